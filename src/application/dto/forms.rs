//! # Form Mapping
//!
//! `FormData` からドメインの入力型への変換

use super::form_data::FormData;
use crate::domain::entities::division::DivisionInput;
use crate::domain::entities::member::MemberInput;
use crate::domain::entities::period::PeriodInput;
use crate::domain::entities::prestasi::PrestasiInput;
use crate::domain::entities::product::ProductInput;

/// フォームから組み立てられる入力
pub trait FromFormData: Sized {
    fn from_form_data(form: &FormData) -> Self;
}

impl FromFormData for DivisionInput {
    fn from_form_data(form: &FormData) -> Self {
        Self {
            name: form.text("name"),
            slug: form.text("slug"),
            description: form.text("description"),
            order_index: form.text("order_index"),
        }
    }
}

impl FromFormData for MemberInput {
    fn from_form_data(form: &FormData) -> Self {
        Self {
            name: form.text("name"),
            email: form.text("email"),
            phone: form.text("phone"),
            student_id: form.text("student_id"),
            bio: form.text("bio"),
        }
    }
}

impl FromFormData for PeriodInput {
    fn from_form_data(form: &FormData) -> Self {
        Self {
            name: form.text("name"),
            is_active: form.text("is_active"),
            start_date: form.text("start_date"),
            end_date: form.text("end_date"),
        }
    }
}

impl FromFormData for PrestasiInput {
    fn from_form_data(form: &FormData) -> Self {
        Self {
            title: form.text("title"),
            description: form.text("description"),
            team_name: form.text("team_name"),
            members: form
                .get_all("members")
                .into_iter()
                .map(str::to_string)
                .collect(),
            category: form.text("category"),
            award: form.text("award"),
            year: form.text("year"),
        }
    }
}

impl FromFormData for ProductInput {
    fn from_form_data(form: &FormData) -> Self {
        Self {
            name: form.text("name"),
            category: form.text("category"),
            price: form.text("price"),
            description: form.text("description"),
        }
    }
}
