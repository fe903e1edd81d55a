//! # Division Entity
//!
//! 組織の部署

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;
use crate::domain::services::listing::Searchable;
use crate::domain::services::slug::slugify;
use crate::domain::services::validation::{FieldErrors, Validator};

/// 部署レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub order_index: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Division {
    const COLLECTION: &'static str = "divisions";
    const LABEL: &'static str = "Division";
}

impl Searchable for Division {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name[..], &self.slug[..], &self.description[..]]
    }
}

/// フォームから受け取った未検証の部署入力
#[derive(Debug, Clone, Default)]
pub struct DivisionInput {
    pub name: String,
    /// 空の場合は `name` から生成する
    pub slug: String,
    pub description: String,
    pub order_index: String,
}

/// 検証済みの部署データ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DivisionDraft {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub order_index: u32,
}

impl DivisionInput {
    /// 入力を検証してドラフトに変換
    ///
    /// # Errors
    ///
    /// ルール違反があればフィールドごとのエラーを返す
    pub fn validate(self) -> Result<DivisionDraft, FieldErrors> {
        let slug = if self.slug.trim().is_empty() {
            slugify(&self.name)
        } else {
            self.slug.trim().to_string()
        };
        let order_index = self.order_index.trim().parse::<u32>().ok();

        Validator::new()
            .min_chars("name", &self.name, 2, "Name must be at least 2 characters.")
            .min_chars("slug", &slug, 2, "Slug must be at least 2 characters.")
            .min_chars(
                "description",
                &self.description,
                5,
                "Description must be at least 5 characters.",
            )
            .custom(
                "order_index",
                order_index.is_some(),
                "Order index must be a non-negative integer.",
            )
            .finish()?;

        Ok(DivisionDraft {
            name: self.name,
            slug,
            description: self.description,
            order_index: order_index.unwrap_or_default(),
        })
    }
}

impl DivisionDraft {
    /// 新規レコードを作成
    pub fn into_record(self, id: String, now: DateTime<Utc>) -> Division {
        Division {
            id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            order_index: self.order_index,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}
