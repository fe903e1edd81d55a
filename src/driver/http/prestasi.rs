//! Prestasi Handlers
//!
//! 画像はフォームの `image_url` フィールドで受け取る。
//! 選択肢（カテゴリ・賞）は `value` フィールドで追加する。

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::Value;
use std::sync::Arc;

use super::error::ApiError;
use super::extract::FormSubmission;
use super::response::{detail_slot, ActionResponse, ListingRequest};
use crate::application::dto::forms::FromFormData;
use crate::application::use_cases::prestasi::IMAGE_FIELD;
use crate::domain::entities::prestasi::{Prestasi, PrestasiInput};
use crate::domain::entities::Record;
use crate::driver::app::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let request = ListingRequest::new(Prestasi::COLLECTION, pairs, state.limits);
    let slot = request.slot(&*state.cache);
    if let Some(cached) = slot.hit() {
        return Ok(cached);
    }

    let page = state.prestasi.list(&request.params).await?;
    request.respond(&slot, page)
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let slot = detail_slot(&*state.cache, Prestasi::COLLECTION, &id);
    if let Some(cached) = slot.hit() {
        return Ok(cached);
    }

    let prestasi = state
        .prestasi
        .get(&id)
        .await?
        .ok_or(ApiError::NotFound(Prestasi::LABEL))?;
    slot.store(&prestasi)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    FormSubmission(form): FormSubmission,
) -> ActionResponse {
    let input = PrestasiInput::from_form_data(&form);
    let result = state.prestasi.add(input, form.file(IMAGE_FIELD)).await;
    ActionResponse::created(result)
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    FormSubmission(form): FormSubmission,
) -> ActionResponse {
    let input = PrestasiInput::from_form_data(&form);
    let result = state.prestasi.update(&id, input, form.file(IMAGE_FIELD)).await;
    ActionResponse::ok(result)
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ActionResponse {
    ActionResponse::ok(state.prestasi.delete(&id).await)
}

pub async fn categories(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.prestasi.categories().await?))
}

pub async fn add_category(
    State(state): State<Arc<AppState>>,
    FormSubmission(form): FormSubmission,
) -> ActionResponse {
    let value = form.text("value");
    ActionResponse::created(state.prestasi.add_category(&value).await)
}

pub async fn awards(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.prestasi.awards().await?))
}

pub async fn add_award(
    State(state): State<Arc<AppState>>,
    FormSubmission(form): FormSubmission,
) -> ActionResponse {
    let value = form.text("value");
    ActionResponse::created(state.prestasi.add_award(&value).await)
}
