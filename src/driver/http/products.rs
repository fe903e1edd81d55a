//! Product Handlers
//!
//! 画像はフォームの `image` フィールドで受け取る

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::Value;
use std::sync::Arc;

use super::error::ApiError;
use super::extract::FormSubmission;
use super::response::{detail_slot, ActionResponse, ListingRequest};
use crate::application::dto::forms::FromFormData;
use crate::application::use_cases::products::PHOTO_FIELD;
use crate::domain::entities::product::{Product, ProductInput};
use crate::domain::entities::Record;
use crate::driver::app::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let request = ListingRequest::new(Product::COLLECTION, pairs, state.limits);
    let slot = request.slot(&*state.cache);
    if let Some(cached) = slot.hit() {
        return Ok(cached);
    }

    let page = state.products.list(&request.params).await?;
    request.respond(&slot, page)
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let slot = detail_slot(&*state.cache, Product::COLLECTION, &id);
    if let Some(cached) = slot.hit() {
        return Ok(cached);
    }

    let product = state
        .products
        .get(&id)
        .await?
        .ok_or(ApiError::NotFound(Product::LABEL))?;
    slot.store(&product)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    FormSubmission(form): FormSubmission,
) -> ActionResponse {
    let input = ProductInput::from_form_data(&form);
    let result = state.products.add(input, form.file(PHOTO_FIELD)).await;
    ActionResponse::created(result)
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    FormSubmission(form): FormSubmission,
) -> ActionResponse {
    let input = ProductInput::from_form_data(&form);
    let result = state.products.update(&id, input, form.file(PHOTO_FIELD)).await;
    ActionResponse::ok(result)
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ActionResponse {
    ActionResponse::ok(state.products.delete(&id).await)
}
