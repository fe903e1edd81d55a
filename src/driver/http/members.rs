//! Member Handlers
//!
//! 写真はフォームの `photo_url` フィールドで受け取る

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::Value;
use std::sync::Arc;

use super::error::ApiError;
use super::extract::FormSubmission;
use super::response::{detail_slot, ActionResponse, ListingRequest};
use crate::application::dto::forms::FromFormData;
use crate::application::use_cases::members::PHOTO_FIELD;
use crate::domain::entities::member::{Member, MemberInput};
use crate::domain::entities::Record;
use crate::driver::app::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let request = ListingRequest::new(Member::COLLECTION, pairs, state.limits);
    let slot = request.slot(&*state.cache);
    if let Some(cached) = slot.hit() {
        return Ok(cached);
    }

    let page = state.members.list(&request.params).await?;
    request.respond(&slot, page)
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let slot = detail_slot(&*state.cache, Member::COLLECTION, &id);
    if let Some(cached) = slot.hit() {
        return Ok(cached);
    }

    let member = state
        .members
        .get(&id)
        .await?
        .ok_or(ApiError::NotFound(Member::LABEL))?;
    slot.store(&member)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    FormSubmission(form): FormSubmission,
) -> ActionResponse {
    let input = MemberInput::from_form_data(&form);
    let result = state.members.add(input, form.file(PHOTO_FIELD)).await;
    ActionResponse::created(result)
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    FormSubmission(form): FormSubmission,
) -> ActionResponse {
    let input = MemberInput::from_form_data(&form);
    let result = state.members.update(&id, input, form.file(PHOTO_FIELD)).await;
    ActionResponse::ok(result)
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ActionResponse {
    ActionResponse::ok(state.members.delete(&id).await)
}
