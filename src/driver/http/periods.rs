//! Period Handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::Value;
use std::sync::Arc;

use super::error::ApiError;
use super::extract::FormSubmission;
use super::response::{detail_slot, ActionResponse, ListingRequest};
use crate::application::dto::forms::FromFormData;
use crate::domain::entities::period::{Period, PeriodInput};
use crate::domain::entities::Record;
use crate::driver::app::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let request = ListingRequest::new(Period::COLLECTION, pairs, state.limits);
    let slot = request.slot(&*state.cache);
    if let Some(cached) = slot.hit() {
        return Ok(cached);
    }

    let page = state.periods.list(&request.params).await?;
    request.respond(&slot, page)
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let slot = detail_slot(&*state.cache, Period::COLLECTION, &id);
    if let Some(cached) = slot.hit() {
        return Ok(cached);
    }

    let period = state
        .periods
        .get(&id)
        .await?
        .ok_or(ApiError::NotFound(Period::LABEL))?;
    slot.store(&period)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    FormSubmission(form): FormSubmission,
) -> ActionResponse {
    let input = PeriodInput::from_form_data(&form);
    ActionResponse::created(state.periods.add(input).await)
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    FormSubmission(form): FormSubmission,
) -> ActionResponse {
    let input = PeriodInput::from_form_data(&form);
    ActionResponse::ok(state.periods.update(&id, input).await)
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ActionResponse {
    ActionResponse::ok(state.periods.delete(&id).await)
}
