//! HTTP Errors
//!
//! ハンドラのエラーとレスポンスへの変換

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::application::dto::action_result::ActionResult;
use crate::domain::services::validation::FieldErrors;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0} not found.")]
    NotFound(&'static str),

    /// 本文を解釈できなかった（ステータスは抽出時の拒否理由に従う）
    #[error("Malformed request: {reason}")]
    MalformedRequest { status: StatusCode, reason: String },

    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// axumの抽出エラーから作る
    pub fn rejected(status: StatusCode, reason: impl Into<String>) -> Self {
        ApiError::MalformedRequest {
            status,
            reason: reason.into(),
        }
    }

    /// 本文として返すアクション結果
    fn into_result(self) -> (StatusCode, ActionResult) {
        match self {
            ApiError::NotFound(label) => (StatusCode::NOT_FOUND, ActionResult::not_found(label)),
            ApiError::MalformedRequest { status, reason } => {
                let mut result = ActionResult::invalid(FieldErrors::new());
                result.message = format!("Malformed request: {}", reason);
                (status, result)
            }
            ApiError::Internal(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ActionResult::failure("load data", &err),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, result) = self.into_result();
        (status, Json(result)).into_response()
    }
}
