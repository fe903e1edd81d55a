//! # Action Result DTO
//!
//! 更新系ユースケース（サーバーアクション）の結果

use log::error;
use serde::Serialize;

use crate::domain::services::validation::FieldErrors;

/// 結果の種別
///
/// HTTPドライバがステータスコードへの対応付けに使う
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Success,
    Invalid,
    NotFound,
    Failed,
}

/// アクションの結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult {
    #[serde(skip)]
    pub status: ActionStatus,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    pub errors: FieldErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ActionResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Success,
            success: true,
            message: message.into(),
            errors: FieldErrors::new(),
            id: None,
        }
    }

    /// 作成に成功した結果（新しいIDを含む）
    pub fn created(message: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::success(message)
        }
    }

    /// フォーム入力の検証エラー
    pub fn invalid(errors: FieldErrors) -> Self {
        Self::rejected("Invalid form data.", errors)
    }

    /// ファイルの検証エラー
    pub fn invalid_file(errors: FieldErrors) -> Self {
        Self::rejected("Invalid file.", errors)
    }

    fn rejected(message: &str, errors: FieldErrors) -> Self {
        Self {
            status: ActionStatus::Invalid,
            success: false,
            message: message.to_string(),
            errors,
            id: None,
        }
    }

    /// 対象のレコードがない
    ///
    /// # Arguments
    ///
    /// * `label` - 表示名（例: "Member"）
    pub fn not_found(label: &str) -> Self {
        Self {
            status: ActionStatus::NotFound,
            success: false,
            message: format!("{} not found.", label),
            errors: FieldErrors::new(),
            id: None,
        }
    }

    /// 予期しない失敗
    ///
    /// エラーIDを付けてログに出力し、同じIDをメッセージに含める
    ///
    /// # Arguments
    ///
    /// * `action` - 動詞と対象（例: "add member"）
    /// * `err` - 原因
    pub fn failure(action: &str, err: &anyhow::Error) -> Self {
        let error_id = uuid::Uuid::new_v4();
        error!("Failed to {} [{}]: {:#}", action, error_id, err);

        Self {
            status: ActionStatus::Failed,
            success: false,
            message: format!(
                "Failed to {}. Please try again. (Error ID: {})",
                action, error_id
            ),
            errors: FieldErrors::new(),
            id: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_created_serializes_id() {
        let result = ActionResult::created("Member added successfully.", "abc");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"success": true, "message": "Member added successfully.", "id": "abc"})
        );
    }

    #[test]
    fn test_invalid_serializes_errors() {
        let mut errors = FieldErrors::new();
        errors.add("name", "Name must be at least 2 characters.");

        let result = ActionResult::invalid(errors);

        assert_eq!(result.status, ActionStatus::Invalid);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "success": false,
                "message": "Invalid form data.",
                "errors": {"name": ["Name must be at least 2 characters."]}
            })
        );
    }

    #[test]
    fn test_failure_message_contains_error_id() {
        let result = ActionResult::failure("delete prestasi", &anyhow::anyhow!("disk full"));

        assert_eq!(result.status, ActionStatus::Failed);
        assert!(result
            .message
            .starts_with("Failed to delete prestasi. Please try again. (Error ID: "));
        assert!(!result.message.contains("disk full"));
    }

    #[test]
    fn test_not_found() {
        let result = ActionResult::not_found("Division");
        assert_eq!(result.message, "Division not found.");
        assert!(!result.is_success());
    }
}
