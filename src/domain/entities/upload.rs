//! # Upload Value Objects
//!
//! 画像アップロードの値オブジェクトと検証ルール

use serde::{Deserialize, Serialize};

use crate::domain::services::validation::FieldErrors;

/// 画像の最大サイズ（バイト）
pub const MAX_FILE_SIZE: usize = 5_000_000;

/// 受け付ける画像のContent-Type
pub const ACCEPTED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

pub const FILE_TOO_LARGE_MESSAGE: &str = "Max file size is 5MB.";
pub const FILE_TYPE_MESSAGE: &str = ".jpg, .jpeg, .png and .webp files are accepted.";

/// フォームから受け取ったファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// 0バイトのファイルは「ファイルなし」として扱う
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 画像として受け付けられるか検証する
    ///
    /// # Arguments
    ///
    /// * `field` - エラーを記録するフィールド名
    ///
    /// # Errors
    ///
    /// サイズ超過または非対応のContent-Typeの場合、該当フィールドのエラーを返す
    pub fn validate_image(&self, field: &str) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.size() > MAX_FILE_SIZE {
            errors.add(field, FILE_TOO_LARGE_MESSAGE);
        }
        if !ACCEPTED_IMAGE_TYPES.contains(&self.content_type.to_ascii_lowercase().as_str()) {
            errors.add(field, FILE_TYPE_MESSAGE);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// オブジェクトキーを組み立てる
    ///
    /// `<folder>/<prefix>_<サニタイズ済みファイル名>`
    pub fn object_key(&self, folder: &str, prefix: &str) -> String {
        format!("{}/{}_{}", folder, prefix, sanitize_file_name(&self.file_name))
    }
}

/// ファイル名をオブジェクトキーに使える形にする
///
/// パス区切りより後ろだけを残し、`[A-Za-z0-9._-]` 以外は `_` に置き換える
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    match sanitized.trim_matches('.') {
        "" => "upload".to_string(),
        _ => sanitized,
    }
}

/// 保存済みの画像
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredImage {
    /// 公開URL
    pub url: String,
    /// オブジェクトキー
    pub key: String,
}
