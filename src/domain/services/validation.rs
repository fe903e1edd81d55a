//! # Validation Service
//!
//! フォーム入力のバリデーションルール

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// フィールドごとのエラーメッセージ
///
/// フィールド名の順序で安定してシリアライズされる
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// フィールドにエラーメッセージを追加
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// フィールドのエラーメッセージを返す
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// 他のエラーを取り込む
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }
}

/// バリデーションビルダー
///
/// ルールを順に適用し、最後に `finish` で結果をまとめる。
///
/// ```
/// use orgdash::domain::services::validation::Validator;
///
/// let result = Validator::new()
///     .min_chars("name", "A", 2, "Name must be at least 2 characters.")
///     .email("email", "someone@example.com", "Please enter a valid email.")
///     .finish();
///
/// let errors = result.unwrap_err();
/// assert_eq!(errors.len(), 1);
/// assert!(errors.get("name").is_some());
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 文字数（Unicodeスカラー値）が `min` 以上であること
    pub fn min_chars(mut self, field: &str, value: &str, min: usize, message: &str) -> Self {
        if value.chars().count() < min {
            self.errors.add(field, message);
        }
        self
    }

    /// メールアドレスの形式であること
    pub fn email(mut self, field: &str, value: &str, message: &str) -> Self {
        if !is_valid_email(value) {
            self.errors.add(field, message);
        }
        self
    }

    /// リストが空でないこと
    pub fn non_empty_list<T>(mut self, field: &str, values: &[T], message: &str) -> Self {
        if values.is_empty() {
            self.errors.add(field, message);
        }
        self
    }

    /// 任意の条件。`ok` が偽ならエラーを記録する
    pub fn custom(mut self, field: &str, ok: bool, message: &str) -> Self {
        if !ok {
            self.errors.add(field, message);
        }
        self
    }

    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}
