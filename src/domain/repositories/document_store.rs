//! # Document Store Trait
//!
//! コレクション単位のドキュメント永続化を抽象化

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// ストアの操作エラー
///
/// `anyhow::Error` に包んで返し、呼び出し側は `downcast_ref` で判別する
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("document {collection}/{id} already exists")]
    AlreadyExists { collection: String, id: String },

    #[error("invalid document key: {0:?}")]
    InvalidKey(String),
}

/// 保存されたドキュメント
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// ドキュメントストア
///
/// Firestoreのようなスキーマレスなドキュメントデータベースの最小限の操作
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// ドキュメントを取得する（存在しなければ `None`）
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// コレクションの全ドキュメントをID順で返す
    async fn list(&self, collection: &str) -> Result<Vec<Document>>;

    /// 新しいドキュメントを作成する
    ///
    /// # Errors
    ///
    /// 同じIDが既に存在する場合は `StoreError::AlreadyExists`
    async fn create(&self, collection: &str, id: &str, data: Value) -> Result<()>;

    /// ドキュメントを作成または上書きする
    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<()>;

    /// トップレベルのフィールドをマージする
    ///
    /// # Errors
    ///
    /// ドキュメントが存在しない場合は `StoreError::NotFound`
    async fn update(&self, collection: &str, id: &str, patch: Map<String, Value>) -> Result<()>;

    /// ドキュメントを削除する
    ///
    /// # Returns
    ///
    /// ドキュメントが存在していた場合に `true`
    async fn delete(&self, collection: &str, id: &str) -> Result<bool>;
}

/// 新しいドキュメントIDを生成する
pub fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// コレクション名・ドキュメントIDとして使える文字列か
///
/// `[A-Za-z0-9_-]` のみ、1〜128文字
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 128
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// エラーが `StoreError::NotFound` かどうか
pub fn is_not_found(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<StoreError>(),
        Some(StoreError::NotFound { .. })
    )
}

/// 値をパッチ用のフィールドマップに変換する
///
/// # Errors
///
/// 値がJSONオブジェクトにシリアライズされない場合
pub fn to_patch<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value).context("Failed to serialize patch")? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("Patch must be a JSON object, got {}", other),
    }
}

/// パッチに `updated_at` を設定する
pub fn touch(patch: &mut Map<String, Value>, now: DateTime<Utc>) {
    patch.insert(
        "updated_at".to_string(),
        Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
}

/// 型付きコレクション
///
/// ストアとコレクション名の組。レコードのシリアライズを引き受ける。
pub struct Collection<'a, D: DocumentStore + ?Sized> {
    store: &'a D,
    name: &'a str,
}

impl<'a, D: DocumentStore + ?Sized> Collection<'a, D> {
    pub fn new(store: &'a D, name: &'a str) -> Self {
        Self { store, name }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// ドキュメントをレコードとして取得する
    ///
    /// キーとして使えないIDは存在しないものとして扱う
    pub async fn get<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>> {
        if !is_valid_key(id) {
            return Ok(None);
        }

        match self.store.get(self.name, id).await? {
            Some(document) => {
                let record = Self::decode(document)
                    .with_context(|| format!("Failed to decode {}/{}", self.name, id))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// 全レコードを取得する
    ///
    /// デコードできないドキュメントは警告を出して読み飛ばす
    pub async fn all<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let documents = self.store.list(self.name).await?;
        let mut records = Vec::with_capacity(documents.len());

        for document in documents {
            let id = document.id.clone();
            match Self::decode(document) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping malformed document {}/{}: {}", self.name, id, e),
            }
        }

        Ok(records)
    }

    pub async fn create<T: Serialize>(&self, id: &str, record: &T) -> Result<()> {
        let data = serde_json::to_value(record).context("Failed to serialize record")?;
        self.store.create(self.name, id, data).await
    }

    pub async fn set<T: Serialize>(&self, id: &str, record: &T) -> Result<()> {
        let data = serde_json::to_value(record).context("Failed to serialize record")?;
        self.store.set(self.name, id, data).await
    }

    pub async fn update(&self, id: &str, patch: Map<String, Value>) -> Result<()> {
        self.store.update(self.name, id, patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.store.delete(self.name, id).await
    }

    /// ドキュメントIDを `id` として補ってからデコードする
    fn decode<T: DeserializeOwned>(document: Document) -> Result<T> {
        let mut data = document.data;
        if let Value::Object(map) = &mut data {
            map.entry("id").or_insert(Value::String(document.id));
        }
        Ok(serde_json::from_value(data)?)
    }
}
