//! # Object Storage Trait
//!
//! アップロード画像の保存先を抽象化

use anyhow::Result;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// オブジェクトストレージ
///
/// Cloud Storageのバケットのように、キーでバイト列を保存し公開URLを発行する
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// オブジェクトを保存する（同じキーは上書き）
    ///
    /// # Arguments
    ///
    /// * `key` - オブジェクトキー（例: `members/1700000000000_foto.png`）
    /// * `bytes` - 内容
    /// * `content_type` - Content-Type
    async fn save(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()>;

    /// オブジェクトを削除する
    ///
    /// # Errors
    ///
    /// オブジェクトが存在しない場合もエラーを返す
    async fn delete(&self, key: &str) -> Result<()>;

    /// キーの公開URL
    fn public_url(&self, key: &str) -> String;

    /// 公開URLからキーを取り出す
    ///
    /// このストレージの公開URLでなければ `None`
    fn key_from_url(&self, url: &str) -> Option<String>;
}
