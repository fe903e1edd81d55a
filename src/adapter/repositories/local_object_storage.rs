//! Local Object Storage Implementation
//!
//! ObjectStorageのファイルシステム実装（`<root>/<bucket>/<key>` に保存）

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::domain::repositories::object_storage::ObjectStorage;

/// 公開URLのパスでエンコードする文字（`/` は区切りとして残す）
const PATH_SEGMENTS: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// ローカルディレクトリをバケットとして使うオブジェクトストレージ
pub struct LocalObjectStorage {
    root: PathBuf,
    bucket: String,
    public_base_url: String,
}

impl LocalObjectStorage {
    /// 新しいストレージを作成
    ///
    /// # Arguments
    ///
    /// * `root` - オブジェクトを保存するディレクトリ
    /// * `bucket` - バケット名（ディレクトリ名と公開URLに使う）
    /// * `public_base_url` - 公開URLのベース（例: `https://storage.googleapis.com`）
    pub fn new(root: impl Into<PathBuf>, bucket: &str, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 公開URLの接頭辞（`<base>/<bucket>/`）
    fn url_prefix(&self) -> String {
        format!("{}/{}/", self.public_base_url, self.bucket)
    }

    /// キーに対応するファイルパス
    ///
    /// 空のキーや `..` を含むキーは拒否する
    fn object_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let is_safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_safe {
            anyhow::bail!("Invalid object key: {:?}", key);
        }
        Ok(self.root.join(&self.bucket).join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn save(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        let path = self.object_path(key)?;
        let bytes = bytes.to_vec();

        tokio::task::spawn_blocking(move || -> Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("Failed to create object directory")?;
            }
            fs::write(&path, bytes)
                .with_context(|| format!("Failed to write object: {}", path.display()))
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to spawn blocking task: {}", e))??;

        info!("Stored object {} ({})", key, content_type);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.object_path(key)?;

        tokio::task::spawn_blocking(move || {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to delete object: {}", path.display()))
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to spawn blocking task: {}", e))??;

        info!("Deleted object {}", key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}{}", self.url_prefix(), utf8_percent_encode(key, PATH_SEGMENTS))
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        let encoded = url.strip_prefix(&self.url_prefix())?;
        let key = percent_decode_str(encoded).decode_utf8().ok()?;
        if key.is_empty() {
            return None;
        }
        Some(key.into_owned())
    }
}
