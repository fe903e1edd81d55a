//! JSON Document Store Implementation
//!
//! DocumentStoreのファイルシステム実装（1ドキュメント = 1 JSONファイル）
//!
//! レイアウト: `<root>/<collection>/<id>.json`

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use walkdir::WalkDir;

use crate::domain::repositories::document_store::{
    is_valid_key, Document, DocumentStore, StoreError,
};

/// JSONファイルベースのドキュメントストア
///
/// 書き込みはロックで直列化し、一時ファイルからのリネームで置き換える
#[derive(Clone)]
pub struct JsonDocumentStore {
    root: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonDocumentStore {
    /// 新しいストアを作成
    ///
    /// # Arguments
    ///
    /// * `root` - ドキュメントを保存するディレクトリ（なければ書き込み時に作成）
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(root: &Path, collection: &str) -> Result<PathBuf> {
        if !is_valid_key(collection) {
            return Err(StoreError::InvalidKey(collection.to_string()).into());
        }
        Ok(root.join(collection))
    }

    fn document_path(root: &Path, collection: &str, id: &str) -> Result<PathBuf> {
        if !is_valid_key(id) {
            return Err(StoreError::InvalidKey(id.to_string()).into());
        }
        Ok(Self::collection_dir(root, collection)?.join(format!("{}.json", id)))
    }

    /// ドキュメントファイルを読み込む（同期処理）
    fn read_sync(path: &Path) -> Result<Option<Value>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read document: {}", path.display()))?;
        let value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse document: {}", path.display()))?;

        Ok(Some(value))
    }

    /// ドキュメントファイルを書き込む（同期処理）
    ///
    /// 同じディレクトリの一時ファイルに書いてからリネームする
    fn write_sync(path: &Path, data: &Value) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create collection directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(data).context("Failed to serialize document")?;
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write temporary file: {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace document: {}", path.display()))?;

        Ok(())
    }

    /// コレクションの全ドキュメントを読み込む（同期処理）
    ///
    /// 読めないファイルは警告を出して読み飛ばす
    fn list_sync(root: &Path, collection: &str) -> Result<Vec<Document>> {
        let dir = Self::collection_dir(root, collection)?;
        if !dir.exists() {
            debug!("Collection directory does not exist: {}", dir.display());
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();

        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_valid_key(id) {
                continue;
            }

            match Self::read_sync(path) {
                Ok(Some(data)) => documents.push(Document {
                    id: id.to_string(),
                    data,
                }),
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable document {}: {:#}", path.display(), e),
            }
        }

        documents.sort_by(|a, b| a.id.cmp(&b.id));

        debug!(
            "Loaded {} documents from {}",
            documents.len(),
            dir.display()
        );

        Ok(documents)
    }

    /// 書き込みロックを取ってから処理を実行する
    fn locked<T>(lock: &Mutex<()>, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let _guard = lock
            .lock()
            .map_err(|_| anyhow::anyhow!("Document store write lock is poisoned"))?;
        f()
    }
}

/// ブロッキング処理を専用スレッドで実行する
async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to spawn blocking task: {}", e))?
}

#[async_trait]
impl DocumentStore for JsonDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let path = Self::document_path(&self.root, collection, id)?;
        let id = id.to_string();

        blocking(move || {
            Ok(Self::read_sync(&path)?.map(|data| Document { id, data }))
        })
        .await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>> {
        let root = self.root.clone();
        let collection = collection.to_string();

        blocking(move || Self::list_sync(&root, &collection)).await
    }

    async fn create(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        let path = Self::document_path(&self.root, collection, id)?;
        let lock = self.write_lock.clone();
        let (collection, id) = (collection.to_string(), id.to_string());

        blocking(move || {
            Self::locked(&lock, || {
                if path.exists() {
                    return Err(StoreError::AlreadyExists { collection, id }.into());
                }
                Self::write_sync(&path, &data)?;
                info!("Created document {}/{}", collection, id);
                Ok(())
            })
        })
        .await
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        let path = Self::document_path(&self.root, collection, id)?;
        let lock = self.write_lock.clone();
        let (collection, id) = (collection.to_string(), id.to_string());

        blocking(move || {
            Self::locked(&lock, || {
                Self::write_sync(&path, &data)?;
                info!("Saved document {}/{}", collection, id);
                Ok(())
            })
        })
        .await
    }

    async fn update(&self, collection: &str, id: &str, patch: Map<String, Value>) -> Result<()> {
        let path = Self::document_path(&self.root, collection, id)?;
        let lock = self.write_lock.clone();
        let (collection, id) = (collection.to_string(), id.to_string());

        blocking(move || {
            Self::locked(&lock, || {
                let Some(mut data) = Self::read_sync(&path)? else {
                    return Err(StoreError::NotFound { collection, id }.into());
                };
                let Value::Object(fields) = &mut data else {
                    anyhow::bail!("Document {}/{} is not a JSON object", collection, id);
                };
                fields.extend(patch);

                Self::write_sync(&path, &data)?;
                info!("Updated document {}/{}", collection, id);
                Ok(())
            })
        })
        .await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let path = Self::document_path(&self.root, collection, id)?;
        let lock = self.write_lock.clone();
        let (collection, id) = (collection.to_string(), id.to_string());

        blocking(move || {
            Self::locked(&lock, || {
                if !path.exists() {
                    return Ok(false);
                }
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to delete document: {}", path.display()))?;
                info!("Deleted document {}/{}", collection, id);
                Ok(true)
            })
        })
        .await
    }
}
