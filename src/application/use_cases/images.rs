//! # Image Workflow
//!
//! 画像付きレコードに共通のアップロード・巻き戻し・後片付け

use anyhow::{Context, Result};
use chrono::Utc;
use log::{info, warn};

use crate::domain::entities::upload::{StoredImage, UploadedFile};
use crate::domain::repositories::object_storage::ObjectStorage;

/// オブジェクトキーの接頭辞の付け方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrefix {
    /// ミリ秒のタイムスタンプ
    Timestamp,
    /// UUID
    Uuid,
}

impl KeyPrefix {
    fn generate(self) -> String {
        match self {
            KeyPrefix::Timestamp => Utc::now().timestamp_millis().to_string(),
            KeyPrefix::Uuid => uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// 画像をアップロードする
///
/// 検証は呼び出し側で済ませておくこと
///
/// # Arguments
///
/// * `storage` - 保存先
/// * `file` - 検証済みのファイル
/// * `folder` - キーのフォルダ（例: `members`）
/// * `prefix` - キーの接頭辞の種類
///
/// # Errors
///
/// ストレージへの保存に失敗した場合
pub async fn upload_image<O: ObjectStorage + ?Sized>(
    storage: &O,
    file: &UploadedFile,
    folder: &str,
    prefix: KeyPrefix,
) -> Result<StoredImage> {
    let key = file.object_key(folder, &prefix.generate());

    storage
        .save(&key, &file.bytes, &file.content_type)
        .await
        .with_context(|| format!("Failed to upload {}", key))?;

    info!("Uploaded {} ({} bytes)", key, file.size());

    Ok(StoredImage {
        url: storage.public_url(&key),
        key,
    })
}

/// 画像を削除する（失敗しても警告のみ）
///
/// キーが記録されていない場合は公開URLから取り出す。どちらも得られなければ何もしない。
pub async fn discard_image<O: ObjectStorage + ?Sized>(storage: &O, image: &StoredImage) {
    let key = if image.key.is_empty() {
        match storage.key_from_url(&image.url) {
            Some(key) => key,
            None => return,
        }
    } else {
        image.key.clone()
    };

    match storage.delete(&key).await {
        Ok(()) => info!("Deleted {}", key),
        Err(e) => warn!("Failed to delete {}: {:#}", key, e),
    }
}

/// 差し替え前の画像を削除する
///
/// 新旧が同じオブジェクトを指す場合は残す
pub async fn discard_replaced<O: ObjectStorage + ?Sized>(
    storage: &O,
    previous: Option<&StoredImage>,
    current: &StoredImage,
) {
    if let Some(previous) = previous {
        if previous.url != current.url || previous.key != current.key {
            discard_image(storage, previous).await;
        }
    }
}
