//! Configuration
//!
//! JSON設定ファイルの読み込み。全ての項目に既定値がある。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::application::dto::list_params::{PageSizeLimits, DEFAULT_PER_PAGE, MAX_PER_PAGE};

/// アプリケーション設定
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub listing: ListingConfig,
    pub cache: CacheConfig,
}

/// HTTPサーバー
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// CORSで許可するオリジン（空なら制限しない）
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            allowed_origins: Vec::new(),
        }
    }
}

/// ドキュメントとオブジェクトの保存先
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// ドキュメントストアのディレクトリ（`~` 展開あり）
    pub data_dir: String,
    /// オブジェクトストレージのディレクトリ（`~` 展開あり）
    pub object_dir: String,
    pub bucket: String,
    /// 公開URLのベース（末尾の `/` は不要）
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data/documents".to_string(),
            object_dir: "./data/objects".to_string(),
            bucket: "orgdash".to_string(),
            public_base_url: "https://storage.googleapis.com".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn data_path(&self) -> PathBuf {
        expand_path(&self.data_dir)
    }

    pub fn object_path(&self) -> PathBuf {
        expand_path(&self.object_dir)
    }
}

/// 一覧のページサイズ
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ListingConfig {
    pub default_per_page: usize,
    pub max_per_page: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
        }
    }
}

impl ListingConfig {
    pub fn limits(&self) -> PageSizeLimits {
        PageSizeLimits {
            default_per_page: self.default_per_page.max(1),
            max_per_page: self.max_per_page.max(1),
        }
    }
}

/// ページキャッシュ
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// 有効期限（秒）。0なら期限なし
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 60,
        }
    }
}

impl Config {
    /// 設定ファイルを読み込む
    ///
    /// # Errors
    ///
    /// ファイルが読めない、またはJSONとして不正な場合
    pub fn load(path: &str) -> Result<Self> {
        let expanded = expand_path(path);
        let content = fs::read_to_string(&expanded)
            .with_context(|| format!("Failed to read config file: {}", expanded.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse config file: {}", expanded.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}
