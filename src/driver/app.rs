//! Application Wiring
//!
//! 設定からRepository実装とUse Caseを組み立て、サブコマンドを実行する

use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::adapter::config::Config;
use crate::adapter::repositories::{JsonDocumentStore, LocalObjectStorage, MemoryPageCache};
use crate::application::dto::list_params::PageSizeLimits;
use crate::application::use_cases::divisions::DivisionUseCase;
use crate::application::use_cases::members::MemberUseCase;
use crate::application::use_cases::periods::PeriodUseCase;
use crate::application::use_cases::prestasi::PrestasiUseCase;
use crate::application::use_cases::products::ProductUseCase;
use crate::domain::repositories::document_store::DocumentStore;
use crate::domain::repositories::object_storage::ObjectStorage;
use crate::domain::repositories::page_cache::PageCache;

use super::cli::{Args, Command};
use super::server;

pub type SharedStore = Arc<dyn DocumentStore>;
pub type SharedStorage = Arc<dyn ObjectStorage>;
pub type SharedCache = Arc<dyn PageCache>;

/// HTTPハンドラが共有する状態
pub struct AppState {
    pub divisions: DivisionUseCase<dyn DocumentStore, dyn PageCache>,
    pub members: MemberUseCase<dyn DocumentStore, dyn ObjectStorage, dyn PageCache>,
    pub periods: PeriodUseCase<dyn DocumentStore, dyn PageCache>,
    pub prestasi: PrestasiUseCase<dyn DocumentStore, dyn ObjectStorage, dyn PageCache>,
    pub products: ProductUseCase<dyn DocumentStore, dyn ObjectStorage, dyn PageCache>,
    pub cache: SharedCache,
    pub limits: PageSizeLimits,
}

impl AppState {
    /// Repository実装を注入して状態を作成
    pub fn new(
        store: SharedStore,
        storage: SharedStorage,
        cache: SharedCache,
        limits: PageSizeLimits,
    ) -> Arc<Self> {
        Arc::new(Self {
            divisions: DivisionUseCase::new(store.clone(), cache.clone()),
            members: MemberUseCase::new(store.clone(), storage.clone(), cache.clone()),
            periods: PeriodUseCase::new(store.clone(), cache.clone()),
            prestasi: PrestasiUseCase::new(store.clone(), storage.clone(), cache.clone()),
            products: ProductUseCase::new(store, storage, cache.clone()),
            cache,
            limits,
        })
    }

    /// 設定ファイルの内容から状態を作成
    pub fn from_config(config: &Config) -> Arc<Self> {
        let store: SharedStore = Arc::new(JsonDocumentStore::new(config.storage.data_path()));
        let storage: SharedStorage = Arc::new(LocalObjectStorage::new(
            config.storage.object_path(),
            &config.storage.bucket,
            &config.storage.public_base_url,
        ));
        let cache: SharedCache = Arc::new(MemoryPageCache::from_settings(
            config.cache.enabled,
            config.cache.ttl_seconds,
        ));

        Self::new(store, storage, cache, config.listing.limits())
    }
}

/// サブコマンドを実行する
///
/// # Errors
///
/// サーバーの起動やシードデータの書き込みに失敗した場合
pub async fn run(mut config: Config, args: Args) -> Result<()> {
    match args.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let state = AppState::from_config(&config);
            server::serve(&config.server, state).await
        }
        Command::Seed => {
            let state = AppState::from_config(&config);
            info!(
                "Seeding products into {}",
                config.storage.data_path().display()
            );

            let summary = state.products.seed().await?;
            println!(
                "✓ Seeded {} products ({} already existed)",
                summary.inserted, summary.skipped
            );
            Ok(())
        }
    }
}
