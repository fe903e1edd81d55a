//! # HTTP API
//!
//! axumのルーターとハンドラ
//!
//! ## エンドポイント
//!
//! | メソッド | パス | 内容 |
//! |---|---|---|
//! | GET / POST | `/api/<entity>` | 一覧 / 追加 |
//! | GET / PUT / DELETE | `/api/<entity>/{id}` | 詳細 / 更新 / 削除 |
//! | GET / POST | `/api/prestasi/categories` | カテゴリ一覧 / 追加 |
//! | GET / POST | `/api/prestasi/awards` | 賞一覧 / 追加 |
//!
//! `<entity>` は `divisions`, `members`, `periods`, `prestasi`, `products`

pub mod divisions;
pub mod error;
pub mod extract;
pub mod members;
pub mod periods;
pub mod prestasi;
pub mod products;
pub mod response;

use axum::extract::DefaultBodyLimit;
use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use log::warn;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::app::AppState;

/// リクエスト本文の上限（画像5MBとフォームの残り）
pub const BODY_LIMIT: usize = 6 * 1024 * 1024;

/// APIのルーター
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/divisions", get(divisions::list).post(divisions::create))
        .route(
            "/api/divisions/{id}",
            get(divisions::show)
                .put(divisions::update)
                .delete(divisions::delete),
        )
        .route("/api/members", get(members::list).post(members::create))
        .route(
            "/api/members/{id}",
            get(members::show).put(members::update).delete(members::delete),
        )
        .route("/api/periods", get(periods::list).post(periods::create))
        .route(
            "/api/periods/{id}",
            get(periods::show).put(periods::update).delete(periods::delete),
        )
        .route("/api/prestasi", get(prestasi::list).post(prestasi::create))
        .route(
            "/api/prestasi/categories",
            get(prestasi::categories).post(prestasi::add_category),
        )
        .route(
            "/api/prestasi/awards",
            get(prestasi::awards).post(prestasi::add_award),
        )
        .route(
            "/api/prestasi/{id}",
            get(prestasi::show)
                .put(prestasi::update)
                .delete(prestasi::delete),
        )
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}

/// CORSの設定
///
/// 許可オリジンが空ならどのオリジンも許可する
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
