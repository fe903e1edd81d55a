//! Responses
//!
//! 一覧・詳細のJSONレスポンス（ページキャッシュ経由）とアクション結果のステータス対応

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;
use crate::application::dto::action_result::{ActionResult, ActionStatus};
use crate::application::dto::list_params::{ListParams, PageSizeLimits};
use crate::application::dto::search_params::SearchParams;
use crate::domain::repositories::page_cache::{detail_path, PageCache};
use crate::domain::services::listing::Page;

/// 一覧のナビゲーションリンク
#[derive(Debug, Serialize)]
pub struct Links {
    pub current: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

#[derive(Debug, Serialize)]
struct Listing<T> {
    #[serde(flatten)]
    page: Page<T>,
    links: Links,
}

/// キャッシュの読み書き先
///
/// 作成時に世代を記録し、その後に無効化されていれば保存しない
pub struct CacheSlot<'a> {
    cache: &'a dyn PageCache,
    key: String,
    generation: u64,
}

impl<'a> CacheSlot<'a> {
    pub fn open(cache: &'a dyn PageCache, key: impl Into<String>) -> Self {
        let key = key.into();
        let generation = cache.generation(&key);
        Self {
            cache,
            key,
            generation,
        }
    }

    /// キャッシュ済みのページ
    pub fn hit(&self) -> Option<Json<Value>> {
        self.cache.get(&self.key).map(Json)
    }

    /// 値をJSONにしてキャッシュに保存する
    pub fn store<T: Serialize>(&self, value: &T) -> Result<Json<Value>, ApiError> {
        let value = serde_json::to_value(value).map_err(anyhow::Error::from)?;
        self.cache
            .put_if_unchanged(&self.key, self.generation, value.clone());
        Ok(Json(value))
    }
}

/// 一覧リクエスト
///
/// クエリからページング条件とキャッシュキーを組み立てる
pub struct ListingRequest {
    collection: &'static str,
    link_base: SearchParams,
    pub params: ListParams,
    pub cache_key: String,
}

impl ListingRequest {
    pub fn new(
        collection: &'static str,
        pairs: Vec<(String, String)>,
        limits: PageSizeLimits,
    ) -> Self {
        let search = SearchParams::from_pairs(pairs);
        let query = search.canonical_query_string();
        let cache_key = if query.is_empty() {
            collection.to_string()
        } else {
            format!("{}?{}", collection, query)
        };

        Self {
            collection,
            link_base: link_base(&search),
            params: ListParams::from_params(search, limits),
            cache_key,
        }
    }

    /// 一覧のキャッシュ
    pub fn slot<'a>(&self, cache: &'a dyn PageCache) -> CacheSlot<'a> {
        CacheSlot::open(cache, self.cache_key.clone())
    }

    fn link(&self, page: usize) -> String {
        format!(
            "/api/{}?{}",
            self.collection,
            self.link_base.with_page(page).to_query_string()
        )
    }

    /// 一覧のレスポンスを作り、キャッシュに保存する
    pub fn respond<T: Serialize>(
        &self,
        slot: &CacheSlot<'_>,
        page: Page<T>,
    ) -> Result<Json<Value>, ApiError> {
        let links = Links {
            current: self.link(page.page),
            next: page.has_next().then(|| self.link(page.page + 1)),
            prev: page.has_prev().then(|| self.link(page.page - 1)),
        };

        slot.store(&Listing { page, links })
    }
}

/// リンクの元になるクエリ
///
/// 空の検索語と日付フィルタを落とし、ページ番号を外す
fn link_base(search: &SearchParams) -> SearchParams {
    let mut base = search.clone();
    let term = search.get("search").unwrap_or_default().to_string();
    base.apply_search(&term);
    for prefix in ["createdAt", "updatedAt"] {
        let from = search.get_non_empty(&format!("{}From", prefix));
        let to = search.get_non_empty(&format!("{}To", prefix));
        base.apply_date_range(prefix, from, to);
    }
    base
}

/// 詳細ページのキャッシュ
pub fn detail_slot<'a>(cache: &'a dyn PageCache, collection: &str, id: &str) -> CacheSlot<'a> {
    CacheSlot::open(cache, detail_path(collection, id))
}

/// アクション結果のレスポンス
pub struct ActionResponse {
    result: ActionResult,
    success_status: StatusCode,
}

impl ActionResponse {
    pub fn ok(result: ActionResult) -> Self {
        Self {
            result,
            success_status: StatusCode::OK,
        }
    }

    /// 作成系のレスポンス（新しいIDがあれば201）
    pub fn created(result: ActionResult) -> Self {
        let success_status = if result.id.is_some() {
            StatusCode::CREATED
        } else {
            StatusCode::OK
        };
        Self {
            result,
            success_status,
        }
    }
}

impl IntoResponse for ActionResponse {
    fn into_response(self) -> Response {
        let status = match self.result.status {
            ActionStatus::Success => self.success_status,
            ActionStatus::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
            ActionStatus::NotFound => StatusCode::NOT_FOUND,
            ActionStatus::Failed => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self.result)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::listing::paginate;
    use crate::domain::services::validation::FieldErrors;
    use crate::adapter::repositories::MemoryPageCache;
    use crate::test_support::RecordingPageCache;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_cache_key_is_canonical() {
        let a = ListingRequest::new(
            "members",
            pairs(&[("search", "budi"), ("page", "2")]),
            PageSizeLimits::default(),
        );
        let b = ListingRequest::new(
            "members",
            pairs(&[("page", "2"), ("search", "budi")]),
            PageSizeLimits::default(),
        );

        assert_eq!(a.cache_key, b.cache_key);
        assert!(a.cache_key.starts_with("members?"));
        assert_eq!(a.params.page, 2);
    }

    #[test]
    fn test_cache_key_without_query() {
        let request = ListingRequest::new("divisions", Vec::new(), PageSizeLimits::default());
        assert_eq!(request.cache_key, "divisions");
    }

    #[test]
    fn test_cache_key_keeps_order_of_repeated_params() {
        let a = ListingRequest::new(
            "divisions",
            pairs(&[("page", "2"), ("page", "1")]),
            PageSizeLimits::default(),
        );
        let b = ListingRequest::new(
            "divisions",
            pairs(&[("page", "1"), ("page", "2")]),
            PageSizeLimits::default(),
        );

        assert_ne!(a.cache_key, b.cache_key);
        assert_eq!(a.params.page, 2);
        assert_eq!(b.params.page, 1);
    }

    #[test]
    fn test_links_keep_filters() {
        let cache = RecordingPageCache::default();
        let request = ListingRequest::new(
            "products",
            pairs(&[("search", "kursi"), ("page", "2"), ("perPage", "2")]),
            PageSizeLimits::default(),
        );
        let page = paginate(vec![1, 2, 3, 4, 5], 2, 2);

        let Json(body) = request.respond(&request.slot(&cache), page).unwrap();

        assert_eq!(body["total_items"], 5);
        assert_eq!(body["links"]["current"], "/api/products?search=kursi&perPage=2&page=2");
        assert_eq!(body["links"]["next"], "/api/products?search=kursi&perPage=2&page=3");
        assert_eq!(body["links"]["prev"], "/api/products?search=kursi&perPage=2&page=1");
    }

    #[test]
    fn test_links_drop_blank_filters() {
        let cache = RecordingPageCache::default();
        let request = ListingRequest::new(
            "prestasi",
            pairs(&[
                ("search", " "),
                ("createdAtFrom", "2024-01-01"),
                ("createdAtTo", ""),
                ("updatedAtFrom", ""),
                ("perPage", "1"),
            ]),
            PageSizeLimits::default(),
        );

        let Json(body) = request
            .respond(&request.slot(&cache), paginate(vec![1, 2], 1, 1))
            .unwrap();

        assert_eq!(
            body["links"]["next"],
            "/api/prestasi?createdAtFrom=2024-01-01&perPage=1&page=2"
        );
    }

    #[test]
    fn test_single_page_has_no_next_or_prev() {
        let cache = RecordingPageCache::default();
        let request = ListingRequest::new("periods", Vec::new(), PageSizeLimits::default());

        let Json(body) = request
            .respond(&request.slot(&cache), paginate(vec![1], 1, 10))
            .unwrap();

        assert_eq!(body["links"]["current"], "/api/periods?page=1");
        assert!(body["links"].get("next").is_none());
        assert!(body["links"].get("prev").is_none());
    }

    #[test]
    fn test_slot_skips_store_after_invalidation() {
        let cache = MemoryPageCache::new(None);
        let slot = detail_slot(&cache, "members", "abc");

        cache.invalidate("members/abc");
        slot.store(&serde_json::json!({"name": "stale"})).unwrap();

        assert!(slot.hit().is_none());
        let fresh = detail_slot(&cache, "members", "abc");
        fresh.store(&serde_json::json!({"name": "fresh"})).unwrap();
        assert_eq!(fresh.hit().unwrap().0["name"], "fresh");
    }

    #[test]
    fn test_action_status_mapping() {
        let created = ActionResponse::created(ActionResult::created("ok", "id1")).into_response();
        assert_eq!(created.status(), StatusCode::CREATED);

        let duplicate = ActionResponse::created(ActionResult::success("ok")).into_response();
        assert_eq!(duplicate.status(), StatusCode::OK);

        let invalid = ActionResponse::ok(ActionResult::invalid(FieldErrors::new())).into_response();
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let missing = ActionResponse::ok(ActionResult::not_found("Member")).into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let failed = ActionResponse::ok(ActionResult::failure(
            "delete member",
            &anyhow::anyhow!("boom"),
        ))
        .into_response();
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
