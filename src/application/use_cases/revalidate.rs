//! # Revalidation
//!
//! 更新後にキャッシュ済みのページを破棄する

use log::debug;

use crate::domain::repositories::page_cache::{detail_path, listing_path, PageCache};

/// 一覧ページと（IDがあれば）詳細ページを破棄する
pub fn revalidate<C: PageCache + ?Sized>(cache: &C, collection: &str, id: Option<&str>) {
    cache.invalidate(&listing_path(collection));
    if let Some(id) = id {
        cache.invalidate(&detail_path(collection, id));
    }
    debug!("Revalidated {} ({:?})", collection, id);
}
