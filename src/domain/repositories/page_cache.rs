//! # Page Cache Trait
//!
//! 一覧・詳細ページのキャッシュと無効化を抽象化

use serde_json::Value;

/// ページキャッシュ
///
/// キーの形式:
///
/// - 一覧: `<collection>` または `<collection>?<query>`
/// - 詳細: `<collection>/<id>`
///
/// パスは無効化されるたびに世代が進む。読み込みの前に世代を取り、
/// `put_if_unchanged` で保存すれば、読み込み中に無効化されたページは残らない。
pub trait PageCache: Send + Sync {
    /// キャッシュ済みのページ
    fn get(&self, key: &str) -> Option<Value>;

    /// キーが属するパスの現在の世代
    fn generation(&self, key: &str) -> u64;

    /// 世代が `generation` のままならページを保存する
    ///
    /// # Returns
    ///
    /// 保存した場合に `true`
    fn put_if_unchanged(&self, key: &str, generation: u64, page: Value) -> bool;

    /// ページを保存する
    fn put(&self, key: &str, page: Value) {
        self.put_if_unchanged(key, self.generation(key), page);
    }

    /// パスに対応するページを破棄する
    ///
    /// `members` なら `members` と `members?…`、`members/<id>` ならその詳細ページ
    fn invalidate(&self, path: &str);
}

/// キーが属するパス（クエリ部分を除いたもの）
///
/// ```
/// use orgdash::domain::repositories::page_cache::key_path;
///
/// assert_eq!(key_path("members?page=2"), "members");
/// assert_eq!(key_path("members/abc"), "members/abc");
/// ```
pub fn key_path(key: &str) -> &str {
    key.split_once('?').map_or(key, |(path, _)| path)
}

/// キーがパスの無効化対象かどうか
///
/// ```
/// use orgdash::domain::repositories::page_cache::key_matches_path;
///
/// assert!(key_matches_path("members?page=2", "members"));
/// assert!(key_matches_path("members", "members"));
/// assert!(!key_matches_path("members/abc", "members"));
/// assert!(key_matches_path("members/abc", "members/abc"));
/// ```
pub fn key_matches_path(key: &str, path: &str) -> bool {
    key_path(key) == path
}

/// 一覧ページのパス
pub fn listing_path(collection: &str) -> String {
    collection.to_string()
}

/// 詳細ページのパス
pub fn detail_path(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, id)
}
