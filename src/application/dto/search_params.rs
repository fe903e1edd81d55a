//! # Search Params DTO
//!
//! 一覧ページのクエリパラメータ（URLと同期する状態）

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// クエリ値としてエンコードする文字
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// 順序付きのクエリパラメータ
///
/// ツールバーの検索欄や日付フィルタが書き換える状態。同名キーは複数持てる。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pairs: Vec<(String, String)>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// 最初の値
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 最初の空でない値（前後の空白は除く）
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// 値を設定する（既存の同名キーは全て置き換える）
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(index) => {
                self.pairs[index].1 = value;
                let mut seen = false;
                self.pairs.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// 検索語を反映する
    ///
    /// 空なら `search` を削除する。結果件数が変わるのでページは先頭に戻す。
    pub fn apply_search(&mut self, value: &str) {
        if value.trim().is_empty() {
            self.remove("search");
        } else {
            self.set("search", value);
        }
        self.remove("page");
    }

    /// 日付範囲フィルタを反映する
    ///
    /// `<prefix>From` / `<prefix>To` を設定、または `None` なら削除する
    pub fn apply_date_range(&mut self, prefix: &str, from: Option<&str>, to: Option<&str>) {
        for (suffix, value) in [("From", from), ("To", to)] {
            let key = format!("{}{}", prefix, suffix);
            match value {
                Some(value) => self.set(&key, value),
                None => self.remove(&key),
            }
        }
        self.remove("page");
    }

    /// ページ番号を差し替えたコピー
    pub fn with_page(&self, page: usize) -> Self {
        let mut params = self.clone();
        params.set("page", page.to_string());
        params
    }

    /// `a=1&b=2` 形式（挿入順）
    pub fn to_query_string(&self) -> String {
        Self::encode(self.pairs.iter())
    }

    /// キー順に並べたクエリ文字列
    ///
    /// 同じ条件の一覧が同じキャッシュキーになるようにする。
    /// 同名キーの並びは保つ（先頭の値が使われるため）。
    pub fn canonical_query_string(&self) -> String {
        let mut pairs: Vec<&(String, String)> = self.pairs.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        Self::encode(pairs.into_iter())
    }

    fn encode<'a>(pairs: impl Iterator<Item = &'a (String, String)>) -> String {
        pairs
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(k, QUERY_VALUE),
                    utf8_percent_encode(v, QUERY_VALUE)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_all_duplicates() {
        let mut params = SearchParams::from_pairs([("page", "1"), ("search", "a"), ("page", "3")]);
        params.set("page", "2");
        assert_eq!(params.to_query_string(), "page=2&search=a");
    }

    #[test]
    fn test_apply_search_sets_and_resets_page() {
        let mut params = SearchParams::from_pairs([("page", "4"), ("perPage", "20")]);
        params.apply_search("juara nasional");
        assert_eq!(params.to_query_string(), "perPage=20&search=juara%20nasional");
    }

    #[test]
    fn test_apply_empty_search_removes_param() {
        let mut params = SearchParams::from_pairs([("search", "budi"), ("perPage", "20")]);
        params.apply_search("  ");
        assert_eq!(params.get("search"), None);
        assert_eq!(params.to_query_string(), "perPage=20");
    }

    #[test]
    fn test_apply_date_range() {
        let mut params = SearchParams::new();
        params.apply_date_range("createdAt", Some("2024-01-01T00:00:00.000Z"), None);
        assert_eq!(params.get("createdAtFrom"), Some("2024-01-01T00:00:00.000Z"));
        assert_eq!(params.get("createdAtTo"), None);

        params.apply_date_range("createdAt", None, None);
        assert!(params.is_empty());
    }

    #[test]
    fn test_with_page_does_not_modify_original() {
        let params = SearchParams::from_pairs([("search", "a")]);
        let next = params.with_page(2);
        assert_eq!(next.to_query_string(), "search=a&page=2");
        assert_eq!(params.to_query_string(), "search=a");
    }

    #[test]
    fn test_canonical_query_string_is_order_independent() {
        let a = SearchParams::from_pairs([("perPage", "10"), ("page", "2")]);
        let b = SearchParams::from_pairs([("page", "2"), ("perPage", "10")]);
        assert_eq!(a.canonical_query_string(), b.canonical_query_string());
    }

    #[test]
    fn test_canonical_query_string_keeps_repeated_values_in_order() {
        let a = SearchParams::from_pairs([("perPage", "1"), ("page", "2"), ("page", "1")]);
        let b = SearchParams::from_pairs([("page", "1"), ("perPage", "1"), ("page", "2")]);

        assert_eq!(a.canonical_query_string(), "page=2&page=1&perPage=1");
        assert_eq!(b.canonical_query_string(), "page=1&page=2&perPage=1");
    }

    #[test]
    fn test_get_non_empty() {
        let params = SearchParams::from_pairs([("search", "  "), ("name", " budi ")]);
        assert_eq!(params.get_non_empty("search"), None);
        assert_eq!(params.get_non_empty("name"), Some("budi"));
    }
}
