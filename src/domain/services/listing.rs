//! # Listing Service
//!
//! 一覧ページ共通の検索・期間フィルタ・ページング

use chrono::{DateTime, Utc};
use serde::Serialize;

/// 検索対象のテキストを提供するレコード
pub trait Searchable {
    /// 検索対象のフィールド値
    fn search_fields(&self) -> Vec<&str>;
}

/// 大文字小文字を区別しない部分一致検索
///
/// `query` が空白のみの場合は全件一致とする
pub fn matches_search<T: Searchable>(item: &T, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    item.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// 検索語でフィルタする（`None` はフィルタなし）
pub fn filter_by_search<T: Searchable>(items: Vec<T>, query: Option<&str>) -> Vec<T> {
    match query {
        Some(query) => items
            .into_iter()
            .filter(|item| matches_search(item, query))
            .collect(),
        None => items,
    }
}

/// 両端を含む日時範囲
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// 範囲内かどうか
    ///
    /// 範囲が指定されているのに値がない場合は範囲外とする
    pub fn contains(&self, value: Option<DateTime<Utc>>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(value) = value else {
            return false;
        };

        self.from.map_or(true, |from| value >= from) && self.to.map_or(true, |to| value <= to)
    }
}

/// ページングされた一覧
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: usize,
    pub page: usize,
    pub per_page: usize,
    pub page_count: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// 要素を変換したページを返す
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            page: self.page,
            per_page: self.per_page,
            page_count: self.page_count,
        }
    }
}

/// 1始まりのページ番号でページングする
///
/// `page` と `per_page` は1未満なら1として扱う。最終ページを超えた場合は空のページを返す。
///
/// ```
/// use orgdash::domain::services::listing::paginate;
///
/// let page = paginate((1..=25).collect::<Vec<_>>(), 3, 10);
/// assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
/// assert_eq!(page.total_items, 25);
/// assert_eq!(page.page_count, 3);
/// ```
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total_items = items.len();
    let page_count = total_items.div_ceil(per_page);
    let offset = (page - 1).saturating_mul(per_page);

    let items = items.into_iter().skip(offset).take(per_page).collect();

    Page {
        items,
        total_items,
        page,
        per_page,
        page_count,
    }
}
