//! # List Params DTO
//!
//! クエリパラメータから一覧条件（ページ・件数・検索語・フィルタ）を読み取る

use chrono::{DateTime, NaiveDate, Utc};
use log::warn;

use super::search_params::SearchParams;
use crate::domain::services::listing::DateRange;

pub const DEFAULT_PER_PAGE: usize = 10;
pub const MAX_PER_PAGE: usize = 100;

/// ページサイズの設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizeLimits {
    pub default_per_page: usize,
    pub max_per_page: usize,
}

impl Default for PageSizeLimits {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
        }
    }
}

/// 状態フィルタ（`active` パラメータ）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveFilter {
    Active,
    Inactive,
}

/// 一覧条件
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub page: usize,
    pub per_page: usize,
    pub search: Option<String>,
    params: SearchParams,
}

impl ListParams {
    /// クエリパラメータから一覧条件を作る
    ///
    /// - `page`: 1未満や数値でない場合は1
    /// - `perPage`: 数値でない場合は既定値、`1..=max_per_page` に丸める
    /// - 検索語: `search`、なければ `name`
    pub fn from_params(params: SearchParams, limits: PageSizeLimits) -> Self {
        let page = params
            .get_non_empty("page")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        let per_page = params
            .get_non_empty("perPage")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(limits.default_per_page)
            .clamp(1, limits.max_per_page.max(1));

        let search = params
            .get_non_empty("search")
            .or_else(|| params.get_non_empty("name"))
            .map(str::to_string);

        Self {
            page,
            per_page,
            search,
            params,
        }
    }

    /// 元のクエリパラメータ
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// 状態フィルタ（`active` / `inactive`、それ以外は指定なし）
    pub fn active(&self) -> Option<ActiveFilter> {
        match self.params.get_non_empty("active") {
            Some("active") => Some(ActiveFilter::Active),
            Some("inactive") => Some(ActiveFilter::Inactive),
            _ => None,
        }
    }

    /// カテゴリフィルタ（`.` 区切り）
    pub fn categories(&self) -> Vec<String> {
        self.params
            .get_non_empty("category")
            .or_else(|| self.params.get_non_empty("categories"))
            .map(|v| {
                v.split('.')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 作成日時の範囲（`createdAtFrom` / `createdAtTo`）
    pub fn created_range(&self) -> DateRange {
        self.date_range("createdAt")
    }

    /// 更新日時の範囲（`updatedAtFrom` / `updatedAtTo`）
    pub fn updated_range(&self) -> DateRange {
        self.date_range("updatedAt")
    }

    fn date_range(&self, prefix: &str) -> DateRange {
        let bound = |suffix: &str| {
            let key = format!("{}{}", prefix, suffix);
            let value = self.params.get_non_empty(&key)?;
            let parsed = parse_bound(value, suffix == "To");
            if parsed.is_none() {
                warn!("Ignoring unparsable {} value: {:?}", key, value);
            }
            parsed
        };

        DateRange::new(bound("From"), bound("To"))
    }
}

/// 日付範囲の境界を解釈する
///
/// RFC 3339の日時、または `YYYY-MM-DD`（上限なら23:59:59.999、下限なら0時）
fn parse_bound(value: &str, upper: bool) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let time = if upper {
        date.and_hms_milli_opt(23, 59, 59, 999)?
    } else {
        date.and_hms_opt(0, 0, 0)?
    };
    Some(time.and_utc())
}
