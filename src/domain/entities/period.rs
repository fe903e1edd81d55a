//! # Period Entity
//!
//! 活動期間（数値IDを持つ）

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Record;
use crate::domain::services::listing::Searchable;
use crate::domain::services::validation::{FieldErrors, Validator};

/// 期間レコード
///
/// `id` はドキュメントキーとしても使う（`"7"` など）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub id: u64,
    pub name: String,
    pub is_active: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Period {
    const COLLECTION: &'static str = "periods";
    const LABEL: &'static str = "Period";
}

impl Searchable for Period {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name[..]]
    }
}

impl Period {
    /// 次の期間IDを決める（既存の最大ID + 1）
    pub fn next_id<'a>(existing: impl IntoIterator<Item = &'a Period>) -> u64 {
        existing
            .into_iter()
            .map(|period| period.id)
            .max()
            .unwrap_or(0)
            + 1
    }
}

/// フォームから受け取った未検証の期間入力
#[derive(Debug, Clone, Default)]
pub struct PeriodInput {
    pub name: String,
    /// `"true"` または `"false"`
    pub is_active: String,
    pub start_date: String,
    pub end_date: String,
}

/// 検証済みの期間データ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodDraft {
    pub name: String,
    pub is_active: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl PeriodInput {
    /// 入力を検証してドラフトに変換
    ///
    /// # Errors
    ///
    /// ルール違反があればフィールドごとのエラーを返す
    pub fn validate(self) -> Result<PeriodDraft, FieldErrors> {
        let is_active = match self.is_active.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        };
        let start_date = parse_date(&self.start_date);
        let end_date = parse_date(&self.end_date);
        let ordered = match (start_date, end_date) {
            (Some(start), Some(end)) => end >= start,
            _ => true,
        };

        Validator::new()
            .min_chars("name", &self.name, 2, "Name must be at least 2 characters.")
            .custom(
                "is_active",
                is_active.is_some(),
                "Status must be either 'true' or 'false'.",
            )
            .custom(
                "start_date",
                !self.start_date.trim().is_empty(),
                "Start date is required.",
            )
            .custom(
                "start_date",
                self.start_date.trim().is_empty() || start_date.is_some(),
                "Start date must be a valid date.",
            )
            .custom(
                "end_date",
                !self.end_date.trim().is_empty(),
                "End date is required.",
            )
            .custom(
                "end_date",
                self.end_date.trim().is_empty() || end_date.is_some(),
                "End date must be a valid date.",
            )
            .custom(
                "end_date",
                ordered,
                "End date must not be before start date.",
            )
            .finish()?;

        match (is_active, start_date, end_date) {
            (Some(is_active), Some(start_date), Some(end_date)) => Ok(PeriodDraft {
                name: self.name,
                is_active,
                start_date,
                end_date,
            }),
            // Validatorが全て検出済み
            _ => Err(FieldErrors::new()),
        }
    }
}

impl PeriodDraft {
    /// 新規レコードを作成
    pub fn into_record(self, id: u64, now: DateTime<Utc>) -> Period {
        Period {
            id,
            name: self.name,
            is_active: self.is_active,
            start_date: self.start_date,
            end_date: self.end_date,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

/// `YYYY-MM-DD` またはRFC 3339形式の日付を解釈する
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}
