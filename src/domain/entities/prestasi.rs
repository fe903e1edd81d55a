//! # Prestasi Entity
//!
//! 実績（大会の受賞など）と、カテゴリ・受賞区分の選択肢

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::upload::StoredImage;
use super::Record;
use crate::domain::services::listing::Searchable;
use crate::domain::services::validation::{FieldErrors, Validator};

/// 保存済みの `members` の要素
///
/// IDの文字列、または `id` フィールドを持つオブジェクトのどちらでもよい
#[derive(Deserialize)]
#[serde(untagged)]
enum MemberRef {
    Id(String),
    Object { id: String },
}

/// `members` をIDのリストに正規化する
fn member_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let refs = Option::<Vec<MemberRef>>::deserialize(deserializer)?;
    Ok(refs
        .unwrap_or_default()
        .into_iter()
        .map(|r| match r {
            MemberRef::Id(id) | MemberRef::Object { id } => id,
        })
        .collect())
}

/// 実績レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prestasi {
    pub id: String,
    pub title: String,
    pub description: String,
    pub team_name: String,
    #[serde(default, deserialize_with = "member_ids")]
    pub members: Vec<String>,
    pub category: String,
    pub award: String,
    pub year: String,
    #[serde(default)]
    pub image_url: String,
    /// 画像のオブジェクトキー
    #[serde(default)]
    pub image_filename: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Prestasi {
    const COLLECTION: &'static str = "prestasi";
    const LABEL: &'static str = "Prestasi";
}

impl Searchable for Prestasi {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            &self.title[..],
            &self.team_name[..],
            &self.category[..],
            &self.award[..],
            &self.year[..],
        ]
    }
}

impl Prestasi {
    /// 保存済みの画像
    pub fn image(&self) -> Option<StoredImage> {
        if self.image_url.is_empty() && self.image_filename.is_empty() {
            return None;
        }
        Some(StoredImage {
            url: self.image_url.clone(),
            key: self.image_filename.clone(),
        })
    }
}

/// カテゴリ・受賞区分の選択肢ドキュメント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceValue {
    pub value: String,
}

/// 実績カテゴリの選択肢コレクション
pub const CATEGORY_COLLECTION: &str = "prestasi_categories";

/// 受賞区分の選択肢コレクション
pub const AWARD_COLLECTION: &str = "prestasi_awards";

/// フォームから受け取った未検証の実績入力
#[derive(Debug, Clone, Default)]
pub struct PrestasiInput {
    pub title: String,
    pub description: String,
    pub team_name: String,
    pub members: Vec<String>,
    pub category: String,
    pub award: String,
    pub year: String,
}

/// 検証済みの実績データ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrestasiDraft {
    pub title: String,
    pub description: String,
    pub team_name: String,
    pub members: Vec<String>,
    pub category: String,
    pub award: String,
    pub year: String,
}

impl PrestasiInput {
    /// 入力を検証してドラフトに変換
    ///
    /// 空のメンバーIDは取り除いてから検証する
    ///
    /// # Errors
    ///
    /// ルール違反があればフィールドごとのエラーを返す
    pub fn validate(self) -> Result<PrestasiDraft, FieldErrors> {
        let members: Vec<String> = self
            .members
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();

        Validator::new()
            .min_chars("title", &self.title, 2, "Title must be at least 2 characters.")
            .min_chars(
                "description",
                &self.description,
                10,
                "Description must be at least 10 characters.",
            )
            .min_chars(
                "team_name",
                &self.team_name,
                2,
                "Team name must be at least 2 characters.",
            )
            .non_empty_list("members", &members, "At least one member is required.")
            .min_chars(
                "category",
                &self.category,
                2,
                "Category must be at least 2 characters.",
            )
            .min_chars("award", &self.award, 2, "Award must be at least 2 characters.")
            .min_chars("year", &self.year, 4, "Year is required.")
            .finish()?;

        Ok(PrestasiDraft {
            title: self.title,
            description: self.description,
            team_name: self.team_name,
            members,
            category: self.category,
            award: self.award,
            year: self.year,
        })
    }
}

impl PrestasiDraft {
    /// 新規レコードを作成
    pub fn into_record(
        self,
        id: String,
        image: Option<StoredImage>,
        now: DateTime<Utc>,
    ) -> Prestasi {
        let (image_url, image_filename) = image.map(|i| (i.url, i.key)).unwrap_or_default();

        Prestasi {
            id,
            title: self.title,
            description: self.description,
            team_name: self.team_name,
            members: self.members,
            category: self.category,
            award: self.award,
            year: self.year,
            image_url,
            image_filename,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> PrestasiInput {
        PrestasiInput {
            title: "Juara 1 Gemastik".to_string(),
            description: "Kategori pengembangan perangkat lunak".to_string(),
            team_name: "Tim Garuda".to_string(),
            members: vec!["m1".to_string(), "m2".to_string()],
            category: "Nasional".to_string(),
            award: "Juara 1".to_string(),
            year: "2024".to_string(),
        }
    }

    #[test]
    fn test_validate_ok() {
        let draft = input().validate().unwrap();
        assert_eq!(draft.members, vec!["m1", "m2"]);
    }

    #[test]
    fn test_validate_drops_blank_members() {
        let errors = PrestasiInput {
            members: vec!["".to_string(), "  ".to_string()],
            ..input()
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            errors.get("members").unwrap(),
            ["At least one member is required.".to_string()]
        );
    }

    #[test]
    fn test_validate_year() {
        let errors = PrestasiInput {
            year: "24".to_string(),
            ..input()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.get("year").unwrap(), ["Year is required.".to_string()]);
    }

    #[test]
    fn test_members_normalized_from_objects() {
        let json = r#"{
            "id": "p1",
            "title": "Juara 2",
            "description": "Lomba karya tulis ilmiah",
            "team_name": "Tim A",
            "members": ["m1", {"id": "m2", "name": "Siti"}],
            "category": "Regional",
            "award": "Juara 2",
            "year": "2023"
        }"#;

        let prestasi: Prestasi = serde_json::from_str(json).unwrap();
        assert_eq!(prestasi.members, vec!["m1", "m2"]);
        assert!(prestasi.image().is_none());
    }

    #[test]
    fn test_members_null_is_empty() {
        let json = r#"{
            "id": "p1",
            "title": "Juara 2",
            "description": "Lomba karya tulis ilmiah",
            "team_name": "Tim A",
            "members": null,
            "category": "Regional",
            "award": "Juara 2",
            "year": "2023"
        }"#;

        let prestasi: Prestasi = serde_json::from_str(json).unwrap();
        assert!(prestasi.members.is_empty());
    }

    #[test]
    fn test_into_record_with_image() {
        let image = StoredImage {
            url: "https://storage.googleapis.com/b/prestasi/x_a.png".to_string(),
            key: "prestasi/x_a.png".to_string(),
        };
        let record = input()
            .validate()
            .unwrap()
            .into_record("p1".to_string(), Some(image.clone()), Utc::now());

        assert_eq!(record.image(), Some(image));
    }
}
