//! # Member Entity
//!
//! 組織のメンバー

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::upload::StoredImage;
use super::Record;
use crate::domain::services::listing::Searchable;
use crate::domain::services::validation::{FieldErrors, Validator};

/// メンバーレコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub student_id: String,
    pub bio: String,
    #[serde(default)]
    pub photo_url: String,
    /// 写真のオブジェクトキー（古いレコードには存在しない）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_path: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Member {
    const COLLECTION: &'static str = "members";
    const LABEL: &'static str = "Member";
}

impl Searchable for Member {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name[..], &self.email[..], &self.student_id[..]]
    }
}

impl Member {
    /// 保存済みの写真
    ///
    /// キーが記録されていない古いレコードはURLのみを返す（キーは空）
    pub fn photo(&self) -> Option<StoredImage> {
        if self.photo_url.is_empty() {
            return None;
        }
        Some(StoredImage {
            url: self.photo_url.clone(),
            key: self.photo_path.clone().unwrap_or_default(),
        })
    }
}

/// フォームから受け取った未検証のメンバー入力
#[derive(Debug, Clone, Default)]
pub struct MemberInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub student_id: String,
    pub bio: String,
}

/// 検証済みのメンバーデータ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub student_id: String,
    pub bio: String,
}

impl MemberInput {
    /// 入力を検証してドラフトに変換
    ///
    /// # Errors
    ///
    /// ルール違反があればフィールドごとのエラーを返す
    pub fn validate(self) -> Result<MemberDraft, FieldErrors> {
        Validator::new()
            .min_chars("name", &self.name, 2, "Name must be at least 2 characters.")
            .email("email", &self.email, "Please enter a valid email.")
            .min_chars(
                "phone",
                &self.phone,
                10,
                "Phone number must be at least 10 characters.",
            )
            .min_chars(
                "student_id",
                &self.student_id,
                5,
                "Student ID must be at least 5 characters.",
            )
            .min_chars("bio", &self.bio, 10, "Bio must be at least 10 characters.")
            .finish()?;

        Ok(MemberDraft {
            name: self.name,
            email: self.email,
            phone: self.phone,
            student_id: self.student_id,
            bio: self.bio,
        })
    }
}

impl MemberDraft {
    /// 新規レコードを作成
    pub fn into_record(self, id: String, photo: StoredImage, now: DateTime<Utc>) -> Member {
        Member {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            student_id: self.student_id,
            bio: self.bio,
            photo_url: photo.url,
            photo_path: Some(photo.key),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> MemberInput {
        MemberInput {
            name: "Budi Santoso".to_string(),
            email: "budi@example.com".to_string(),
            phone: "081234567890".to_string(),
            student_id: "21/123456".to_string(),
            bio: "Mahasiswa teknik informatika angkatan 2021".to_string(),
        }
    }

    #[test]
    fn test_validate_ok() {
        let draft = input().validate().unwrap();
        assert_eq!(draft.name, "Budi Santoso");
    }

    #[test]
    fn test_validate_reports_every_field() {
        let errors = MemberInput::default().validate().unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["bio", "email", "name", "phone", "student_id"]);
    }

    #[test]
    fn test_validate_email_message() {
        let errors = MemberInput {
            email: "budi".to_string(),
            ..input()
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            errors.get("email").unwrap(),
            ["Please enter a valid email.".to_string()]
        );
    }

    #[test]
    fn test_photo_of_legacy_record() {
        let member = Member {
            id: "m1".to_string(),
            name: "Budi".to_string(),
            email: "budi@example.com".to_string(),
            phone: "081234567890".to_string(),
            student_id: "12345".to_string(),
            bio: "Legacy record from import".to_string(),
            photo_url: "https://storage.googleapis.com/bucket/members/1_a.png".to_string(),
            photo_path: None,
            created_at: None,
            updated_at: None,
        };

        let photo = member.photo().unwrap();
        assert!(photo.key.is_empty());
        assert!(photo.url.ends_with("1_a.png"));
    }

    #[test]
    fn test_deserialize_without_photo_path() {
        let json = r#"{
            "id": "m1",
            "name": "Siti",
            "email": "siti@example.com",
            "phone": "081234567890",
            "student_id": "12345",
            "bio": "Anggota divisi humas",
            "photo_url": "",
            "created_at": "2024-12-25T10:00:00Z"
        }"#;

        let member: Member = serde_json::from_str(json).unwrap();
        assert!(member.photo().is_none());
        assert!(member.created_at.is_some());
        assert!(member.updated_at.is_none());
    }
}
