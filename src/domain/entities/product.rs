//! # Product Entity
//!
//! 物販の商品

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::upload::StoredImage;
use super::Record;
use crate::domain::services::listing::Searchable;
use crate::domain::services::validation::{FieldErrors, Validator};

/// 商品レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub description: String,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_path: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Product {
    const COLLECTION: &'static str = "products";
    const LABEL: &'static str = "Product";
}

impl Searchable for Product {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name[..], &self.description[..], &self.category[..]]
    }
}

impl Product {
    /// アップロードされた写真
    ///
    /// シードデータの外部URLのように、キーを持たない写真は対象外
    pub fn uploaded_photo(&self) -> Option<StoredImage> {
        self.photo_path.as_ref().map(|key| StoredImage {
            url: self.photo_url.clone(),
            key: key.clone(),
        })
    }
}

/// フォームから受け取った未検証の商品入力
#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub price: String,
    pub description: String,
}

/// 検証済みの商品データ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub description: String,
}

impl ProductInput {
    /// 入力を検証してドラフトに変換
    ///
    /// # Errors
    ///
    /// ルール違反があればフィールドごとのエラーを返す
    pub fn validate(self) -> Result<ProductDraft, FieldErrors> {
        let price = self
            .price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0);

        Validator::new()
            .min_chars("name", &self.name, 2, "Name must be at least 2 characters.")
            .min_chars(
                "category",
                &self.category,
                2,
                "Category must be at least 2 characters.",
            )
            .custom("price", price.is_some(), "Price must be a non-negative number.")
            .min_chars(
                "description",
                &self.description,
                10,
                "Description must be at least 10 characters.",
            )
            .finish()?;

        Ok(ProductDraft {
            name: self.name,
            category: self.category,
            price: price.unwrap_or_default(),
            description: self.description,
        })
    }
}

impl ProductDraft {
    /// 新規レコードを作成
    pub fn into_record(
        self,
        id: String,
        photo: Option<StoredImage>,
        now: DateTime<Utc>,
    ) -> Product {
        let (photo_url, photo_path) = match photo {
            Some(photo) => (photo.url, Some(photo.key)),
            None => (String::new(), None),
        };

        Product {
            id,
            name: self.name,
            category: self.category,
            price: self.price,
            description: self.description,
            photo_url,
            photo_path,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ProductInput {
        ProductInput {
            name: "Kaos Himpunan".to_string(),
            category: "Clothing".to_string(),
            price: "85000".to_string(),
            description: "Kaos katun dengan logo himpunan".to_string(),
        }
    }

    #[test]
    fn test_validate_ok() {
        let draft = input().validate().unwrap();
        assert_eq!(draft.price, 85000.0);
    }

    #[test]
    fn test_validate_price() {
        for bad in ["", "abc", "-1", "NaN", "inf"] {
            let errors = ProductInput {
                price: bad.to_string(),
                ..input()
            }
            .validate()
            .unwrap_err();
            assert!(errors.get("price").is_some(), "price {:?} should fail", bad);
        }
    }

    #[test]
    fn test_seeded_photo_is_not_uploaded() {
        let product = ProductDraft {
            name: "Mug".to_string(),
            category: "Groceries".to_string(),
            price: 10.0,
            description: "Mug keramik putih polos".to_string(),
        }
        .into_record("1".to_string(), None, Utc::now());

        assert!(product.uploaded_photo().is_none());
        assert!(product.photo_url.is_empty());
    }
}
