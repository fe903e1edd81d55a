//! # Product Use Cases
//!
//! 商品の一覧・取得・追加・更新・削除と、サンプルデータの投入

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use log::info;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde_json::Value;

use super::images::{discard_image, discard_replaced, upload_image, KeyPrefix};
use super::revalidate::revalidate;
use crate::application::dto::action_result::ActionResult;
use crate::application::dto::list_params::ListParams;
use crate::domain::entities::product::{Product, ProductDraft, ProductInput};
use crate::domain::entities::upload::{StoredImage, UploadedFile};
use crate::domain::entities::Record;
use crate::domain::repositories::document_store::{
    is_not_found, new_document_id, to_patch, touch, Collection, DocumentStore,
};
use crate::domain::repositories::object_storage::ObjectStorage;
use crate::domain::repositories::page_cache::PageCache;
use crate::domain::services::listing::{filter_by_search, paginate, Page};

/// 写真のフォームフィールド名
pub const PHOTO_FIELD: &str = "image";

const PHOTO_FOLDER: &str = "products";

/// 投入するサンプル商品の数
pub const SEED_COUNT: u32 = 20;

/// サンプル商品のカテゴリ
pub const SEED_CATEGORIES: [&str; 8] = [
    "Electronics",
    "Furniture",
    "Clothing",
    "Toys",
    "Groceries",
    "Books",
    "Jewelry",
    "Beauty Products",
];

const ADJECTIVES: [&str; 10] = [
    "Handcrafted",
    "Ergonomic",
    "Sleek",
    "Rustic",
    "Practical",
    "Elegant",
    "Refined",
    "Modern",
    "Compact",
    "Durable",
];

const MATERIALS: [&str; 8] = [
    "Wooden", "Steel", "Cotton", "Granite", "Bamboo", "Leather", "Plastic", "Ceramic",
];

const NOUNS: [&str; 10] = [
    "Chair", "Lamp", "Keyboard", "Shirt", "Table", "Backpack", "Watch", "Bottle", "Speaker",
    "Notebook",
];

/// サンプルデータ投入の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// 追加した商品の数
    pub inserted: usize,
    /// 既に存在したため飛ばした商品の数
    pub skipped: usize,
}

/// 商品のユースケース
pub struct ProductUseCase<D, O, C>
where
    D: DocumentStore + ?Sized,
    O: ObjectStorage + ?Sized,
    C: PageCache + ?Sized,
{
    store: Arc<D>,
    storage: Arc<O>,
    cache: Arc<C>,
}

impl<D, O, C> ProductUseCase<D, O, C>
where
    D: DocumentStore + ?Sized,
    O: ObjectStorage + ?Sized,
    C: PageCache + ?Sized,
{
    pub fn new(store: Arc<D>, storage: Arc<O>, cache: Arc<C>) -> Self {
        Self {
            store,
            storage,
            cache,
        }
    }

    fn products(&self) -> Collection<'_, D> {
        Collection::new(&*self.store, Product::COLLECTION)
    }

    /// 商品の一覧
    ///
    /// 検索とカテゴリ（`.` 区切りで複数指定）で絞り込み、名前順に並べる
    pub async fn list(&self, params: &ListParams) -> Result<Page<Product>> {
        let products: Vec<Product> = self.products().all().await?;
        let mut products = filter_by_search(products, params.search.as_deref());

        let categories = params.categories();
        if !categories.is_empty() {
            products.retain(|p| categories.iter().any(|c| c == &p.category));
        }
        products.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(paginate(products, params.page, params.per_page))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Product>> {
        self.products().get(id).await
    }

    /// 商品を追加する（写真は任意）
    pub async fn add(&self, input: ProductInput, photo: Option<&UploadedFile>) -> ActionResult {
        let draft = match input.validate() {
            Ok(draft) => draft,
            Err(errors) => return ActionResult::invalid(errors),
        };
        if let Some(Err(errors)) = photo.map(|p| p.validate_image(PHOTO_FIELD)) {
            return ActionResult::invalid_file(errors);
        }

        let uploaded = match self.upload(photo).await {
            Ok(uploaded) => uploaded,
            Err(e) => return ActionResult::failure("add product", &e),
        };

        let id = new_document_id();
        let product = draft.into_record(id.clone(), uploaded.clone(), Utc::now());

        match self.products().create(&id, &product).await {
            Ok(()) => {
                revalidate(&*self.cache, Product::COLLECTION, None);
                ActionResult::created("Product added successfully.", id)
            }
            Err(e) => {
                if let Some(photo) = &uploaded {
                    discard_image(&*self.storage, photo).await;
                }
                ActionResult::failure("add product", &e)
            }
        }
    }

    async fn upload(&self, photo: Option<&UploadedFile>) -> Result<Option<StoredImage>> {
        match photo {
            Some(photo) => {
                let stored =
                    upload_image(&*self.storage, photo, PHOTO_FOLDER, KeyPrefix::Uuid).await?;
                Ok(Some(stored))
            }
            None => Ok(None),
        }
    }

    /// 商品を更新する
    ///
    /// 写真を差し替えた場合、古い写真はアップロードしたものに限り削除する
    pub async fn update(
        &self,
        id: &str,
        input: ProductInput,
        photo: Option<&UploadedFile>,
    ) -> ActionResult {
        let draft = match input.validate() {
            Ok(draft) => draft,
            Err(errors) => return ActionResult::invalid(errors),
        };
        if let Some(Err(errors)) = photo.map(|p| p.validate_image(PHOTO_FIELD)) {
            return ActionResult::invalid_file(errors);
        }

        let existing = match self.get(id).await {
            Ok(Some(product)) => product,
            Ok(None) => return ActionResult::not_found(Product::LABEL),
            Err(e) => return ActionResult::failure("update product", &e),
        };

        let uploaded = match self.upload(photo).await {
            Ok(uploaded) => uploaded,
            Err(e) => return ActionResult::failure("update product", &e),
        };

        match self.apply_update(id, &draft, uploaded.as_ref()).await {
            Ok(()) => {
                if let Some(new_photo) = &uploaded {
                    discard_replaced(&*self.storage, existing.uploaded_photo().as_ref(), new_photo)
                        .await;
                }
                revalidate(&*self.cache, Product::COLLECTION, Some(id));
                ActionResult::success("Product updated successfully.")
            }
            Err(e) => {
                if let Some(new_photo) = &uploaded {
                    discard_image(&*self.storage, new_photo).await;
                }
                if is_not_found(&e) {
                    ActionResult::not_found(Product::LABEL)
                } else {
                    ActionResult::failure("update product", &e)
                }
            }
        }
    }

    async fn apply_update(
        &self,
        id: &str,
        draft: &ProductDraft,
        photo: Option<&StoredImage>,
    ) -> Result<()> {
        let mut patch = to_patch(draft)?;
        if let Some(photo) = photo {
            patch.insert("photo_url".to_string(), Value::String(photo.url.clone()));
            patch.insert("photo_path".to_string(), Value::String(photo.key.clone()));
        }
        touch(&mut patch, Utc::now());
        self.products().update(id, patch).await
    }

    /// 商品を削除する（アップロードした写真も削除する）
    pub async fn delete(&self, id: &str) -> ActionResult {
        let existing = match self.get(id).await {
            Ok(Some(product)) => product,
            Ok(None) => return ActionResult::not_found(Product::LABEL),
            Err(e) => return ActionResult::failure("delete product", &e),
        };

        match self.products().delete(id).await {
            Ok(true) => {}
            Ok(false) => return ActionResult::not_found(Product::LABEL),
            Err(e) => return ActionResult::failure("delete product", &e),
        }

        if let Some(photo) = existing.uploaded_photo() {
            discard_image(&*self.storage, &photo).await;
        }

        revalidate(&*self.cache, Product::COLLECTION, Some(id));
        ActionResult::success("Product deleted successfully.")
    }

    /// サンプル商品を投入する
    ///
    /// IDは `1` から `20`。既に存在するIDは上書きせずに飛ばす。
    ///
    /// # Errors
    ///
    /// ストアの読み書きに失敗した場合
    pub async fn seed(&self) -> Result<SeedSummary> {
        let products = sample_products(&mut rand::rng(), Utc::now());
        self.seed_products(products).await
    }

    /// 指定した商品を投入する（既存のIDは飛ばす）
    pub async fn seed_products(&self, products: Vec<Product>) -> Result<SeedSummary> {
        let mut summary = SeedSummary::default();

        for product in products {
            if self.store.get(Product::COLLECTION, &product.id).await?.is_some() {
                summary.skipped += 1;
                continue;
            }
            self.products()
                .create(&product.id, &product)
                .await
                .with_context(|| format!("Failed to seed product {}", product.id))?;
            summary.inserted += 1;
        }

        if summary.inserted > 0 {
            revalidate(&*self.cache, Product::COLLECTION, None);
        }
        info!(
            "Seeded {} products ({} already existed)",
            summary.inserted, summary.skipped
        );

        Ok(summary)
    }
}

/// サンプル商品を生成する
///
/// 作成日時は2022〜2023年、更新日時は直近30日以内
pub fn sample_products<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> Vec<Product> {
    let created_from = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).single();
    let created_to = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).single();

    (1..=SEED_COUNT)
        .map(|n| {
            let id = n.to_string();
            let name = format!(
                "{} {} {}",
                pick(rng, &ADJECTIVES),
                pick(rng, &MATERIALS),
                pick(rng, &NOUNS)
            );
            let category = pick(rng, &SEED_CATEGORIES).to_string();
            let description = format!(
                "The {} is part of our {} collection, designed for everyday use.",
                name.to_lowercase(),
                category.to_lowercase()
            );
            let cents: u32 = rng.random_range(500..=50_000);
            let created_at = match (created_from, created_to) {
                (Some(from), Some(to)) => {
                    let span = (to - from).num_seconds();
                    Some(from + Duration::seconds(rng.random_range(0..=span)))
                }
                _ => None,
            };
            let updated_at = now - Duration::seconds(rng.random_range(0..=30 * 24 * 60 * 60));

            Product {
                photo_url: format!(
                    "https://api.slingacademy.com/public/sample-products/{}.png",
                    id
                ),
                id,
                name,
                category,
                price: f64::from(cents) / 100.0,
                description,
                photo_path: None,
                created_at,
                updated_at: Some(updated_at),
            }
        })
        .collect()
}

fn pick<'a, R: Rng>(rng: &mut R, values: &'a [&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}
