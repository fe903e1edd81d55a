//! # Prestasi Use Cases
//!
//! 実績の一覧・取得・追加・更新・削除と、カテゴリ・受賞区分の選択肢

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use super::images::{discard_image, discard_replaced, upload_image, KeyPrefix};
use super::revalidate::revalidate;
use crate::application::dto::action_result::ActionResult;
use crate::application::dto::list_params::ListParams;
use crate::domain::entities::member::Member;
use crate::domain::entities::prestasi::{
    ChoiceValue, Prestasi, PrestasiDraft, PrestasiInput, AWARD_COLLECTION, CATEGORY_COLLECTION,
};
use crate::domain::entities::upload::{StoredImage, UploadedFile};
use crate::domain::entities::Record;
use crate::domain::repositories::document_store::{
    is_not_found, new_document_id, to_patch, touch, Collection, DocumentStore,
};
use crate::domain::repositories::object_storage::ObjectStorage;
use crate::domain::repositories::page_cache::PageCache;
use crate::domain::services::listing::{filter_by_search, paginate, Page};
use crate::domain::services::validation::Validator;

/// 画像のフォームフィールド名
pub const IMAGE_FIELD: &str = "image_url";

const IMAGE_FOLDER: &str = "prestasi";

/// 一覧の行（メンバー名を解決済み）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrestasiRow {
    #[serde(flatten)]
    pub prestasi: Prestasi,
    /// `members` と同じ順序。見つからないIDはそのまま表示する。
    pub member_names: Vec<String>,
}

/// 選択肢の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceKind {
    Category,
    Award,
}

impl ChoiceKind {
    fn collection(self) -> &'static str {
        match self {
            ChoiceKind::Category => CATEGORY_COLLECTION,
            ChoiceKind::Award => AWARD_COLLECTION,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ChoiceKind::Category => "Category",
            ChoiceKind::Award => "Award",
        }
    }
}

/// 実績のユースケース
pub struct PrestasiUseCase<D, O, C>
where
    D: DocumentStore + ?Sized,
    O: ObjectStorage + ?Sized,
    C: PageCache + ?Sized,
{
    store: Arc<D>,
    storage: Arc<O>,
    cache: Arc<C>,
}

impl<D, O, C> PrestasiUseCase<D, O, C>
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

    fn prestasi(&self) -> Collection<'_, D> {
        Collection::new(&*self.store, Prestasi::COLLECTION)
    }

    /// 実績の一覧
    ///
    /// 検索と作成日時・更新日時の範囲で絞り込み、新しい順に並べる
    pub async fn list(&self, params: &ListParams) -> Result<Page<PrestasiRow>> {
        let records: Vec<Prestasi> = self.prestasi().all().await?;
        let mut records = filter_by_search(records, params.search.as_deref());

        let created = params.created_range();
        let updated = params.updated_range();
        records.retain(|p| created.contains(p.created_at) && updated.contains(p.updated_at));
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let page = paginate(records, params.page, params.per_page);
        let names = self.member_names().await?;

        Ok(page.map(|prestasi| {
            let member_names = prestasi
                .members
                .iter()
                .map(|id| names.get(id).cloned().unwrap_or_else(|| id.clone()))
                .collect();
            PrestasiRow {
                prestasi,
                member_names,
            }
        }))
    }

    async fn member_names(&self) -> Result<HashMap<String, String>> {
        let members: Vec<Member> = Collection::new(&*self.store, Member::COLLECTION)
            .all()
            .await?;
        Ok(members.into_iter().map(|m| (m.id, m.name)).collect())
    }

    /// 実績を取得する（`members` はIDに正規化済み）
    pub async fn get(&self, id: &str) -> Result<Option<Prestasi>> {
        self.prestasi().get(id).await
    }

    /// 実績を追加する
    ///
    /// 画像は任意。送られた場合は検証してからアップロードする。
    pub async fn add(&self, input: PrestasiInput, image: Option<&UploadedFile>) -> ActionResult {
        let draft = match input.validate() {
            Ok(draft) => draft,
            Err(errors) => return ActionResult::invalid(errors),
        };
        if let Some(Err(errors)) = image.map(|i| i.validate_image(IMAGE_FIELD)) {
            return ActionResult::invalid_file(errors);
        }

        let uploaded = match self.upload(image).await {
            Ok(uploaded) => uploaded,
            Err(e) => return ActionResult::failure("add prestasi", &e),
        };

        let id = new_document_id();
        let record = draft.into_record(id.clone(), uploaded.clone(), Utc::now());

        match self.prestasi().create(&id, &record).await {
            Ok(()) => {
                revalidate(&*self.cache, Prestasi::COLLECTION, None);
                ActionResult::created("Prestasi added successfully.", id)
            }
            Err(e) => {
                if let Some(image) = &uploaded {
                    discard_image(&*self.storage, image).await;
                }
                ActionResult::failure("add prestasi", &e)
            }
        }
    }

    async fn upload(&self, image: Option<&UploadedFile>) -> Result<Option<StoredImage>> {
        match image {
            Some(image) => {
                let stored =
                    upload_image(&*self.storage, image, IMAGE_FOLDER, KeyPrefix::Uuid).await?;
                Ok(Some(stored))
            }
            None => Ok(None),
        }
    }

    /// 実績を更新する
    ///
    /// 画像が送られなければ既存の画像を残す
    pub async fn update(
        &self,
        id: &str,
        input: PrestasiInput,
        image: Option<&UploadedFile>,
    ) -> ActionResult {
        let draft = match input.validate() {
            Ok(draft) => draft,
            Err(errors) => return ActionResult::invalid(errors),
        };
        if let Some(Err(errors)) = image.map(|i| i.validate_image(IMAGE_FIELD)) {
            return ActionResult::invalid_file(errors);
        }

        let existing = match self.get(id).await {
            Ok(Some(record)) => record,
            Ok(None) => return ActionResult::not_found(Prestasi::LABEL),
            Err(e) => return ActionResult::failure("update prestasi", &e),
        };

        let uploaded = match self.upload(image).await {
            Ok(uploaded) => uploaded,
            Err(e) => return ActionResult::failure("update prestasi", &e),
        };

        match self.apply_update(id, &draft, uploaded.as_ref()).await {
            Ok(()) => {
                if let Some(new_image) = &uploaded {
                    discard_replaced(&*self.storage, existing.image().as_ref(), new_image).await;
                }
                revalidate(&*self.cache, Prestasi::COLLECTION, Some(id));
                ActionResult::success("Prestasi updated successfully.")
            }
            Err(e) => {
                if let Some(new_image) = &uploaded {
                    discard_image(&*self.storage, new_image).await;
                }
                if is_not_found(&e) {
                    ActionResult::not_found(Prestasi::LABEL)
                } else {
                    ActionResult::failure("update prestasi", &e)
                }
            }
        }
    }

    async fn apply_update(
        &self,
        id: &str,
        draft: &PrestasiDraft,
        image: Option<&StoredImage>,
    ) -> Result<()> {
        let mut patch = to_patch(draft)?;
        if let Some(image) = image {
            patch.insert("image_url".to_string(), Value::String(image.url.clone()));
            patch.insert("image_filename".to_string(), Value::String(image.key.clone()));
        }
        touch(&mut patch, Utc::now());
        self.prestasi().update(id, patch).await
    }

    /// 実績を削除する（画像も削除する）
    pub async fn delete(&self, id: &str) -> ActionResult {
        let existing = match self.get(id).await {
            Ok(Some(record)) => record,
            Ok(None) => return ActionResult::not_found(Prestasi::LABEL),
            Err(e) => return ActionResult::failure("delete prestasi", &e),
        };

        match self.prestasi().delete(id).await {
            Ok(true) => {}
            Ok(false) => return ActionResult::not_found(Prestasi::LABEL),
            Err(e) => return ActionResult::failure("delete prestasi", &e),
        }

        if let Some(image) = existing.image() {
            discard_image(&*self.storage, &image).await;
        }

        revalidate(&*self.cache, Prestasi::COLLECTION, Some(id));
        ActionResult::success("Prestasi deleted successfully.")
    }

    /// 選択肢の一覧（重複を除いて昇順）
    pub async fn choices(&self, kind: ChoiceKind) -> Result<Vec<String>> {
        let values: Vec<ChoiceValue> = Collection::new(&*self.store, kind.collection())
            .all()
            .await?;

        Ok(values
            .into_iter()
            .map(|c| c.value.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect())
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        self.choices(ChoiceKind::Category).await
    }

    pub async fn awards(&self) -> Result<Vec<String>> {
        self.choices(ChoiceKind::Award).await
    }

    /// 選択肢を追加する
    ///
    /// 既に同じ値があれば何も書き込まずに成功を返す
    pub async fn add_choice(&self, kind: ChoiceKind, value: &str) -> ActionResult {
        let value = value.trim();
        if let Err(errors) = Validator::new()
            .min_chars("value", value, 2, "Value must be at least 2 characters.")
            .finish()
        {
            return ActionResult::invalid(errors);
        }

        let action = format!("add {}", kind.label().to_lowercase());
        let existing = match self.choices(kind).await {
            Ok(existing) => existing,
            Err(e) => return ActionResult::failure(&action, &e),
        };
        let message = format!("{} added successfully.", kind.label());
        if existing.iter().any(|v| v == value) {
            return ActionResult::success(message);
        }

        let id = new_document_id();
        let choice = ChoiceValue {
            value: value.to_string(),
        };
        match Collection::new(&*self.store, kind.collection())
            .create(&id, &choice)
            .await
        {
            Ok(()) => {
                revalidate(&*self.cache, kind.collection(), None);
                ActionResult::created(message, id)
            }
            Err(e) => ActionResult::failure(&action, &e),
        }
    }

    pub async fn add_category(&self, value: &str) -> ActionResult {
        self.add_choice(ChoiceKind::Category, value).await
    }

    pub async fn add_award(&self, value: &str) -> ActionResult {
        self.add_choice(ChoiceKind::Award, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::action_result::ActionStatus;
    use crate::application::dto::list_params::PageSizeLimits;
    use crate::application::dto::search_params::SearchParams;
    use crate::test_support::{MemoryDocumentStore, MemoryObjectStorage, RecordingPageCache};
    use serde_json::json;

    struct Fixture {
        use_case: PrestasiUseCase<MemoryDocumentStore, MemoryObjectStorage, RecordingPageCache>,
        store: Arc<MemoryDocumentStore>,
        storage: Arc<MemoryObjectStorage>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryDocumentStore::new());
        let storage = Arc::new(MemoryObjectStorage::new());
        Fixture {
            use_case: PrestasiUseCase::new(
                store.clone(),
                storage.clone(),
                Arc::new(RecordingPageCache::default()),
            ),
            store,
            storage,
        }
    }

    fn input(title: &str, members: &[&str]) -> PrestasiInput {
        PrestasiInput {
            title: title.to_string(),
            description: "Lomba pengembangan aplikasi".to_string(),
            team_name: "Tim Garuda".to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
            category: "Teknologi".to_string(),
            award: "Juara 1".to_string(),
            year: "2024".to_string(),
        }
    }

    fn webp(name: &str) -> UploadedFile {
        UploadedFile::new(name, "image/webp", vec![1, 2, 3, 4])
    }

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        ListParams::from_params(
            SearchParams::from_pairs(pairs.iter().copied()),
            PageSizeLimits::default(),
        )
    }

    #[tokio::test]
    async fn test_add_without_image() {
        let f = fixture();

        let result = f.use_case.add(input("Gemastik", &["m1"]), None).await;

        assert!(result.success);
        let record = f.use_case.get(&result.id.unwrap()).await.unwrap().unwrap();
        assert!(record.image_url.is_empty());
        assert!(record.image().is_none());
        assert!(f.storage.keys().is_empty());
    }

    #[tokio::test]
    async fn test_add_with_image_uses_uuid_prefix() {
        let f = fixture();

        let result = f
            .use_case
            .add(input("Gemastik", &["m1"]), Some(&webp("piala.webp")))
            .await;

        let record = f.use_case.get(&result.id.unwrap()).await.unwrap().unwrap();
        assert!(record.image_filename.starts_with("prestasi/"));
        assert!(record.image_filename.ends_with("_piala.webp"));
        // prestasi/<36文字のUUID>_piala.webp
        assert_eq!(record.image_filename.len(), "prestasi/".len() + 36 + "_piala.webp".len());
        assert!(f.storage.contains(&record.image_filename));
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_image() {
        let f = fixture();
        let gif = UploadedFile::new("a.gif", "image/gif", vec![1]);

        let result = f.use_case.add(input("Gemastik", &["m1"]), Some(&gif)).await;

        assert_eq!(result.message, "Invalid file.");
        assert!(result.errors.get(IMAGE_FIELD).is_some());
        assert!(f.store.list("prestasi").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_requires_members() {
        let f = fixture();

        let result = f.use_case.add(input("Gemastik", &["", " "]), None).await;

        assert_eq!(result.status, ActionStatus::Invalid);
        assert_eq!(
            result.errors.get("members"),
            Some(&["At least one member is required.".to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_update_keeps_image_when_none_sent() {
        let f = fixture();
        let id = f
            .use_case
            .add(input("Gemastik", &["m1"]), Some(&webp("a.webp")))
            .await
            .id
            .unwrap();
        let before = f.use_case.get(&id).await.unwrap().unwrap();

        let result = f.use_case.update(&id, input("Gemastik 2024", &["m1", "m2"]), None).await;

        assert!(result.success);
        let after = f.use_case.get(&id).await.unwrap().unwrap();
        assert_eq!(after.title, "Gemastik 2024");
        assert_eq!(after.members, vec!["m1", "m2"]);
        assert_eq!(after.image(), before.image());
    }

    #[tokio::test]
    async fn test_update_replaces_image() {
        let f = fixture();
        let id = f
            .use_case
            .add(input("Gemastik", &["m1"]), Some(&webp("a.webp")))
            .await
            .id
            .unwrap();
        let old = f.use_case.get(&id).await.unwrap().unwrap().image_filename;

        f.use_case
            .update(&id, input("Gemastik", &["m1"]), Some(&webp("b.webp")))
            .await;

        let new = f.use_case.get(&id).await.unwrap().unwrap().image_filename;
        assert_ne!(old, new);
        assert_eq!(f.storage.keys(), vec![new]);
    }

    #[tokio::test]
    async fn test_delete_removes_image() {
        let f = fixture();
        let id = f
            .use_case
            .add(input("Gemastik", &["m1"]), Some(&webp("a.webp")))
            .await
            .id
            .unwrap();

        let result = f.use_case.delete(&id).await;

        assert_eq!(result.message, "Prestasi deleted successfully.");
        assert!(f.storage.keys().is_empty());
        assert_eq!(f.use_case.delete(&id).await.status, ActionStatus::NotFound);
    }

    #[tokio::test]
    async fn test_get_normalizes_member_objects() {
        let f = fixture();
        f.store
            .set(
                "prestasi",
                "p1",
                json!({
                    "title": "Gemastik",
                    "description": "Lomba pengembangan aplikasi",
                    "team_name": "Tim Garuda",
                    "members": ["m1", {"id": "m2", "name": "Siti"}],
                    "category": "Teknologi",
                    "award": "Juara 1",
                    "year": "2024"
                }),
            )
            .await
            .unwrap();

        let record = f.use_case.get("p1").await.unwrap().unwrap();

        assert_eq!(record.id, "p1");
        assert_eq!(record.members, vec!["m1", "m2"]);
    }

    #[tokio::test]
    async fn test_list_resolves_member_names_and_sorts_newest_first() {
        let f = fixture();
        f.store
            .set("members", "m1", json!({
                "name": "Budi",
                "email": "budi@example.com",
                "phone": "081234567890",
                "student_id": "2101001",
                "bio": "Mahasiswa teknik informatika",
                "photo_url": ""
            }))
            .await
            .unwrap();
        for (id, created) in [("p1", "2024-01-10T00:00:00Z"), ("p2", "2024-03-10T00:00:00Z")] {
            f.store
                .set("prestasi", id, json!({
                    "title": format!("Lomba {}", id),
                    "description": "Lomba pengembangan aplikasi",
                    "team_name": "Tim Garuda",
                    "members": ["m1", "ghost"],
                    "category": "Teknologi",
                    "award": "Juara 1",
                    "year": "2024",
                    "created_at": created,
                    "updated_at": created
                }))
                .await
                .unwrap();
        }

        let page = f.use_case.list(&params(&[])).await.unwrap();

        let ids: Vec<_> = page.items.iter().map(|r| r.prestasi.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);
        assert_eq!(page.items[0].member_names, vec!["Budi", "ghost"]);

        let page = f
            .use_case
            .list(&params(&[("createdAtFrom", "2024-02-01"), ("createdAtTo", "2024-12-31")]))
            .await
            .unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].prestasi.id, "p2");
    }

    #[tokio::test]
    async fn test_list_row_serializes_flat() {
        let f = fixture();
        let id = f.use_case.add(input("Gemastik", &["m1"]), None).await.id.unwrap();

        let page = f.use_case.list(&params(&[])).await.unwrap();
        let value = serde_json::to_value(&page.items[0]).unwrap();

        assert_eq!(value["id"], json!(id));
        assert_eq!(value["member_names"], json!(["m1"]));
    }

    #[tokio::test]
    async fn test_choices_sorted_and_deduplicated() {
        let f = fixture();

        assert!(f.use_case.add_category("Teknologi").await.success);
        assert!(f.use_case.add_category("Seni").await.success);
        assert!(f.use_case.add_category("Teknologi").await.success);
        assert!(f.use_case.add_award("Juara 1").await.success);

        assert_eq!(f.use_case.categories().await.unwrap(), vec!["Seni", "Teknologi"]);
        assert_eq!(f.use_case.awards().await.unwrap(), vec!["Juara 1"]);
        assert_eq!(f.store.list("prestasi_categories").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_add_choice_rejects_blank() {
        let f = fixture();

        let result = f.use_case.add_award("  ").await;

        assert_eq!(result.status, ActionStatus::Invalid);
        assert!(f.use_case.awards().await.unwrap().is_empty());
    }
}
