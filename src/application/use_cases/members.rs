//! # Member Use Cases
//!
//! メンバーの一覧・取得・追加・更新・削除（写真のアップロードと差し替えを含む）

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde_json::Value;

use super::images::{discard_image, discard_replaced, upload_image, KeyPrefix};
use super::revalidate::revalidate;
use crate::application::dto::action_result::ActionResult;
use crate::application::dto::list_params::ListParams;
use crate::domain::entities::member::{Member, MemberDraft, MemberInput};
use crate::domain::entities::prestasi::Prestasi;
use crate::domain::entities::upload::{StoredImage, UploadedFile};
use crate::domain::entities::Record;
use crate::domain::repositories::document_store::{
    is_not_found, new_document_id, to_patch, touch, Collection, DocumentStore,
};
use crate::domain::repositories::object_storage::ObjectStorage;
use crate::domain::repositories::page_cache::PageCache;
use crate::domain::services::listing::{filter_by_search, paginate, Page};
use crate::domain::services::validation::FieldErrors;

/// 写真のフォームフィールド名
pub const PHOTO_FIELD: &str = "photo_url";

/// 写真の保存先フォルダ
const PHOTO_FOLDER: &str = "members";

/// メンバーのユースケース
pub struct MemberUseCase<D, O, C>
where
    D: DocumentStore + ?Sized,
    O: ObjectStorage + ?Sized,
    C: PageCache + ?Sized,
{
    store: Arc<D>,
    storage: Arc<O>,
    cache: Arc<C>,
}

impl<D, O, C> MemberUseCase<D, O, C>
where
    D: DocumentStore + ?Sized,
    O: ObjectStorage + ?Sized,
    C: PageCache + ?Sized,
{
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `store` - ドキュメントストア
    /// * `storage` - 写真の保存先
    /// * `cache` - ページキャッシュ
    pub fn new(store: Arc<D>, storage: Arc<O>, cache: Arc<C>) -> Self {
        Self {
            store,
            storage,
            cache,
        }
    }

    fn members(&self) -> Collection<'_, D> {
        Collection::new(&*self.store, Member::COLLECTION)
    }

    /// メンバー一覧と実績一覧（メンバー名を表示する）を破棄する
    fn revalidate(&self, id: Option<&str>) {
        revalidate(&*self.cache, Member::COLLECTION, id);
        revalidate(&*self.cache, Prestasi::COLLECTION, None);
    }

    /// メンバーの一覧
    ///
    /// 名前・メール・学籍番号で検索し、名前順に並べる
    pub async fn list(&self, params: &ListParams) -> Result<Page<Member>> {
        let members: Vec<Member> = self.members().all().await?;
        let mut members = filter_by_search(members, params.search.as_deref());
        members.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(paginate(members, params.page, params.per_page))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Member>> {
        self.members().get(id).await
    }

    /// メンバーを追加する
    ///
    /// 写真は必須。ドキュメントの保存に失敗した場合はアップロードした写真を削除する。
    pub async fn add(&self, input: MemberInput, photo: Option<&UploadedFile>) -> ActionResult {
        let draft = match input.validate() {
            Ok(draft) => draft,
            Err(errors) => return ActionResult::invalid(errors),
        };

        let Some(photo) = photo else {
            let mut errors = FieldErrors::new();
            errors.add(PHOTO_FIELD, "Photo is required.");
            return ActionResult::invalid_file(errors);
        };
        if let Err(errors) = photo.validate_image(PHOTO_FIELD) {
            return ActionResult::invalid_file(errors);
        }

        let uploaded = upload_image(&*self.storage, photo, PHOTO_FOLDER, KeyPrefix::Timestamp).await;
        let image = match uploaded {
            Ok(image) => image,
            Err(e) => return ActionResult::failure("add member", &e),
        };

        let id = new_document_id();
        let member = draft.into_record(id.clone(), image.clone(), Utc::now());

        match self.members().create(&id, &member).await {
            Ok(()) => {
                self.revalidate(None);
                ActionResult::created("Member added successfully.", id)
            }
            Err(e) => {
                discard_image(&*self.storage, &image).await;
                ActionResult::failure("add member", &e)
            }
        }
    }

    /// メンバーを更新する
    ///
    /// 写真が送られた場合は差し替え、更新に成功してから古い写真を削除する
    pub async fn update(
        &self,
        id: &str,
        input: MemberInput,
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
            Ok(Some(member)) => member,
            Ok(None) => return ActionResult::not_found(Member::LABEL),
            Err(e) => return ActionResult::failure("update member", &e),
        };

        let uploaded = match photo {
            Some(photo) => {
                let uploaded =
                    upload_image(&*self.storage, photo, PHOTO_FOLDER, KeyPrefix::Timestamp).await;
                match uploaded {
                    Ok(image) => Some(image),
                    Err(e) => return ActionResult::failure("update member", &e),
                }
            }
            None => None,
        };

        match self.apply_update(id, &draft, uploaded.as_ref()).await {
            Ok(()) => {
                if let Some(new_photo) = &uploaded {
                    discard_replaced(&*self.storage, existing.photo().as_ref(), new_photo).await;
                }
                self.revalidate(Some(id));
                ActionResult::success("Member updated successfully.")
            }
            Err(e) => {
                if let Some(new_photo) = &uploaded {
                    discard_image(&*self.storage, new_photo).await;
                }
                if is_not_found(&e) {
                    ActionResult::not_found(Member::LABEL)
                } else {
                    ActionResult::failure("update member", &e)
                }
            }
        }
    }

    async fn apply_update(
        &self,
        id: &str,
        draft: &MemberDraft,
        photo: Option<&StoredImage>,
    ) -> Result<()> {
        let mut patch = to_patch(draft)?;
        if let Some(photo) = photo {
            patch.insert("photo_url".to_string(), Value::String(photo.url.clone()));
            patch.insert("photo_path".to_string(), Value::String(photo.key.clone()));
        }
        touch(&mut patch, Utc::now());
        self.members().update(id, patch).await
    }

    /// メンバーを削除する
    ///
    /// ドキュメントを削除してから写真を削除する（写真の削除失敗は警告のみ）
    pub async fn delete(&self, id: &str) -> ActionResult {
        let existing = match self.get(id).await {
            Ok(Some(member)) => member,
            Ok(None) => return ActionResult::not_found(Member::LABEL),
            Err(e) => return ActionResult::failure("delete member", &e),
        };

        match self.members().delete(id).await {
            Ok(true) => {}
            Ok(false) => return ActionResult::not_found(Member::LABEL),
            Err(e) => return ActionResult::failure("delete member", &e),
        }

        if let Some(photo) = existing.photo() {
            discard_image(&*self.storage, &photo).await;
        }

        self.revalidate(Some(id));
        ActionResult::success("Member deleted successfully.")
    }
}
