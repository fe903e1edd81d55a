//! # Division Use Cases
//!
//! 部署の一覧・取得・追加・更新・削除

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;

use super::revalidate::revalidate;
use crate::application::dto::action_result::ActionResult;
use crate::application::dto::list_params::ListParams;
use crate::domain::entities::division::{Division, DivisionDraft, DivisionInput};
use crate::domain::entities::Record;
use crate::domain::repositories::document_store::{
    is_not_found, new_document_id, to_patch, touch, Collection, DocumentStore,
};
use crate::domain::repositories::page_cache::PageCache;
use crate::domain::services::listing::{filter_by_search, paginate, Page};

/// 部署のユースケース
pub struct DivisionUseCase<D: DocumentStore + ?Sized, C: PageCache + ?Sized> {
    store: Arc<D>,
    cache: Arc<C>,
}

impl<D: DocumentStore + ?Sized, C: PageCache + ?Sized> DivisionUseCase<D, C> {
    pub fn new(store: Arc<D>, cache: Arc<C>) -> Self {
        Self { store, cache }
    }

    fn divisions(&self) -> Collection<'_, D> {
        Collection::new(&*self.store, Division::COLLECTION)
    }

    /// 部署の一覧
    ///
    /// 名前・スラッグ・説明で検索し、`order_index`、名前の順に並べる
    pub async fn list(&self, params: &ListParams) -> Result<Page<Division>> {
        let divisions: Vec<Division> = self.divisions().all().await?;
        let mut divisions = filter_by_search(divisions, params.search.as_deref());

        divisions.sort_by(|a, b| {
            a.order_index
                .cmp(&b.order_index)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(paginate(divisions, params.page, params.per_page))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Division>> {
        self.divisions().get(id).await
    }

    /// 部署を追加する
    pub async fn add(&self, input: DivisionInput) -> ActionResult {
        let draft = match input.validate() {
            Ok(draft) => draft,
            Err(errors) => return ActionResult::invalid(errors),
        };

        let id = new_document_id();
        let division = draft.into_record(id.clone(), Utc::now());

        match self.divisions().create(&id, &division).await {
            Ok(()) => {
                revalidate(&*self.cache, Division::COLLECTION, None);
                ActionResult::created("Division added successfully.", id)
            }
            Err(e) => ActionResult::failure("add division", &e),
        }
    }

    /// 部署を更新する
    pub async fn update(&self, id: &str, input: DivisionInput) -> ActionResult {
        let draft = match input.validate() {
            Ok(draft) => draft,
            Err(errors) => return ActionResult::invalid(errors),
        };

        let result = self.apply_update(id, &draft).await;

        match result {
            Ok(true) => {
                revalidate(&*self.cache, Division::COLLECTION, Some(id));
                ActionResult::success("Division updated successfully.")
            }
            Ok(false) => ActionResult::not_found(Division::LABEL),
            Err(e) if is_not_found(&e) => ActionResult::not_found(Division::LABEL),
            Err(e) => ActionResult::failure("update division", &e),
        }
    }

    async fn apply_update(&self, id: &str, draft: &DivisionDraft) -> Result<bool> {
        if self.get(id).await?.is_none() {
            return Ok(false);
        }
        let mut patch = to_patch(draft)?;
        touch(&mut patch, Utc::now());
        self.divisions().update(id, patch).await?;
        Ok(true)
    }

    /// 部署を削除する
    pub async fn delete(&self, id: &str) -> ActionResult {
        let result = match self.get(id).await {
            Ok(Some(_)) => self.divisions().delete(id).await,
            Ok(None) => Ok(false),
            Err(e) => Err(e),
        };

        match result {
            Ok(true) => {
                revalidate(&*self.cache, Division::COLLECTION, Some(id));
                ActionResult::success("Division deleted successfully.")
            }
            Ok(false) => ActionResult::not_found(Division::LABEL),
            Err(e) => ActionResult::failure("delete division", &e),
        }
    }
}
