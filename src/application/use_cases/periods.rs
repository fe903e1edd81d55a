//! # Period Use Cases
//!
//! 活動期間の一覧・取得・追加・更新・削除

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use log::warn;

use super::revalidate::revalidate;
use crate::application::dto::action_result::ActionResult;
use crate::application::dto::list_params::{ActiveFilter, ListParams};
use crate::domain::entities::period::{Period, PeriodDraft, PeriodInput};
use crate::domain::entities::Record;
use crate::domain::repositories::document_store::{
    is_not_found, to_patch, touch, Collection, DocumentStore, StoreError,
};
use crate::domain::repositories::page_cache::PageCache;
use crate::domain::services::listing::{filter_by_search, paginate, Page};

/// ID採番の競合時に再試行する回数
const MAX_ID_ATTEMPTS: usize = 3;

/// 期間のユースケース
pub struct PeriodUseCase<D: DocumentStore + ?Sized, C: PageCache + ?Sized> {
    store: Arc<D>,
    cache: Arc<C>,
}

impl<D: DocumentStore + ?Sized, C: PageCache + ?Sized> PeriodUseCase<D, C> {
    pub fn new(store: Arc<D>, cache: Arc<C>) -> Self {
        Self { store, cache }
    }

    fn periods(&self) -> Collection<'_, D> {
        Collection::new(&*self.store, Period::COLLECTION)
    }

    /// 期間の一覧（ID順）
    pub async fn list(&self, params: &ListParams) -> Result<Page<Period>> {
        let periods: Vec<Period> = self.periods().all().await?;
        let mut periods = filter_by_search(periods, params.search.as_deref());

        match params.active() {
            Some(ActiveFilter::Active) => periods.retain(|p| p.is_active),
            Some(ActiveFilter::Inactive) => periods.retain(|p| !p.is_active),
            None => {}
        }
        periods.sort_by_key(|p| p.id);

        Ok(paginate(periods, params.page, params.per_page))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Period>> {
        self.periods().get(id).await
    }

    /// 期間を追加する
    ///
    /// IDは既存の最大値 + 1。同時に追加されて衝突した場合は採番し直す。
    pub async fn add(&self, input: PeriodInput) -> ActionResult {
        let draft = match input.validate() {
            Ok(draft) => draft,
            Err(errors) => return ActionResult::invalid(errors),
        };

        match self.create_with_next_id(draft).await {
            Ok(id) => {
                revalidate(&*self.cache, Period::COLLECTION, None);
                ActionResult::created("Period added successfully.", id.to_string())
            }
            Err(e) => ActionResult::failure("add period", &e),
        }
    }

    async fn create_with_next_id(&self, draft: PeriodDraft) -> Result<u64> {
        let mut attempt = 1;
        loop {
            let existing: Vec<Period> = self.periods().all().await?;
            let id = Period::next_id(&existing);
            let period = draft.clone().into_record(id, Utc::now());

            match self.periods().create(&id.to_string(), &period).await {
                Ok(()) => return Ok(id),
                Err(e)
                    if attempt < MAX_ID_ATTEMPTS
                        && matches!(
                            e.downcast_ref::<StoreError>(),
                            Some(StoreError::AlreadyExists { .. })
                        ) =>
                {
                    warn!("Period id {} was taken, retrying", id);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// 期間を更新する
    pub async fn update(&self, id: &str, input: PeriodInput) -> ActionResult {
        let draft = match input.validate() {
            Ok(draft) => draft,
            Err(errors) => return ActionResult::invalid(errors),
        };

        match self.apply_update(id, &draft).await {
            Ok(true) => {
                revalidate(&*self.cache, Period::COLLECTION, Some(id));
                ActionResult::success("Period updated successfully.")
            }
            Ok(false) => ActionResult::not_found(Period::LABEL),
            Err(e) if is_not_found(&e) => ActionResult::not_found(Period::LABEL),
            Err(e) => ActionResult::failure("update period", &e),
        }
    }

    async fn apply_update(&self, id: &str, draft: &PeriodDraft) -> Result<bool> {
        if self.get(id).await?.is_none() {
            return Ok(false);
        }
        let mut patch = to_patch(draft)?;
        touch(&mut patch, Utc::now());
        self.periods().update(id, patch).await?;
        Ok(true)
    }

    /// 期間を削除する
    pub async fn delete(&self, id: &str) -> ActionResult {
        let result = match self.get(id).await {
            Ok(Some(_)) => self.periods().delete(id).await,
            Ok(None) => Ok(false),
            Err(e) => Err(e),
        };

        match result {
            Ok(true) => {
                revalidate(&*self.cache, Period::COLLECTION, Some(id));
                ActionResult::success("Period deleted successfully.")
            }
            Ok(false) => ActionResult::not_found(Period::LABEL),
            Err(e) => ActionResult::failure("delete period", &e),
        }
    }
}
