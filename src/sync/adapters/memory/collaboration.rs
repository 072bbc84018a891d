//! In-memory collaboration store for reconciliation tests.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::sync::domain::{
    ActivityId, ChecklistItem, ChecklistStatus, ListItemId, Progress, ProjectTaskId, WbsItem,
};
use crate::sync::ports::{CollaborationStore, CollaborationStoreError, CollaborationStoreResult};

/// Thread-safe in-memory collaboration store.
///
/// Writes mutate the held snapshot, so a refetch observes earlier patches
/// the way the real store would.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCollaborationStore {
    state: Arc<RwLock<CollaborationState>>,
}

#[derive(Debug, Default)]
struct CollaborationState {
    checklist: Vec<ChecklistItem>,
    wbs: Vec<WbsItem>,
}

impl InMemoryCollaborationStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one checklist item, preserving insertion order.
    #[must_use]
    pub fn with_checklist_item(self, item: ChecklistItem) -> Self {
        self.mutate(|state| state.checklist.push(item));
        self
    }

    /// Seeds one WBS item, preserving insertion order.
    #[must_use]
    pub fn with_wbs_item(self, item: WbsItem) -> Self {
        self.mutate(|state| state.wbs.push(item));
        self
    }

    /// Returns a copy of one checklist item for assertions.
    #[must_use]
    pub fn checklist_item(&self, id: &ListItemId) -> Option<ChecklistItem> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.checklist.iter().find(|item| item.id() == id).cloned())
    }

    /// Returns a copy of one WBS item for assertions.
    #[must_use]
    pub fn wbs_item(&self, id: &ListItemId) -> Option<WbsItem> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.wbs.iter().find(|item| item.id() == id).cloned())
    }

    /// Applies a seeding mutation. Seeding happens before the store is
    /// shared, so a poisoned lock is unreachable here.
    fn mutate(&self, apply: impl FnOnce(&mut CollaborationState)) {
        if let Ok(mut state) = self.state.write() {
            apply(&mut state);
        }
    }
}

fn lock_error(err: impl std::fmt::Display) -> CollaborationStoreError {
    CollaborationStoreError::transport(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl CollaborationStore for InMemoryCollaborationStore {
    async fn fetch_checklist(&self) -> CollaborationStoreResult<Vec<ChecklistItem>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.checklist.clone())
    }

    async fn fetch_wbs(&self) -> CollaborationStoreResult<Vec<WbsItem>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.wbs.clone())
    }

    async fn update_status(
        &self,
        id: &ListItemId,
        status: ChecklistStatus,
    ) -> CollaborationStoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let item = state
            .checklist
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or(CollaborationStoreError::UnexpectedStatus {
                operation: "update checklist status",
                status: 404,
            })?;
        item.apply_status(status);
        Ok(())
    }

    async fn link_business_task(
        &self,
        id: &ListItemId,
        activity: ActivityId,
    ) -> CollaborationStoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let item = state
            .checklist
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or(CollaborationStoreError::UnexpectedStatus {
                operation: "link business task",
                status: 404,
            })?;
        item.record_linked_activity(activity);
        Ok(())
    }

    async fn update_wbs_progress(
        &self,
        id: &ListItemId,
        progress: Progress,
        status: Option<ChecklistStatus>,
        project_task: ProjectTaskId,
    ) -> CollaborationStoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let item = state
            .wbs
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or(CollaborationStoreError::UnexpectedStatus {
                operation: "update WBS progress",
                status: 404,
            })?;
        item.apply_remote_progress(progress, status, project_task);
        Ok(())
    }
}
