//! Collaboration store port for checklist and WBS list access.

use super::identity::TokenError;
use crate::sync::domain::{
    ActivityId, ChecklistItem, ChecklistStatus, ListItemId, Progress, ProjectTaskId, WbsItem,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for collaboration store operations.
pub type CollaborationStoreResult<T> = Result<T, CollaborationStoreError>;

/// Collaboration store contract.
///
/// Fetches return point-in-time snapshots; writes are field-level patches
/// against one list item. Implementations own pagination, column naming,
/// and value encoding.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollaborationStore: Send + Sync {
    /// Returns every checklist item, in store order.
    ///
    /// # Errors
    ///
    /// Returns [`CollaborationStoreError`] when the snapshot cannot be
    /// fetched.
    async fn fetch_checklist(&self) -> CollaborationStoreResult<Vec<ChecklistItem>>;

    /// Returns every WBS item, in store order.
    ///
    /// # Errors
    ///
    /// Returns [`CollaborationStoreError`] when the snapshot cannot be
    /// fetched.
    async fn fetch_wbs(&self) -> CollaborationStoreResult<Vec<WbsItem>>;

    /// Overwrites the status of one checklist item.
    ///
    /// # Errors
    ///
    /// Returns [`CollaborationStoreError`] when the write is rejected.
    async fn update_status(
        &self,
        id: &ListItemId,
        status: ChecklistStatus,
    ) -> CollaborationStoreResult<()>;

    /// Writes the business activity cross-reference onto one checklist
    /// item.
    ///
    /// # Errors
    ///
    /// Returns [`CollaborationStoreError`] when the write is rejected.
    async fn link_business_task(
        &self,
        id: &ListItemId,
        activity: ActivityId,
    ) -> CollaborationStoreResult<()>;

    /// Writes progress, optionally status, and the business cross-reference
    /// onto one WBS item in a single patch.
    ///
    /// # Errors
    ///
    /// Returns [`CollaborationStoreError`] when the write is rejected.
    async fn update_wbs_progress(
        &self,
        id: &ListItemId,
        progress: Progress,
        status: Option<ChecklistStatus>,
        project_task: ProjectTaskId,
    ) -> CollaborationStoreResult<()>;
}

/// Errors returned by collaboration store implementations.
#[derive(Debug, Clone, Error)]
pub enum CollaborationStoreError {
    /// Token acquisition failed before any request was made.
    #[error(transparent)]
    Auth(#[from] TokenError),

    /// The transport layer failed before a response arrived.
    #[error("collaboration transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The store answered with an unexpected HTTP status.
    #[error("{operation} returned unexpected status {status}")]
    UnexpectedStatus {
        /// Operation that observed the status.
        operation: &'static str,
        /// HTTP status received.
        status: u16,
    },

    /// The store answered with a body the adapter could not interpret.
    #[error("{operation} returned a malformed response: {detail}")]
    MalformedResponse {
        /// Operation that received the body.
        operation: &'static str,
        /// What was wrong with it.
        detail: String,
    },
}

impl CollaborationStoreError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
