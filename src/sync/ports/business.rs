//! Business store port for activity and project task access.

use super::identity::TokenError;
use crate::sync::domain::{
    ActivityId, BusinessTask, BusinessTaskDraft, BusinessTaskRef, BusinessWbsTask, Progress,
    ProjectId, ProjectTaskId, WbsTaskDraft,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for business store operations.
pub type BusinessStoreResult<T> = Result<T, BusinessStoreError>;

/// Business store contract.
///
/// Creation returns the store-assigned identifier so callers can write it
/// back as a cross-reference. Subject lookup exists for simple activities
/// only; project tasks have no natural-key path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BusinessStore: Send + Sync {
    /// Returns open activities, oldest due first, capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessStoreError`] when the snapshot cannot be fetched.
    async fn fetch_open_tasks(&self, limit: usize) -> BusinessStoreResult<Vec<BusinessTask>>;

    /// Returns the project tasks under one project, earliest start first.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessStoreError`] when the snapshot cannot be fetched.
    async fn fetch_wbs_tasks(&self, project: ProjectId)
    -> BusinessStoreResult<Vec<BusinessWbsTask>>;

    /// Creates an activity and returns its store-assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessStoreError`] when creation is rejected or the
    /// store's answer carries no identifier.
    async fn create_task(&self, draft: &BusinessTaskDraft) -> BusinessStoreResult<ActivityId>;

    /// Closes an activity as done at the given timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessStoreError`] when the write is rejected.
    async fn complete_task(
        &self,
        activity: ActivityId,
        completed_on: DateTime<Utc>,
    ) -> BusinessStoreResult<()>;

    /// Creates a project task and returns its store-assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessStoreError`] when creation is rejected or the
    /// store's answer carries no identifier.
    async fn create_wbs_task(&self, draft: &WbsTaskDraft) -> BusinessStoreResult<ProjectTaskId>;

    /// Overwrites a project task's progress, closing it when `complete` is
    /// set.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessStoreError`] when the write is rejected.
    async fn update_wbs_progress(
        &self,
        project_task: ProjectTaskId,
        progress: Progress,
        complete: bool,
    ) -> BusinessStoreResult<()>;

    /// Finds one activity by exact subject match.
    ///
    /// Returns `None` when no activity carries the subject; a miss is the
    /// normal precursor to creation, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`BusinessStoreError`] when the lookup itself fails.
    async fn find_task_by_subject(
        &self,
        subject: &str,
    ) -> BusinessStoreResult<Option<BusinessTaskRef>>;
}

/// Errors returned by business store implementations.
#[derive(Debug, Clone, Error)]
pub enum BusinessStoreError {
    /// Token acquisition failed before any request was made.
    #[error(transparent)]
    Auth(#[from] TokenError),

    /// The transport layer failed before a response arrived.
    #[error("business transport error: {0}")]
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

impl BusinessStoreError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
