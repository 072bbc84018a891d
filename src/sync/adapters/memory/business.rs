//! In-memory business store for reconciliation tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::sync::domain::{
    ActivityId, BusinessTask, BusinessTaskDraft, BusinessTaskRef, BusinessTaskState,
    BusinessWbsTask, Progress, ProjectId, ProjectTaskId, WbsTaskDraft,
};
use crate::sync::ports::{BusinessStore, BusinessStoreError, BusinessStoreResult};

/// Thread-safe in-memory business store.
///
/// Assigns random identifiers on creation and mutates held records on
/// writes, so later fetches observe completions and progress updates.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBusinessStore {
    state: Arc<RwLock<BusinessState>>,
}

#[derive(Debug, Default)]
struct BusinessState {
    tasks: Vec<BusinessTask>,
    wbs_tasks: Vec<StoredWbsTask>,
}

#[derive(Debug, Clone)]
struct StoredWbsTask {
    task: BusinessWbsTask,
    project: Option<ProjectId>,
}

impl InMemoryBusinessStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one activity.
    #[must_use]
    pub fn with_task(self, task: BusinessTask) -> Self {
        self.mutate(|state| state.tasks.push(task));
        self
    }

    /// Seeds one project task under an optional project binding.
    #[must_use]
    pub fn with_wbs_task(self, task: BusinessWbsTask, project: Option<ProjectId>) -> Self {
        self.mutate(|state| state.wbs_tasks.push(StoredWbsTask { task, project }));
        self
    }

    /// Returns a copy of one activity for assertions.
    #[must_use]
    pub fn task(&self, activity: ActivityId) -> Option<BusinessTask> {
        self.state.read().ok().and_then(|state| {
            state
                .tasks
                .iter()
                .find(|task| task.activity_id() == activity)
                .cloned()
        })
    }

    /// Returns a copy of one project task for assertions.
    #[must_use]
    pub fn wbs_task(&self, project_task: ProjectTaskId) -> Option<BusinessWbsTask> {
        self.state.read().ok().and_then(|state| {
            state
                .wbs_tasks
                .iter()
                .find(|stored| stored.task.project_task_id() == project_task)
                .map(|stored| stored.task.clone())
        })
    }

    /// Returns the number of held activities.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.state.read().map_or(0, |state| state.tasks.len())
    }

    /// Returns the number of held project tasks.
    #[must_use]
    pub fn wbs_task_count(&self) -> usize {
        self.state.read().map_or(0, |state| state.wbs_tasks.len())
    }

    /// Applies a seeding mutation. Seeding happens before the store is
    /// shared, so a poisoned lock is unreachable here.
    fn mutate(&self, apply: impl FnOnce(&mut BusinessState)) {
        if let Ok(mut state) = self.state.write() {
            apply(&mut state);
        }
    }
}

fn lock_error(err: impl std::fmt::Display) -> BusinessStoreError {
    BusinessStoreError::transport(std::io::Error::other(err.to_string()))
}

const fn missing_record(operation: &'static str) -> BusinessStoreError {
    BusinessStoreError::UnexpectedStatus {
        operation,
        status: 404,
    }
}

#[async_trait]
impl BusinessStore for InMemoryBusinessStore {
    async fn fetch_open_tasks(&self, limit: usize) -> BusinessStoreResult<Vec<BusinessTask>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .tasks
            .iter()
            .filter(|task| task.state() == BusinessTaskState::Open)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn fetch_wbs_tasks(
        &self,
        project: ProjectId,
    ) -> BusinessStoreResult<Vec<BusinessWbsTask>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .wbs_tasks
            .iter()
            .filter(|stored| stored.project == Some(project))
            .map(|stored| stored.task.clone())
            .collect())
    }

    async fn create_task(&self, draft: &BusinessTaskDraft) -> BusinessStoreResult<ActivityId> {
        let mut state = self.state.write().map_err(lock_error)?;
        let activity = ActivityId::from_uuid(Uuid::new_v4());
        state.tasks.push(BusinessTask::from_draft(activity, draft));
        Ok(activity)
    }

    async fn complete_task(
        &self,
        activity: ActivityId,
        completed_on: DateTime<Utc>,
    ) -> BusinessStoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let task = state
            .tasks
            .iter_mut()
            .find(|task| task.activity_id() == activity)
            .ok_or(missing_record("complete task"))?;
        task.complete(completed_on);
        Ok(())
    }

    async fn create_wbs_task(&self, draft: &WbsTaskDraft) -> BusinessStoreResult<ProjectTaskId> {
        let mut state = self.state.write().map_err(lock_error)?;
        let project_task = ProjectTaskId::from_uuid(Uuid::new_v4());
        state.wbs_tasks.push(StoredWbsTask {
            task: BusinessWbsTask::from_draft(project_task, draft),
            project: draft.project(),
        });
        Ok(project_task)
    }

    async fn update_wbs_progress(
        &self,
        project_task: ProjectTaskId,
        progress: Progress,
        complete: bool,
    ) -> BusinessStoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .wbs_tasks
            .iter_mut()
            .find(|stored| stored.task.project_task_id() == project_task)
            .ok_or(missing_record("update WBS progress"))?;
        stored.task.apply_progress(progress, complete);
        Ok(())
    }

    async fn find_task_by_subject(
        &self,
        subject: &str,
    ) -> BusinessStoreResult<Option<BusinessTaskRef>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .tasks
            .iter()
            .find(|task| task.subject() == subject)
            .map(|task| BusinessTaskRef::new(task.activity_id(), task.state())))
    }
}
