//! Per-record reconciliation decisions.
//!
//! The engine decides, for one collaboration-side record at a time, what to
//! create, update, or leave untouched on each side. It works against
//! point-in-time snapshots: business-side lookups go through indexes built
//! once per run, so a pass costs one listing per store surface plus the
//! writes it decides to issue.

use crate::sync::domain::{
    ActivityId, BusinessTask, BusinessTaskDraft, BusinessTaskState, BusinessWbsTask, ChecklistItem,
    ChecklistStatus, ProjectId, ProjectTaskId, StepOutcome, WbsItem, WbsTaskDraft,
};
use crate::sync::ports::{
    BusinessStore, BusinessStoreError, CollaborationStore, CollaborationStoreError,
};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Result type for reconciliation service operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Service-level errors for reconciliation operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A collaboration store operation failed.
    #[error(transparent)]
    Collaboration(#[from] CollaborationStoreError),
    /// A business store operation failed.
    #[error(transparent)]
    Business(#[from] BusinessStoreError),
}

/// Index of open business activities, keyed by activity identifier.
///
/// Built once per run from the capped open-task listing. Within one pass,
/// absence from this index is read as the activity having left the open
/// set, which for simple tasks means external completion.
#[derive(Debug, Default)]
pub struct OpenTaskIndex {
    states: HashMap<ActivityId, BusinessTaskState>,
}

impl OpenTaskIndex {
    /// Builds an index from fetched open activities.
    #[must_use]
    pub fn from_tasks(tasks: &[BusinessTask]) -> Self {
        let states = tasks
            .iter()
            .map(|task| (task.activity_id(), task.state()))
            .collect();
        Self { states }
    }

    /// Returns the indexed state for an activity, if present.
    #[must_use]
    pub fn state_of(&self, activity: ActivityId) -> Option<BusinessTaskState> {
        self.states.get(&activity).copied()
    }

    /// Reports whether an activity is present in the open set.
    #[must_use]
    pub fn contains(&self, activity: ActivityId) -> bool {
        self.states.contains_key(&activity)
    }

    /// Returns the number of indexed activities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Reports whether the index holds no activities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Index of business project tasks for one project scope, keyed by project
/// task identifier.
#[derive(Debug, Default)]
pub struct WbsTaskIndex {
    tasks: HashMap<ProjectTaskId, BusinessWbsTask>,
}

impl WbsTaskIndex {
    /// Builds an index from fetched project tasks.
    #[must_use]
    pub fn from_tasks(tasks: Vec<BusinessWbsTask>) -> Self {
        let indexed = tasks
            .into_iter()
            .map(|task| (task.project_task_id(), task))
            .collect();
        Self { tasks: indexed }
    }

    /// Returns the indexed project task, if present.
    #[must_use]
    pub fn task_of(&self, project_task: ProjectTaskId) -> Option<&BusinessWbsTask> {
        self.tasks.get(&project_task)
    }

    /// Returns the number of indexed project tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Reports whether the index holds no project tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Business linkage of one checklist item after the upsert step.
struct Linkage {
    activity: ActivityId,
    created: bool,
    /// Counterpart state when the linkage came from a natural-key lookup;
    /// `None` on the direct cross-reference path.
    known_state: Option<BusinessTaskState>,
}

/// Per-record reconciliation engine.
///
/// Holds the two store ports and the clock that stamps completion times.
/// Each method reconciles exactly one record in one direction and reports
/// what it did; containment of per-record failures is the orchestrator's
/// concern.
#[derive(Clone)]
pub struct ReconcileEngine<C, B, K>
where
    C: CollaborationStore,
    B: BusinessStore,
    K: Clock + Send + Sync,
{
    collaboration: Arc<C>,
    business: Arc<B>,
    clock: Arc<K>,
}

impl<C, B, K> ReconcileEngine<C, B, K>
where
    C: CollaborationStore,
    B: BusinessStore,
    K: Clock + Send + Sync,
{
    /// Creates a new reconciliation engine.
    #[must_use]
    pub const fn new(collaboration: Arc<C>, business: Arc<B>, clock: Arc<K>) -> Self {
        Self {
            collaboration,
            business,
            clock,
        }
    }

    /// Fetches the checklist snapshot for this pass.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Collaboration`] when the listing fails.
    pub async fn checklist_snapshot(&self) -> SyncResult<Vec<ChecklistItem>> {
        let items = self.collaboration.fetch_checklist().await?;
        debug!(count = items.len(), "fetched checklist snapshot");
        Ok(items)
    }

    /// Fetches the WBS snapshot for this pass.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Collaboration`] when the listing fails.
    pub async fn wbs_snapshot(&self) -> SyncResult<Vec<WbsItem>> {
        let items = self.collaboration.fetch_wbs().await?;
        debug!(count = items.len(), "fetched WBS snapshot");
        Ok(items)
    }

    /// Builds the open-activity index for this pass.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Business`] when the listing fails.
    pub async fn open_task_index(&self, limit: usize) -> SyncResult<OpenTaskIndex> {
        let tasks = self.business.fetch_open_tasks(limit).await?;
        debug!(count = tasks.len(), "indexed open business activities");
        Ok(OpenTaskIndex::from_tasks(&tasks))
    }

    /// Builds the project-task index for this pass.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Business`] when the listing fails.
    pub async fn wbs_task_index(&self, project: ProjectId) -> SyncResult<WbsTaskIndex> {
        let tasks = self.business.fetch_wbs_tasks(project).await?;
        debug!(count = tasks.len(), %project, "indexed business project tasks");
        Ok(WbsTaskIndex::from_tasks(tasks))
    }

    /// Pushes one checklist item outward.
    ///
    /// Ensures a business counterpart exists, then issues a completion
    /// update when the checklist says completed and the counterpart is
    /// still open. The completion transition is one-way: a counterpart
    /// that already left the open set is never touched again.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when a store operation fails; the record's
    /// state on either side is then unspecified for this pass.
    pub async fn push_checklist_item(
        &self,
        item: &ChecklistItem,
        open_tasks: &OpenTaskIndex,
    ) -> SyncResult<StepOutcome> {
        let linkage = self.ensure_checklist_linked(item).await?;
        if linkage.created {
            return Ok(StepOutcome::Created);
        }
        if item.status() == ChecklistStatus::Completed {
            let still_open = linkage.known_state.map_or_else(
                || open_tasks.contains(linkage.activity),
                |state| matches!(state, BusinessTaskState::Open),
            );
            if still_open {
                self.business
                    .complete_task(linkage.activity, self.clock.utc())
                    .await?;
                debug!(item = %item.title(), activity = %linkage.activity, "completed business activity");
                return Ok(StepOutcome::Updated);
            }
        }
        Ok(StepOutcome::Skipped)
    }

    /// Pulls business-side state back onto one checklist item.
    ///
    /// Unlinked items have nothing to pull from and are skipped. Absence
    /// from the open-activity index is read as external completion; a
    /// present counterpart has its coarse-mapped status compared against
    /// the checklist's.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Collaboration`] when the status write fails.
    pub async fn pull_checklist_item(
        &self,
        item: &ChecklistItem,
        open_tasks: &OpenTaskIndex,
    ) -> SyncResult<StepOutcome> {
        let Some(activity) = item.linked_activity() else {
            return Ok(StepOutcome::Skipped);
        };
        let Some(state) = open_tasks.state_of(activity) else {
            if item.status() == ChecklistStatus::Completed {
                return Ok(StepOutcome::Skipped);
            }
            debug!(item = %item.title(), %activity, "activity left the open set; marking checklist item completed");
            self.collaboration
                .update_status(item.id(), ChecklistStatus::Completed)
                .await?;
            return Ok(StepOutcome::Updated);
        };
        let mapped = state.checklist_status();
        if mapped == item.status() {
            return Ok(StepOutcome::Skipped);
        }
        self.collaboration.update_status(item.id(), mapped).await?;
        Ok(StepOutcome::Updated)
    }

    /// Pushes one WBS item outward.
    ///
    /// Linked items get their business progress overwritten every pass,
    /// closing the counterpart when the checklist says completed. Unlinked
    /// items create a counterpart and write the new cross-reference back
    /// before anything else happens to the record.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when a store operation fails.
    pub async fn push_wbs_item(
        &self,
        item: &WbsItem,
        project: Option<ProjectId>,
    ) -> SyncResult<StepOutcome> {
        if let Some(project_task) = item.linked_project_task() {
            let complete = item.status() == ChecklistStatus::Completed;
            self.business
                .update_wbs_progress(project_task, item.percent_complete(), complete)
                .await?;
            return Ok(StepOutcome::Updated);
        }

        let draft = wbs_draft(item, project);
        let project_task = self.business.create_wbs_task(&draft).await?;
        debug!(item = %item.title(), %project_task, "created business project task");
        self.collaboration
            .update_wbs_progress(item.id(), item.percent_complete(), None, project_task)
            .await?;
        Ok(StepOutcome::Created)
    }

    /// Pulls business-side progress and status back onto one WBS item.
    ///
    /// Progress differences within the shared tolerance and an unchanged
    /// derived status leave the record untouched; either kind of drift
    /// triggers one combined write. Counterparts outside the project scope
    /// are left alone, absence proves nothing for project tasks.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Collaboration`] when the combined write fails.
    pub async fn pull_wbs_item(
        &self,
        item: &WbsItem,
        wbs_tasks: &WbsTaskIndex,
    ) -> SyncResult<StepOutcome> {
        let Some(project_task) = item.linked_project_task() else {
            return Ok(StepOutcome::Skipped);
        };
        let Some(remote) = wbs_tasks.task_of(project_task) else {
            debug!(item = %item.title(), %project_task, "no business project task in scope");
            return Ok(StepOutcome::Skipped);
        };
        let derived = remote.derived_status();
        let drifted = remote.progress().drifted_from(item.percent_complete());
        if !drifted && derived == item.status() {
            return Ok(StepOutcome::Skipped);
        }
        self.collaboration
            .update_wbs_progress(item.id(), remote.progress(), Some(derived), project_task)
            .await?;
        Ok(StepOutcome::Updated)
    }

    /// Ensures one checklist item has a business counterpart.
    ///
    /// Direct cross-reference wins; otherwise a natural-key lookup adopts
    /// an existing activity, and only then is one created. Both the adopt
    /// and create paths write the cross-reference back immediately, so the
    /// next run takes the direct path.
    async fn ensure_checklist_linked(&self, item: &ChecklistItem) -> SyncResult<Linkage> {
        if let Some(activity) = item.linked_activity() {
            return Ok(Linkage {
                activity,
                created: false,
                known_state: None,
            });
        }

        if let Some(found) = self.business.find_task_by_subject(item.title()).await? {
            debug!(item = %item.title(), activity = %found.activity_id(), "adopted business activity by subject");
            self.collaboration
                .link_business_task(item.id(), found.activity_id())
                .await?;
            return Ok(Linkage {
                activity: found.activity_id(),
                created: false,
                known_state: Some(found.state()),
            });
        }

        let draft = checklist_draft(item);
        let activity = self.business.create_task(&draft).await?;
        debug!(item = %item.title(), %activity, "created business activity");
        self.collaboration
            .link_business_task(item.id(), activity)
            .await?;
        Ok(Linkage {
            activity,
            created: true,
            known_state: None,
        })
    }
}

/// Maps a checklist item onto the draft its business counterpart is created
/// from.
fn checklist_draft(item: &ChecklistItem) -> BusinessTaskDraft {
    let (state, sub_status) = item.status().business_fields();
    let mut draft = BusinessTaskDraft::new(item.title(), state, sub_status);
    if let Some(notes) = item.notes() {
        draft = draft.with_description(notes);
    }
    if let Some(due_date) = item.due_date() {
        draft = draft.with_due_date(due_date);
    }
    draft
}

/// Maps a WBS item onto the draft its business counterpart is created from.
fn wbs_draft(item: &WbsItem, project: Option<ProjectId>) -> WbsTaskDraft {
    let mut draft = WbsTaskDraft::new(item.business_subject(), item.percent_complete());
    if let Some(start_date) = item.start_date() {
        draft = draft.with_scheduled_start(start_date);
    }
    if let Some(due_date) = item.due_date() {
        draft = draft.with_scheduled_end(due_date);
    }
    if let Some(bound) = project {
        draft = draft.with_project(bound);
    }
    draft
}
