//! Work-breakdown records on both store surfaces.

use super::{ChecklistStatus, ListItemId, Progress, ProjectId, ProjectTaskId, WbsState};
use chrono::{DateTime, Utc};

/// Snapshot of one WBS row as fetched from the collaboration store.
///
/// The business counterpart's subject is composed from the task code and
/// title; there is no natural-key lookup for WBS records, so the business
/// cross-reference is the only linkage.
#[derive(Debug, Clone, PartialEq)]
pub struct WbsItem {
    id: ListItemId,
    title: String,
    phase: Option<String>,
    task_code: Option<String>,
    start_date: Option<DateTime<Utc>>,
    due_date: Option<DateTime<Utc>>,
    status: ChecklistStatus,
    percent_complete: Progress,
    dependencies: Option<String>,
    linked_project_task: Option<ProjectTaskId>,
}

impl WbsItem {
    /// Creates a WBS item with required fields.
    #[must_use]
    pub fn new(
        id: ListItemId,
        title: impl Into<String>,
        status: ChecklistStatus,
        percent_complete: Progress,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            phase: None,
            task_code: None,
            start_date: None,
            due_date: None,
            status,
            percent_complete,
            dependencies: None,
            linked_project_task: None,
        }
    }

    /// Sets the phase label.
    #[must_use]
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    /// Sets the task code used to compose the business subject.
    #[must_use]
    pub fn with_task_code(mut self, task_code: impl Into<String>) -> Self {
        self.task_code = Some(task_code.into());
        self
    }

    /// Sets the scheduled start date.
    #[must_use]
    pub const fn with_start_date(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the free-text dependency notes.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: impl Into<String>) -> Self {
        self.dependencies = Some(dependencies.into());
        self
    }

    /// Sets the business project task cross-reference.
    #[must_use]
    pub const fn with_linked_project_task(mut self, project_task: ProjectTaskId) -> Self {
        self.linked_project_task = Some(project_task);
        self
    }

    /// Applies a combined write of progress, optional status, and the
    /// business cross-reference, as one patch.
    pub const fn apply_remote_progress(
        &mut self,
        progress: Progress,
        status: Option<ChecklistStatus>,
        project_task: ProjectTaskId,
    ) {
        self.percent_complete = progress;
        if let Some(updated) = status {
            self.status = updated;
        }
        self.linked_project_task = Some(project_task);
    }

    /// Returns the collaboration store identifier.
    #[must_use]
    pub const fn id(&self) -> &ListItemId {
        &self.id
    }

    /// Returns the item title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the phase label, if any.
    #[must_use]
    pub fn phase(&self) -> Option<&str> {
        self.phase.as_deref()
    }

    /// Returns the task code, if any.
    #[must_use]
    pub fn task_code(&self) -> Option<&str> {
        self.task_code.as_deref()
    }

    /// Returns the scheduled start date, if any.
    #[must_use]
    pub const fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the checklist status.
    #[must_use]
    pub const fn status(&self) -> ChecklistStatus {
        self.status
    }

    /// Returns the completion percentage.
    #[must_use]
    pub const fn percent_complete(&self) -> Progress {
        self.percent_complete
    }

    /// Returns the free-text dependency notes, if any.
    #[must_use]
    pub fn dependencies(&self) -> Option<&str> {
        self.dependencies.as_deref()
    }

    /// Returns the linked business project task, if any.
    #[must_use]
    pub const fn linked_project_task(&self) -> Option<ProjectTaskId> {
        self.linked_project_task
    }

    /// Reports whether a business cross-reference is present.
    #[must_use]
    pub const fn is_linked(&self) -> bool {
        self.linked_project_task.is_some()
    }

    /// Composes the subject line used for the business counterpart.
    ///
    /// Task code and title joined with a space, trimmed, so records without
    /// a code fall back to the bare title.
    #[must_use]
    pub fn business_subject(&self) -> String {
        let task_code = self.task_code.as_deref().unwrap_or_default();
        format!("{task_code} {}", self.title).trim().to_owned()
    }
}

/// Snapshot of one business project task as fetched from the business store.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessWbsTask {
    project_task_id: ProjectTaskId,
    subject: String,
    scheduled_start: Option<DateTime<Utc>>,
    scheduled_end: Option<DateTime<Utc>>,
    progress: Progress,
    state: WbsState,
}

impl BusinessWbsTask {
    /// Creates a project task snapshot with required fields.
    #[must_use]
    pub fn new(
        project_task_id: ProjectTaskId,
        subject: impl Into<String>,
        progress: Progress,
        state: WbsState,
    ) -> Self {
        Self {
            project_task_id,
            subject: subject.into(),
            scheduled_start: None,
            scheduled_end: None,
            progress,
            state,
        }
    }

    /// Materializes the project task a draft describes once the store has
    /// assigned its identifier.
    #[must_use]
    pub fn from_draft(project_task_id: ProjectTaskId, draft: &WbsTaskDraft) -> Self {
        let mut task = Self::new(
            project_task_id,
            draft.subject(),
            draft.progress(),
            WbsState::Open,
        );
        if let Some(scheduled_start) = draft.scheduled_start() {
            task = task.with_scheduled_start(scheduled_start);
        }
        if let Some(scheduled_end) = draft.scheduled_end() {
            task = task.with_scheduled_end(scheduled_end);
        }
        task
    }

    /// Sets the scheduled start.
    #[must_use]
    pub const fn with_scheduled_start(mut self, scheduled_start: DateTime<Utc>) -> Self {
        self.scheduled_start = Some(scheduled_start);
        self
    }

    /// Sets the scheduled end.
    #[must_use]
    pub const fn with_scheduled_end(mut self, scheduled_end: DateTime<Utc>) -> Self {
        self.scheduled_end = Some(scheduled_end);
        self
    }

    /// Overwrites the completion percentage, closing the task when asked.
    pub const fn apply_progress(&mut self, progress: Progress, complete: bool) {
        self.progress = progress;
        if complete {
            self.state = WbsState::Completed;
        }
    }

    /// Returns the store-assigned project task identifier.
    #[must_use]
    pub const fn project_task_id(&self) -> ProjectTaskId {
        self.project_task_id
    }

    /// Returns the subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the scheduled start, if any.
    #[must_use]
    pub const fn scheduled_start(&self) -> Option<DateTime<Utc>> {
        self.scheduled_start
    }

    /// Returns the scheduled end, if any.
    #[must_use]
    pub const fn scheduled_end(&self) -> Option<DateTime<Utc>> {
        self.scheduled_end
    }

    /// Returns the completion percentage.
    #[must_use]
    pub const fn progress(&self) -> Progress {
        self.progress
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> WbsState {
        self.state
    }

    /// Derives the checklist status this task reads back as.
    ///
    /// Closed tasks read as completed; open tasks read as in progress once
    /// any progress is recorded, and not started otherwise.
    #[must_use]
    pub const fn derived_status(&self) -> ChecklistStatus {
        match self.state {
            WbsState::Completed => ChecklistStatus::Completed,
            WbsState::Open => {
                if self.progress.value() > 0.0 {
                    ChecklistStatus::InProgress
                } else {
                    ChecklistStatus::NotStarted
                }
            }
        }
    }
}

/// Project task described ahead of creation, before the store assigns an
/// identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct WbsTaskDraft {
    subject: String,
    scheduled_start: Option<DateTime<Utc>>,
    scheduled_end: Option<DateTime<Utc>>,
    progress: Progress,
    project: Option<ProjectId>,
}

impl WbsTaskDraft {
    /// Creates a draft with required fields.
    #[must_use]
    pub fn new(subject: impl Into<String>, progress: Progress) -> Self {
        Self {
            subject: subject.into(),
            scheduled_start: None,
            scheduled_end: None,
            progress,
            project: None,
        }
    }

    /// Sets the scheduled start.
    #[must_use]
    pub const fn with_scheduled_start(mut self, scheduled_start: DateTime<Utc>) -> Self {
        self.scheduled_start = Some(scheduled_start);
        self
    }

    /// Sets the scheduled end.
    #[must_use]
    pub const fn with_scheduled_end(mut self, scheduled_end: DateTime<Utc>) -> Self {
        self.scheduled_end = Some(scheduled_end);
        self
    }

    /// Sets the parent project binding.
    #[must_use]
    pub const fn with_project(mut self, project: ProjectId) -> Self {
        self.project = Some(project);
        self
    }

    /// Returns the subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the scheduled start, if any.
    #[must_use]
    pub const fn scheduled_start(&self) -> Option<DateTime<Utc>> {
        self.scheduled_start
    }

    /// Returns the scheduled end, if any.
    #[must_use]
    pub const fn scheduled_end(&self) -> Option<DateTime<Utc>> {
        self.scheduled_end
    }

    /// Returns the initial completion percentage.
    #[must_use]
    pub const fn progress(&self) -> Progress {
        self.progress
    }

    /// Returns the parent project binding, if any.
    #[must_use]
    pub const fn project(&self) -> Option<ProjectId> {
        self.project
    }
}
