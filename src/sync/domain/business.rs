//! Business activity records mirroring simple checklist items.

use super::{ActivityId, BusinessSubStatus, BusinessTaskState};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Snapshot of one business activity as fetched from the business store.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessTask {
    activity_id: ActivityId,
    subject: String,
    description: Option<String>,
    due_date: Option<DateTime<Utc>>,
    completed_on: Option<DateTime<Utc>>,
    state: BusinessTaskState,
    sub_status: BusinessSubStatus,
    regarding: Option<Uuid>,
}

impl BusinessTask {
    /// Creates an activity snapshot with required fields.
    #[must_use]
    pub fn new(
        activity_id: ActivityId,
        subject: impl Into<String>,
        state: BusinessTaskState,
        sub_status: BusinessSubStatus,
    ) -> Self {
        Self {
            activity_id,
            subject: subject.into(),
            description: None,
            due_date: None,
            completed_on: None,
            state,
            sub_status,
            regarding: None,
        }
    }

    /// Materializes the activity a draft describes once the store has
    /// assigned its identifier.
    #[must_use]
    pub fn from_draft(activity_id: ActivityId, draft: &BusinessTaskDraft) -> Self {
        let mut task = Self::new(
            activity_id,
            draft.subject(),
            draft.state(),
            draft.sub_status(),
        );
        if let Some(description) = draft.description() {
            task = task.with_description(description);
        }
        if let Some(due_date) = draft.due_date() {
            task = task.with_due_date(due_date);
        }
        task
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the completion timestamp.
    #[must_use]
    pub const fn with_completed_on(mut self, completed_on: DateTime<Utc>) -> Self {
        self.completed_on = Some(completed_on);
        self
    }

    /// Sets the regarding-record reference.
    #[must_use]
    pub const fn with_regarding(mut self, regarding: Uuid) -> Self {
        self.regarding = Some(regarding);
        self
    }

    /// Closes the activity as done at the given timestamp.
    pub const fn complete(&mut self, completed_on: DateTime<Utc>) {
        self.state = BusinessTaskState::Completed;
        self.sub_status = BusinessSubStatus::Completed;
        self.completed_on = Some(completed_on);
    }

    /// Returns the store-assigned activity identifier.
    #[must_use]
    pub const fn activity_id(&self) -> ActivityId {
        self.activity_id
    }

    /// Returns the subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the completion timestamp, if any.
    #[must_use]
    pub const fn completed_on(&self) -> Option<DateTime<Utc>> {
        self.completed_on
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> BusinessTaskState {
        self.state
    }

    /// Returns the sub-status refinement.
    #[must_use]
    pub const fn sub_status(&self) -> BusinessSubStatus {
        self.sub_status
    }

    /// Returns the regarding-record reference, if any.
    #[must_use]
    pub const fn regarding(&self) -> Option<Uuid> {
        self.regarding
    }
}

/// Activity record described ahead of creation, before the store assigns an
/// identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessTaskDraft {
    subject: String,
    description: Option<String>,
    due_date: Option<DateTime<Utc>>,
    state: BusinessTaskState,
    sub_status: BusinessSubStatus,
}

impl BusinessTaskDraft {
    /// Creates a draft with required fields.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        state: BusinessTaskState,
        sub_status: BusinessSubStatus,
    ) -> Self {
        Self {
            subject: subject.into(),
            description: None,
            due_date: None,
            state,
            sub_status,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Returns the subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> BusinessTaskState {
        self.state
    }

    /// Returns the sub-status refinement.
    #[must_use]
    pub const fn sub_status(&self) -> BusinessSubStatus {
        self.sub_status
    }
}

/// Identifier and state of an activity located by natural-key lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessTaskRef {
    activity_id: ActivityId,
    state: BusinessTaskState,
}

impl BusinessTaskRef {
    /// Creates a lookup result.
    #[must_use]
    pub const fn new(activity_id: ActivityId, state: BusinessTaskState) -> Self {
        Self { activity_id, state }
    }

    /// Returns the located activity identifier.
    #[must_use]
    pub const fn activity_id(&self) -> ActivityId {
        self.activity_id
    }

    /// Returns the located activity's lifecycle state.
    #[must_use]
    pub const fn state(&self) -> BusinessTaskState {
        self.state
    }
}
