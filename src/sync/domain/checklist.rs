//! Checklist item snapshot from the collaboration store.

use super::{ActivityId, ChecklistStatus, ListItemId};
use chrono::{DateTime, Utc};

/// Snapshot of one checklist row as fetched from the collaboration store.
///
/// The title doubles as the natural key used to locate an unlinked business
/// counterpart; it is treated as opaque text and never validated here. The
/// business cross-reference is absent until a push links the record.
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistItem {
    id: ListItemId,
    title: String,
    status: ChecklistStatus,
    due_date: Option<DateTime<Utc>>,
    assignee: Option<String>,
    priority: Option<String>,
    notes: Option<String>,
    linked_activity: Option<ActivityId>,
}

impl ChecklistItem {
    /// Creates a checklist item with required fields.
    #[must_use]
    pub fn new(id: ListItemId, title: impl Into<String>, status: ChecklistStatus) -> Self {
        Self {
            id,
            title: title.into(),
            status,
            due_date: None,
            assignee: None,
            priority: None,
            notes: None,
            linked_activity: None,
        }
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the assignee display text.
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Sets the priority label.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets the free-text notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets the business activity cross-reference.
    #[must_use]
    pub const fn with_linked_activity(mut self, activity: ActivityId) -> Self {
        self.linked_activity = Some(activity);
        self
    }

    /// Overwrites the checklist status.
    pub const fn apply_status(&mut self, status: ChecklistStatus) {
        self.status = status;
    }

    /// Records the business activity cross-reference.
    pub const fn record_linked_activity(&mut self, activity: ActivityId) {
        self.linked_activity = Some(activity);
    }

    /// Returns the collaboration store identifier.
    #[must_use]
    pub const fn id(&self) -> &ListItemId {
        &self.id
    }

    /// Returns the title, which is also the natural key.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the checklist status.
    #[must_use]
    pub const fn status(&self) -> ChecklistStatus {
        self.status
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the assignee display text, if any.
    #[must_use]
    pub fn assignee(&self) -> Option<&str> {
        self.assignee.as_deref()
    }

    /// Returns the priority label, if any.
    #[must_use]
    pub fn priority(&self) -> Option<&str> {
        self.priority.as_deref()
    }

    /// Returns the free-text notes, if any.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Returns the linked business activity, if any.
    #[must_use]
    pub const fn linked_activity(&self) -> Option<ActivityId> {
        self.linked_activity
    }

    /// Reports whether a business cross-reference is present.
    #[must_use]
    pub const fn is_linked(&self) -> bool {
        self.linked_activity.is_some()
    }
}
