//! Status vocabularies for both stores and the lossy mappings between them.
//!
//! The collaboration store speaks a six-value checklist vocabulary; the
//! business store speaks numeric state and sub-status codes. Pushes refine
//! (six values fan out over state/sub-status pairs); pulls coarsen (three
//! business states fold back onto three checklist values). Unknown inbound
//! vocabulary never raises: it degrades to the most conservative value so a
//! single malformed record cannot poison a batch.

use std::fmt;

/// Checklist status vocabulary of the collaboration store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecklistStatus {
    /// Work has not begun.
    NotStarted,
    /// Work is underway.
    InProgress,
    /// Work is finished.
    Completed,
    /// Work was abandoned.
    Cancelled,
    /// Work is blocked on another party.
    WaitingOnOther,
    /// Work is postponed.
    Deferred,
}

impl ChecklistStatus {
    /// Returns the canonical collaboration-store display string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::WaitingOnOther => "Waiting on someone else",
            Self::Deferred => "Deferred",
        }
    }

    /// Ingests raw status text from the collaboration store.
    ///
    /// Unknown or missing vocabulary degrades to [`Self::NotStarted`] rather
    /// than failing the record.
    #[must_use]
    pub fn from_raw(value: &str) -> Self {
        match value {
            "In Progress" => Self::InProgress,
            "Completed" => Self::Completed,
            "Cancelled" => Self::Cancelled,
            "Waiting on someone else" => Self::WaitingOnOther,
            "Deferred" => Self::Deferred,
            _ => Self::NotStarted,
        }
    }

    /// Maps this status onto the business-store state and sub-status pair.
    ///
    /// Both waiting-style values share the business `Waiting` sub-status;
    /// the distinction does not survive a push/pull round trip.
    #[must_use]
    pub const fn business_fields(self) -> (BusinessTaskState, BusinessSubStatus) {
        match self {
            Self::NotStarted => (BusinessTaskState::Open, BusinessSubStatus::NotStarted),
            Self::InProgress => (BusinessTaskState::Open, BusinessSubStatus::InProgress),
            Self::Completed => (BusinessTaskState::Completed, BusinessSubStatus::Completed),
            Self::Cancelled => (BusinessTaskState::Cancelled, BusinessSubStatus::Cancelled),
            Self::WaitingOnOther | Self::Deferred => {
                (BusinessTaskState::Open, BusinessSubStatus::Waiting)
            }
        }
    }
}

impl fmt::Display for ChecklistStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a business activity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusinessTaskState {
    /// The activity is live.
    Open,
    /// The activity is closed as done.
    Completed,
    /// The activity is closed as abandoned.
    Cancelled,
}

impl BusinessTaskState {
    /// Returns the business-store wire code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Open => 0,
            Self::Completed => 1,
            Self::Cancelled => 2,
        }
    }

    /// Ingests a business-store wire code.
    ///
    /// Unknown codes degrade to [`Self::Open`] rather than failing the
    /// record.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Completed,
            2 => Self::Cancelled,
            _ => Self::Open,
        }
    }

    /// Coarsens this state onto the checklist vocabulary.
    ///
    /// Open activities always read back as in progress; the sub-status
    /// refinements pushed outward do not return.
    #[must_use]
    pub const fn checklist_status(self) -> ChecklistStatus {
        match self {
            Self::Open => ChecklistStatus::InProgress,
            Self::Completed => ChecklistStatus::Completed,
            Self::Cancelled => ChecklistStatus::Cancelled,
        }
    }
}

impl fmt::Display for BusinessTaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Open => "open",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{label}")
    }
}

/// Sub-status refinement of a business activity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusinessSubStatus {
    /// Open, not yet begun.
    NotStarted,
    /// Open, underway.
    InProgress,
    /// Open, blocked on another party.
    Waiting,
    /// Closed as done.
    Completed,
    /// Closed as abandoned.
    Cancelled,
}

impl BusinessSubStatus {
    /// Returns the business-store wire code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::NotStarted => 2,
            Self::InProgress => 3,
            Self::Waiting => 4,
            Self::Completed => 5,
            Self::Cancelled => 6,
        }
    }

    /// Ingests a business-store wire code.
    ///
    /// Unknown codes degrade to [`Self::NotStarted`] rather than failing
    /// the record.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            3 => Self::InProgress,
            4 => Self::Waiting,
            5 => Self::Completed,
            6 => Self::Cancelled,
            _ => Self::NotStarted,
        }
    }
}

/// Lifecycle state of a business project task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WbsState {
    /// The project task is live.
    Open,
    /// The project task is closed.
    Completed,
}

impl WbsState {
    /// Returns the business-store wire code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Open => 0,
            Self::Completed => 1,
        }
    }

    /// Ingests a business-store wire code.
    ///
    /// Any code other than the completed marker reads as open.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Completed,
            _ => Self::Open,
        }
    }
}
