//! Domain model for task reconciliation.
//!
//! The reconciliation domain models the two record surfaces (checklist items
//! and WBS items on the collaboration side, activities and project tasks on
//! the business side), the status vocabularies and the lossy mappings
//! between them, clamped progress percentages, and the per-run outcome
//! tallies. Infrastructure concerns stay outside the domain boundary.

mod business;
mod checklist;
mod ids;
mod mode;
mod outcome;
mod progress;
mod status;
mod wbs;

pub use business::{BusinessTask, BusinessTaskDraft, BusinessTaskRef};
pub use checklist::ChecklistItem;
pub use ids::{ActivityId, ListItemId, ProjectId, ProjectTaskId};
pub use mode::{ParseRunModeError, RunMode};
pub use outcome::{StepOutcome, SyncOutcome, SyncReport};
pub use progress::{PROGRESS_TOLERANCE, Progress};
pub use status::{BusinessSubStatus, BusinessTaskState, ChecklistStatus, WbsState};
pub use wbs::{BusinessWbsTask, WbsItem, WbsTaskDraft};
