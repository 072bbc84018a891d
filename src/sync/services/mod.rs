//! Application services for reconciliation runs.

mod engine;
mod orchestrator;

pub use engine::{OpenTaskIndex, ReconcileEngine, SyncError, SyncResult, WbsTaskIndex};
pub use orchestrator::{SyncOrchestrator, SyncScope};
