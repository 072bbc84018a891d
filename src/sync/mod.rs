//! Task reconciliation between the collaboration store and the business
//! store.
//!
//! This module implements the two reconciliation surfaces: simple checklist
//! items mirrored as business activities, and work-breakdown (WBS) items
//! mirrored as business project tasks. Each run pushes collaboration-side
//! state outward, then pulls business-side state back, containing per-record
//! failures so one bad row never aborts the batch. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
