//! Per-run outcome tallies.

use serde::Serialize;
use std::fmt;
use std::ops::{Add, AddAssign};

/// What one reconciliation step did to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A business counterpart was created.
    Created,
    /// An existing record was changed on either side.
    Updated,
    /// Both sides were already converged.
    Skipped,
}

/// Counter set for one record type across a run.
///
/// Outcomes add field-wise, so per-record tallies fold into per-type and
/// whole-run totals in any grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    created: u64,
    updated: u64,
    skipped: u64,
    errors: u64,
}

impl SyncOutcome {
    /// Creates an empty tally.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            created: 0,
            updated: 0,
            skipped: 0,
            errors: 0,
        }
    }

    /// Counts one step outcome.
    pub const fn record(&mut self, step: StepOutcome) {
        match step {
            StepOutcome::Created => self.created += 1,
            StepOutcome::Updated => self.updated += 1,
            StepOutcome::Skipped => self.skipped += 1,
        }
    }

    /// Counts one contained per-record failure.
    pub const fn record_error(&mut self) {
        self.errors += 1;
    }

    /// Returns the number of created counterparts.
    #[must_use]
    pub const fn created(&self) -> u64 {
        self.created
    }

    /// Returns the number of updated records.
    #[must_use]
    pub const fn updated(&self) -> u64 {
        self.updated
    }

    /// Returns the number of records already converged.
    #[must_use]
    pub const fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Returns the number of contained per-record failures.
    #[must_use]
    pub const fn errors(&self) -> u64 {
        self.errors
    }

    /// Reports whether any contained failure was counted.
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

impl Add for SyncOutcome {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            created: self.created + rhs.created,
            updated: self.updated + rhs.updated,
            skipped: self.skipped + rhs.skipped,
            errors: self.errors + rhs.errors,
        }
    }
}

impl AddAssign for SyncOutcome {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created={} updated={} skipped={} errors={}",
            self.created, self.updated, self.skipped, self.errors
        )
    }
}

/// Combined outcome of one reconciliation run, one tally per record type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    checklist: SyncOutcome,
    wbs: SyncOutcome,
}

impl SyncReport {
    /// Creates a report from per-type tallies.
    #[must_use]
    pub const fn new(checklist: SyncOutcome, wbs: SyncOutcome) -> Self {
        Self { checklist, wbs }
    }

    /// Returns the checklist tally.
    #[must_use]
    pub const fn checklist(&self) -> SyncOutcome {
        self.checklist
    }

    /// Returns the WBS tally.
    #[must_use]
    pub const fn wbs(&self) -> SyncOutcome {
        self.wbs
    }

    /// Returns the whole-run total.
    #[must_use]
    pub fn total(&self) -> SyncOutcome {
        self.checklist + self.wbs
    }

    /// Reports whether any record type counted a contained failure.
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.checklist.has_errors() || self.wbs.has_errors()
    }
}
