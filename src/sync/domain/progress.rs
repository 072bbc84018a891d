//! Clamped completion percentage for WBS records.

use std::fmt;

/// Drift tolerance, in percentage points, below which two progress values
/// are considered converged.
///
/// Differences of exactly this magnitude do not count as drift; only
/// strictly larger gaps trigger a write.
pub const PROGRESS_TOLERANCE: f64 = 0.5;

/// Completion percentage clamped to the inclusive range 0 to 100.
///
/// Both stores carry percent-complete as a free numeric column; clamping at
/// the domain boundary keeps out-of-range store values from propagating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress(f64);

impl Progress {
    const MIN: f64 = 0.0;
    const MAX: f64 = 100.0;

    /// Creates a progress value, clamping into the 0 to 100 range.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        if value < Self::MIN {
            return Self(Self::MIN);
        }
        if value > Self::MAX {
            return Self(Self::MAX);
        }
        Self(value)
    }

    /// Returns the percentage as a bare number.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Reports whether this value and `other` differ by strictly more than
    /// [`PROGRESS_TOLERANCE`] percentage points.
    #[must_use]
    pub const fn drifted_from(self, other: Self) -> bool {
        let delta = if self.0 >= other.0 {
            self.0 - other.0
        } else {
            other.0 - self.0
        };
        delta > PROGRESS_TOLERANCE
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
