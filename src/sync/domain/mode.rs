//! Direction selection for a reconciliation run.

use std::fmt;
use thiserror::Error;

/// Raised when run mode text matches no known mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown run mode: {0}")]
pub struct ParseRunModeError(pub String);

/// Which reconciliation directions a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunMode {
    /// Collaboration-side state flows outward only.
    Push,
    /// Business-side state flows back only.
    Pull,
    /// Push then pull, per record, in one pass.
    Full,
}

impl RunMode {
    /// Returns the canonical mode name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Pull => "pull",
            Self::Full => "full",
        }
    }

    /// Reports whether this mode performs push steps.
    #[must_use]
    pub const fn pushes(self) -> bool {
        matches!(self, Self::Push | Self::Full)
    }

    /// Reports whether this mode performs pull steps.
    #[must_use]
    pub const fn pulls(self) -> bool {
        matches!(self, Self::Pull | Self::Full)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for RunMode {
    type Error = ParseRunModeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "push" => Ok(Self::Push),
            "pull" => Ok(Self::Pull),
            "full" => Ok(Self::Full),
            _ => Err(ParseRunModeError(value.to_owned())),
        }
    }
}
