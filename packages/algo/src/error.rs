//! Error taxonomy for the scheduling core.

use thiserror::Error;

/// Input rejected before any search runs.
///
/// Exhausting a search budget without a valid schedule is not an error;
/// solvers report it through their `found` flag instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("preference vector is empty")]
    EmptyPreferenceVector,

    #[error("expected {expected} slots, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("required hours must be positive")]
    NonPositiveRequiredHours,

    #[error("only {available} available slots for {required} required hours")]
    InsufficientAvailability { required: usize, available: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ScheduleError {
    /// Errors that callers should answer with an empty schedule rather than a failure
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, ScheduleError::InsufficientAvailability { .. })
    }
}
