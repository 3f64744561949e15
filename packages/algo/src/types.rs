//! Common Types and Constants
//!
//! Shared data structures used across all scheduling modules.

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

// ==================== Constants ====================

/// Days in the planning week (Monday..Sunday)
pub const NUM_DAYS: usize = 7;

/// Schedulable hours per day (08:00 through 22:00)
pub const HOURS_PER_DAY: usize = 15;

/// Clock hour of the first slot in a day
pub const START_HOUR: u32 = 8;

/// Slots in the canonical weekly grid
pub const TOTAL_SLOTS: usize = NUM_DAYS * HOURS_PER_DAY;

/// Weekday names in grid order
pub const DAY_NAMES: [&str; NUM_DAYS] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Binary slot selection (1 = study, 0 = free)
pub type CandidateSchedule = Vec<u8>;

// ==================== Preference Vector ====================

/// Per-slot desirability scores; 0 marks a slot as unavailable.
///
/// Index layout is `day * hours_per_day + (hour - START_HOUR)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceVector(Vec<f64>);

impl PreferenceVector {
    /// Wraps `values`, requiring exactly `expected_len` entries.
    pub fn new(values: Vec<f64>, expected_len: usize) -> Result<Self, ScheduleError> {
        if values.is_empty() {
            return Err(ScheduleError::EmptyPreferenceVector);
        }
        if values.len() != expected_len {
            return Err(ScheduleError::LengthMismatch {
                expected: expected_len,
                actual: values.len(),
            });
        }
        Ok(Self(values))
    }

    /// Standard 7x15 grid
    pub fn weekly(values: Vec<f64>) -> Result<Self, ScheduleError> {
        Self::new(values, TOTAL_SLOTS)
    }

    /// Every slot equally preferred (used by the standalone optimizer variant)
    pub fn uniform(len: usize) -> Self {
        Self(vec![1.0; len])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> f64 {
        self.0[index]
    }

    /// Number of slots with a strictly positive score
    pub fn available_count(&self) -> usize {
        self.0.iter().filter(|&&v| v > 0.0).count()
    }

    /// Indices of slots with a strictly positive score, ascending
    pub fn available_indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, &v)| v > 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn day_has_availability(&self, day: usize, hours_per_day: usize) -> bool {
        let start = day * hours_per_day;
        let end = (start + hours_per_day).min(self.0.len());
        start < end && self.0[start..end].iter().any(|&v| v > 0.0)
    }

    /// Builds a shorter vector containing only the rows of `days`, in order.
    pub fn restrict_to_days(&self, days: &[usize], hours_per_day: usize) -> Self {
        let mut values = Vec::with_capacity(days.len() * hours_per_day);
        for &day in days {
            let start = day * hours_per_day;
            values.extend_from_slice(&self.0[start..start + hours_per_day]);
        }
        Self(values)
    }
}

impl AsRef<[f64]> for PreferenceVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

// ==================== Schedule Config ====================

/// Constraint set for the branch-and-bound scheduler
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleConfig {
    pub required_hours: usize,
    pub max_daily_hours: usize,
    /// Wall-clock budget in milliseconds
    pub time_limit_ms: u64,
    pub prefer_two_hour_blocks: bool,
    pub penalize_single_hour_blocks: bool,
    pub penalize_long_blocks: bool,
    pub num_days: usize,
    pub hours_per_day: usize,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            required_hours: 14,
            max_daily_hours: 4,
            time_limit_ms: 10_000,
            prefer_two_hour_blocks: true,
            penalize_single_hour_blocks: true,
            penalize_long_blocks: true,
            num_days: NUM_DAYS,
            hours_per_day: HOURS_PER_DAY,
        }
    }
}

impl ScheduleConfig {
    pub fn total_slots(&self) -> usize {
        self.num_days * self.hours_per_day
    }
}

// ==================== Candidate Schedule Helpers ====================

pub fn selected_count(schedule: &[u8]) -> usize {
    schedule.iter().filter(|&&bit| bit == 1).count()
}

/// Selected hours per day
pub fn daily_counts(schedule: &[u8], hours_per_day: usize) -> Vec<usize> {
    schedule
        .chunks(hours_per_day)
        .map(selected_count)
        .collect()
}

// ==================== Output Records ====================

/// One selected slot, `hour` is the offset within the day
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    pub day: String,
    pub hour: u32,
}

impl StudySession {
    pub fn clock_hour(&self) -> u32 {
        START_HOUR + self.hour
    }
}

/// Selected slot with its clock hour (8..=22)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub day: String,
    pub hour: u32,
}

/// Human-facing range, e.g. `09:00`-`10:00`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRange {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}
