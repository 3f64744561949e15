//! Preference vector generation
//!
//! Turns a 0/1 availability grid plus a stated time-of-day preference into
//! tiered scores. The day is split into four buckets; an available slot
//! scores by its bucket's distance from the preferred bucket:
//!
//! | distance | score |
//! |----------|-------|
//! | 0        | 9     |
//! | 1        | 6     |
//! | 2        | 4     |
//! | 3        | 2     |
//!
//! Unavailable slots stay 0.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::types::{PreferenceVector, HOURS_PER_DAY, START_HOUR, TOTAL_SLOTS};

const TIER_SCORES: [f64; 4] = [9.0, 6.0, 4.0, 2.0];

/// Score used for every available slot when no preference is stored
pub const NEUTRAL_SCORE: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeOfDay {
    /// 08:00-11:59
    Morning,
    /// 12:00-15:59
    Afternoon,
    /// 16:00-19:59
    Evening,
    /// 20:00-22:59
    Night,
}

impl FromStr for TimeOfDay {
    type Err = ScheduleError;

    /// Case-insensitive, e.g. `"MORNING"` or `" evening "`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morning" => Ok(TimeOfDay::Morning),
            "afternoon" => Ok(TimeOfDay::Afternoon),
            "evening" => Ok(TimeOfDay::Evening),
            "night" => Ok(TimeOfDay::Night),
            other => Err(ScheduleError::InvalidConfig(format!(
                "unknown time of day: {other}"
            ))),
        }
    }
}

impl TimeOfDay {

    pub fn to_index(&self) -> usize {
        match self {
            TimeOfDay::Morning => 0,
            TimeOfDay::Afternoon => 1,
            TimeOfDay::Evening => 2,
            TimeOfDay::Night => 3,
        }
    }

    /// Bucket containing a clock hour in `8..=22`
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            h if h < 12 => TimeOfDay::Morning,
            h if h < 16 => TimeOfDay::Afternoon,
            h if h < 20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn score_for_hour(&self, hour: u32) -> f64 {
        let distance = self.to_index().abs_diff(TimeOfDay::for_hour(hour).to_index());
        TIER_SCORES[distance]
    }
}

/// Builds the weekly preference vector.
///
/// `availability` defaults to all-available when absent. Non-zero entries
/// count as available.
pub fn generate_preference_vector(
    availability: Option<&[f64]>,
    preference: Option<TimeOfDay>,
) -> Result<PreferenceVector, ScheduleError> {
    let mut values = match availability {
        Some(grid) => grid.to_vec(),
        None => vec![1.0; TOTAL_SLOTS],
    };
    if values.len() != TOTAL_SLOTS {
        return Err(ScheduleError::LengthMismatch {
            expected: TOTAL_SLOTS,
            actual: values.len(),
        });
    }

    for (i, value) in values.iter_mut().enumerate() {
        if *value == 0.0 {
            continue;
        }
        let hour = START_HOUR + (i % HOURS_PER_DAY) as u32;
        *value = match preference {
            Some(pref) => pref.score_for_hour(hour),
            None => NEUTRAL_SCORE,
        };
    }

    PreferenceVector::weekly(values)
}
