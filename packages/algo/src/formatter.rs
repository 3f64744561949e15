//! Schedule formatting
//!
//! Converts binary schedules into day/hour records and clock-time ranges.
//! A schedule whose length does not match `day_names.len() * hours_per_day`
//! is rejected rather than truncated.

use crate::error::ScheduleError;
use crate::types::{SessionRange, StudySession, TimeSlot, START_HOUR};

fn check_shape(schedule: &[u8], hours_per_day: usize, day_names: &[&str]) -> Result<(), ScheduleError> {
    let expected = hours_per_day * day_names.len();
    if hours_per_day == 0 || schedule.len() != expected {
        return Err(ScheduleError::LengthMismatch {
            expected,
            actual: schedule.len(),
        });
    }
    Ok(())
}

/// Selected slots as (day name, hour offset within the day)
pub fn to_sessions(
    schedule: &[u8],
    hours_per_day: usize,
    day_names: &[&str],
) -> Result<Vec<StudySession>, ScheduleError> {
    check_shape(schedule, hours_per_day, day_names)?;

    Ok(schedule
        .iter()
        .enumerate()
        .filter(|(_, &bit)| bit == 1)
        .map(|(i, _)| StudySession {
            day: day_names[i / hours_per_day].to_string(),
            hour: (i % hours_per_day) as u32,
        })
        .collect())
}

/// Selected slots with clock hours (`START_HOUR + offset`)
pub fn to_time_slots(
    schedule: &[u8],
    hours_per_day: usize,
    day_names: &[&str],
) -> Result<Vec<TimeSlot>, ScheduleError> {
    Ok(to_sessions(schedule, hours_per_day, day_names)?
        .into_iter()
        .map(|s| TimeSlot {
            hour: s.clock_hour(),
            day: s.day,
        })
        .collect())
}

/// One-hour ranges such as `09:00`-`10:00`
pub fn to_session_ranges(
    schedule: &[u8],
    hours_per_day: usize,
    day_names: &[&str],
) -> Result<Vec<SessionRange>, ScheduleError> {
    Ok(to_sessions(schedule, hours_per_day, day_names)?
        .into_iter()
        .map(|s| {
            let start = START_HOUR + s.hour;
            SessionRange {
                day: s.day,
                start_time: clock_label(start),
                end_time: clock_label(start + 1),
            }
        })
        .collect())
}

pub fn clock_label(hour: u32) -> String {
    format!("{hour:02}:00")
}
