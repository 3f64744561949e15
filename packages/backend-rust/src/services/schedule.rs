use serde::{Deserialize, Serialize};

use studyplan_algo::formatter::to_time_slots;
use studyplan_algo::sanitize::sanitize_preferences;
use studyplan_algo::{
    BranchAndBoundScheduler, PreferenceVector, ScheduleConfig, ScheduleError, TimeSlot, DAY_NAMES,
};

use super::{flag_enabled, ServiceError, VectorInput};
use crate::config::SchedulerDefaults;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeScheduleInput {
    #[serde(default)]
    pub preference_vector: Option<VectorInput>,
    #[serde(default)]
    pub required_hours: Option<i64>,
    #[serde(default)]
    pub max_daily_hours: Option<i64>,
    /// Milliseconds
    #[serde(default)]
    pub time_limit: Option<u64>,
    #[serde(default)]
    pub prefer_two_hour_blocks: Option<serde_json::Value>,
    #[serde(default)]
    pub penalize_single_hour_blocks: Option<serde_json::Value>,
    #[serde(default)]
    pub penalize_long_blocks: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedSchedule {
    pub time_slots: Vec<TimeSlot>,
    pub value: f64,
    pub selected_hours: usize,
    pub execution_time_ms: i64,
    pub timed_out: bool,
}

impl OptimizedSchedule {
    pub fn empty() -> Self {
        Self {
            time_slots: Vec::new(),
            value: 0.0,
            selected_hours: 0,
            execution_time_ms: 0,
            timed_out: false,
        }
    }
}

impl OptimizeScheduleInput {
    pub fn to_config(&self, defaults: &SchedulerDefaults) -> Result<ScheduleConfig, ServiceError> {
        let required_hours = positive_hours(self.required_hours, defaults.required_hours)
            .ok_or(ScheduleError::NonPositiveRequiredHours)?;
        let max_daily_hours = positive_hours(self.max_daily_hours, defaults.max_daily_hours)
            .ok_or_else(|| {
                ServiceError::InvalidRequest("maxDailyHours must be positive".to_string())
            })?;

        Ok(ScheduleConfig {
            required_hours,
            max_daily_hours,
            time_limit_ms: self
                .time_limit
                .unwrap_or(defaults.time_limit_ms)
                .min(defaults.max_time_limit_ms),
            prefer_two_hour_blocks: flag_enabled(self.prefer_two_hour_blocks.as_ref()),
            penalize_single_hour_blocks: flag_enabled(self.penalize_single_hour_blocks.as_ref()),
            penalize_long_blocks: flag_enabled(self.penalize_long_blocks.as_ref()),
            ..ScheduleConfig::default()
        })
    }
}

fn positive_hours(value: Option<i64>, default: usize) -> Option<usize> {
    match value {
        None => Some(default),
        Some(v) if v > 0 => Some(v as usize),
        Some(_) => None,
    }
}

/// Runs the exact scheduler for one request.
///
/// Unsatisfiable requests and searches that never reach a valid leaf both
/// come back as an empty schedule rather than an error.
pub fn optimize_schedule(
    input: OptimizeScheduleInput,
    defaults: &SchedulerDefaults,
) -> Result<OptimizedSchedule, ServiceError> {
    let config = input.to_config(defaults)?;
    let mut values = input
        .preference_vector
        .ok_or_else(|| ServiceError::InvalidRequest("preferenceVector is required".to_string()))?
        .into_values()?;
    if values.is_empty() {
        return Err(ScheduleError::EmptyPreferenceVector.into());
    }
    sanitize_preferences(&mut values);
    let preferences = PreferenceVector::weekly(values)?;

    let result = match BranchAndBoundScheduler::new(config.clone()).solve(&preferences) {
        Ok(result) => result,
        Err(err) if err.is_unsatisfiable() => {
            tracing::warn!(error = %err, "schedule request cannot be satisfied");
            return Ok(OptimizedSchedule::empty());
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(
        value = result.value,
        selected_hours = result.selected_hours,
        elapsed_ms = result.execution_time_ms,
        timed_out = result.stats.timed_out,
        nodes = result.stats.nodes_expanded,
        "branch and bound finished"
    );

    if !result.found {
        return Ok(OptimizedSchedule {
            execution_time_ms: result.execution_time_ms,
            timed_out: result.stats.timed_out,
            ..OptimizedSchedule::empty()
        });
    }

    Ok(OptimizedSchedule {
        time_slots: to_time_slots(&result.schedule, config.hours_per_day, &DAY_NAMES)?,
        value: result.value,
        selected_hours: result.selected_hours,
        execution_time_ms: result.execution_time_ms,
        timed_out: result.stats.timed_out,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use studyplan_algo::TOTAL_SLOTS;

    fn scenario_a_vector() -> Vec<f64> {
        let mut values = vec![0.0; TOTAL_SLOTS];
        for day in 0..5 {
            for local in 1..=4 {
                values[day * 15 + local] = 5.0;
            }
        }
        values
    }

    fn parse(payload: serde_json::Value) -> OptimizeScheduleInput {
        serde_json::from_value(payload).unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let input = parse(json!({ "preferenceVector": [] }));
        let config = input.to_config(&SchedulerDefaults::default()).unwrap();
        assert_eq!(config.required_hours, 14);
        assert_eq!(config.max_daily_hours, 4);
        assert_eq!(config.time_limit_ms, 10_000);
        assert!(config.prefer_two_hour_blocks);
        assert!(config.penalize_single_hour_blocks);
        assert!(config.penalize_long_blocks);
    }

    #[test]
    fn test_time_limit_clamped_to_configured_maximum() {
        let defaults = SchedulerDefaults::default();
        let input = parse(json!({ "timeLimit": u64::MAX }));
        let config = input.to_config(&defaults).unwrap();
        assert_eq!(config.time_limit_ms, defaults.max_time_limit_ms);

        let input = parse(json!({ "timeLimit": 250 }));
        assert_eq!(input.to_config(&defaults).unwrap().time_limit_ms, 250);
    }

    #[test]
    fn test_huge_time_limit_still_schedules() {
        let input = parse(json!({
            "preferenceVector": scenario_a_vector(),
            "requiredHours": 8,
            "maxDailyHours": 2,
            "timeLimit": u64::MAX
        }));
        let result = optimize_schedule(input, &SchedulerDefaults::default()).unwrap();
        assert!(!result.timed_out);
        assert_eq!(result.time_slots.len(), 8);
        assert_eq!(result.value, 120.0);
    }

    #[test]
    fn test_only_explicit_false_disables_flags() {
        let input = parse(json!({
            "preferTwoHourBlocks": false,
            "penalizeSingleHourBlocks": "no",
            "penalizeLongBlocks": 0
        }));
        let config = input.to_config(&SchedulerDefaults::default()).unwrap();
        assert!(!config.prefer_two_hour_blocks);
        assert!(config.penalize_single_hour_blocks);
        assert!(config.penalize_long_blocks);
    }

    #[test]
    fn test_scenario_a_through_service() {
        let input = parse(json!({
            "preferenceVector": scenario_a_vector(),
            "requiredHours": 8,
            "maxDailyHours": 2,
            "timeLimit": 5000
        }));
        let result = optimize_schedule(input, &SchedulerDefaults::default()).unwrap();

        assert_eq!(result.time_slots.len(), 8);
        assert_eq!(result.selected_hours, 8);
        for slot in &result.time_slots {
            assert!((9..=12).contains(&slot.hour));
            assert!(!["Saturday", "Sunday"].contains(&slot.day.as_str()));
        }
        assert_eq!(result.value, 120.0);
    }

    #[test]
    fn test_string_encoded_vector() {
        let encoded = serde_json::to_string(&scenario_a_vector()).unwrap();
        let input = parse(json!({
            "preferenceVector": encoded,
            "requiredHours": 2,
            "maxDailyHours": 2
        }));
        let result = optimize_schedule(input, &SchedulerDefaults::default()).unwrap();
        assert_eq!(result.time_slots.len(), 2);
    }

    #[test]
    fn test_scenario_b_returns_empty_slots() {
        let input = parse(json!({
            "preferenceVector": vec![0.0; TOTAL_SLOTS],
            "requiredHours": 5
        }));
        let result = optimize_schedule(input, &SchedulerDefaults::default()).unwrap();
        assert!(result.time_slots.is_empty());
        assert_eq!(result.value, 0.0);
    }

    #[test]
    fn test_invalid_inputs_are_errors() {
        let defaults = SchedulerDefaults::default();

        let missing = parse(json!({}));
        assert!(matches!(
            optimize_schedule(missing, &defaults),
            Err(ServiceError::InvalidRequest(_))
        ));

        let empty = parse(json!({ "preferenceVector": [] }));
        assert!(matches!(
            optimize_schedule(empty, &defaults),
            Err(ServiceError::Schedule(ScheduleError::EmptyPreferenceVector))
        ));

        let short = parse(json!({ "preferenceVector": [1.0, 2.0] }));
        assert!(matches!(
            optimize_schedule(short, &defaults),
            Err(ServiceError::Schedule(ScheduleError::LengthMismatch { expected: 105, actual: 2 }))
        ));

        let zero_hours = parse(json!({ "preferenceVector": scenario_a_vector(), "requiredHours": 0 }));
        assert!(matches!(
            optimize_schedule(zero_hours, &defaults),
            Err(ServiceError::Schedule(ScheduleError::NonPositiveRequiredHours))
        ));
    }
}
