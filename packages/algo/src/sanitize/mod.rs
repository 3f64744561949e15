//! Data Sanitization
//!
//! Input cleaning and validation performed before any search runs.
//!
//! Functions:
//! - Preference value sanitization
//! - Scheduling problem validation

use crate::error::ScheduleError;
use crate::types::PreferenceVector;

/// 检查数组是否包含无效值 (NaN 或 Inf)
pub fn has_invalid_values(arr: &[f64]) -> bool {
    arr.iter().any(|&x| x.is_nan() || x.is_infinite())
}

/// 清理偏好向量: 非有限值视为不可用
pub fn sanitize_preferences(values: &mut [f64]) {
    for val in values.iter_mut() {
        if !val.is_finite() {
            *val = 0.0;
        }
    }
}

/// 校验调度问题的基本约束
///
/// Checks run in the order a caller would report them: shape first, then
/// hour counts, then availability.
pub fn validate_problem(
    preferences: &PreferenceVector,
    expected_len: usize,
    required_hours: usize,
    max_daily_hours: usize,
) -> Result<(), ScheduleError> {
    if preferences.is_empty() {
        return Err(ScheduleError::EmptyPreferenceVector);
    }
    if preferences.len() != expected_len {
        return Err(ScheduleError::LengthMismatch {
            expected: expected_len,
            actual: preferences.len(),
        });
    }
    if required_hours == 0 {
        return Err(ScheduleError::NonPositiveRequiredHours);
    }
    if max_daily_hours == 0 {
        return Err(ScheduleError::InvalidConfig(
            "max daily hours must be positive".to_string(),
        ));
    }

    let available = preferences.available_count();
    if available < required_hours {
        return Err(ScheduleError::InsufficientAvailability {
            required: required_hours,
            available,
        });
    }

    Ok(())
}
