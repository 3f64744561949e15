//! Request-level entrypoints wrapping the scheduling core.
//!
//! Each service parses a JSON payload, applies defaults, runs the pure
//! algorithm and, for reviews, talks to the store.

pub mod preference_vector;
pub mod review;
pub mod schedule;
pub mod study_sessions;

use serde::Deserialize;

use studyplan_algo::ScheduleError;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
    #[error("solver task failed: {0}")]
    Worker(String),
}

/// A preference vector as clients send it: a JSON array, or that array
/// encoded into a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VectorInput {
    Values(Vec<f64>),
    Encoded(String),
}

impl VectorInput {
    pub fn into_values(self) -> Result<Vec<f64>, ServiceError> {
        match self {
            VectorInput::Values(values) => Ok(values),
            VectorInput::Encoded(text) => serde_json::from_str::<Vec<f64>>(&text).map_err(|err| {
                ServiceError::InvalidRequest(format!("preferenceVector is not a numeric array: {err}"))
            }),
        }
    }
}

/// `true` unless the client sent an explicit `false`.
pub(crate) fn flag_enabled(value: Option<&serde_json::Value>) -> bool {
    !matches!(value, Some(serde_json::Value::Bool(false)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_vector_input_accepts_array_and_string() {
        let array: VectorInput = serde_json::from_value(json!([1.0, 0, 2.5])).unwrap();
        assert_eq!(array.into_values().unwrap(), vec![1.0, 0.0, 2.5]);

        let encoded: VectorInput = serde_json::from_value(json!("[1, 0, 2.5]")).unwrap();
        assert_eq!(encoded.into_values().unwrap(), vec![1.0, 0.0, 2.5]);
    }

    #[test]
    fn test_vector_input_rejects_garbage_string() {
        let encoded: VectorInput = serde_json::from_value(json!("not a vector")).unwrap();
        assert!(matches!(encoded.into_values(), Err(ServiceError::InvalidRequest(_))));
    }

    #[test]
    fn test_flags_default_to_enabled() {
        assert!(flag_enabled(None));
        assert!(flag_enabled(Some(&json!(true))));
        assert!(flag_enabled(Some(&json!("false"))));
        assert!(flag_enabled(Some(&json!(null))));
        assert!(!flag_enabled(Some(&json!(false))));
    }
}
