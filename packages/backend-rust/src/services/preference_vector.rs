use serde::{Deserialize, Serialize};

use studyplan_algo::{generate_preference_vector, TimeOfDay};

use super::{ServiceError, VectorInput};
use crate::store::PreferenceStore;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceVectorInput {
    pub user_id: String,
    /// 0/1 grid; every slot available when omitted
    #[serde(default)]
    pub availability: Option<VectorInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPreferences {
    pub preference_vector: Vec<f64>,
    pub time_of_day: Option<TimeOfDay>,
}

pub fn generate_for_user(
    store: &dyn PreferenceStore,
    input: PreferenceVectorInput,
) -> Result<GeneratedPreferences, ServiceError> {
    if input.user_id.trim().is_empty() {
        return Err(ServiceError::InvalidRequest("userId is required".to_string()));
    }

    let availability = input.availability.map(VectorInput::into_values).transpose()?;

    let stored = store.time_of_day(&input.user_id)?;
    let time_of_day = match stored.as_deref() {
        Some(raw) => match raw.parse::<TimeOfDay>() {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!(user_id = %input.user_id, error = %err, "unknown time-of-day preference");
                None
            }
        },
        None => None,
    };

    let vector = generate_preference_vector(availability.as_deref(), time_of_day)?;
    Ok(GeneratedPreferences {
        preference_vector: vector.into_inner(),
        time_of_day,
    })
}
