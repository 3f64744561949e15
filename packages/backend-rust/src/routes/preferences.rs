use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::response::{ok, AppError};
use crate::services::preference_vector::{generate_for_user, PreferenceVectorInput};
use crate::state::AppState;

pub async fn generate_vector(
    State(state): State<AppState>,
    payload: Result<Json<PreferenceVectorInput>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(input) = payload.map_err(|err| AppError::bad_request(err.body_text()))?;
    let generated = generate_for_user(state.preferences(), input)?;
    Ok(ok(generated).into_response())
}
