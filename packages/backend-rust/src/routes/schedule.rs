use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::response::{ok, AppError};
use crate::services::schedule::{optimize_schedule, OptimizeScheduleInput};
use crate::services::study_sessions::{generate_study_sessions, StudySessionsInput};
use crate::services::ServiceError;
use crate::state::AppState;

pub async fn optimize(
    State(state): State<AppState>,
    payload: Result<Json<OptimizeScheduleInput>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(input) = payload.map_err(|err| AppError::bad_request(err.body_text()))?;
    let defaults = state.config().scheduler.clone();

    let result = tokio::task::spawn_blocking(move || optimize_schedule(input, &defaults))
        .await
        .map_err(|err| ServiceError::Worker(err.to_string()))??;

    Ok(ok(result).into_response())
}

pub async fn sessions(
    State(state): State<AppState>,
    payload: Result<Json<StudySessionsInput>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(input) = payload.map_err(|err| AppError::bad_request(err.body_text()))?;
    let defaults = state.config().scheduler.clone();

    let plan = tokio::task::spawn_blocking(move || generate_study_sessions(input, &defaults))
        .await
        .map_err(|err| ServiceError::Worker(err.to_string()))??;

    Ok(ok(plan).into_response())
}
