use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::response::{ok, AppError};
use crate::services::review::{get_review, schedule_review, ReviewContext, ReviewInput};
use crate::state::AppState;

pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<ReviewInput>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(input) = payload.map_err(|err| AppError::bad_request(err.body_text()))?;
    let ctx = ReviewContext {
        reviews: state.reviews(),
        lectures: state.lectures(),
        clock: state.clock(),
        params: state.half_life_params(),
    };
    let record = schedule_review(&ctx, input)?;
    Ok(ok(record).into_response())
}

pub async fn show(
    State(state): State<AppState>,
    Path((user_id, lecture_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let record = get_review(state.reviews(), &user_id, &lecture_id)?;
    Ok(ok(record).into_response())
}
