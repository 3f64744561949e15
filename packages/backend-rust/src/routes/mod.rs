mod health;
mod preferences;
mod reviews;
mod schedule;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::response::json_error;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/schedule/optimize",
            post(schedule::optimize).fallback(fallback_handler),
        )
        .route(
            "/api/schedule/sessions",
            post(schedule::sessions).fallback(fallback_handler),
        )
        .route(
            "/api/preferences/vector",
            post(preferences::generate_vector).fallback(fallback_handler),
        )
        .route(
            "/api/reviews",
            post(reviews::submit).fallback(fallback_handler),
        )
        .route(
            "/api/reviews/:user_id/:lecture_id",
            get(reviews::show).fallback(fallback_handler),
        )
        .nest("/health", health::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "接口不存在").into_response()
}
