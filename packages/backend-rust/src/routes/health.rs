use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/live", get(live))
        .route("/info", get(info))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthInfoResponse {
    service: &'static str,
    version: &'static str,
    start_time: String,
    uptime: u64,
    scheduler: SchedulerInfo,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SchedulerInfo {
    time_limit_ms: u64,
    required_hours: usize,
    max_daily_hours: usize,
    dfo_generations: usize,
    dfo_population: usize,
}

async fn root(State(state): State<AppState>) -> Response {
    Json(HealthResponse {
        status: "ok",
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
    })
    .into_response()
}

async fn live(State(state): State<AppState>) -> Response {
    Json(HealthResponse {
        status: "healthy",
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
    })
    .into_response()
}

async fn info(State(state): State<AppState>) -> Response {
    let defaults = &state.config().scheduler;
    Json(HealthInfoResponse {
        service: "studyplan-backend",
        version: env!("CARGO_PKG_VERSION"),
        start_time: system_time_iso(state.started_at_system()),
        uptime: state.uptime_seconds(),
        scheduler: SchedulerInfo {
            time_limit_ms: defaults.time_limit_ms,
            required_hours: defaults.required_hours,
            max_daily_hours: defaults.max_daily_hours,
            dfo_generations: defaults.dfo_generations,
            dfo_population: defaults.dfo_population,
        },
    })
    .into_response()
}

fn system_time_iso(time: std::time::SystemTime) -> String {
    let datetime: chrono::DateTime<chrono::Utc> = time.into();
    datetime.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
