#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use serde_json::Value;

use studyplan_algo::FixedClock;
use studyplan_backend::config::{Config, SchedulerDefaults};
use studyplan_backend::state::{AppState, Stores};
use studyplan_backend::store::{MemoryLectureCatalog, MemoryPreferenceStore, MemoryReviewStore};

pub const NOW_MS: i64 = 1_700_000_000_000;

pub struct TestApp {
    pub router: Router,
    pub reviews: Arc<MemoryReviewStore>,
    pub preferences: Arc<MemoryPreferenceStore>,
    pub lectures: Arc<MemoryLectureCatalog>,
}

pub fn test_config() -> Config {
    Config {
        scheduler: SchedulerDefaults {
            dfo_generations: 15,
            dfo_population: 10,
            optimizer_seed: Some(42),
            ..SchedulerDefaults::default()
        },
        ..Config::default()
    }
}

pub fn create_test_app() -> TestApp {
    let reviews = Arc::new(MemoryReviewStore::new());
    let preferences = Arc::new(MemoryPreferenceStore::new());
    let lectures = Arc::new(MemoryLectureCatalog::new());

    let stores = Stores {
        reviews: reviews.clone(),
        preferences: preferences.clone(),
        lectures: lectures.clone(),
    };
    let state = AppState::new(test_config(), stores).with_clock(Arc::new(FixedClock(NOW_MS)));

    TestApp {
        router: studyplan_backend::build_router(state),
        reviews,
        preferences,
        lectures,
    }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
