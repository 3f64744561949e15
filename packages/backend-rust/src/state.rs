use std::sync::Arc;
use std::time::{Instant, SystemTime};

use studyplan_algo::{Clock, HalfLifeParams, SystemClock};

use crate::config::Config;
use crate::store::{
    LectureCatalog, MemoryLectureCatalog, MemoryPreferenceStore, MemoryReviewStore,
    PreferenceStore, ReviewStore,
};

/// Persistence collaborators shared by every request
#[derive(Clone)]
pub struct Stores {
    pub reviews: Arc<dyn ReviewStore>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub lectures: Arc<dyn LectureCatalog>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            reviews: Arc::new(MemoryReviewStore::new()),
            preferences: Arc::new(MemoryPreferenceStore::new()),
            lectures: Arc::new(MemoryLectureCatalog::new()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    config: Arc<Config>,
    stores: Stores,
    clock: Arc<dyn Clock + Send + Sync>,
    half_life_params: Arc<HalfLifeParams>,
}

impl AppState {
    pub fn new(config: Config, stores: Stores) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            config: Arc::new(config),
            stores,
            clock: Arc::new(SystemClock),
            half_life_params: Arc::new(HalfLifeParams::default()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn reviews(&self) -> &dyn ReviewStore {
        self.stores.reviews.as_ref()
    }

    pub fn preferences(&self) -> &dyn PreferenceStore {
        self.stores.preferences.as_ref()
    }

    pub fn lectures(&self) -> &dyn LectureCatalog {
        self.stores.lectures.as_ref()
    }

    pub fn clock(&self) -> &(dyn Clock + Send + Sync) {
        self.clock.as_ref()
    }

    pub fn half_life_params(&self) -> &HalfLifeParams {
        &self.half_life_params
    }
}
