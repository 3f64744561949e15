//! External data layer seams
//!
//! The scheduling core never performs I/O. Everything it needs from
//! storage (stored time-of-day preferences, lecture metadata, review
//! records) comes through these traits.

mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use memory::{MemoryLectureCatalog, MemoryPreferenceStore, MemoryReviewStore};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Review state for one (user, lecture) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: Uuid,
    pub user_id: String,
    pub course_id: String,
    pub lecture_id: String,
    /// Next scheduled review
    pub review_date: DateTime<Utc>,
    /// Days
    pub half_life: f64,
    pub last_score: u8,
    pub last_review_date: DateTime<Utc>,
    pub study_count: u32,
}

/// Catalogue fields exactly as authored, parsed by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureInfo {
    pub difficulty: Option<String>,
    pub duration: Option<String>,
}

pub trait ReviewStore: Send + Sync {
    fn find(&self, user_id: &str, lecture_id: &str) -> Result<Option<ReviewRecord>, StoreError>;

    /// Creates or replaces the record keyed by (user_id, lecture_id).
    fn upsert(&self, record: ReviewRecord) -> Result<ReviewRecord, StoreError>;

    /// Reads, recomputes and writes one record as a single step.
    ///
    /// `update` sees the current record, if any, and returns its
    /// replacement. Returning `None` leaves the store untouched and the
    /// call yields `Ok(None)`. No other write to the same key may land
    /// between the read and the write.
    fn update_with(
        &self,
        user_id: &str,
        lecture_id: &str,
        update: &mut dyn FnMut(Option<&ReviewRecord>) -> Option<ReviewRecord>,
    ) -> Result<Option<ReviewRecord>, StoreError>;
}

pub trait PreferenceStore: Send + Sync {
    /// Stored time-of-day preference, e.g. `"MORNING"`
    fn time_of_day(&self, user_id: &str) -> Result<Option<String>, StoreError>;
}

pub trait LectureCatalog: Send + Sync {
    fn lecture(&self, lecture_id: &str) -> Result<Option<LectureInfo>, StoreError>;
}
