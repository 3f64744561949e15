use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use studyplan_algo::spaced_repetition::MS_PER_DAY;
use studyplan_algo::{Clock, HalfLifeInput, HalfLifeParams, LectureMetadata, ReviewScheduler};

use super::ServiceError;
use crate::store::{LectureCatalog, ReviewRecord, ReviewStore};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub user_id: String,
    pub course_id: String,
    pub lecture_id: String,
    pub score: f64,
    /// Only consulted for a first review; later ones count from the stored record
    #[serde(default)]
    pub study_count: Option<u32>,
    #[serde(default)]
    pub quiz_completed_at: Option<DateTime<Utc>>,
}

/// Collaborators one review submission touches
pub struct ReviewContext<'a> {
    pub reviews: &'a dyn ReviewStore,
    pub lectures: &'a dyn LectureCatalog,
    pub clock: &'a (dyn Clock + Send + Sync),
    pub params: &'a HalfLifeParams,
}

/// Computes the next review for one quiz submission and persists it.
///
/// The lookup, the half-life calculation and the write run inside one
/// store update, so concurrent submissions for the same lecture each see
/// the previous one's record. A failed calculation or write leaves the
/// stored state untouched.
pub fn schedule_review(ctx: &ReviewContext<'_>, input: ReviewInput) -> Result<ReviewRecord, ServiceError> {
    validate(&input)?;

    let lecture = ctx.lectures.lecture(&input.lecture_id)?;
    if lecture.is_none() {
        tracing::warn!(lecture_id = %input.lecture_id, "lecture metadata missing, using defaults");
    }
    let metadata = lecture
        .map(|info| LectureMetadata::from_raw(info.difficulty.as_deref(), info.duration.as_deref()))
        .unwrap_or_default();

    let base_ms = input
        .quiz_completed_at
        .map(|at| at.timestamp_millis())
        .unwrap_or_else(|| ctx.clock.now_millis());

    let mut failure = None;
    let saved = ctx
        .reviews
        .update_with(&input.user_id, &input.lecture_id, &mut |existing| {
            match next_record(ctx, &input, &metadata, base_ms, existing) {
                Ok(record) => Some(record),
                Err(err) => {
                    failure = Some(err);
                    None
                }
            }
        })
        .map_err(|err| {
            tracing::warn!(error = %err, "review record write failed");
            ServiceError::from(err)
        })?;

    let saved = match saved {
        Some(record) => record,
        None => {
            return Err(failure
                .unwrap_or_else(|| ServiceError::Worker("review update skipped".to_string())))
        }
    };

    tracing::debug!(
        user_id = %saved.user_id,
        lecture_id = %saved.lecture_id,
        half_life = saved.half_life,
        study_count = saved.study_count,
        "review scheduled"
    );

    Ok(saved)
}

fn next_record(
    ctx: &ReviewContext<'_>,
    input: &ReviewInput,
    metadata: &LectureMetadata,
    base_ms: i64,
    existing: Option<&ReviewRecord>,
) -> Result<ReviewRecord, ServiceError> {
    let (study_count, previous_half_life, days_since_last_review) = match existing {
        Some(record) => {
            let elapsed = (base_ms - record.last_review_date.timestamp_millis()) as f64 / MS_PER_DAY;
            (
                record.study_count.saturating_add(1),
                Some(record.half_life),
                elapsed.max(0.0),
            )
        }
        None => (input.study_count.unwrap_or(1).max(1), None, 0.0),
    };

    let half_life_input = HalfLifeInput {
        score: input.score,
        study_duration_minutes: metadata.duration_minutes,
        task_complexity: metadata.difficulty,
        days_since_last_review,
        previous_half_life,
        study_count,
    };
    let scheduled = ReviewScheduler::with_clock(ctx.params.clone(), ctx.clock)
        .schedule(&half_life_input, Some(base_ms));

    Ok(ReviewRecord {
        id: existing.map(|r| r.id).unwrap_or_else(Uuid::new_v4),
        user_id: input.user_id.clone(),
        course_id: input.course_id.clone(),
        lecture_id: input.lecture_id.clone(),
        review_date: to_datetime(scheduled.review_at_ms)?,
        half_life: scheduled.half_life,
        last_score: input.score.clamp(0.0, 100.0).round() as u8,
        last_review_date: to_datetime(scheduled.base_ms)?,
        study_count,
    })
}

pub fn get_review(
    reviews: &dyn ReviewStore,
    user_id: &str,
    lecture_id: &str,
) -> Result<ReviewRecord, ServiceError> {
    reviews
        .find(user_id, lecture_id)?
        .ok_or_else(|| ServiceError::NotFound("复习记录不存在".to_string()))
}

fn validate(input: &ReviewInput) -> Result<(), ServiceError> {
    for (name, value) in [
        ("userId", &input.user_id),
        ("courseId", &input.course_id),
        ("lectureId", &input.lecture_id),
    ] {
        if value.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(format!("{name} is required")));
        }
    }
    if !input.score.is_finite() {
        return Err(ServiceError::InvalidRequest("score must be a number".to_string()));
    }
    Ok(())
}

fn to_datetime(ms: i64) -> Result<DateTime<Utc>, ServiceError> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| ServiceError::InvalidRequest("timestamp out of range".to_string()))
}

#[cfg(test)]
mod tests {
    use studyplan_algo::FixedClock;

    use super::*;
    use crate::store::{
        LectureInfo, MemoryLectureCatalog, MemoryReviewStore, StoreError,
    };

    const NOW: i64 = 1_700_000_000_000;

    struct RejectingStore;

    impl ReviewStore for RejectingStore {
        fn find(&self, _: &str, _: &str) -> Result<Option<ReviewRecord>, StoreError> {
            Ok(None)
        }

        fn upsert(&self, _: ReviewRecord) -> Result<ReviewRecord, StoreError> {
            Err(StoreError::Rejected("read-only".to_string()))
        }

        fn update_with(
            &self,
            _: &str,
            _: &str,
            _: &mut dyn FnMut(Option<&ReviewRecord>) -> Option<ReviewRecord>,
        ) -> Result<Option<ReviewRecord>, StoreError> {
            Err(StoreError::Rejected("read-only".to_string()))
        }
    }

    fn catalog() -> MemoryLectureCatalog {
        let catalog = MemoryLectureCatalog::new();
        catalog.insert(
            "lec-1",
            LectureInfo {
                difficulty: Some("3".to_string()),
                duration: Some("60 min".to_string()),
            },
        );
        catalog
    }

    fn input(score: f64) -> ReviewInput {
        ReviewInput {
            user_id: "u1".to_string(),
            course_id: "c1".to_string(),
            lecture_id: "lec-1".to_string(),
            score,
            study_count: None,
            quiz_completed_at: None,
        }
    }

    #[test]
    fn test_first_review_creates_record() {
        let reviews = MemoryReviewStore::new();
        let lectures = catalog();
        let clock = FixedClock(NOW);
        let params = HalfLifeParams::default();
        let ctx = ReviewContext {
            reviews: &reviews,
            lectures: &lectures,
            clock: &clock,
            params: &params,
        };

        let record = schedule_review(&ctx, input(90.0)).unwrap();
        assert_eq!(record.study_count, 1);
        assert!((record.half_life - 14.5575).abs() < 1e-9);
        assert_eq!(record.last_review_date.timestamp_millis(), NOW);
        let expected = NOW + (14.5575 * MS_PER_DAY).round() as i64;
        assert_eq!(record.review_date.timestamp_millis(), expected);
        assert_eq!(reviews.len(), 1);
    }

    #[test]
    fn test_second_review_updates_in_place() {
        let reviews = MemoryReviewStore::new();
        let lectures = catalog();
        let clock = FixedClock(NOW);
        let params = HalfLifeParams::default();
        let ctx = ReviewContext {
            reviews: &reviews,
            lectures: &lectures,
            clock: &clock,
            params: &params,
        };

        let first = schedule_review(&ctx, input(90.0)).unwrap();
        let second = schedule_review(&ctx, input(90.0)).unwrap();

        assert_eq!(reviews.len(), 1);
        assert_eq!(first.id, second.id);
        assert_eq!(second.study_count, 2);
        assert!(second.half_life > first.half_life);
        assert!((second.half_life - first.half_life * 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_completion_time_is_base() {
        let reviews = MemoryReviewStore::new();
        let lectures = catalog();
        let clock = FixedClock(NOW);
        let params = HalfLifeParams::default();
        let ctx = ReviewContext {
            reviews: &reviews,
            lectures: &lectures,
            clock: &clock,
            params: &params,
        };

        let completed = DateTime::<Utc>::from_timestamp_millis(NOW - 3_600_000).unwrap();
        let record = schedule_review(
            &ctx,
            ReviewInput {
                quiz_completed_at: Some(completed),
                ..input(50.0)
            },
        )
        .unwrap();
        assert_eq!(record.last_review_date, completed);
        assert!(record.review_date > completed);
    }

    #[test]
    fn test_missing_lecture_uses_defaults() {
        let reviews = MemoryReviewStore::new();
        let lectures = MemoryLectureCatalog::new();
        let clock = FixedClock(NOW);
        let params = HalfLifeParams::default();
        let ctx = ReviewContext {
            reviews: &reviews,
            lectures: &lectures,
            clock: &clock,
            params: &params,
        };

        // 0.5 * 1.0 * 30 / 3 = 5, modifier 0.2 + 0.7 * 2.5 = 1.95
        let record = schedule_review(&ctx, input(100.0)).unwrap();
        assert!((record.half_life - 9.75).abs() < 1e-9);
    }

    #[test]
    fn test_failed_write_surfaces_persistence_error() {
        let reviews = RejectingStore;
        let lectures = catalog();
        let clock = FixedClock(NOW);
        let params = HalfLifeParams::default();
        let ctx = ReviewContext {
            reviews: &reviews,
            lectures: &lectures,
            clock: &clock,
            params: &params,
        };

        assert!(matches!(
            schedule_review(&ctx, input(80.0)),
            Err(ServiceError::Persistence(StoreError::Rejected(_)))
        ));
    }

    #[test]
    fn test_rejects_blank_ids_and_nan_score() {
        let reviews = MemoryReviewStore::new();
        let lectures = catalog();
        let clock = FixedClock(NOW);
        let params = HalfLifeParams::default();
        let ctx = ReviewContext {
            reviews: &reviews,
            lectures: &lectures,
            clock: &clock,
            params: &params,
        };

        let blank = ReviewInput {
            lecture_id: " ".to_string(),
            ..input(80.0)
        };
        assert!(matches!(schedule_review(&ctx, blank), Err(ServiceError::InvalidRequest(_))));
        assert!(matches!(
            schedule_review(&ctx, input(f64::NAN)),
            Err(ServiceError::InvalidRequest(_))
        ));
        assert!(reviews.is_empty());
    }

    #[test]
    fn test_concurrent_submissions_count_every_review() {
        const SUBMISSIONS: u32 = 16;

        let reviews = MemoryReviewStore::new();
        let lectures = catalog();
        let clock = FixedClock(NOW);
        let params = HalfLifeParams::default();
        let ctx = ReviewContext {
            reviews: &reviews,
            lectures: &lectures,
            clock: &clock,
            params: &params,
        };

        std::thread::scope(|scope| {
            for _ in 0..SUBMISSIONS {
                scope.spawn(|| schedule_review(&ctx, input(75.0)).unwrap());
            }
        });

        assert_eq!(reviews.len(), 1);
        let record = reviews.find("u1", "lec-1").unwrap().unwrap();
        assert_eq!(record.study_count, SUBMISSIONS);
    }

    #[test]
    fn test_get_review_not_found() {
        let reviews = MemoryReviewStore::new();
        assert!(matches!(
            get_review(&reviews, "u1", "lec-1"),
            Err(ServiceError::NotFound(_))
        ));
    }
}
