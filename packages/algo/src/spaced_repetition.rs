//! Half-Life Regression review scheduling
//!
//! Estimates how many days a lecture stays recallable above 50% and places
//! the next review that far after the quiz.
//!
//! The estimate is a chain of order-dependent adjustments:
//! 1. base = C × (score × duration) / complexity
//! 2. quiz performance: × (0.2 + score² × Q × 2.5)
//! 3. spacing effect: × (1 + T × ln(1 + days since last review))
//! 4. blend with the previous half-life, weight 1/(n+1) on the new estimate
//! 5. repetition: × (1 + √(n-1) × S)
//! 6. floor at the minimum half-life
//!
//! The engine is pure; looking up and persisting review records is the
//! caller's job.

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};

pub const MS_PER_DAY: f64 = 86_400_000.0;

pub const DEFAULT_DIFFICULTY: f64 = 3.0;
pub const DEFAULT_DURATION_MINUTES: f64 = 30.0;

// ==================== Parameters ====================

/// How the study-count bonus grows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepetitionScaling {
    /// `1 + sqrt(n - 1) * factor`
    SquareRoot,
    /// `exp((n - 1) * factor / 10)`
    Exponential,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HalfLifeParams {
    pub base_constant: f64,
    pub quiz_score_factor: f64,
    /// Exponent applied to the normalized score in the quiz adjustment
    pub score_exponent: f64,
    pub time_since_review_factor: f64,
    pub study_count_factor: f64,
    pub repetition_scaling: RepetitionScaling,
    pub min_half_life: f64,
}

impl Default for HalfLifeParams {
    fn default() -> Self {
        Self {
            base_constant: 0.5,
            quiz_score_factor: 0.7,
            score_exponent: 2.0,
            time_since_review_factor: 0.3,
            study_count_factor: 0.4,
            repetition_scaling: RepetitionScaling::SquareRoot,
            min_half_life: 1.0,
        }
    }
}

impl HalfLifeParams {
    /// Second parameterisation kept for comparison runs; not the production default.
    pub fn alternate() -> Self {
        Self {
            quiz_score_factor: 0.4,
            score_exponent: 1.5,
            study_count_factor: 0.8,
            repetition_scaling: RepetitionScaling::Exponential,
            ..Self::default()
        }
    }
}

// ==================== Inputs ====================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HalfLifeInput {
    /// Quiz score, clamped into 0-100
    pub score: f64,
    pub study_duration_minutes: f64,
    /// 1-5, clamped
    pub task_complexity: f64,
    /// 0 when there is no prior review
    pub days_since_last_review: f64,
    pub previous_half_life: Option<f64>,
    /// At least 1
    pub study_count: u32,
}

/// Lecture attributes that feed the half-life estimate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureMetadata {
    pub difficulty: f64,
    pub duration_minutes: f64,
}

impl Default for LectureMetadata {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            duration_minutes: DEFAULT_DURATION_MINUTES,
        }
    }
}

impl LectureMetadata {
    /// Parses free-text catalogue fields, falling back to defaults.
    pub fn from_raw(difficulty: Option<&str>, duration: Option<&str>) -> Self {
        Self {
            difficulty: difficulty
                .and_then(parse_difficulty)
                .unwrap_or(DEFAULT_DIFFICULTY),
            duration_minutes: duration
                .and_then(parse_duration_minutes)
                .unwrap_or(DEFAULT_DURATION_MINUTES),
        }
    }
}

/// `"4"`, `"4.5"`, `"easy"`, `"Very Hard"` ... mapped onto 1-5
pub fn parse_difficulty(raw: &str) -> Option<f64> {
    let text = raw.trim().to_lowercase();
    if let Ok(value) = text.parse::<f64>() {
        return value.is_finite().then(|| value.clamp(1.0, 5.0));
    }
    let level = match text.replace(['-', '_'], " ").as_str() {
        "very easy" | "beginner" | "trivial" => 1.0,
        "easy" | "basic" => 2.0,
        "medium" | "moderate" | "intermediate" | "normal" => 3.0,
        "hard" | "difficult" | "advanced" => 4.0,
        "very hard" | "expert" => 5.0,
        _ => return None,
    };
    Some(level)
}

/// Minutes from text such as `"45"`, `"45 min"`, `"1 hour"`, `"1h 30m"`, `"1.5 hours"`
pub fn parse_duration_minutes(raw: &str) -> Option<f64> {
    let text = raw.trim().to_lowercase();
    if let Ok(value) = text.parse::<f64>() {
        return (value.is_finite() && value > 0.0).then_some(value);
    }

    let mut total = 0.0;
    let mut matched = false;
    let mut number = String::new();
    let mut unit = String::new();

    let mut flush = |number: &mut String, unit: &mut String| {
        if let Ok(value) = number.parse::<f64>() {
            let minutes = match unit.as_str() {
                "h" | "hr" | "hrs" | "hour" | "hours" => Some(value * 60.0),
                "" | "m" | "min" | "mins" | "minute" | "minutes" => Some(value),
                _ => None,
            };
            if let Some(minutes) = minutes {
                total += minutes;
                matched = true;
            }
        }
        number.clear();
        unit.clear();
    };

    for ch in text.chars() {
        if ch.is_ascii_digit() || ch == '.' {
            if !unit.is_empty() {
                flush(&mut number, &mut unit);
            }
            number.push(ch);
        } else if ch.is_alphabetic() {
            if !number.is_empty() {
                unit.push(ch);
            }
        } else if !unit.is_empty() {
            flush(&mut number, &mut unit);
        }
    }
    flush(&mut number, &mut unit);

    (matched && total > 0.0).then_some(total)
}

// ==================== Computation ====================

pub fn compute_half_life(input: &HalfLifeInput, params: &HalfLifeParams) -> f64 {
    let normalized_score = input.score.clamp(0.0, 100.0) / 100.0;
    let complexity = input.task_complexity.clamp(1.0, 5.0);
    let duration = input.study_duration_minutes.max(0.0);
    let study_count = input.study_count.max(1);

    let mut half_life = params.base_constant * (normalized_score * duration) / complexity;

    let effect = normalized_score.powf(params.score_exponent);
    half_life *= 0.2 + effect * params.quiz_score_factor * 2.5;

    if input.days_since_last_review > 0.0 {
        half_life *= 1.0 + params.time_since_review_factor * (1.0 + input.days_since_last_review).ln();
    }

    if let Some(previous) = input.previous_half_life.filter(|&h| h > 0.0) {
        let weight = 1.0 / (study_count as f64 + 1.0);
        half_life = weight * half_life + (1.0 - weight) * previous;
    }

    if study_count > 1 {
        let repetitions = (study_count - 1) as f64;
        half_life *= match params.repetition_scaling {
            RepetitionScaling::SquareRoot => 1.0 + repetitions.sqrt() * params.study_count_factor,
            RepetitionScaling::Exponential => (repetitions * params.study_count_factor / 10.0).exp(),
        };
    }

    if half_life.is_finite() {
        half_life.max(params.min_half_life)
    } else {
        params.min_half_life
    }
}

/// `base_ms` plus `half_life_days`, in epoch milliseconds
pub fn next_review_at(base_ms: i64, half_life_days: f64) -> i64 {
    base_ms + (half_life_days * MS_PER_DAY).round() as i64
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSchedule {
    pub half_life: f64,
    pub review_at_ms: i64,
    pub base_ms: i64,
}

pub struct ReviewScheduler<C: Clock = SystemClock> {
    params: HalfLifeParams,
    clock: C,
}

impl ReviewScheduler<SystemClock> {
    pub fn new(params: HalfLifeParams) -> Self {
        Self::with_clock(params, SystemClock)
    }
}

impl<C: Clock> ReviewScheduler<C> {
    pub fn with_clock(params: HalfLifeParams, clock: C) -> Self {
        Self { params, clock }
    }

    pub fn params(&self) -> &HalfLifeParams {
        &self.params
    }

    /// Schedules from `completed_at_ms`, or from the clock when absent.
    pub fn schedule(&self, input: &HalfLifeInput, completed_at_ms: Option<i64>) -> ReviewSchedule {
        let base_ms = completed_at_ms.unwrap_or_else(|| self.clock.now_millis());
        let half_life = compute_half_life(input, &self.params);
        ReviewSchedule {
            half_life,
            review_at_ms: next_review_at(base_ms, half_life),
            base_ms,
        }
    }
}
