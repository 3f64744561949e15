use serde::{Deserialize, Serialize};

use studyplan_algo::formatter::to_session_ranges;
use studyplan_algo::sanitize::sanitize_preferences;
use studyplan_algo::{
    DfoConfig, PopulationOptimizer, PreferenceVector, RandomSource, SeededRandom, DAY_NAMES,
    HOURS_PER_DAY, NUM_DAYS,
};

use super::{ServiceError, VectorInput};
use crate::config::SchedulerDefaults;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySessionsInput {
    pub user_id: String,
    pub preference_vector: VectorInput,
    #[serde(default)]
    pub courses: Vec<String>,
    #[serde(default)]
    pub required_hours: Option<usize>,
    #[serde(default)]
    pub max_daily_hours: Option<usize>,
    /// Reproducible run; the configured seed or fresh entropy otherwise
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSession {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub course: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySessionPlan {
    pub sessions: Vec<CourseSession>,
    pub available_days: Vec<String>,
    pub fitness: f64,
}

impl StudySessionPlan {
    fn empty(available_days: Vec<String>) -> Self {
        Self {
            sessions: Vec::new(),
            available_days,
            fitness: 0.0,
        }
    }
}

pub fn generate_study_sessions(
    input: StudySessionsInput,
    defaults: &SchedulerDefaults,
) -> Result<StudySessionPlan, ServiceError> {
    let seed = input.seed.or(defaults.optimizer_seed);
    let mut rng = match seed {
        Some(seed) => SeededRandom::new(seed),
        None => SeededRandom::from_entropy(),
    };
    generate_with_rng(input, defaults, &mut rng)
}

/// Runs the population optimizer over the weekdays that have any
/// positive-preference slot, then assigns courses round-robin.
pub fn generate_with_rng<R: RandomSource + ?Sized>(
    input: StudySessionsInput,
    defaults: &SchedulerDefaults,
    rng: &mut R,
) -> Result<StudySessionPlan, ServiceError> {
    let mut values = input.preference_vector.into_values()?;
    sanitize_preferences(&mut values);
    let preferences = PreferenceVector::weekly(values)?;

    let days: Vec<usize> = (0..NUM_DAYS)
        .filter(|&day| preferences.day_has_availability(day, HOURS_PER_DAY))
        .collect();
    let day_names: Vec<&str> = days.iter().map(|&day| DAY_NAMES[day]).collect();
    let available_days: Vec<String> = day_names.iter().map(|name| name.to_string()).collect();

    if days.is_empty() {
        tracing::warn!(user_id = %input.user_id, "no available days, skipping optimizer");
        return Ok(StudySessionPlan::empty(available_days));
    }

    let restricted = preferences.restrict_to_days(&days, HOURS_PER_DAY);
    let config = DfoConfig {
        num_days: days.len(),
        hours_per_day: HOURS_PER_DAY,
        required_hours: input.required_hours.unwrap_or(defaults.required_hours),
        max_daily_hours: input.max_daily_hours.unwrap_or(defaults.max_daily_hours),
        population_size: defaults.dfo_population,
        generations: defaults.dfo_generations,
        ..DfoConfig::default()
    };

    let result = match PopulationOptimizer::new(config).optimize(&restricted, rng) {
        Ok(result) => result,
        Err(err) if err.is_unsatisfiable() => {
            tracing::warn!(user_id = %input.user_id, error = %err, "study session request cannot be satisfied");
            return Ok(StudySessionPlan::empty(available_days));
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(
        user_id = %input.user_id,
        fitness = result.fitness,
        best_generation = result.best_generation,
        "population optimizer finished"
    );

    let ranges = to_session_ranges(&result.solution, HOURS_PER_DAY, &day_names)?;
    let sessions = ranges
        .into_iter()
        .enumerate()
        .map(|(i, range)| CourseSession {
            day: range.day,
            start_time: range.start_time,
            end_time: range.end_time,
            course: assign_course(&input.courses, i),
        })
        .collect();

    Ok(StudySessionPlan {
        sessions,
        available_days,
        fitness: result.fitness,
    })
}

fn assign_course(courses: &[String], index: usize) -> Option<String> {
    if courses.is_empty() {
        None
    } else {
        Some(courses[index % courses.len()].clone())
    }
}
