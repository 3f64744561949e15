//! Dispersive Flies Optimisation with hill-climbing refinement
//!
//! Population search over binary schedules:
//! - Each fly starts from a random set of available slots
//! - Every generation, non-best flies move towards the swarm best relative
//!   to their better ring neighbour, with rare per-coordinate restarts
//! - Continuous positions are thresholded back to bits (`> 0.5`)
//! - A subset of the swarm (always including the best fly) is refined by
//!   [`HillClimber`]
//!
//! The best schedule seen in any generation is returned, not just the
//! final swarm's best.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::fitness::{FitnessConfig, FitnessEvaluator, FitnessReport, FitnessWeights};
use crate::hill_climb::HillClimber;
use crate::random::RandomSource;
use crate::sanitize::validate_problem;
use crate::types::{CandidateSchedule, PreferenceVector, HOURS_PER_DAY, NUM_DAYS};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DfoConfig {
    pub num_days: usize,
    pub hours_per_day: usize,
    pub required_hours: usize,
    pub max_daily_hours: usize,
    pub population_size: usize,
    pub generations: usize,
    /// Per-coordinate random restart probability
    pub delta: f64,
    /// Share of the swarm refined by hill climbing each generation
    pub hill_climbing_rate: f64,
}

impl Default for DfoConfig {
    fn default() -> Self {
        Self {
            num_days: NUM_DAYS,
            hours_per_day: HOURS_PER_DAY,
            required_hours: 14,
            max_daily_hours: 4,
            population_size: 50,
            generations: 100,
            delta: 0.009,
            hill_climbing_rate: 0.3,
        }
    }
}

impl DfoConfig {
    pub fn total_hours(&self) -> usize {
        self.num_days * self.hours_per_day
    }

    pub fn fitness_config(&self) -> FitnessConfig {
        FitnessConfig {
            num_days: self.num_days,
            hours_per_day: self.hours_per_day,
            required_hours: self.required_hours,
            max_daily_hours: self.max_daily_hours,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub solution: CandidateSchedule,
    pub fitness: f64,
    pub report: FitnessReport,
    /// Generation in which the returned solution was first seen
    pub best_generation: usize,
}

pub struct PopulationOptimizer {
    config: DfoConfig,
    evaluator: FitnessEvaluator,
}

impl PopulationOptimizer {
    pub fn new(config: DfoConfig) -> Self {
        Self::with_weights(config, FitnessWeights::default())
    }

    pub fn with_weights(config: DfoConfig, weights: FitnessWeights) -> Self {
        let evaluator = FitnessEvaluator::with_weights(config.fitness_config(), weights);
        Self { config, evaluator }
    }

    pub fn config(&self) -> &DfoConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    pub fn optimize<R: RandomSource + ?Sized>(
        &self,
        preferences: &PreferenceVector,
        rng: &mut R,
    ) -> Result<OptimizationResult, ScheduleError> {
        validate_problem(
            preferences,
            self.config.total_hours(),
            self.config.required_hours,
            self.config.max_daily_hours,
        )?;
        if self.config.population_size == 0 {
            return Err(ScheduleError::InvalidConfig(
                "population size must be positive".to_string(),
            ));
        }

        let prefs = preferences.as_slice();
        let climber = HillClimber::new(&self.evaluator, prefs);
        let mut population = self.initial_population(preferences, rng);

        let mut best_solution = population[0].clone();
        let mut best_fitness = f64::NEG_INFINITY;
        let mut best_generation = 0;

        for generation in 0..self.config.generations {
            let fitness = self.evaluate_population(&population, prefs);
            let best_idx = argmax(&fitness);
            if fitness[best_idx] > best_fitness {
                best_fitness = fitness[best_idx];
                best_solution = population[best_idx].clone();
                best_generation = generation;
            }

            population = self.update_population(&population, &fitness, best_idx, rng);

            for idx in climb_targets(best_idx, population.len(), self.config.hill_climbing_rate, rng) {
                population[idx] = climber.climb(&population[idx], rng);
            }

            tracing::trace!(generation, best_fitness, "dfo generation complete");
        }

        let fitness = self.evaluate_population(&population, prefs);
        let best_idx = argmax(&fitness);
        if fitness[best_idx] > best_fitness {
            best_solution = population[best_idx].clone();
            best_generation = self.config.generations;
        }

        let report = self.evaluator.evaluate(&best_solution, prefs);
        tracing::debug!(
            fitness = report.fitness,
            best_generation,
            generations = self.config.generations,
            "dfo search finished"
        );

        Ok(OptimizationResult {
            fitness: report.fitness,
            solution: best_solution,
            report,
            best_generation,
        })
    }

    /// Each fly selects `required_hours` distinct available slots at random.
    fn initial_population<R: RandomSource + ?Sized>(
        &self,
        preferences: &PreferenceVector,
        rng: &mut R,
    ) -> Vec<CandidateSchedule> {
        let valid = preferences.available_indices();
        (0..self.config.population_size)
            .map(|_| {
                let mut indices = valid.clone();
                rng.shuffle(&mut indices);
                let mut schedule = vec![0u8; self.config.total_hours()];
                for &idx in indices.iter().take(self.config.required_hours) {
                    schedule[idx] = 1;
                }
                schedule
            })
            .collect()
    }

    fn evaluate_population(&self, population: &[CandidateSchedule], prefs: &[f64]) -> Vec<f64> {
        population
            .par_iter()
            .map(|individual| self.evaluator.fitness(individual, prefs))
            .collect()
    }

    fn update_population<R: RandomSource + ?Sized>(
        &self,
        population: &[CandidateSchedule],
        fitness: &[f64],
        best_idx: usize,
        rng: &mut R,
    ) -> Vec<CandidateSchedule> {
        let n = population.len();
        let best = &population[best_idx];

        (0..n)
            .map(|i| {
                if i == best_idx {
                    return population[i].clone();
                }
                let left = (i + n - 1) % n;
                let right = (i + 1) % n;
                let neighbor = if fitness[right] > fitness[left] {
                    &population[right]
                } else {
                    &population[left]
                };

                let individual = &population[i];
                (0..individual.len())
                    .map(|d| {
                        let value = if rng.next_bool(self.config.delta) {
                            if rng.next_bool(0.5) {
                                1.0
                            } else {
                                0.0
                            }
                        } else {
                            let u = rng.next_f64();
                            neighbor[d] as f64 + u * (best[d] as f64 - individual[d] as f64)
                        };
                        threshold(value)
                    })
                    .collect()
            })
            .collect()
    }
}

/// Strict threshold: exactly 0.5 maps to 0
pub fn threshold(value: f64) -> u8 {
    if value > 0.5 {
        1
    } else {
        0
    }
}

/// First index of the maximum
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// `best_idx` plus random distinct indices, `max(1, floor(rate * n))` in total
fn climb_targets<R: RandomSource + ?Sized>(
    best_idx: usize,
    n: usize,
    rate: f64,
    rng: &mut R,
) -> Vec<usize> {
    let count = ((rate * n as f64).floor() as usize).max(1).min(n);
    let mut targets = Vec::with_capacity(count);
    targets.push(best_idx);
    while targets.len() < count {
        let idx = rng.next_index(n);
        if !targets.contains(&idx) {
            targets.push(idx);
        }
    }
    targets
}
