//! Fitness evaluation for the metaheuristic path.
//!
//! `fitness = reward - penalties + bonus`. Each evaluation returns its own
//! breakdown, so the evaluator holds no per-call state and can be shared
//! across threads.

use serde::{Deserialize, Serialize};

use crate::scoring::analyze_day;
use crate::types::selected_count;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FitnessWeights {
    /// Reward multiplier per unit of preference
    pub reward_scale: f64,
    /// Per selected slot with preference exactly 0
    pub unavailable_slot_penalty: f64,
    /// Per selected slot with negative preference
    pub negative_slot_penalty: f64,
    /// Per hour of difference from the required total
    pub hour_mismatch_penalty: f64,
    pub single_hour_block_penalty: f64,
    /// Per hour beyond the second in a block
    pub long_block_penalty: f64,
    /// Per hour over the daily cap
    pub daily_overflow_penalty: f64,
    pub two_hour_block_bonus: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            reward_scale: 50.0,
            unavailable_slot_penalty: 100_000.0,
            negative_slot_penalty: 1_000.0,
            hour_mismatch_penalty: 1_000.0,
            single_hour_block_penalty: 30.0,
            long_block_penalty: 40.0,
            daily_overflow_penalty: 100.0,
            two_hour_block_bonus: 20.0,
        }
    }
}

/// Grid shape and hour constraints
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessConfig {
    pub num_days: usize,
    pub hours_per_day: usize,
    pub required_hours: usize,
    pub max_daily_hours: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyBreakdown {
    pub unavailable_slots: usize,
    pub negative_slots: usize,
    pub hour_difference: usize,
    pub single_hour_blocks: usize,
    pub long_block_excess_hours: usize,
    pub days_over_cap: usize,
    pub overflow_hours: usize,
    pub total: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusBreakdown {
    pub two_hour_blocks: usize,
    pub total: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessReport {
    pub fitness: f64,
    pub reward: f64,
    pub penalties: PenaltyBreakdown,
    pub bonus: BonusBreakdown,
}

#[derive(Clone, Debug)]
pub struct FitnessEvaluator {
    config: FitnessConfig,
    weights: FitnessWeights,
}

impl FitnessEvaluator {
    pub fn new(config: FitnessConfig) -> Self {
        Self::with_weights(config, FitnessWeights::default())
    }

    pub fn with_weights(config: FitnessConfig, weights: FitnessWeights) -> Self {
        Self { config, weights }
    }

    pub fn config(&self) -> &FitnessConfig {
        &self.config
    }

    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    pub fn reward(&self, schedule: &[u8], preferences: &[f64]) -> f64 {
        schedule
            .iter()
            .zip(preferences)
            .map(|(&bit, &pref)| pref * bit as f64 * self.weights.reward_scale)
            .sum()
    }

    pub fn calculate_penalties(&self, schedule: &[u8], preferences: &[f64]) -> PenaltyBreakdown {
        let w = &self.weights;
        let mut breakdown = PenaltyBreakdown::default();

        for (&bit, &pref) in schedule.iter().zip(preferences) {
            if bit != 1 {
                continue;
            }
            if pref == 0.0 {
                breakdown.unavailable_slots += 1;
            } else if pref < 0.0 {
                breakdown.negative_slots += 1;
            }
        }

        breakdown.hour_difference = selected_count(schedule).abs_diff(self.config.required_hours);

        for row in schedule.chunks(self.config.hours_per_day) {
            let blocks = analyze_day(row);
            breakdown.single_hour_blocks += blocks.single_hour_blocks;
            breakdown.long_block_excess_hours += blocks.long_block_excess_hours;

            let daily = selected_count(row);
            if daily > self.config.max_daily_hours {
                breakdown.days_over_cap += 1;
                breakdown.overflow_hours += daily - self.config.max_daily_hours;
            }
        }

        breakdown.total = breakdown.unavailable_slots as f64 * w.unavailable_slot_penalty
            + breakdown.negative_slots as f64 * w.negative_slot_penalty
            + breakdown.hour_difference as f64 * w.hour_mismatch_penalty
            + breakdown.single_hour_blocks as f64 * w.single_hour_block_penalty
            + breakdown.long_block_excess_hours as f64 * w.long_block_penalty
            + breakdown.overflow_hours as f64 * w.daily_overflow_penalty;

        breakdown
    }

    pub fn calculate_bonus(&self, schedule: &[u8]) -> BonusBreakdown {
        let two_hour_blocks = schedule
            .chunks(self.config.hours_per_day)
            .map(|row| analyze_day(row).two_hour_blocks)
            .sum::<usize>();
        BonusBreakdown {
            two_hour_blocks,
            total: two_hour_blocks as f64 * self.weights.two_hour_block_bonus,
        }
    }

    pub fn evaluate(&self, schedule: &[u8], preferences: &[f64]) -> FitnessReport {
        let reward = self.reward(schedule, preferences);
        let penalties = self.calculate_penalties(schedule, preferences);
        let bonus = self.calculate_bonus(schedule);
        FitnessReport {
            fitness: reward - penalties.total + bonus.total,
            reward,
            penalties,
            bonus,
        }
    }

    pub fn fitness(&self, schedule: &[u8], preferences: &[f64]) -> f64 {
        self.evaluate(schedule, preferences).fitness
    }
}
