//! Block-shape analysis and schedule scoring.
//!
//! A block is a maximal run of selected slots inside one day. Runs never
//! continue across the day boundary.

use serde::{Deserialize, Serialize};

use crate::types::ScheduleConfig;

/// Penalty/bonus magnitudes applied per block
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringWeights {
    pub single_hour_block_penalty: f64,
    pub two_hour_block_bonus: f64,
    /// Charged per hour beyond the second
    pub long_block_penalty: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            single_hour_block_penalty: 30.0,
            two_hour_block_bonus: 20.0,
            long_block_penalty: 40.0,
        }
    }
}

/// Block counts for a whole schedule or a single day
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSummary {
    pub single_hour_blocks: usize,
    pub two_hour_blocks: usize,
    pub long_blocks: usize,
    /// Sum of `length - 2` over blocks longer than two hours
    pub long_block_excess_hours: usize,
}

impl BlockSummary {
    fn record(&mut self, length: usize) {
        match length {
            0 => {}
            1 => self.single_hour_blocks += 1,
            2 => self.two_hour_blocks += 1,
            n => {
                self.long_blocks += 1;
                self.long_block_excess_hours += n - 2;
            }
        }
    }

    fn merge(&mut self, other: &BlockSummary) {
        self.single_hour_blocks += other.single_hour_blocks;
        self.two_hour_blocks += other.two_hour_blocks;
        self.long_blocks += other.long_blocks;
        self.long_block_excess_hours += other.long_block_excess_hours;
    }
}

/// Scans one day row left to right, flushing a block at each gap and at day end.
pub fn analyze_day(row: &[u8]) -> BlockSummary {
    let mut summary = BlockSummary::default();
    let mut run = 0usize;
    for &bit in row {
        if bit == 1 {
            run += 1;
        } else {
            summary.record(run);
            run = 0;
        }
    }
    summary.record(run);
    summary
}

pub fn analyze_blocks(schedule: &[u8], hours_per_day: usize) -> BlockSummary {
    let mut total = BlockSummary::default();
    for row in schedule.chunks(hours_per_day) {
        total.merge(&analyze_day(row));
    }
    total
}

/// Contiguous blocks inside one day row as `(start, length)` pairs
pub fn day_blocks(row: &[u8]) -> Vec<(usize, usize)> {
    let mut blocks = Vec::new();
    let mut start = None;
    for (i, &bit) in row.iter().enumerate() {
        match (bit == 1, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                blocks.push((s, i - s));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        blocks.push((s, row.len() - s));
    }
    blocks
}

/// Sum of preferences at the selected slots
pub fn base_value(schedule: &[u8], preferences: &[f64]) -> f64 {
    schedule
        .iter()
        .zip(preferences)
        .filter(|(&bit, _)| bit == 1)
        .map(|(_, &pref)| pref)
        .sum()
}

/// Signed block-shape adjustment for the enabled flags
pub fn block_adjustment(summary: &BlockSummary, config: &ScheduleConfig, weights: &ScoringWeights) -> f64 {
    let mut adjustment = 0.0;
    if config.penalize_single_hour_blocks {
        adjustment -= summary.single_hour_blocks as f64 * weights.single_hour_block_penalty;
    }
    if config.prefer_two_hour_blocks {
        adjustment += summary.two_hour_blocks as f64 * weights.two_hour_block_bonus;
    }
    if config.penalize_long_blocks {
        adjustment -= summary.long_block_excess_hours as f64 * weights.long_block_penalty;
    }
    adjustment
}

/// True value of a complete schedule: base preference sum plus block-shape terms
pub fn calculate_schedule_value(
    schedule: &[u8],
    preferences: &[f64],
    config: &ScheduleConfig,
    weights: &ScoringWeights,
) -> f64 {
    let summary = analyze_blocks(schedule, config.hours_per_day);
    base_value(schedule, preferences) + block_adjustment(&summary, config, weights)
}
