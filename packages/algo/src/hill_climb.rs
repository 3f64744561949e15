//! Hill Climbing Local Search
//!
//! Best-improvement refinement of a single schedule. Every iteration draws a
//! few random neighbours, keeps the best one if it strictly improves
//! fitness, and gives up after a run of non-improving iterations.
//!
//! Neighbour moves:
//! - Swap: drop one selected slot, pick up one free slot
//! - Block swap: two days trade the offsets of equally long blocks
//! - Shift: one selected hour moves to an adjacent free hour
//!
//! Neighbours whose selected-hour count differs from the input are discarded.

use crate::fitness::FitnessEvaluator;
use crate::random::RandomSource;
use crate::scoring::day_blocks;
use crate::types::{selected_count, CandidateSchedule};

pub const DEFAULT_MAX_NEIGHBORS: usize = 2;
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKind {
    Swap,
    BlockSwap,
    Shift,
}

impl MoveKind {
    const ALL: [MoveKind; 3] = [MoveKind::Swap, MoveKind::BlockSwap, MoveKind::Shift];
}

pub struct HillClimber<'a> {
    evaluator: &'a FitnessEvaluator,
    preferences: &'a [f64],
    max_neighbors: usize,
    max_iterations: usize,
}

impl<'a> HillClimber<'a> {
    pub fn new(evaluator: &'a FitnessEvaluator, preferences: &'a [f64]) -> Self {
        Self {
            evaluator,
            preferences,
            max_neighbors: DEFAULT_MAX_NEIGHBORS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_limits(mut self, max_neighbors: usize, max_iterations: usize) -> Self {
        self.max_neighbors = max_neighbors.max(1);
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Refines `schedule` to a local optimum; the selected-hour count is preserved.
    pub fn climb<R: RandomSource + ?Sized>(&self, schedule: &[u8], rng: &mut R) -> CandidateSchedule {
        let target_hours = selected_count(schedule);
        let mut current = schedule.to_vec();
        let mut current_fitness = self.evaluator.fitness(&current, self.preferences);
        let mut stale = 0;

        while stale < self.max_iterations {
            let mut best: Option<(CandidateSchedule, f64)> = None;

            for _ in 0..self.max_neighbors {
                let kind = MoveKind::ALL[rng.next_index(MoveKind::ALL.len())];
                let Some(candidate) = self.neighbor(&current, kind, rng) else {
                    continue;
                };
                if selected_count(&candidate) != target_hours {
                    continue;
                }
                let fitness = self.evaluator.fitness(&candidate, self.preferences);
                if best.as_ref().map_or(true, |(_, f)| fitness > *f) {
                    best = Some((candidate, fitness));
                }
            }

            match best {
                Some((candidate, fitness)) if fitness > current_fitness => {
                    current = candidate;
                    current_fitness = fitness;
                    stale = 0;
                }
                _ => stale += 1,
            }
        }

        current
    }

    pub fn neighbor<R: RandomSource + ?Sized>(
        &self,
        current: &[u8],
        kind: MoveKind,
        rng: &mut R,
    ) -> Option<CandidateSchedule> {
        match kind {
            MoveKind::Swap => swap_move(current, rng),
            MoveKind::BlockSwap => block_swap_move(current, self.hours_per_day(), rng),
            MoveKind::Shift => shift_move(current, self.hours_per_day(), rng),
        }
    }

    fn hours_per_day(&self) -> usize {
        self.evaluator.config().hours_per_day
    }
}

// ==================== Moves ====================

fn swap_move<R: RandomSource + ?Sized>(current: &[u8], rng: &mut R) -> Option<CandidateSchedule> {
    let (selected, free): (Vec<usize>, Vec<usize>) = (0..current.len()).partition(|&i| current[i] == 1);
    if selected.is_empty() || free.is_empty() {
        return None;
    }
    let off = selected[rng.next_index(selected.len())];
    let on = free[rng.next_index(free.len())];

    let mut next = current.to_vec();
    next[off] = 0;
    next[on] = 1;
    Some(next)
}

fn block_swap_move<R: RandomSource + ?Sized>(
    current: &[u8],
    hours_per_day: usize,
    rng: &mut R,
) -> Option<CandidateSchedule> {
    let num_days = current.len() / hours_per_day;
    if num_days < 2 {
        return None;
    }
    let day_a = rng.next_index(num_days);
    let mut day_b = rng.next_index(num_days - 1);
    if day_b >= day_a {
        day_b += 1;
    }

    let base_a = day_a * hours_per_day;
    let base_b = day_b * hours_per_day;
    let blocks_a = day_blocks(&current[base_a..base_a + hours_per_day]);
    let blocks_b = day_blocks(&current[base_b..base_b + hours_per_day]);

    let pairs: Vec<(usize, usize, usize)> = blocks_a
        .iter()
        .flat_map(|&(start_a, len_a)| {
            blocks_b
                .iter()
                .filter(move |&&(start_b, len_b)| len_b == len_a && start_b != start_a)
                .map(move |&(start_b, _)| (start_a, start_b, len_a))
        })
        .collect();
    if pairs.is_empty() {
        return None;
    }
    let (start_a, start_b, len) = pairs[rng.next_index(pairs.len())];

    let mut next = current.to_vec();
    next[base_a + start_a..base_a + start_a + len].fill(0);
    next[base_b + start_b..base_b + start_b + len].fill(0);
    next[base_a + start_b..base_a + start_b + len].fill(1);
    next[base_b + start_a..base_b + start_a + len].fill(1);
    Some(next)
}

fn shift_move<R: RandomSource + ?Sized>(
    current: &[u8],
    hours_per_day: usize,
    rng: &mut R,
) -> Option<CandidateSchedule> {
    let num_days = current.len() / hours_per_day;
    if num_days == 0 {
        return None;
    }
    let day = rng.next_index(num_days);
    let base = day * hours_per_day;
    let hours: Vec<usize> = (0..hours_per_day).filter(|&h| current[base + h] == 1).collect();
    if hours.is_empty() {
        return None;
    }
    let hour = hours[rng.next_index(hours.len())];
    let target = if rng.next_bool(0.5) {
        hour.checked_sub(1)?
    } else {
        hour + 1
    };
    if target >= hours_per_day || current[base + target] == 1 {
        return None;
    }

    let mut next = current.to_vec();
    next[base + hour] = 0;
    next[base + target] = 1;
    Some(next)
}
