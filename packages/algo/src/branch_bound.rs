//! Branch-and-Bound Weekly Scheduler
//!
//! Exact best-bound-first search over a binary decision tree: level `i`
//! decides whether slot `i` is studied. Children are generated lazily when a
//! node is expanded, and a child is only enqueued while its optimistic bound
//! beats the incumbent.
//!
//! Core principles:
//! - Bound = accumulated value + greedy sum of the best remaining slots
//!   (ignores daily caps and block shapes)
//! - A branch whose remaining valid slots cannot cover the missing hours
//!   gets a bound of `-inf` and is dropped
//! - Complete schedules are validated and rescored with block-shape terms
//!   before they may replace the incumbent
//! - Cooperative timeout: the clock is polled once per main-loop iteration

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::ScheduleError;
use crate::sanitize::validate_problem;
use crate::scoring::{calculate_schedule_value, ScoringWeights};
use crate::types::{selected_count, CandidateSchedule, PreferenceVector, ScheduleConfig};

// ==================== Data Structures ====================

/// Partial decision state. Never mutated once created; branching copies.
#[derive(Clone, Debug)]
struct SchedulingNode {
    /// Index of the last decided slot, -1 at the root
    level: isize,
    selected_hours: usize,
    total_value: f64,
    bound: f64,
    schedule: CandidateSchedule,
}

/// Heap entry ordered by bound; ties go to the deeper node, then to the
/// earlier insertion, so flat regions dive to a leaf instead of widening.
struct LiveNode {
    seq: u64,
    node: SchedulingNode,
}

impl PartialEq for LiveNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LiveNode {}

impl PartialOrd for LiveNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LiveNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.node
            .bound
            .total_cmp(&other.node.bound)
            .then_with(|| self.node.level.cmp(&other.node.level))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Search counters, mostly for diagnostics
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub nodes_expanded: u64,
    pub nodes_pruned: u64,
    pub leaves_evaluated: u64,
    /// Incumbent value after each improvement, in discovery order
    pub incumbent_history: Vec<f64>,
    pub timed_out: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchAndBoundResult {
    pub schedule: CandidateSchedule,
    pub value: f64,
    pub selected_hours: usize,
    pub execution_time_ms: i64,
    /// False when no schedule satisfied every constraint within the budget
    pub found: bool,
    pub stats: SearchStats,
}

// ==================== Main Implementation ====================

pub struct BranchAndBoundScheduler<C: Clock = SystemClock> {
    config: ScheduleConfig,
    weights: ScoringWeights,
    clock: C,
}

impl BranchAndBoundScheduler<SystemClock> {
    pub fn new(config: ScheduleConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> BranchAndBoundScheduler<C> {
    pub fn with_clock(config: ScheduleConfig, clock: C) -> Self {
        Self {
            config,
            weights: ScoringWeights::default(),
            clock,
        }
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Runs the search and returns the best schedule found within the time limit.
    ///
    /// Rejects inputs that cannot possibly be satisfied before searching.
    pub fn solve(&self, preferences: &PreferenceVector) -> Result<BranchAndBoundResult, ScheduleError> {
        let total_slots = self.config.total_slots();
        validate_problem(
            preferences,
            total_slots,
            self.config.required_hours,
            self.config.max_daily_hours,
        )?;

        let start = self.clock.now_millis();
        let time_limit = i64::try_from(self.config.time_limit_ms).unwrap_or(i64::MAX);
        let mut search = Search::new(&self.config, &self.weights, preferences.as_slice());

        let mut root = SchedulingNode {
            level: -1,
            selected_hours: 0,
            total_value: 0.0,
            bound: 0.0,
            schedule: vec![0; total_slots],
        };
        root.bound = search.bound(&root);
        search.push(root);

        loop {
            if self.clock.now_millis().saturating_sub(start) > time_limit {
                search.stats.timed_out = true;
                break;
            }
            let Some(live) = search.live.pop() else {
                break;
            };
            search.expand(live.node);
        }

        let execution_time_ms = self.clock.now_millis() - start;
        let result = search.finish(execution_time_ms);

        tracing::debug!(
            found = result.found,
            value = result.value,
            expanded = result.stats.nodes_expanded,
            pruned = result.stats.nodes_pruned,
            timed_out = result.stats.timed_out,
            elapsed_ms = execution_time_ms,
            "branch-and-bound finished"
        );

        Ok(result)
    }
}

// ==================== Search State ====================

struct Search<'a> {
    config: &'a ScheduleConfig,
    weights: &'a ScoringWeights,
    values: &'a [f64],
    /// Slot indices sorted by preference, highest first
    order: Vec<usize>,
    live: BinaryHeap<LiveNode>,
    next_seq: u64,
    best_value: f64,
    incumbent: Option<CandidateSchedule>,
    stats: SearchStats,
}

impl<'a> Search<'a> {
    fn new(config: &'a ScheduleConfig, weights: &'a ScoringWeights, values: &'a [f64]) -> Self {
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

        Self {
            config,
            weights,
            values,
            order,
            live: BinaryHeap::new(),
            next_seq: 0,
            best_value: f64::NEG_INFINITY,
            incumbent: None,
            stats: SearchStats::default(),
        }
    }

    fn push(&mut self, node: SchedulingNode) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.live.push(LiveNode { seq, node });
    }

    /// Optimistic value reachable from `node`
    fn bound(&self, node: &SchedulingNode) -> f64 {
        let required = self.config.required_hours;
        if node.selected_hours >= required {
            return node.total_value;
        }

        let hours_needed = required - node.selected_hours;
        let first_open = (node.level + 1) as usize;
        let mut bound = node.total_value;
        let mut taken = 0;

        for &idx in &self.order {
            if taken == hours_needed {
                break;
            }
            if idx < first_open {
                continue;
            }
            let pref = self.values[idx];
            if pref <= 0.0 {
                break;
            }
            bound += pref;
            taken += 1;
        }

        if taken < hours_needed {
            f64::NEG_INFINITY
        } else {
            bound
        }
    }

    fn expand(&mut self, node: SchedulingNode) {
        // Stale entry: the incumbent improved after this node was queued
        if node.bound <= self.best_value {
            self.stats.nodes_pruned += 1;
            return;
        }

        let slot = (node.level + 1) as usize;
        if slot >= self.values.len() {
            return;
        }
        self.stats.nodes_expanded += 1;

        let hours_per_day = self.config.hours_per_day;
        let day = slot / hours_per_day;
        let day_selected = selected_count(&node.schedule[day * hours_per_day..(day + 1) * hours_per_day]);

        if self.values[slot] > 0.0
            && node.selected_hours < self.config.required_hours
            && day_selected < self.config.max_daily_hours
        {
            let mut schedule = node.schedule.clone();
            schedule[slot] = 1;
            self.consider(SchedulingNode {
                level: slot as isize,
                selected_hours: node.selected_hours + 1,
                total_value: node.total_value + self.values[slot],
                bound: 0.0,
                schedule,
            });
        }

        self.consider(SchedulingNode {
            level: slot as isize,
            selected_hours: node.selected_hours,
            total_value: node.total_value,
            bound: 0.0,
            schedule: node.schedule,
        });
    }

    fn consider(&mut self, mut child: SchedulingNode) {
        let last_level = self.values.len() as isize - 1;
        if child.selected_hours == self.config.required_hours || child.level == last_level {
            self.evaluate_leaf(child.schedule);
            return;
        }

        child.bound = self.bound(&child);
        if child.bound > self.best_value {
            self.push(child);
        } else {
            self.stats.nodes_pruned += 1;
        }
    }

    fn evaluate_leaf(&mut self, schedule: CandidateSchedule) {
        self.stats.leaves_evaluated += 1;
        if !self.is_valid(&schedule) {
            return;
        }

        let value = calculate_schedule_value(&schedule, self.values, self.config, self.weights);
        if value > self.best_value {
            self.best_value = value;
            self.incumbent = Some(schedule);
            self.stats.incumbent_history.push(value);
        }
    }

    fn is_valid(&self, schedule: &[u8]) -> bool {
        if selected_count(schedule) != self.config.required_hours {
            return false;
        }
        let over_cap = schedule
            .chunks(self.config.hours_per_day)
            .any(|row| selected_count(row) > self.config.max_daily_hours);
        if over_cap {
            return false;
        }
        schedule
            .iter()
            .zip(self.values)
            .all(|(&bit, &pref)| bit == 0 || pref > 0.0)
    }

    fn finish(self, execution_time_ms: i64) -> BranchAndBoundResult {
        match self.incumbent {
            Some(schedule) => BranchAndBoundResult {
                selected_hours: selected_count(&schedule),
                schedule,
                value: self.best_value,
                execution_time_ms,
                found: true,
                stats: self.stats,
            },
            None => BranchAndBoundResult {
                schedule: vec![0; self.values.len()],
                value: 0.0,
                selected_hours: 0,
                execution_time_ms,
                found: false,
                stats: self.stats,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, SteppingClock};
    use crate::types::{daily_counts, HOURS_PER_DAY, TOTAL_SLOTS};

    fn scenario_a_preferences() -> PreferenceVector {
        let mut values = vec![0.0; TOTAL_SLOTS];
        for day in 0..5 {
            for local in 1..=4 {
                values[day * HOURS_PER_DAY + local] = 5.0;
            }
        }
        PreferenceVector::weekly(values).unwrap()
    }

    #[test]
    fn test_scenario_a_respects_all_constraints() {
        let config = ScheduleConfig {
            required_hours: 8,
            max_daily_hours: 2,
            time_limit_ms: 5_000,
            ..ScheduleConfig::default()
        };
        let prefs = scenario_a_preferences();
        let result = BranchAndBoundScheduler::new(config).solve(&prefs).unwrap();

        assert!(result.found);
        assert_eq!(result.selected_hours, 8);
        assert!(daily_counts(&result.schedule, HOURS_PER_DAY).iter().all(|&c| c <= 2));
        for (i, &bit) in result.schedule.iter().enumerate() {
            if bit == 1 {
                assert!(prefs.get(i) > 0.0);
            }
        }
        // Four 2-hour blocks: 8 * 5 + 4 * 20
        assert_eq!(result.value, 120.0);
    }

    #[test]
    fn test_prefers_adjacent_pair_over_isolated_peaks() {
        let mut values = vec![0.0; TOTAL_SLOTS];
        values[0] = 9.0;
        values[2] = 9.0;
        values[3] = 5.0;
        values[4] = 5.0;
        let prefs = PreferenceVector::weekly(values).unwrap();
        let config = ScheduleConfig {
            required_hours: 2,
            max_daily_hours: 2,
            time_limit_ms: 5_000,
            ..ScheduleConfig::default()
        };

        let result = BranchAndBoundScheduler::with_clock(config, FixedClock(0))
            .solve(&prefs)
            .unwrap();

        assert!(result.found);
        assert_eq!(result.schedule[2], 1);
        assert_eq!(result.schedule[3], 1);
        assert_eq!(result.value, 34.0);
    }

    #[test]
    fn test_insufficient_availability_is_rejected_before_search() {
        let prefs = PreferenceVector::weekly(vec![0.0; TOTAL_SLOTS]).unwrap();
        let config = ScheduleConfig {
            required_hours: 5,
            ..ScheduleConfig::default()
        };
        let err = BranchAndBoundScheduler::new(config).solve(&prefs).unwrap_err();
        assert!(err.is_unsatisfiable());
    }

    #[test]
    fn test_timeout_returns_empty_incumbent() {
        let prefs = scenario_a_preferences();
        let config = ScheduleConfig {
            required_hours: 8,
            max_daily_hours: 2,
            time_limit_ms: 500,
            ..ScheduleConfig::default()
        };
        let clock = SteppingClock::new(0, 1_000);
        let result = BranchAndBoundScheduler::with_clock(config, &clock)
            .solve(&prefs)
            .unwrap();

        assert!(result.stats.timed_out);
        assert!(!result.found);
        assert_eq!(result.value, 0.0);
        assert_eq!(result.selected_hours, 0);
        assert_eq!(result.schedule.len(), TOTAL_SLOTS);
        assert!(result.execution_time_ms >= 1_000);
    }

    #[test]
    fn test_incumbent_history_is_increasing() {
        let mut values = vec![0.0; TOTAL_SLOTS];
        for (i, v) in values.iter_mut().enumerate().take(30) {
            *v = ((i * 7) % 10 + 1) as f64;
        }
        let prefs = PreferenceVector::weekly(values).unwrap();
        let config = ScheduleConfig {
            required_hours: 4,
            max_daily_hours: 3,
            time_limit_ms: 5_000,
            ..ScheduleConfig::default()
        };
        let result = BranchAndBoundScheduler::with_clock(config, FixedClock(0))
            .solve(&prefs)
            .unwrap();

        assert!(result.found);
        let history = &result.stats.incumbent_history;
        assert!(!history.is_empty());
        assert!(history.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*history.last().unwrap(), result.value);
    }

    #[test]
    fn test_identical_runs_are_reproducible() {
        let prefs = scenario_a_preferences();
        let config = ScheduleConfig {
            required_hours: 6,
            max_daily_hours: 2,
            ..ScheduleConfig::default()
        };
        let a = BranchAndBoundScheduler::with_clock(config.clone(), FixedClock(0))
            .solve(&prefs)
            .unwrap();
        let b = BranchAndBoundScheduler::with_clock(config, FixedClock(0))
            .solve(&prefs)
            .unwrap();
        assert_eq!(a.schedule, b.schedule);
        assert_eq!(a.value, b.value);
    }

    #[test]
    fn test_huge_time_limit_does_not_time_out() {
        let config = ScheduleConfig {
            required_hours: 8,
            max_daily_hours: 2,
            time_limit_ms: u64::MAX,
            ..ScheduleConfig::default()
        };
        let result = BranchAndBoundScheduler::with_clock(config, FixedClock(1_700_000_000_000))
            .solve(&scenario_a_preferences())
            .unwrap();

        assert!(!result.stats.timed_out);
        assert!(result.found);
        assert_eq!(result.value, 120.0);
    }

    #[test]
    fn test_flat_preferences_reach_a_schedule() {
        // Every slot scores 4.0, as for a user with no stored time-of-day preference
        let prefs = PreferenceVector::weekly(vec![4.0; TOTAL_SLOTS]).unwrap();
        let config = ScheduleConfig {
            time_limit_ms: 2_000,
            ..ScheduleConfig::default()
        };
        let clock = SteppingClock::new(0, 1);
        let result = BranchAndBoundScheduler::with_clock(config, &clock)
            .solve(&prefs)
            .unwrap();

        assert!(result.found);
        assert_eq!(result.selected_hours, 14);
        assert!(daily_counts(&result.schedule, HOURS_PER_DAY).iter().all(|&c| c <= 4));
        assert!(result.stats.leaves_evaluated > 0);
    }

    #[test]
    fn test_live_node_ordering_prefers_depth_on_equal_bounds() {
        let node = |level, bound| SchedulingNode {
            level,
            selected_hours: 0,
            total_value: 0.0,
            bound,
            schedule: Vec::new(),
        };
        let mut heap = BinaryHeap::new();
        heap.push(LiveNode { seq: 0, node: node(3, 7.0) });
        heap.push(LiveNode { seq: 1, node: node(9, 7.0) });
        heap.push(LiveNode { seq: 2, node: node(40, 6.0) });
        assert_eq!(heap.pop().unwrap().seq, 1);
        assert_eq!(heap.pop().unwrap().seq, 0);
        assert_eq!(heap.pop().unwrap().seq, 2);
    }

    #[test]
    fn test_live_node_ordering_breaks_ties_by_insertion() {
        let node = |bound| SchedulingNode {
            level: 0,
            selected_hours: 0,
            total_value: 0.0,
            bound,
            schedule: Vec::new(),
        };
        let mut heap = BinaryHeap::new();
        heap.push(LiveNode { seq: 0, node: node(5.0) });
        heap.push(LiveNode { seq: 1, node: node(7.0) });
        heap.push(LiveNode { seq: 2, node: node(7.0) });
        assert_eq!(heap.pop().unwrap().seq, 1);
        assert_eq!(heap.pop().unwrap().seq, 2);
        assert_eq!(heap.pop().unwrap().seq, 0);
    }
}
