//! Property-Based Tests for the scheduling core
//!
//! Tests the following invariants:
//! - Exact hours: accepted branch-and-bound schedules select exactly the required hours
//! - Availability: no accepted schedule uses a zero-preference slot
//! - Daily cap: accepted branch-and-bound schedules respect the per-day maximum
//! - Incumbent monotonicity: recorded incumbent values only increase
//! - Half-life floor, score monotonicity, repetition growth

use proptest::prelude::*;

use studyplan_algo::{
    compute_half_life, daily_counts, BranchAndBoundScheduler, DfoConfig, FixedClock,
    HalfLifeInput, HalfLifeParams, PopulationOptimizer, PreferenceVector, ScheduleConfig,
    SeededRandom,
};

const DAYS: usize = 3;
const HOURS: usize = 5;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_small_grid() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(prop_oneof![Just(0.0), Just(2.0), Just(4.0), Just(6.0), Just(9.0)], DAYS * HOURS)
}

fn arb_half_life_input() -> impl Strategy<Value = HalfLifeInput> {
    (
        (-10.0f64..=110.0),            // score
        (0.0f64..=240.0),              // duration
        (0.0f64..=7.0),                // complexity
        (0.0f64..=60.0),               // days since last review
        proptest::option::of(0.0f64..=90.0),
        (1u32..=20u32),                // study count
    )
        .prop_map(|(score, duration, complexity, days, previous, count)| HalfLifeInput {
            score,
            study_duration_minutes: duration,
            task_complexity: complexity,
            days_since_last_review: days,
            previous_half_life: previous,
            study_count: count,
        })
}

fn small_config(required_hours: usize, max_daily_hours: usize) -> ScheduleConfig {
    ScheduleConfig {
        required_hours,
        max_daily_hours,
        time_limit_ms: 10_000,
        num_days: DAYS,
        hours_per_day: HOURS,
        ..ScheduleConfig::default()
    }
}

// ============================================================================
// Branch and Bound
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_branch_and_bound_accepted_schedules_are_valid(
        grid in arb_small_grid(),
        required in 1usize..=4,
        cap in 1usize..=3,
    ) {
        let prefs = PreferenceVector::new(grid.clone(), DAYS * HOURS).unwrap();
        let scheduler = BranchAndBoundScheduler::with_clock(small_config(required, cap), FixedClock(0));

        match scheduler.solve(&prefs) {
            Ok(result) if result.found => {
                prop_assert_eq!(result.selected_hours, required);
                prop_assert!(daily_counts(&result.schedule, HOURS).iter().all(|&c| c <= cap));
                for (i, &bit) in result.schedule.iter().enumerate() {
                    if bit == 1 {
                        prop_assert!(grid[i] > 0.0);
                    }
                }
                let history = &result.stats.incumbent_history;
                prop_assert!(history.windows(2).all(|w| w[0] < w[1]));
                prop_assert_eq!(history.last().copied(), Some(result.value));
            }
            Ok(result) => {
                prop_assert_eq!(result.selected_hours, 0);
                prop_assert_eq!(result.value, 0.0);
            }
            Err(err) => {
                prop_assert!(err.is_unsatisfiable());
                prop_assert!(prefs.available_count() < required);
            }
        }
    }

    #[test]
    fn prop_dfo_never_selects_unavailable_slots(
        grid in arb_small_grid(),
        seed in any::<u64>(),
    ) {
        let prefs = PreferenceVector::new(grid.clone(), DAYS * HOURS).unwrap();
        prop_assume!(prefs.available_count() >= 3);

        let optimizer = PopulationOptimizer::new(DfoConfig {
            num_days: DAYS,
            hours_per_day: HOURS,
            required_hours: 3,
            max_daily_hours: 2,
            population_size: 8,
            generations: 6,
            ..DfoConfig::default()
        });
        let result = optimizer.optimize(&prefs, &mut SeededRandom::new(seed)).unwrap();
        for (i, &bit) in result.solution.iter().enumerate() {
            if bit == 1 {
                prop_assert!(grid[i] > 0.0);
            }
        }
    }
}

// ============================================================================
// Half-Life Regression
// ============================================================================

proptest! {
    #[test]
    fn prop_half_life_floor(input in arb_half_life_input()) {
        let h = compute_half_life(&input, &HalfLifeParams::default());
        prop_assert!(h >= 1.0);
        prop_assert!(h.is_finite());
    }

    #[test]
    fn prop_half_life_monotonic_in_score(
        duration in 30.0f64..=240.0,
        complexity in 1.0f64..=5.0,
    ) {
        let params = HalfLifeParams::default();
        let at = |score: f64| compute_half_life(
            &HalfLifeInput {
                score,
                study_duration_minutes: duration,
                task_complexity: complexity,
                days_since_last_review: 0.0,
                previous_half_life: None,
                study_count: 1,
            },
            &params,
        );
        prop_assert!(at(100.0) > at(50.0));
        prop_assert!(at(50.0) >= at(0.0));
        prop_assert_eq!(at(0.0), 1.0);
    }

    #[test]
    fn prop_repetition_growth(
        score in 60.0f64..=100.0,
        duration in 30.0f64..=240.0,
        complexity in 1.0f64..=5.0,
    ) {
        let params = HalfLifeParams::default();
        let at = |study_count: u32| compute_half_life(
            &HalfLifeInput {
                score,
                study_duration_minutes: duration,
                task_complexity: complexity,
                days_since_last_review: 0.0,
                previous_half_life: None,
                study_count,
            },
            &params,
        );
        prop_assert!(at(3) > at(1));
    }
}
