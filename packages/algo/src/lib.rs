//! # studyplan-algo - 学习计划核心算法库
//!
//! 本 crate 提供纯 Rust 实现的排程与复习算法:
//!
//! - **Branch and Bound** - 精确的最优界优先周计划搜索
//! - **Dispersive Flies Optimisation** - 种群元启发式搜索 + 爬山局部优化
//! - **Half-Life Regression** - 基于测验成绩的间隔复习调度
//!
//! ## 设计理念
//!
//! - **纯函数** - 不做任何 I/O，持久化由调用方负责
//! - **可复现** - 随机数与时钟均可注入
//! - **充分测试** - 所有算法都有单元测试与性质测试
//!
//! ## 模块结构
//!
//! - [`branch_bound`] - 分支定界排程器
//! - [`fitness`] - 元启发式适应度评估
//! - [`hill_climb`] - 爬山局部搜索
//! - [`dfo`] - DFO 种群优化器
//! - [`formatter`] - 排程结果格式化
//! - [`preference`] - 偏好向量生成
//! - [`spaced_repetition`] - 半衰期回归复习调度
//! - [`scoring`] - 时间块分析与排程评分
//! - [`sanitize`] - 输入清洗与校验
//! - [`random`] / [`clock`] - 可注入的随机源与时钟
//! - [`types`] - 公共类型和常量
//!
//! ## 使用示例
//!
//! ```rust
//! use studyplan_algo::{BranchAndBoundScheduler, PreferenceVector, ScheduleConfig};
//!
//! let mut values = vec![0.0; 105];
//! for day in 0..5 {
//!     for local in 1..=4 {
//!         values[day * 15 + local] = 5.0;
//!     }
//! }
//! let prefs = PreferenceVector::weekly(values).unwrap();
//! let config = ScheduleConfig { required_hours: 8, max_daily_hours: 2, ..ScheduleConfig::default() };
//! let result = BranchAndBoundScheduler::new(config).solve(&prefs).unwrap();
//! assert_eq!(result.selected_hours, 8);
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod branch_bound;
pub mod clock;
pub mod dfo;
pub mod error;
pub mod fitness;
pub mod formatter;
pub mod hill_climb;
pub mod preference;
pub mod random;
pub mod sanitize;
pub mod scoring;
pub mod spaced_repetition;
pub mod types;

// ============================================================================
// 重新导出
// ============================================================================

/// 重新导出所有公共类型
pub use types::*;

pub use error::ScheduleError;

pub use clock::{Clock, FixedClock, SteppingClock, SystemClock};
pub use random::{RandomSource, SeededRandom, SequenceRandom};

/// 重新导出分支定界排程器
pub use branch_bound::{BranchAndBoundResult, BranchAndBoundScheduler, SearchStats};

/// 重新导出元启发式组件
pub use dfo::{DfoConfig, OptimizationResult, PopulationOptimizer};
pub use fitness::{
    BonusBreakdown, FitnessConfig, FitnessEvaluator, FitnessReport, FitnessWeights,
    PenaltyBreakdown,
};
pub use hill_climb::{HillClimber, MoveKind};

pub use scoring::{calculate_schedule_value, BlockSummary, ScoringWeights};

pub use preference::{generate_preference_vector, TimeOfDay};

/// 重新导出间隔复习模块
pub use spaced_repetition::{
    compute_half_life, next_review_at, HalfLifeInput, HalfLifeParams, LectureMetadata,
    RepetitionScaling, ReviewSchedule, ReviewScheduler,
};
