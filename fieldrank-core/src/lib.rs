//! fieldrank-core: Pure-computation grouped ranking engine.
//!
//! Records in → per-group standard or dense ranks out.
//! No IO, no HTTP, no storage. The caller fetches the records and writes the ranks back.
//!
//! Records are identified by caller-provided string IDs and carry a raw
//! source value plus an optional raw group value. Values that are not finite
//! numbers are skipped rather than reported as errors.
//!
//! # Quick start
//!
//! ```rust
//! use fieldrank_core::{
//!     calculate_grouped_ranking, InputRecord, RankingConfig, RankingInput, RankingMethod,
//!     SortDirection, ZeroValueHandling,
//! };
//!
//! let input = RankingInput {
//!     records: vec![
//!         InputRecord::new("rec1", 10.0),
//!         InputRecord::new("rec2", 10.0),
//!         InputRecord::new("rec3", 5.0),
//!     ],
//!     config: RankingConfig {
//!         sort_direction: SortDirection::Desc,
//!         ranking_method: RankingMethod::Standard,
//!         zero_value_handling: ZeroValueHandling::IncludeZero,
//!         grouping_enabled: false,
//!     },
//! };
//!
//! let outcome = calculate_grouped_ranking(&input);
//! let ranks: Vec<usize> = outcome.results.iter().map(|r| r.rank).collect();
//! assert_eq!(ranks, vec![1, 1, 3]);
//! assert_eq!(outcome.group_count, 1);
//! ```

pub mod assign;
pub mod engine;
pub mod grouping;
pub mod normalize;
pub mod types;

// Re-export primary public API at crate root.
pub use assign::{assign_ranks, rank_group, GroupRanking};
pub use engine::{calculate_grouped_ranking, RankingEngine};
pub use grouping::{partition, Group, GroupKey};
pub use normalize::normalize;
pub use types::{
    ExclusionCounts, InputRecord, ParseConfigError, RankResult, RankingConfig, RankingInput,
    RankingMethod, RankingOutcome, RawValue, SortDirection, ZeroValueHandling,
};
