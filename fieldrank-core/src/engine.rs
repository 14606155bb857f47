//! Ranking engine orchestrator.
//!
//! Pure computation crate: no async, no HTTP, no IO. The caller fetches
//! every candidate record, hands them over in one call, and writes the
//! returned ranks back itself.
use tracing::debug;

use crate::assign::rank_group;
use crate::grouping::{partition, GroupKey};
use crate::types::{InputRecord, RankingConfig, RankingInput, RankingOutcome};

/// Rank records per group.
///
/// Groups are ranked independently and concatenated in order of first
/// appearance. An empty outcome is valid and means "no valid data".
pub fn calculate_grouped_ranking(input: &RankingInput) -> RankingOutcome {
    RankingEngine::new(input.config).rank(&input.records)
}

/// Holds a ranking configuration and applies it to record sets.
///
/// Stateless between calls; one engine can be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingEngine {
    config: RankingConfig,
}

impl RankingEngine {
    pub fn new(config: RankingConfig) -> Self {
        RankingEngine { config }
    }

    pub fn rank(&self, records: &[InputRecord]) -> RankingOutcome {
        let config = &self.config;
        let mut outcome = RankingOutcome::default();

        for group in partition(records, config.grouping_enabled) {
            let ranked = rank_group(
                &group.members,
                config.sort_direction,
                config.ranking_method,
                config.zero_value_handling,
            );

            debug!(
                group = ?DisplayKey(&group.key),
                members = group.members.len(),
                ranked = ranked.results.len(),
                no_value = ranked.excluded.no_value,
                zero_skipped = ranked.excluded.zero_skipped,
                "ranked group"
            );

            outcome.excluded.add(ranked.excluded);
            if !ranked.results.is_empty() {
                outcome.group_count += 1;
                outcome.results.extend(ranked.results);
            }
        }

        debug!(
            records = records.len(),
            ranked = outcome.results.len(),
            groups = outcome.group_count,
            direction = %config.sort_direction,
            method = %config.ranking_method,
            zero = %config.zero_value_handling,
            "ranking complete"
        );

        outcome
    }
}

struct DisplayKey<'a>(&'a GroupKey);

impl std::fmt::Debug for DisplayKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            GroupKey::Ungrouped => f.write_str("<ungrouped>"),
            GroupKey::Value(v) => write!(f, "{v:?}"),
        }
    }
}
