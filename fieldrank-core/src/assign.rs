//! Tie-aware rank assignment within a single group.
use crate::normalize::normalize;
use crate::types::{
    ExclusionCounts, InputRecord, RankResult, RankingMethod, SortDirection, ZeroValueHandling,
};

/// Ranks of one group plus what was left out of it.
#[derive(Debug, Clone, Default)]
pub struct GroupRanking {
    /// In sorted order.
    pub results: Vec<RankResult>,
    pub excluded: ExclusionCounts,
}

/// Rank the members of one group.
///
/// Members without an effective value (and zeros under `SkipZero`) are
/// dropped before sorting and never consume a rank. The sort is stable, so
/// tied members keep their input order.
pub fn rank_group(
    members: &[&InputRecord],
    sort_direction: SortDirection,
    ranking_method: RankingMethod,
    zero_value_handling: ZeroValueHandling,
) -> GroupRanking {
    let mut excluded = ExclusionCounts::default();
    let mut scored: Vec<(&InputRecord, f64)> = Vec::with_capacity(members.len());

    for &record in members {
        let Some(value) = normalize(&record.source_value) else {
            excluded.no_value += 1;
            continue;
        };
        if zero_value_handling == ZeroValueHandling::SkipZero && value == 0.0 {
            excluded.zero_skipped += 1;
            continue;
        }
        scored.push((record, value));
    }

    // Values are finite and zero is canonical, so total_cmp matches numeric order.
    match sort_direction {
        SortDirection::Asc => scored.sort_by(|a, b| a.1.total_cmp(&b.1)),
        SortDirection::Desc => scored.sort_by(|a, b| b.1.total_cmp(&a.1)),
    }

    let ranks = assign_ranks(scored.iter().map(|&(_, v)| v), ranking_method);
    let results = scored
        .iter()
        .zip(ranks)
        .map(|(&(record, _), rank)| RankResult {
            record_id: record.record_id.clone(),
            rank,
        })
        .collect();

    GroupRanking { results, excluded }
}

/// Assign ranks to values that are already in sorted order.
///
/// Standard: a new value takes its 1-based position (1,2,2,4).
/// Dense: a new value takes the previous rank + 1 (1,2,2,3).
pub fn assign_ranks(sorted_values: impl IntoIterator<Item = f64>, method: RankingMethod) -> Vec<usize> {
    let mut ranks = Vec::new();
    let mut current_rank = 0;
    let mut previous_value: Option<f64> = None;

    for (i, value) in sorted_values.into_iter().enumerate() {
        let position = i + 1;
        if previous_value != Some(value) {
            current_rank = match method {
                RankingMethod::Standard => position,
                RankingMethod::Dense => current_rank + 1,
            };
            previous_value = Some(value);
        }
        ranks.push(current_rank);
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawValue;

    fn records(values: &[(&str, f64)]) -> Vec<InputRecord> {
        values.iter().map(|&(id, v)| InputRecord::new(id, v)).collect()
    }

    fn ranked(
        records: &[InputRecord],
        direction: SortDirection,
        method: RankingMethod,
        zero: ZeroValueHandling,
    ) -> Vec<(String, usize)> {
        let members: Vec<&InputRecord> = records.iter().collect();
        rank_group(&members, direction, method, zero)
            .results
            .into_iter()
            .map(|r| (r.record_id, r.rank))
            .collect()
    }

    fn pairs(expected: &[(&str, usize)]) -> Vec<(String, usize)> {
        expected.iter().map(|&(id, r)| (id.to_string(), r)).collect()
    }

    #[test]
    fn test_assign_standard() {
        assert_eq!(assign_ranks([10.0, 8.0, 8.0, 5.0], RankingMethod::Standard), vec![1, 2, 2, 4]);
        assert_eq!(assign_ranks([1.0, 1.0, 1.0], RankingMethod::Standard), vec![1, 1, 1]);
    }

    #[test]
    fn test_assign_dense() {
        assert_eq!(assign_ranks([10.0, 8.0, 8.0, 5.0], RankingMethod::Dense), vec![1, 2, 2, 3]);
        assert_eq!(assign_ranks([3.0, 3.0, 2.0, 2.0, 1.0], RankingMethod::Dense), vec![1, 1, 2, 2, 3]);
    }

    #[test]
    fn test_assign_empty() {
        assert!(assign_ranks(std::iter::empty(), RankingMethod::Dense).is_empty());
    }

    #[test]
    fn test_desc_standard_with_tie() {
        let recs = records(&[("a", 10.0), ("b", 10.0), ("c", 5.0)]);
        let out = ranked(&recs, SortDirection::Desc, RankingMethod::Standard, ZeroValueHandling::IncludeZero);
        assert_eq!(out, pairs(&[("a", 1), ("b", 1), ("c", 3)]));
    }

    #[test]
    fn test_desc_dense_with_tie() {
        let recs = records(&[("a", 10.0), ("b", 10.0), ("c", 5.0)]);
        let out = ranked(&recs, SortDirection::Desc, RankingMethod::Dense, ZeroValueHandling::IncludeZero);
        assert_eq!(out, pairs(&[("a", 1), ("b", 1), ("c", 2)]));
    }

    #[test]
    fn test_asc_orders_smallest_first() {
        let recs = records(&[("a", 3.0), ("b", -1.0), ("c", 2.5)]);
        let out = ranked(&recs, SortDirection::Asc, RankingMethod::Standard, ZeroValueHandling::IncludeZero);
        assert_eq!(out, pairs(&[("b", 1), ("c", 2), ("a", 3)]));
    }

    #[test]
    fn test_skip_zero_excludes_and_counts() {
        let recs = records(&[("a", 0.0), ("b", 5.0)]);
        let members: Vec<&InputRecord> = recs.iter().collect();
        let group = rank_group(&members, SortDirection::Asc, RankingMethod::Standard, ZeroValueHandling::SkipZero);
        assert_eq!(group.results, vec![RankResult { record_id: "b".into(), rank: 1 }]);
        assert_eq!(group.excluded.zero_skipped, 1);
        assert_eq!(group.excluded.no_value, 0);
    }

    #[test]
    fn test_include_zero_ranks_zero() {
        let recs = records(&[("a", 0.0), ("b", 5.0), ("c", -0.0)]);
        let out = ranked(&recs, SortDirection::Asc, RankingMethod::Standard, ZeroValueHandling::IncludeZero);
        // -0 and 0 tie and keep input order.
        assert_eq!(out, pairs(&[("a", 1), ("c", 1), ("b", 3)]));
    }

    #[test]
    fn test_unusable_values_do_not_consume_rank() {
        let recs = vec![
            InputRecord::new("a", 9.0),
            InputRecord::new("b", RawValue::Null),
            InputRecord::new("c", "n/a"),
            InputRecord::new("d", 4.0),
            InputRecord::new("e", f64::NAN),
        ];
        let members: Vec<&InputRecord> = recs.iter().collect();
        let group = rank_group(&members, SortDirection::Desc, RankingMethod::Standard, ZeroValueHandling::IncludeZero);
        let ids: Vec<(&str, usize)> = group.results.iter().map(|r| (r.record_id.as_str(), r.rank)).collect();
        assert_eq!(ids, vec![("a", 1), ("d", 2)]);
        assert_eq!(group.excluded.no_value, 3);
    }

    #[test]
    fn test_stable_ties_keep_input_order() {
        let recs = records(&[("z", 1.0), ("y", 2.0), ("x", 1.0), ("w", 2.0)]);
        let out = ranked(&recs, SortDirection::Desc, RankingMethod::Standard, ZeroValueHandling::IncludeZero);
        assert_eq!(out, pairs(&[("y", 1), ("w", 1), ("z", 3), ("x", 3)]));
    }

    #[test]
    fn test_duplicate_ids_ranked_independently() {
        let recs = records(&[("dup", 3.0), ("dup", 1.0)]);
        let out = ranked(&recs, SortDirection::Desc, RankingMethod::Dense, ZeroValueHandling::IncludeZero);
        assert_eq!(out, pairs(&[("dup", 1), ("dup", 2)]));
    }

    #[test]
    fn test_multi_value_uses_first() {
        let recs = vec![
            InputRecord::new("a", vec![1.0, 100.0]),
            InputRecord::new("b", vec![2.0]),
        ];
        let out = ranked(&recs, SortDirection::Desc, RankingMethod::Standard, ZeroValueHandling::IncludeZero);
        assert_eq!(out, pairs(&[("b", 1), ("a", 2)]));
    }
}
