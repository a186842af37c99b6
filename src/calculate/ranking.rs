//! Team rankings from logged performances.
//!
//! Per test type, athletes are ordered by personal best. The overall
//! ranking averages each athlete's percentile over the test types they
//! have a personal best in.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use super::split::{split_from_time, watts_from_split};
use super::time::{format_time, is_valid_time};
use crate::models::{
    normalize_test_type, AthleteId, OverallRankingRow, PerformanceRecord, RankingRow,
};

/// Percentile of a 0-based position among `count` entries (0 = best).
pub fn percentile_of(index: usize, count: usize) -> f64 {
    if count <= 1 {
        0.0
    } else {
        index as f64 / (count - 1) as f64 * 100.0
    }
}

/// Each athlete's fastest valid time for a test type, fastest first.
///
/// Equal times are ordered by athlete id.
pub fn personal_bests(records: &[PerformanceRecord], test_type: &str) -> Vec<(AthleteId, f64)> {
    let mut bests: HashMap<&AthleteId, f64> = HashMap::new();

    for record in records.iter().filter(|r| r.matches_test_type(test_type)) {
        let seconds = record.seconds();
        if !is_valid_time(seconds) {
            debug!(
                "Skipping record {} for {}: no valid time",
                record.id, record.athlete_id
            );
            continue;
        }
        bests
            .entry(&record.athlete_id)
            .and_modify(|best| *best = best.min(seconds))
            .or_insert(seconds);
    }

    let mut sorted: Vec<(AthleteId, f64)> = bests
        .into_iter()
        .map(|(id, best)| (id.clone(), best))
        .collect();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

/// Ranking for a single test type. Athletes without a valid time are absent.
pub fn rank_test_type(records: &[PerformanceRecord], test_type: &str) -> Vec<RankingRow> {
    let bests = personal_bests(records, test_type);
    let count = bests.len();

    bests
        .into_iter()
        .enumerate()
        .map(|(index, (athlete_id, best_time))| {
            let split = split_from_time(best_time, test_type);
            RankingRow {
                athlete_id,
                athlete_name: None,
                best_time,
                best_time_display: format_time(best_time),
                split,
                watts: split.and_then(watts_from_split),
                rank: index as u32 + 1,
                percentile: percentile_of(index, count),
            }
        })
        .collect()
}

/// Test types with at least one valid time, normalized and sorted.
pub fn test_types_with_results(records: &[PerformanceRecord]) -> Vec<String> {
    records
        .iter()
        .filter(|r| r.is_completed())
        .map(|r| normalize_test_type(&r.test_type))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Combined ranking across every test type with results.
///
/// Athletes with no qualifying test are left out rather than ranked last.
pub fn rank_overall(records: &[PerformanceRecord]) -> Vec<OverallRankingRow> {
    let mut per_athlete: HashMap<AthleteId, BTreeMap<String, f64>> = HashMap::new();

    for test_type in test_types_with_results(records) {
        for row in rank_test_type(records, &test_type) {
            per_athlete
                .entry(row.athlete_id)
                .or_default()
                .insert(test_type.clone(), row.percentile);
        }
    }

    let mut rows: Vec<OverallRankingRow> = per_athlete
        .into_iter()
        .filter(|(_, per_test)| !per_test.is_empty())
        .map(|(athlete_id, per_test)| {
            let tests_counted = per_test.len() as u32;
            let average_percentile = per_test.values().sum::<f64>() / per_test.len() as f64;
            OverallRankingRow {
                athlete_id,
                athlete_name: None,
                average_percentile,
                tests_counted,
                per_test,
                rank: 0,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.average_percentile
            .total_cmp(&b.average_percentile)
            .then_with(|| a.athlete_id.cmp(&b.athlete_id))
    });
    for (index, row) in rows.iter_mut().enumerate() {
        row.rank = index as u32 + 1;
    }

    rows
}

/// Attach display names to ranking rows from an id -> name lookup.
pub fn attach_names(rows: &mut [RankingRow], names: &HashMap<AthleteId, String>) {
    for row in rows {
        row.athlete_name = names.get(&row.athlete_id).cloned();
    }
}

/// Attach display names to overall ranking rows.
pub fn attach_overall_names(rows: &mut [OverallRankingRow], names: &HashMap<AthleteId, String>) {
    for row in rows {
        row.athlete_name = names.get(&row.athlete_id).cloned();
    }
}
