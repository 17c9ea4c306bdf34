use crate::error::{Warning, WarningKind};
use crate::metrics::{DerivedMetrics, SeriesPoint};
use crate::record::{GlobalState, QueueStats, SeedRecord, bp_to_percent};
use serde::Serialize;
use std::collections::BTreeMap;

/// Scalar rollups over the validated record set.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub total_seeds: usize,
    pub final_coverage_percent: f64,
    pub total_bugs: u64,
    pub max_depth: u32,
    pub initial_seed_count: usize,
    pub mutated_seed_count: usize,
    /// Seeds whose own contribution was non-zero.
    pub coverage_increasing_seeds: usize,
    /// Seeds per recorded processing state. Records without a state are not counted.
    pub state_counts: BTreeMap<String, usize>,
    /// `total_coverage` from the global state, as a percentage.
    pub recorded_coverage_percent: f64,
    pub last_allocated_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_fuzzing_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_stats: Option<QueueStats>,
}

/// The finished, read-only report handed to the presentation layer.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CampaignReport {
    coverage_series: Vec<SeriesPoint<f64>>,
    increase_series: Vec<SeriesPoint<f64>>,
    bug_series: Vec<SeriesPoint<u64>>,
    depth_histogram: BTreeMap<u32, usize>,
    summary: ReportSummary,
    warnings: Vec<Warning>,
}

impl CampaignReport {
    pub fn coverage_series(&self) -> &[SeriesPoint<f64>] {
        &self.coverage_series
    }

    pub fn increase_series(&self) -> &[SeriesPoint<f64>] {
        &self.increase_series
    }

    pub fn bug_series(&self) -> &[SeriesPoint<u64>] {
        &self.bug_series
    }

    pub fn depth_histogram(&self) -> &BTreeMap<u32, usize> {
        &self.depth_histogram
    }

    pub fn summary(&self) -> &ReportSummary {
        &self.summary
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Number of warnings of each kind, for operator summaries.
    pub fn warning_counts(&self) -> BTreeMap<WarningKind, usize> {
        let mut counts = BTreeMap::new();
        for warning in &self.warnings {
            *counts.entry(warning.kind).or_insert(0) += 1;
        }
        counts
    }
}

/// Packages derived metrics and scalar rollups into a report.
///
/// `warnings` are the load and validation warnings; the deriver's own
/// warnings are appended after them.
pub fn assemble(
    records: &[SeedRecord],
    global_state: &GlobalState,
    metrics: DerivedMetrics,
    mut warnings: Vec<Warning>,
) -> CampaignReport {
    let initial_seed_count = records.iter().filter(|r| r.is_initial()).count();
    let mut state_counts = BTreeMap::new();
    for state in records.iter().filter_map(|r| r.state.as_ref()) {
        *state_counts.entry(state.to_string()).or_insert(0) += 1;
    }

    let summary = ReportSummary {
        total_seeds: records.len(),
        final_coverage_percent: metrics.final_coverage_percent(),
        total_bugs: metrics.total_bugs(),
        max_depth: records.iter().map(|r| r.depth).max().unwrap_or(0),
        initial_seed_count,
        mutated_seed_count: records.len() - initial_seed_count,
        coverage_increasing_seeds: records.iter().filter(|r| r.cov_incr > 0).count(),
        state_counts,
        recorded_coverage_percent: bp_to_percent(global_state.total_coverage),
        last_allocated_id: global_state.last_allocated_id,
        current_fuzzing_id: global_state.current_fuzzing_id,
        queue_stats: global_state.queue_stats,
    };

    let DerivedMetrics {
        coverage_series,
        increase_series,
        bug_series,
        depth_histogram,
        warnings: derive_warnings,
    } = metrics;
    warnings.extend(derive_warnings);

    CampaignReport {
        coverage_series,
        increase_series,
        bug_series,
        depth_histogram,
        summary,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::test_utils::{global, raw};
    use crate::metrics::derive;
    use crate::record::{RawSeedRecord, SeedCandidate};

    fn records(raws: Vec<RawSeedRecord>) -> Vec<SeedRecord> {
        raws.into_iter()
            .map(|r| {
                let name = format!("{}.json", r.id.unwrap_or_default());
                SeedRecord::from_candidate(SeedCandidate::new(name, r)).unwrap()
            })
            .collect()
    }

    #[test]
    fn summary_rolls_up_counts() {
        let recs = records(vec![
            RawSeedRecord {
                state: Some("PROCESSED".to_string()),
                ..raw(0, 1000, 1000, 0, "NORMAL")
            },
            RawSeedRecord {
                state: Some("PROCESSED".to_string()),
                ..raw(1, 1000, 0, 0, "NORMAL")
            },
            RawSeedRecord {
                state: Some("CRASH".to_string()),
                ..raw(2, 5000, 4000, 1, "BUG")
            },
            raw(3, 7474, 2474, 4, "BUG"),
        ]);
        let state = GlobalState {
            current_fuzzing_id: Some(3),
            ..global(3, 7474)
        };
        let metrics = derive(&recs, &state);
        let report = assemble(&recs, &state, metrics, Vec::new());
        let summary = report.summary();

        assert_eq!(summary.total_seeds, 4);
        assert_eq!(summary.final_coverage_percent, 74.74);
        assert_eq!(summary.total_bugs, 2);
        assert_eq!(summary.max_depth, 4);
        assert_eq!(summary.initial_seed_count, 2);
        assert_eq!(summary.mutated_seed_count, 2);
        assert_eq!(summary.coverage_increasing_seeds, 3);
        assert_eq!(summary.state_counts.get("PROCESSED"), Some(&2));
        assert_eq!(summary.state_counts.get("CRASH"), Some(&1));
        assert_eq!(summary.state_counts.values().sum::<usize>(), 3);
        assert_eq!(summary.recorded_coverage_percent, 74.74);
        assert_eq!(summary.current_fuzzing_id, Some(3));
        assert!(report.warnings().is_empty());
    }

    #[test]
    fn load_warnings_precede_derivation_warnings() {
        let recs = records(vec![raw(0, 1000, 1000, 0, "NORMAL")]);
        let state = global(0, 2000);
        let metrics = derive(&recs, &state);
        let earlier = vec![
            Warning::new(WarningKind::RecordParseError, "bad").with_source("x.json"),
        ];
        let report = assemble(&recs, &state, metrics, earlier);
        let kinds: Vec<WarningKind> = report.warnings().iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![WarningKind::RecordParseError, WarningKind::ConsistencyMismatch]
        );
        let counts = report.warning_counts();
        assert_eq!(counts.get(&WarningKind::RecordParseError), Some(&1));
        assert_eq!(counts.get(&WarningKind::DuplicateId), None);
    }

    #[test]
    fn report_serializes_boundary_fields() {
        let recs = records(vec![
            raw(0, 1000, 1000, 0, "NORMAL"),
            raw(1, 5000, 4000, 1, "BUG"),
        ]);
        let state = global(1, 5000);
        let report = assemble(&recs, &state, derive(&recs, &state), Vec::new());
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["coverage_series"], serde_json::json!([[0, 10.0], [1, 50.0]]));
        assert_eq!(value["bug_series"], serde_json::json!([[0, 0], [1, 1]]));
        assert_eq!(value["depth_histogram"]["0"], 1);
        assert_eq!(value["depth_histogram"]["1"], 1);
        assert_eq!(value["summary"]["total_bugs"], 1);
        assert!(value["summary"].get("queue_stats").is_none());
        assert_eq!(value["warnings"], serde_json::json!([]));
    }
}
