use crate::error::{Warning, WarningKind};
use crate::record::{GlobalState, SeedRecord, bp_to_percent};
use std::collections::BTreeMap;
use tracing::warn;

/// One point of a per-seed series: `(seed_id, value)`.
pub type SeriesPoint<T> = (u64, T);

/// Series and checks computed from the ordered record sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedMetrics {
    /// Cumulative coverage percentage after each seed.
    pub coverage_series: Vec<SeriesPoint<f64>>,
    /// Each seed's own coverage contribution in percent.
    pub increase_series: Vec<SeriesPoint<f64>>,
    /// Running count of `BUG` verdicts, one value per seed.
    pub bug_series: Vec<SeriesPoint<u64>>,
    /// Number of seeds at each mutation depth.
    pub depth_histogram: BTreeMap<u32, usize>,
    pub warnings: Vec<Warning>,
}

impl DerivedMetrics {
    pub fn total_bugs(&self) -> u64 {
        self.bug_series.last().map_or(0, |(_, bugs)| *bugs)
    }

    pub fn final_coverage_percent(&self) -> f64 {
        self.coverage_series.last().map_or(0.0, |(_, cov)| *cov)
    }
}

/// Computes every derived series from records already in ascending `id`
/// order. Pure: the output depends only on the arguments.
///
/// Per-record `new_cov` is taken as authoritative; cumulative coverage is
/// never rebuilt from increments and a decrease is reported, not repaired.
pub fn derive(records: &[SeedRecord], global_state: &GlobalState) -> DerivedMetrics {
    let mut metrics = DerivedMetrics {
        coverage_series: Vec::with_capacity(records.len()),
        increase_series: Vec::with_capacity(records.len()),
        bug_series: Vec::with_capacity(records.len()),
        ..Default::default()
    };

    let mut bugs = 0u64;
    let mut previous: Option<&SeedRecord> = None;
    for record in records {
        metrics
            .coverage_series
            .push((record.id, bp_to_percent(record.new_cov)));
        metrics
            .increase_series
            .push((record.id, bp_to_percent(record.cov_incr)));

        if record.oracle_verdict.is_bug() {
            bugs += 1;
        }
        metrics.bug_series.push((record.id, bugs));

        *metrics.depth_histogram.entry(record.depth).or_insert(0) += 1;

        if let Some(prev) = previous.filter(|prev| record.new_cov < prev.new_cov) {
            warn!(
                previous_id = prev.id,
                id = record.id,
                from = prev.new_cov,
                to = record.new_cov,
                "cumulative coverage decreased"
            );
            metrics.warnings.push(
                Warning::new(
                    WarningKind::CoverageRegression,
                    format!(
                        "coverage fell from {} bp at id {} to {} bp at id {}",
                        prev.new_cov, prev.id, record.new_cov, record.id
                    ),
                )
                .with_source(record.source.clone()),
            );
        }

        if record.id > global_state.last_allocated_id {
            warn!(
                id = record.id,
                last_allocated_id = global_state.last_allocated_id,
                "seed id beyond last allocated id"
            );
            metrics.warnings.push(
                Warning::new(
                    WarningKind::IdBeyondAllocation,
                    format!(
                        "id {} exceeds last_allocated_id {}",
                        record.id, global_state.last_allocated_id
                    ),
                )
                .with_source(record.source.clone()),
            );
        }

        previous = Some(record);
    }

    if let Some(last) = records.last() {
        if last.new_cov != global_state.total_coverage {
            warn!(
                derived = last.new_cov,
                recorded = global_state.total_coverage,
                "final coverage disagrees with global state"
            );
            metrics.warnings.push(Warning::new(
                WarningKind::ConsistencyMismatch,
                format!(
                    "final seed coverage {} bp ({:.2}%) at id {} differs from global state total_coverage {} bp ({:.2}%)",
                    last.new_cov,
                    bp_to_percent(last.new_cov),
                    last.id,
                    global_state.total_coverage,
                    bp_to_percent(global_state.total_coverage)
                ),
            ));
        }
    }

    metrics
}
