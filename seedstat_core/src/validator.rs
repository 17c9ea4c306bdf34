use crate::error::{Warning, WarningKind};
use crate::record::{FULL_COVERAGE_BP, SeedCandidate, SeedRecord};
use tracing::{debug, warn};

/// Canonically ordered records plus the warnings raised while producing them.
#[derive(Debug, Default)]
pub struct Validated {
    /// Ascending by `id`, no duplicate ids.
    pub records: Vec<SeedRecord>,
    pub warnings: Vec<Warning>,
}

/// Turns raw candidates into the ordered sequence the deriver consumes.
///
/// * A candidate missing a required field is dropped with `InvalidRecord`.
/// * A basis-point field above 10000, or an increment that disagrees with
///   `new_cov - old_cov`, is flagged but the record is kept.
/// * Records are sorted by `(id, source)`. When several share an `id`, the
///   one whose source file name sorts last wins and every other one gets a
///   `DuplicateId` warning.
pub fn validate(candidates: Vec<SeedCandidate>) -> Validated {
    let mut warnings = Vec::new();
    let mut records = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let source = candidate.source.clone();
        match SeedRecord::from_candidate(candidate) {
            Ok(record) => {
                flag_out_of_range(&record, &mut warnings);
                flag_increment_mismatch(&record, &mut warnings);
                records.push(record);
            }
            Err(missing) => {
                warn!(source = %source, ?missing, "dropping record with missing fields");
                warnings.push(
                    Warning::new(
                        WarningKind::InvalidRecord,
                        format!("missing required field(s): {}", missing.join(", ")),
                    )
                    .with_source(source),
                );
            }
        }
    }

    records.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.source.cmp(&b.source)));

    let mut deduped: Vec<SeedRecord> = Vec::with_capacity(records.len());
    for record in records {
        match deduped.last_mut() {
            Some(kept) if kept.id == record.id => {
                warn!(
                    id = record.id,
                    discarded = %kept.source,
                    kept = %record.source,
                    "duplicate seed id"
                );
                warnings.push(
                    Warning::new(
                        WarningKind::DuplicateId,
                        format!("id {} superseded by {}", record.id, record.source),
                    )
                    .with_source(kept.source.clone()),
                );
                *kept = record;
            }
            _ => deduped.push(record),
        }
    }

    debug!(records = deduped.len(), warnings = warnings.len(), "validated seed records");
    Validated {
        records: deduped,
        warnings,
    }
}

fn flag_out_of_range(record: &SeedRecord, warnings: &mut Vec<Warning>) {
    let fields = [
        ("new_cov", Some(record.new_cov)),
        ("cov_incr", Some(record.cov_incr)),
        ("old_cov", record.old_cov),
    ];
    for (name, value) in fields {
        if let Some(bp) = value.filter(|bp| *bp > FULL_COVERAGE_BP) {
            warn!(id = record.id, field = name, value = bp, "basis-point value out of range");
            warnings.push(
                Warning::new(
                    WarningKind::InvalidRecord,
                    format!(
                        "id {}: {} = {} exceeds {} basis points",
                        record.id, name, bp, FULL_COVERAGE_BP
                    ),
                )
                .with_source(record.source.clone()),
            );
        }
    }
}

fn flag_increment_mismatch(record: &SeedRecord, warnings: &mut Vec<Warning>) {
    let Some(old_cov) = record.old_cov else {
        return;
    };
    let expected = record.new_cov.saturating_sub(old_cov);
    if expected != record.cov_incr {
        warn!(id = record.id, expected, cov_incr = record.cov_incr, "coverage increment mismatch");
        warnings.push(
            Warning::new(
                WarningKind::IncrementMismatch,
                format!(
                    "id {}: cov_incr = {} but new_cov - old_cov = {}",
                    record.id, record.cov_incr, expected
                ),
            )
            .with_source(record.source.clone()),
        );
    }
}
