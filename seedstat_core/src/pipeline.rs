use crate::config::InputConfig;
use crate::error::PipelineError;
use crate::loader::{self, CampaignDir, LoadOutcome, RecordSource};
use crate::metrics;
use crate::report::{self, CampaignReport};
use crate::validator::{self, Validated};
use std::path::Path;
use tracing::info;

/// Runs the whole pipeline over a campaign directory on disk.
pub fn run_pipeline(root: &Path, input: &InputConfig) -> Result<CampaignReport, PipelineError> {
    let campaign = CampaignDir::open(root, input)?;
    run_with_source(&campaign)
}

/// Load, validate, derive and assemble. Fatal errors abort before any
/// report exists; everything else ends up in the report's warnings.
pub fn run_with_source<S: RecordSource + ?Sized>(
    source: &S,
) -> Result<CampaignReport, PipelineError> {
    let LoadOutcome {
        global_state,
        candidates,
        mut warnings,
    } = loader::load(source)?;

    let Validated {
        records,
        warnings: validation_warnings,
    } = validator::validate(candidates);
    warnings.extend(validation_warnings);

    if records.is_empty() {
        return Err(PipelineError::NoRecordsFound(source.location().to_path_buf()));
    }

    let derived = metrics::derive(&records, &global_state);
    let report = report::assemble(&records, &global_state, derived, warnings);
    info!(
        seeds = report.summary().total_seeds,
        bugs = report.summary().total_bugs,
        warnings = report.warnings().len(),
        "campaign report assembled"
    );
    Ok(report)
}
