pub mod config;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod validator;

pub use config::{InputConfig, OutputConfig, SeedstatConfig};
pub use error::{PipelineError, Warning, WarningKind};
pub use loader::{CampaignDir, LoadOutcome, LoadedCandidates, RecordSource};
pub use metrics::{DerivedMetrics, SeriesPoint};
pub use pipeline::{run_pipeline, run_with_source};
pub use record::{GlobalState, OracleVerdict, RawSeedRecord, SeedCandidate, SeedRecord, SeedState};
pub use report::{CampaignReport, ReportSummary};
pub use validator::Validated;
