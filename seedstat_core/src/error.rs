use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Conditions that abort the pipeline before any report is assembled.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The campaign root does not exist or is not a directory.
    #[error("Campaign directory not found: {0:?}")]
    DirectoryNotFound(PathBuf),

    /// The global state file is absent or could not be parsed.
    #[error("Global state unavailable at {path:?}: {reason}")]
    GlobalStateMissing { path: PathBuf, reason: String },

    /// Loading and validation left no usable seed records.
    #[error("No usable seed records found under {0:?}")]
    NoRecordsFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err.to_string())
    }
}

/// Category of a recoverable or non-fatal finding.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WarningKind {
    /// A seed metadata file could not be read or parsed and was skipped.
    RecordParseError,
    /// A record lacks a required field (skipped) or has an out-of-range value (kept).
    InvalidRecord,
    /// Another record with the same id superseded this one.
    DuplicateId,
    /// The last record's coverage disagrees with the global state.
    ConsistencyMismatch,
    /// Cumulative coverage decreased between consecutive records.
    CoverageRegression,
    /// A record id is higher than the last id the engine allocated.
    IdBeyondAllocation,
    /// `new_cov - old_cov` differs from `cov_incr`.
    IncrementMismatch,
    /// The metadata directory does not exist.
    MetadataDirMissing,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A structured warning attached to the final report.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    /// File the warning concerns, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub detail: String,
}

impl Warning {
    pub fn new(kind: WarningKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            source: None,
            detail: detail.into(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "[{}] {}: {}", self.kind, source, self.detail),
            None => write!(f, "[{}] {}", self.kind, self.detail),
        }
    }
}
