use crate::config::InputConfig;
use crate::error::{PipelineError, Warning, WarningKind};
use crate::record::{GlobalState, RawSeedRecord, SeedCandidate};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Everything the loader produced: the global state, the raw candidates in
/// the order they were read, and one warning per skipped file.
#[derive(Debug)]
pub struct LoadOutcome {
    pub global_state: GlobalState,
    pub candidates: Vec<SeedCandidate>,
    pub warnings: Vec<Warning>,
}

/// Candidates read by a [`RecordSource`] plus the warnings for files it skipped.
#[derive(Debug, Default)]
pub struct LoadedCandidates {
    pub candidates: Vec<SeedCandidate>,
    pub warnings: Vec<Warning>,
}

/// A read-only snapshot of campaign output.
///
/// The filesystem layout is the only production implementation; the trait
/// lets the rest of the pipeline be driven from memory.
pub trait RecordSource {
    /// Human-readable location of the campaign, used in error messages.
    fn location(&self) -> &Path;

    /// Loads the single global state record. Any failure is fatal.
    fn load_global_state(&self) -> Result<GlobalState, PipelineError>;

    /// Loads every per-seed record it can. A file that cannot be parsed is
    /// reported as a warning and left out of the result.
    fn load_candidates(&self) -> Result<LoadedCandidates, PipelineError>;
}

/// Loads the global state first and only then the seed records, so a
/// missing global state aborts before any seed file is touched.
pub fn load<S: RecordSource + ?Sized>(source: &S) -> Result<LoadOutcome, PipelineError> {
    let global_state = source.load_global_state()?;
    let LoadedCandidates {
        candidates,
        warnings,
    } = source.load_candidates()?;
    debug!(
        location = ?source.location(),
        candidates = candidates.len(),
        skipped = warnings.len(),
        "loaded seed record candidates"
    );
    Ok(LoadOutcome {
        global_state,
        candidates,
        warnings,
    })
}

/// Campaign output directory laid out as
/// `<root>/metadata/*.json` and `<root>/state/global_state.json`.
#[derive(Debug, Clone)]
pub struct CampaignDir {
    root: PathBuf,
    metadata_dir: PathBuf,
    state_file: PathBuf,
    record_suffix: String,
}

impl CampaignDir {
    /// Opens a campaign root. Fails with `DirectoryNotFound` unless `root`
    /// is an existing directory.
    pub fn open(root: &Path, input: &InputConfig) -> Result<Self, PipelineError> {
        if !root.is_dir() {
            return Err(PipelineError::DirectoryNotFound(root.to_path_buf()));
        }
        Ok(Self {
            root: root.to_path_buf(),
            metadata_dir: root.join(&input.metadata_dir),
            state_file: root.join(&input.state_file),
            record_suffix: format!(".{}", input.record_extension.trim_start_matches('.')),
        })
    }

    pub fn metadata_dir(&self) -> &Path {
        &self.metadata_dir
    }

    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    fn is_record_file(&self, file_name: &str) -> bool {
        !file_name.starts_with('.')
            && file_name.len() > self.record_suffix.len()
            && file_name.ends_with(&self.record_suffix)
    }

    /// Record file paths in the metadata directory, sorted by file name so
    /// the load order does not depend on the filesystem.
    fn record_paths(&self) -> Result<Vec<(String, PathBuf)>, PipelineError> {
        let entries = fs::read_dir(&self.metadata_dir).map_err(|e| {
            PipelineError::Io(format!(
                "Failed to read metadata directory {:?}: {}",
                self.metadata_dir, e
            ))
        })?;
        let mut paths = Vec::new();
        for entry_result in entries {
            let entry = entry_result.map_err(|e| {
                PipelineError::Io(format!(
                    "Error reading entry in {:?}: {}",
                    self.metadata_dir, e
                ))
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if self.is_record_file(&file_name) {
                paths.push((file_name, path));
            }
        }
        paths.sort();
        Ok(paths)
    }
}

fn parse_record_file(path: &Path) -> Result<RawSeedRecord, String> {
    let bytes = fs::read(path).map_err(|e| format!("read failed: {}", e))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("invalid record JSON: {}", e))
}

impl RecordSource for CampaignDir {
    fn location(&self) -> &Path {
        &self.root
    }

    fn load_global_state(&self) -> Result<GlobalState, PipelineError> {
        let missing = |reason: String| PipelineError::GlobalStateMissing {
            path: self.state_file.clone(),
            reason,
        };
        let bytes = fs::read(&self.state_file).map_err(|e| missing(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| missing(format!("invalid JSON: {}", e)))
    }

    fn load_candidates(&self) -> Result<LoadedCandidates, PipelineError> {
        let mut loaded = LoadedCandidates::default();
        if !self.metadata_dir.is_dir() {
            warn!(path = ?self.metadata_dir, "metadata directory not found");
            loaded.warnings.push(Warning::new(
                WarningKind::MetadataDirMissing,
                format!("metadata directory not found: {:?}", self.metadata_dir),
            ));
            return Ok(loaded);
        }

        for (file_name, path) in self.record_paths()? {
            match parse_record_file(&path) {
                Ok(record) => loaded.candidates.push(SeedCandidate::new(file_name, record)),
                Err(reason) => {
                    warn!(path = ?path, %reason, "skipping unreadable seed record");
                    loaded.warnings.push(
                        Warning::new(WarningKind::RecordParseError, reason).with_source(file_name),
                    );
                }
            }
        }
        Ok(loaded)
    }
}
