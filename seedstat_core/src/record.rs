use serde::{Deserialize, Serialize};
use std::fmt;

/// Basis-point value representing 100% coverage.
pub const FULL_COVERAGE_BP: u64 = 10_000;

/// Converts basis points (10000 = 100%) to a percentage.
pub fn bp_to_percent(bp: u64) -> f64 {
    bp as f64 / 100.0
}

/// Outcome the campaign's bug-detection logic assigned to a seed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OracleVerdict {
    Bug,
    Normal,
    Skipped,
    /// The record carried no verdict at all.
    #[default]
    Unknown,
    /// A verdict string this tool does not recognise. Never counted as a bug.
    Other(String),
}

impl OracleVerdict {
    pub fn is_bug(&self) -> bool {
        matches!(self, OracleVerdict::Bug)
    }
}

impl From<&str> for OracleVerdict {
    fn from(raw: &str) -> Self {
        match raw {
            "BUG" => OracleVerdict::Bug,
            "NORMAL" => OracleVerdict::Normal,
            "SKIPPED" => OracleVerdict::Skipped,
            "" => OracleVerdict::Unknown,
            other => OracleVerdict::Other(other.to_string()),
        }
    }
}

/// Processing state the engine recorded for a seed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SeedState {
    Pending,
    Processed,
    Crash,
    Timeout,
    Other(String),
}

impl SeedState {
    pub fn as_str(&self) -> &str {
        match self {
            SeedState::Pending => "PENDING",
            SeedState::Processed => "PROCESSED",
            SeedState::Crash => "CRASH",
            SeedState::Timeout => "TIMEOUT",
            SeedState::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for SeedState {
    fn from(raw: &str) -> Self {
        match raw {
            "PENDING" => SeedState::Pending,
            "PROCESSED" => SeedState::Processed,
            "CRASH" => SeedState::Crash,
            "TIMEOUT" => SeedState::Timeout,
            other => SeedState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SeedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-seed metadata file exactly as it was parsed from disk.
///
/// Every field is optional so that a missing key can be told apart from a
/// zero value. Keys not listed here (`file_path`, `created_at`, ...) are
/// ignored.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSeedRecord {
    pub id: Option<u64>,
    pub parent_id: Option<u64>,
    pub depth: Option<u32>,
    pub state: Option<String>,
    pub old_cov: Option<u64>,
    pub new_cov: Option<u64>,
    pub cov_incr: Option<u64>,
    pub oracle_verdict: Option<String>,
}

/// A raw record together with the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedCandidate {
    /// File name of the metadata file, used as the secondary ordering key.
    pub source: String,
    pub record: RawSeedRecord,
}

impl SeedCandidate {
    pub fn new(source: impl Into<String>, record: RawSeedRecord) -> Self {
        Self {
            source: source.into(),
            record,
        }
    }
}

/// A validated seed record. Every required field is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRecord {
    pub id: u64,
    /// Cumulative coverage after this seed, in basis points.
    pub new_cov: u64,
    /// This seed's own marginal contribution, in basis points.
    pub cov_incr: u64,
    pub old_cov: Option<u64>,
    pub depth: u32,
    pub parent_id: Option<u64>,
    pub oracle_verdict: OracleVerdict,
    pub state: Option<SeedState>,
    pub source: String,
}

impl SeedRecord {
    /// Names of the fields a record must carry to be usable.
    pub const REQUIRED_FIELDS: [&'static str; 4] = ["id", "new_cov", "cov_incr", "depth"];

    /// Builds a validated record, or returns the names of the missing
    /// required fields.
    pub fn from_candidate(candidate: SeedCandidate) -> Result<Self, Vec<&'static str>> {
        let SeedCandidate { source, record } = candidate;
        match (record.id, record.new_cov, record.cov_incr, record.depth) {
            (Some(id), Some(new_cov), Some(cov_incr), Some(depth)) => Ok(SeedRecord {
                id,
                new_cov,
                cov_incr,
                old_cov: record.old_cov,
                depth,
                parent_id: record.parent_id,
                oracle_verdict: record
                    .oracle_verdict
                    .as_deref()
                    .map(OracleVerdict::from)
                    .unwrap_or_default(),
                state: record
                    .state
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .map(SeedState::from),
                source,
            }),
            (id, new_cov, cov_incr, depth) => {
                let present = [
                    id.is_some(),
                    new_cov.is_some(),
                    cov_incr.is_some(),
                    depth.is_some(),
                ];
                Err(Self::REQUIRED_FIELDS
                    .iter()
                    .zip(present)
                    .filter(|(_, is_present)| !is_present)
                    .map(|(name, _)| *name)
                    .collect())
            }
        }
    }

    pub fn is_initial(&self) -> bool {
        self.depth == 0
    }
}

/// Queue statistics the engine keeps alongside its global state.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    #[serde(default)]
    pub pool_size: u64,
    #[serde(default)]
    pub processed_count: u64,
}

/// Campaign-level rollup written by the engine independently of the seed
/// records. Used for cross-validation only.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GlobalState {
    pub last_allocated_id: u64,
    pub total_coverage: u64,
    #[serde(default)]
    pub current_fuzzing_id: Option<u64>,
    #[serde(default)]
    pub queue_stats: Option<QueueStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bp_to_percent_is_exact_for_two_decimals() {
        assert_eq!(bp_to_percent(1000), 10.0);
        assert_eq!(bp_to_percent(7474), 74.74);
        assert_eq!(bp_to_percent(FULL_COVERAGE_BP), 100.0);
        assert_eq!(bp_to_percent(0), 0.0);
    }

    #[test]
    fn verdict_strings_map_to_variants() {
        assert_eq!(OracleVerdict::from("BUG"), OracleVerdict::Bug);
        assert_eq!(OracleVerdict::from("NORMAL"), OracleVerdict::Normal);
        assert_eq!(OracleVerdict::from("SKIPPED"), OracleVerdict::Skipped);
        assert_eq!(OracleVerdict::from(""), OracleVerdict::Unknown);
        let odd = OracleVerdict::from("bug");
        assert_eq!(odd, OracleVerdict::Other("bug".to_string()));
        assert!(!odd.is_bug(), "verdict matching is case-sensitive");
    }

    #[test]
    fn raw_record_ignores_unknown_keys_and_keeps_absent_fields_none() {
        let raw: RawSeedRecord = serde_json::from_str(
            r#"{"id": 7, "file_path": "corpus/x.seed", "new_cov": 0, "created_at": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(raw.id, Some(7));
        assert_eq!(raw.new_cov, Some(0));
        assert_eq!(raw.cov_incr, None);
        assert_eq!(raw.depth, None);
    }

    #[test]
    fn from_candidate_reports_every_missing_required_field() {
        let candidate = SeedCandidate::new(
            "a.json",
            RawSeedRecord {
                new_cov: Some(10),
                ..Default::default()
            },
        );
        let missing = SeedRecord::from_candidate(candidate).unwrap_err();
        assert_eq!(missing, vec!["id", "cov_incr", "depth"]);
    }

    #[test]
    fn from_candidate_defaults_optional_fields() {
        let candidate = SeedCandidate::new(
            "b.json",
            RawSeedRecord {
                id: Some(0),
                new_cov: Some(0),
                cov_incr: Some(0),
                depth: Some(0),
                state: Some("CRASH".to_string()),
                ..Default::default()
            },
        );
        let record = SeedRecord::from_candidate(candidate).unwrap();
        assert_eq!(record.oracle_verdict, OracleVerdict::Unknown);
        assert_eq!(record.state, Some(SeedState::Crash));
        assert!(record.is_initial());
        assert_eq!(record.source, "b.json");
    }

    #[test]
    fn global_state_requires_core_fields() {
        let ok: GlobalState = serde_json::from_str(
            r#"{"last_allocated_id": 3, "total_coverage": 7474, "queue_stats": {"pool_size": 2, "processed_count": 1}}"#,
        )
        .unwrap();
        assert_eq!(ok.total_coverage, 7474);
        assert_eq!(ok.queue_stats.unwrap().pool_size, 2);
        assert_eq!(ok.current_fuzzing_id, None);

        let missing = serde_json::from_str::<GlobalState>(r#"{"last_allocated_id": 3}"#);
        assert!(missing.is_err());
    }
}
