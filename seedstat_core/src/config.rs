use crate::error::PipelineError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Where the loader finds campaign records, relative to the campaign root.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    #[serde(default = "default_metadata_dir")]
    pub metadata_dir: PathBuf,
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    #[serde(default = "default_record_extension")]
    pub record_extension: String,
}

pub fn default_metadata_dir() -> PathBuf {
    PathBuf::from("metadata")
}

pub fn default_state_file() -> PathBuf {
    PathBuf::from("state").join("global_state.json")
}

fn default_record_extension() -> String {
    "json".to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            metadata_dir: default_metadata_dir(),
            state_file: default_state_file(),
            record_extension: default_record_extension(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_report_file")]
    pub report_file: PathBuf,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

pub fn default_report_file() -> PathBuf {
    PathBuf::from("report.json")
}

fn default_pretty() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_file: default_report_file(),
            pretty: default_pretty(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct SeedstatConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl SeedstatConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("Failed to read config file at {:?}: {}", path, e))
        })?;

        let config: SeedstatConfig = toml::from_str(&content).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to parse TOML from config file {:?}: {}",
                path, e
            ))
        })?;

        Ok(config)
    }
}
