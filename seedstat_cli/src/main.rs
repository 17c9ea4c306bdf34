use seedstat_core::config::SeedstatConfig;
use seedstat_core::report::CampaignReport;
use seedstat_core::run_pipeline;

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_FILE: &str = "seedstat.toml";

#[derive(Parser, Debug)]
#[clap(author, version, about = "Summarise a finished fuzzing campaign into chartable series", long_about = None)]
struct Cli {
    /// Campaign output directory (contains `metadata/` and `state/`).
    #[clap(short, long, value_parser)]
    data_dir: PathBuf,
    #[clap(short, long, value_parser)]
    config_file: Option<PathBuf>,
    /// Report file; relative paths resolve against the data directory.
    #[clap(short, long, value_parser)]
    output: Option<PathBuf>,
    #[clap(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(config_file: Option<&Path>) -> Result<SeedstatConfig, anyhow::Error> {
    match config_file {
        Some(config_path) => {
            info!(path = ?config_path, "loading configuration");
            Ok(SeedstatConfig::load_from_file(config_path)?)
        }
        None => {
            let default_config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_config_path.exists() {
                info!(path = ?default_config_path, "loading default configuration");
                Ok(SeedstatConfig::load_from_file(&default_config_path)?)
            } else {
                info!("no configuration file found, using built-in defaults");
                Ok(SeedstatConfig::default())
            }
        }
    }
}

fn resolve_report_path(data_dir: &Path, report_file: &Path) -> PathBuf {
    if report_file.is_absolute() {
        report_file.to_path_buf()
    } else {
        data_dir.join(report_file)
    }
}

fn write_report(report: &CampaignReport, path: &Path, pretty: bool) -> Result<(), anyhow::Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create report directory {:?}: {}", parent, e))?;
    }
    let body = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    std::fs::write(path, body)
        .map_err(|e| anyhow::anyhow!("Failed to write report to {:?}: {}", path, e))?;
    Ok(())
}

fn print_summary(report: &CampaignReport) {
    let summary = report.summary();
    println!("Seeds: {}", summary.total_seeds);
    println!(
        "  initial: {}, mutated: {}, max depth: {}",
        summary.initial_seed_count, summary.mutated_seed_count, summary.max_depth
    );
    println!("Final coverage: {:.2}%", summary.final_coverage_percent);
    println!(
        "Recorded coverage (global state): {:.2}%",
        summary.recorded_coverage_percent
    );
    println!("Total bugs found: {}", summary.total_bugs);
    let counts = report.warning_counts();
    if counts.is_empty() {
        println!("Warnings: none");
    } else {
        println!("Warnings: {}", report.warnings().len());
        for (kind, count) in counts {
            println!("  {kind}: {count}");
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(cli.config_file.as_deref())?;
    if let Some(output) = cli.output {
        config.output.report_file = output;
    }

    info!(path = ?cli.data_dir, "loading campaign data");
    let report = run_pipeline(&cli.data_dir, &config.input)?;

    for warning in report.warnings() {
        eprintln!("Warning: {warning}");
    }
    print_summary(&report);

    let report_path = resolve_report_path(&cli.data_dir, &config.output.report_file);
    write_report(&report, &report_path, config.output.pretty)?;
    println!("Saved: {}", report_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_short_and_long_flags() {
        let cli = Cli::try_parse_from([
            "seedstat",
            "-d",
            "fuzz_out/x64/canary",
            "--output",
            "r.json",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("fuzz_out/x64/canary"));
        assert_eq!(cli.output, Some(PathBuf::from("r.json")));
        assert!(cli.verbose);
        assert!(cli.config_file.is_none());
    }

    #[test]
    fn data_dir_is_required() {
        assert!(Cli::try_parse_from(["seedstat"]).is_err());
    }

    #[test]
    fn relative_report_path_resolves_against_data_dir() {
        let data_dir = Path::new("/campaign");
        assert_eq!(
            resolve_report_path(data_dir, Path::new("report.json")),
            PathBuf::from("/campaign/report.json")
        );
        assert_eq!(
            resolve_report_path(data_dir, Path::new("/tmp/out.json")),
            PathBuf::from("/tmp/out.json")
        );
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[output]\npretty = false\n").unwrap();
        let config = load_config(Some(path.as_path())).unwrap();
        assert!(!config.output.pretty);
        assert!(load_config(Some(dir.path().join("missing.toml").as_path())).is_err());
    }
}
