//! Provider diversity report CLI.
//!
//! Loads a peer snapshot (the dashboard feed's JSON peer list), runs one
//! aggregation and scoring pass and emits text/JSON reports.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use log::info;

use peerscope::config::{load_config, EngineConfig};
use peerscope::diversity::aggregator::{aggregate, ColorMap};
use peerscope::diversity::report::{
    generate_json_report, generate_text_report, print_summary, DiversityReport,
};
use peerscope::diversity::scorer::score;
use peerscope::snapshot::load_peer_snapshot;

/// Autonomous-System diversity analysis for Bitcoin Core peer dashboards
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the peer snapshot JSON file
    #[arg(short, long)]
    peers: PathBuf,

    /// Path to an engine configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for text and JSON reports
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the full JSON report to stdout instead of the summary
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    config.validate()?;

    info!("Loading peer snapshot from {:?}", args.peers);
    let peers = load_peer_snapshot(&args.peers)?;

    let aggregation = aggregate(&peers, &ColorMap::new(), config.displayed_providers);
    let diversity = score(&aggregation);
    info!(
        "Aggregated {} analyzable peers across {} operators",
        aggregation.analyzable_count,
        aggregation.operators.len()
    );

    let report = DiversityReport::new(
        &args.peers.display().to_string(),
        peers.len(),
        aggregation,
        diversity,
    );

    if let Some(output) = &args.output {
        std::fs::create_dir_all(output)?;
        generate_text_report(&report, &output.join("diversity_report.txt"))?;
        generate_json_report(&report, &output.join("diversity_report.json"))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["peerscope", "--peers", "peers.json", "--json"]);
        assert_eq!(args.peers, PathBuf::from("peers.json"));
        assert!(args.json);
        assert_eq!(args.output, None);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_cli_output_and_config_args() {
        let args = Args::parse_from([
            "peerscope",
            "--peers",
            "peers.json",
            "--config",
            "engine.yaml",
            "--output",
            "reports",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("engine.yaml")));
        assert_eq!(args.output, Some(PathBuf::from("reports")));
        assert_eq!(args.log_level, "debug");
    }
}
