//! Report generation for provider diversity analysis.
//!
//! Generates both JSON and human-readable text reports from one
//! aggregation pass.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::format::{format_bytes, format_duration_compact};

use super::types::{AsAggregation, DiversityScore, HostingClass, ProviderAggregate};

/// Report metadata block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub snapshot_path: String,
    pub total_peers: usize,
}

/// Complete diversity report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiversityReport {
    pub metadata: ReportMetadata,
    pub score: DiversityScore,
    pub aggregation: AsAggregation,
}

impl DiversityReport {
    pub fn new(
        snapshot_path: &str,
        total_peers: usize,
        aggregation: AsAggregation,
        score: DiversityScore,
    ) -> Self {
        Self {
            metadata: ReportMetadata {
                generated_at: chrono::Utc::now().to_rfc3339(),
                snapshot_path: snapshot_path.to_string(),
                total_peers,
            },
            score,
            aggregation,
        }
    }
}

/// Generate JSON report
pub fn generate_json_report(report: &DiversityReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

/// Generate human-readable text report
pub fn generate_text_report(report: &DiversityReport, output_path: &Path) -> Result<()> {
    let content = render_text_report(report);
    fs::write(output_path, content)
        .with_context(|| format!("Failed to write text report to {}", output_path.display()))?;

    log::info!("Text report written to {}", output_path.display());
    Ok(())
}

/// Render the text report body.
pub fn render_text_report(report: &DiversityReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("=".repeat(80));
    lines.push("                    PEERSCOPE PROVIDER DIVERSITY ANALYSIS".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    lines.push(format!("Generated: {}", report.metadata.generated_at));
    lines.push(format!("Snapshot: {}", report.metadata.snapshot_path));
    lines.push(format!("Total peers: {}", report.metadata.total_peers));
    lines.push(format!(
        "Analyzable peers: {}",
        report.aggregation.analyzable_count
    ));
    lines.push(format!(
        "Private/no-AS peers: {}",
        report.aggregation.no_as_peers.len()
    ));
    if report.aggregation.malformed_count > 0 {
        lines.push(format!(
            "Malformed records dropped: {}",
            report.aggregation.malformed_count
        ));
    }
    lines.push(String::new());

    lines.push("=".repeat(80));
    lines.push("                              DIVERSITY SCORE".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    match report.score {
        DiversityScore::Rated { score, tier, .. } => {
            lines.push(format!("Score: {:.1} / 10 ({})", score, tier));
            match tier {
                t if t >= super::types::ScoreTier::Good => {
                    lines.push("Peers are well spread across network operators.".to_string());
                }
                super::types::ScoreTier::Moderate => {
                    lines.push(
                        "A few operators carry a sizable share of connections.".to_string(),
                    );
                }
                _ => {
                    lines.push(
                        "Connections are concentrated on very few operators; consider adding peers from other networks."
                            .to_string(),
                    );
                }
            }
        }
        DiversityScore::NoData => {
            lines.push("Score: n/a (no peers with operator data)".to_string());
        }
    }
    lines.push(String::new());

    if !report.aggregation.displayed.is_empty() {
        lines.push("=".repeat(80));
        lines.push("                             PROVIDER BREAKDOWN".to_string());
        lines.push("=".repeat(80));
        lines.push(String::new());

        for (rank, provider) in report.aggregation.displayed.iter().enumerate() {
            lines.push(provider_line(rank + 1, provider));
        }
        lines.push(String::new());

        let has_others = report
            .aggregation
            .displayed
            .last()
            .map(|a| a.key == super::types::ProviderKey::Others)
            .unwrap_or(false);
        if has_others {
            let folded = report.aggregation.operators.len()
                - (report.aggregation.displayed.len() - 1);
            lines.push(format!("({} operators folded into \"Others\")", folded));
            lines.push(String::new());
        }
    }

    lines.push("=".repeat(80));
    lines.join("\n")
}

fn provider_line(rank: usize, provider: &ProviderAggregate) -> String {
    let risk = provider
        .risk_tier
        .label()
        .map(|label| format!(" [risk: {}]", label))
        .unwrap_or_default();
    let hosting = match provider.hosting_class {
        HostingClass::Cloud => "cloud",
        HostingClass::Residential => "residential",
        HostingClass::Mixed => "mixed",
    };
    format!(
        "  {}. {} ({}) - {} peers, {:.1}%, {} in / {} out, avg ping {:.0}ms, avg up {}, avg age {}, {}{}",
        rank,
        provider.name,
        provider.key,
        provider.peer_count,
        provider.percentage,
        provider.inbound,
        provider.outbound,
        provider.avg_ping_ms,
        format_bytes(provider.avg_bytes_sent as u64),
        format_duration_compact(provider.avg_conn_duration_sec as u64),
        hosting,
        risk
    )
}

/// Print a summary to stdout
pub fn print_summary(report: &DiversityReport) {
    println!("\n=== PROVIDER DIVERSITY SUMMARY ===\n");
    println!("Total peers: {}", report.metadata.total_peers);
    println!("Analyzable: {}", report.aggregation.analyzable_count);
    println!("No-AS: {}", report.aggregation.no_as_peers.len());

    match report.score {
        DiversityScore::Rated { score, tier, .. } => {
            println!("Diversity score: {:.1}/10 ({})", score, tier);
        }
        DiversityScore::NoData => println!("Diversity score: n/a"),
    }

    for provider in report.aggregation.displayed.iter().take(5) {
        println!(
            "  {} {} - {} peers ({:.1}%)",
            provider.key, provider.name, provider.peer_count, provider.percentage
        );
    }
    println!();
}
