//! subsea-rbi CLI
//!
//! Loads a failure-mode catalog and a facility risk register, assembles the
//! FMECA table for each component and prints the RBI figures.
//!
//! # Usage
//!
//! ```bash
//! # Full per-inspection-type sweep over every component
//! subsea-rbi --catalog failure_modes.json --register register.json
//!
//! # One component, one inspection method, JSON output
//! subsea-rbi --catalog failure_modes.json --register register.json \
//!     --component M1 --inspection-type "ROV Inspection" --json
//! ```
//!
//! # Environment Variables
//!
//! - `SUBSEA_RBI_CONFIG`: path to an engine config TOML (policy knobs)
//! - `RUST_LOG`: logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use subsea_rbi::{
    assemble_fmeca, component_risk_summary, run_rbi, Area, Component, ComponentRiskReport,
    EngineConfig, Facility, FailureModeCatalog, RbiResult, RiskRegister,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "subsea-rbi")]
#[command(about = "Offshore equipment FMECA and Risk-Based Inspection engine")]
#[command(version)]
struct CliArgs {
    /// Path to the failure-mode catalog JSON
    #[arg(long, value_name = "FILE")]
    catalog: PathBuf,

    /// Path to the facility risk-register JSON
    #[arg(long, value_name = "FILE")]
    register: PathBuf,

    /// Restrict the run to a single component ident
    #[arg(long, value_name = "IDENT")]
    component: Option<String>,

    /// Run a single inspection method instead of the full sweep
    #[arg(long, value_name = "NAME")]
    inspection_type: Option<String>,

    /// Emit JSON instead of the human-readable table
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let config = EngineConfig::load();

    let catalog = FailureModeCatalog::load_from_file(&args.catalog)
        .with_context(|| format!("loading catalog {}", args.catalog.display()))?;
    let register = RiskRegister::load_from_file(&args.register)
        .with_context(|| format!("loading register {}", args.register.display()))?;

    let targets: Vec<(&Facility, &Area, &Component)> = match &args.component {
        Some(ident) => vec![register
            .find_component(ident)
            .with_context(|| format!("locating component '{ident}'"))?],
        None => register
            .facilities
            .iter()
            .flat_map(|facility| {
                facility.areas.iter().flat_map(move |area| {
                    area.components
                        .iter()
                        .map(move |component| (facility, area, component))
                })
            })
            .collect(),
    };
    info!(components = targets.len(), "Running RBI analysis");

    match &args.inspection_type {
        Some(inspection_type) => {
            let mut results: Vec<RbiResult> = Vec::new();
            for (facility, area, component) in targets {
                let fmeca = assemble_fmeca(component, area, facility, &catalog, &config)
                    .with_context(|| format!("assembling FMECA for {component}"))?;
                let result = run_rbi(&fmeca, inspection_type, facility.risk_cut_off, &config)
                    .with_context(|| format!("running RBI for {component}"))?;
                results.push(result);
            }
            if args.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for result in &results {
                    print_result(result);
                }
            }
        }
        None => {
            let mut reports: Vec<ComponentRiskReport> = Vec::new();
            for (facility, area, component) in targets {
                let fmeca = assemble_fmeca(component, area, facility, &catalog, &config)
                    .with_context(|| format!("assembling FMECA for {component}"))?;
                let report = component_risk_summary(&fmeca, facility.risk_cut_off, &config)
                    .with_context(|| format!("summarising risk for {component}"))?;
                reports.push(report);
            }
            if args.json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    print_report(report);
                }
            }
        }
    }

    Ok(())
}

fn print_result(result: &RbiResult) {
    println!(
        "{} | {} | {} failure modes | risk {:.3}/yr | inspect every {:.2} yr",
        result.component_ident,
        result.inspection_type,
        result.failure_mode_count,
        result.total_risk,
        result.inspection_interval,
    );
}

fn print_report(report: &ComponentRiskReport) {
    println!(
        "Component {} (risk cut-off {:.0}/yr)",
        report.component_ident, report.risk_cut_off
    );
    for entry in &report.results {
        match entry.inspection_interval {
            Some(interval) => println!(
                "  {:<24} {:>3} modes | risk {:>12.3}/yr | every {:.2} yr",
                entry.inspection_type, entry.failure_mode_count, entry.total_risk, interval,
            ),
            None => println!(
                "  {:<24} {:>3} modes | no applicable risk",
                entry.inspection_type, entry.failure_mode_count,
            ),
        }
    }
}
