//! RBI Filter & Aggregator
//!
//! Turns an assembled FMECA table into a Risk-Based Inspection figure for one
//! inspection method:
//!
//! 1. Keep failures whose catalog `inspection_type` matches and that are not
//!    time-dependent (time-dependent modes follow a fixed schedule, never a
//!    risk trigger).
//! 2. Discount each survivor's risk by its detectability class.
//! 3. Sum the discounted risk.
//! 4. Derive `inspection_interval = risk_cut_off / total_risk` in years.
//!
//! Zero applicable risk is a defined error, not a silent infinity. Every
//! figure is recomputed from the table handed in; nothing is memoized.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::EngineConfig;
use crate::fmeca::{Failure, Fmeca};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum RbiError {
    #[error(
        "No applicable risk for inspection type '{inspection_type}' on component \
         '{component}'; inspection interval is undefined"
    )]
    NoApplicableRisk {
        component: String,
        inspection_type: String,
    },

    #[error("risk_cut_off must be a positive, finite currency/year budget (got {0})")]
    NonPositiveRiskCutOff(f64),
}

// ============================================================================
// Results
// ============================================================================

/// Aggregated RBI outcome for one inspection method.
#[derive(Debug, Clone, Serialize)]
pub struct RbiResult {
    pub component_ident: String,
    pub inspection_type: String,
    /// Rows that survived the inspection-type and time-dependence filter.
    pub failure_mode_count: usize,
    /// Detectability-discounted annual commercial risk (currency/year).
    pub total_risk: f64,
    /// Years between inspections that keeps annual risk within budget.
    pub inspection_interval: f64,
}

/// Risk for one inspection type within a component sweep. Types with no
/// applicable risk are listed without an interval instead of failing the
/// whole report.
#[derive(Debug, Clone, Serialize)]
pub struct InspectionTypeRisk {
    pub inspection_type: String,
    pub failure_mode_count: usize,
    pub total_risk: f64,
    pub inspection_interval: Option<f64>,
}

/// Per-component RBI report across every inspection type present in the
/// FMECA table.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentRiskReport {
    pub component_ident: String,
    pub generated_at: DateTime<Utc>,
    pub risk_cut_off: f64,
    pub results: Vec<InspectionTypeRisk>,
}

// ============================================================================
// Aggregation
// ============================================================================

/// A failure contributes to inspection-driven RBI only if the chosen method
/// inspects for it and the mode is not on a fixed time-based schedule.
fn applicable(failure: &Failure, inspection_type: &str) -> bool {
    failure.inspection_type == inspection_type && !failure.time_dependent
}

fn aggregate(fmeca: &Fmeca, inspection_type: &str, config: &EngineConfig) -> (usize, f64) {
    let mut count = 0;
    let mut total_risk = 0.0;
    for failure in &fmeca.failures {
        if applicable(failure, inspection_type) {
            count += 1;
            total_risk += config.detectability_discounts.factor(failure.detectable)
                * failure.risk;
        }
    }
    (count, total_risk)
}

/// Run RBI for one inspection method over an assembled FMECA table.
pub fn run_rbi(
    fmeca: &Fmeca,
    inspection_type: &str,
    risk_cut_off: f64,
    config: &EngineConfig,
) -> Result<RbiResult, RbiError> {
    if !risk_cut_off.is_finite() || risk_cut_off <= 0.0 {
        return Err(RbiError::NonPositiveRiskCutOff(risk_cut_off));
    }

    let (failure_mode_count, total_risk) = aggregate(fmeca, inspection_type, config);
    if total_risk <= 0.0 {
        return Err(RbiError::NoApplicableRisk {
            component: fmeca.component_ident.clone(),
            inspection_type: inspection_type.to_string(),
        });
    }

    let inspection_interval = risk_cut_off / total_risk;
    debug!(
        component = %fmeca.component_ident,
        inspection_type,
        failure_mode_count,
        total_risk,
        inspection_interval,
        "RBI aggregation complete"
    );

    Ok(RbiResult {
        component_ident: fmeca.component_ident.clone(),
        inspection_type: inspection_type.to_string(),
        failure_mode_count,
        total_risk,
        inspection_interval,
    })
}

/// Sweep every inspection type present in the FMECA table and report each
/// one's aggregated risk and interval.
pub fn component_risk_summary(
    fmeca: &Fmeca,
    risk_cut_off: f64,
    config: &EngineConfig,
) -> Result<ComponentRiskReport, RbiError> {
    if !risk_cut_off.is_finite() || risk_cut_off <= 0.0 {
        return Err(RbiError::NonPositiveRiskCutOff(risk_cut_off));
    }

    let mut inspection_types: Vec<String> = fmeca
        .failures
        .iter()
        .map(|f| f.inspection_type.clone())
        .collect();
    inspection_types.sort();
    inspection_types.dedup();

    let results = inspection_types
        .into_iter()
        .map(|inspection_type| {
            let (failure_mode_count, total_risk) = aggregate(fmeca, &inspection_type, config);
            let inspection_interval =
                (total_risk > 0.0).then(|| risk_cut_off / total_risk);
            InspectionTypeRisk {
                inspection_type,
                failure_mode_count,
                total_risk,
                inspection_interval,
            }
        })
        .collect();

    Ok(ComponentRiskReport {
        component_ident: fmeca.component_ident.clone(),
        generated_at: Utc::now(),
        risk_cut_off,
        results,
    })
}
