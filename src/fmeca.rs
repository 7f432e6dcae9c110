//! FMECA Assembly
//!
//! Builds the Failure Modes, Effects and Criticality Analysis table for a
//! component: every subcomponent is cross-producted against the catalog's
//! failure modes for its category, and each mode's consequence label is
//! resolved against the component's priced consequences.
//!
//! The table is a pure derivation. Re-running assembly after any change to
//! the component, catalog or vessel trips produces a fresh, consistent set;
//! nothing here is cached or partially reused.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::{CatalogError, Detectability, FailureModeCatalog};
use crate::config::{EngineConfig, MissingConsequencePolicy};
use crate::cost::{consequence_cost, CostError};
use crate::model::{Area, Component, Facility};
use crate::reliability::{annual_probability_of_failure, ReliabilityError};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum FmecaError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Reliability(#[from] ReliabilityError),

    #[error(transparent)]
    Cost(#[from] CostError),

    #[error(
        "Component '{component}' has no consequence named '{consequence}' \
         (required by failure mode '{failure_mode}' of subcomponent '{subcomponent}')"
    )]
    MissingConsequence {
        component: String,
        subcomponent: String,
        failure_mode: String,
        consequence: String,
    },
}

// ============================================================================
// Failure rows
// ============================================================================

/// One FMECA row: a subcomponent occurrence bound to a catalog failure mode
/// and the component consequence that prices it.
///
/// `probability`, `cost` and `risk` are snapshots taken at assembly time; the
/// row is replaced, not updated, when the model changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub subcomponent_ident: String,
    pub subcomponent_category: String,
    pub description: String,
    pub mean_time_to_failure: f64,
    pub time_dependent: bool,
    pub detectable: Detectability,
    pub inspection_type: String,
    /// `None` only under the zero-cost missing-consequence policy.
    pub consequence_name: Option<String>,
    pub probability: f64,
    pub cost: f64,
    pub risk: f64,
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failure {} ({})", self.description, self.subcomponent_ident)
    }
}

/// The assembled FMECA table for one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fmeca {
    pub component_ident: String,
    pub failures: Vec<Failure>,
}

impl Fmeca {
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Sum of undiscounted risk over every row. This is the raw criticality
    /// figure; RBI applies inspection filtering and detectability discounts
    /// on top.
    pub fn total_risk(&self) -> f64 {
        self.failures.iter().map(|f| f.risk).sum()
    }
}

// ============================================================================
// Assembly
// ============================================================================

/// Assemble the FMECA table for `component`.
///
/// `area` supplies the equity share and `facility` the deferred-production
/// cost and vessel fleet. Every subcomponent category must exist in the
/// catalog; a consequence label with no match on the component either fails
/// the assembly or prices the row at zero, per
/// `config.missing_consequence_policy`.
pub fn assemble_fmeca(
    component: &Component,
    area: &Area,
    facility: &Facility,
    catalog: &FailureModeCatalog,
    config: &EngineConfig,
) -> Result<Fmeca, FmecaError> {
    let mut failures = Vec::new();

    for subcomponent in &component.subcomponents {
        let modes = catalog.modes_for_category(&subcomponent.category)?;
        for (description, failure_mode) in modes {
            let probability = annual_probability_of_failure(failure_mode.mean_time_to_failure)?;

            let (consequence_name, cost) =
                match component.consequence(&failure_mode.consequence_description) {
                    Some(consequence) => {
                        let breakdown =
                            consequence_cost(consequence, facility, area.equity_share)?;
                        (Some(consequence.name.clone()), breakdown.total_cost)
                    }
                    None => match config.missing_consequence_policy {
                        MissingConsequencePolicy::Fail => {
                            return Err(FmecaError::MissingConsequence {
                                component: component.ident.clone(),
                                subcomponent: subcomponent.ident.clone(),
                                failure_mode: description.clone(),
                                consequence: failure_mode.consequence_description.clone(),
                            });
                        }
                        MissingConsequencePolicy::ZeroCost => {
                            warn!(
                                component = %component.ident,
                                subcomponent = %subcomponent.ident,
                                failure_mode = %description,
                                consequence = %failure_mode.consequence_description,
                                "No matching consequence on component; pricing failure mode at zero"
                            );
                            (None, 0.0)
                        }
                    },
                };

            failures.push(Failure {
                subcomponent_ident: subcomponent.ident.clone(),
                subcomponent_category: subcomponent.category.clone(),
                description: description.clone(),
                mean_time_to_failure: failure_mode.mean_time_to_failure,
                time_dependent: failure_mode.time_dependent,
                detectable: failure_mode.detectable,
                inspection_type: failure_mode.inspection_type.clone(),
                consequence_name,
                probability,
                cost,
                risk: probability * cost,
            });
        }
    }

    debug!(
        component = %component.ident,
        rows = failures.len(),
        "Assembled FMECA table"
    );

    Ok(Fmeca {
        component_ident: component.ident.clone(),
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FailureMode;
    use crate::model::{Consequence, SubComponent};
    use std::collections::BTreeMap;

    fn catalog() -> FailureModeCatalog {
        let mut entries = BTreeMap::new();
        entries.insert(
            "Loss of Function due to Failure to Open on demand".to_string(),
            FailureMode {
                mean_time_to_failure: 3077.4,
                time_dependent: false,
                detectable: Detectability::Lagging,
                inspection_type: "ROV Inspection".to_string(),
                consequence_description: "Minor Intervention".to_string(),
            },
        );
        entries.insert(
            "Loss of Function due to Blockage".to_string(),
            FailureMode {
                mean_time_to_failure: 6479.3,
                time_dependent: false,
                detectable: Detectability::Leading,
                inspection_type: "ROV Inspection".to_string(),
                consequence_description: "Major Intervention".to_string(),
            },
        );
        let mut modes = BTreeMap::new();
        modes.insert("Actuated Process Valve".to_string(), entries);
        FailureModeCatalog::new(modes).unwrap()
    }

    fn flat_consequence(name: &str, cost: f64) -> Consequence {
        // With deferred_prod_cost = 1 and equity_share = 1 the consequence
        // prices at exactly mean_time_to_repair * deferred_prod_rate, so a
        // flat target cost can be encoded as one day at `cost` units/day.
        Consequence {
            ident: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            mean_time_to_repair: 1.0,
            replacement_cost: 0.0,
            deferred_prod_rate: cost,
            vessel_trips: vec![],
        }
    }

    fn facility() -> Facility {
        Facility {
            ident: "fac-1".to_string(),
            name: "facility-1".to_string(),
            operator: "Operator".to_string(),
            risk_cut_off: 302_500.0,
            deferred_prod_cost: 1.0,
            vessels: vec![],
            areas: vec![],
        }
    }

    fn area() -> Area {
        Area {
            ident: "area-1".to_string(),
            name: "area-1".to_string(),
            equity_share: 1.0,
            components: vec![],
        }
    }

    fn component() -> Component {
        Component {
            ident: "M1".to_string(),
            category: "Manifold".to_string(),
            service_type: "Production".to_string(),
            subcomponents: vec![SubComponent {
                ident: "V1".to_string(),
                category: "Actuated Process Valve".to_string(),
            }],
            consequences: vec![
                flat_consequence("Major Intervention", 1_000_000.0),
                flat_consequence("Minor Intervention", 300_000.0),
            ],
        }
    }

    #[test]
    fn one_row_per_subcomponent_failure_mode() {
        let fmeca = assemble_fmeca(
            &component(),
            &area(),
            &facility(),
            &catalog(),
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(fmeca.len(), 2);
        assert!(fmeca
            .failures
            .iter()
            .all(|f| f.subcomponent_ident == "V1"));
    }

    #[test]
    fn row_risk_matches_reference_value() {
        let fmeca = assemble_fmeca(
            &component(),
            &area(),
            &facility(),
            &catalog(),
            &EngineConfig::default(),
        )
        .unwrap();
        let open_on_demand = fmeca
            .failures
            .iter()
            .find(|f| f.description.contains("Open on demand"))
            .unwrap();
        assert_eq!(
            open_on_demand.consequence_name.as_deref(),
            Some("Minor Intervention")
        );
        let expected = 97.469;
        assert!(
            (open_on_demand.risk - expected).abs() <= 0.001 * expected,
            "expected risk ~{expected}, got {}",
            open_on_demand.risk
        );
    }

    #[test]
    fn assembly_is_idempotent() {
        let component = component();
        let first = assemble_fmeca(
            &component,
            &area(),
            &facility(),
            &catalog(),
            &EngineConfig::default(),
        )
        .unwrap();
        let second = assemble_fmeca(
            &component,
            &area(),
            &facility(),
            &catalog(),
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn reassembly_reflects_subcomponent_changes() {
        let mut component = component();
        let before = assemble_fmeca(
            &component,
            &area(),
            &facility(),
            &catalog(),
            &EngineConfig::default(),
        )
        .unwrap();
        component.subcomponents.push(SubComponent {
            ident: "V2".to_string(),
            category: "Actuated Process Valve".to_string(),
        });
        let after = assemble_fmeca(
            &component,
            &area(),
            &facility(),
            &catalog(),
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(after.len(), 2 * before.len());
        assert!((after.total_risk() - 2.0 * before.total_risk()).abs() < 1e-9);
    }

    #[test]
    fn missing_consequence_fails_by_default() {
        let mut component = component();
        component.consequences.retain(|c| c.name != "Minor Intervention");
        let err = assemble_fmeca(
            &component,
            &area(),
            &facility(),
            &catalog(),
            &EngineConfig::default(),
        )
        .unwrap_err();
        match err {
            FmecaError::MissingConsequence { consequence, .. } => {
                assert_eq!(consequence, "Minor Intervention");
            }
            other => panic!("expected MissingConsequence, got {other}"),
        }
    }

    #[test]
    fn zero_cost_policy_prices_unmatched_rows_at_zero() {
        let mut component = component();
        component.consequences.retain(|c| c.name != "Minor Intervention");
        let config = EngineConfig {
            missing_consequence_policy: MissingConsequencePolicy::ZeroCost,
            ..EngineConfig::default()
        };
        let fmeca =
            assemble_fmeca(&component, &area(), &facility(), &catalog(), &config).unwrap();
        assert_eq!(fmeca.len(), 2);
        let unmatched = fmeca
            .failures
            .iter()
            .find(|f| f.consequence_name.is_none())
            .unwrap();
        assert!(unmatched.cost.abs() < f64::EPSILON);
        assert!(unmatched.risk.abs() < f64::EPSILON);
        // The matched row still carries its full risk.
        assert!(fmeca.total_risk() > 0.0);
    }

    #[test]
    fn unknown_category_aborts_assembly() {
        let mut component = component();
        component.subcomponents[0].category = "Unknown Category".to_string();
        let err = assemble_fmeca(
            &component,
            &area(),
            &facility(),
            &catalog(),
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FmecaError::Catalog(CatalogError::UnknownCategory(_))
        ));
    }
}
