//! Equipment data model
//!
//! Record types for the offshore-facility hierarchy the engine computes over:
//!
//! - `Facility` — owns areas and vessels, carries the commercial risk budget
//! - `Area` — owns components, carries the operator's equity share
//! - `Component` — owns subcomponents and consequences
//! - `SubComponent` — keys into the failure-mode catalog by category
//! - `Consequence` — a priced failure outcome, owning vessel trips
//! - `Vessel` / `VesselTrip` — mobilisation cost inputs
//!
//! All types are explicit serde records with fixed field lists; a whole
//! facility tree round-trips through the JSON "risk register" format. The
//! model holds no derived risk figures — FMECA tables and RBI results are
//! recomputed from current state on demand, never stored here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Register I/O error ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Register parse error ({path}): {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Area '{area}': equity_share must be within [0, 1] (got {value})")]
    InvalidEquityShare { area: String, value: f64 },

    #[error("{entity} '{ident}': {field} must be a non-negative, finite number (got {value})")]
    NegativeValue {
        entity: &'static str,
        ident: String,
        field: &'static str,
        value: f64,
    },

    #[error("Vessel trip '{trip}' references unknown vessel '{vessel}' on facility '{facility}'")]
    UnknownVessel {
        trip: String,
        vessel: String,
        facility: String,
    },

    #[error("Unknown component '{0}'")]
    UnknownComponent(String),
}

// ============================================================================
// Facility hierarchy
// ============================================================================

/// Top of the equipment hierarchy. `risk_cut_off` is the annual commercial
/// risk budget (currency/year) the RBI interval is derived from;
/// `deferred_prod_cost` prices one unit of deferred production.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    pub ident: String,
    pub name: String,
    #[serde(default)]
    pub operator: String,
    pub risk_cut_off: f64,
    pub deferred_prod_cost: f64,
    #[serde(default)]
    pub vessels: Vec<Vessel>,
    #[serde(default)]
    pub areas: Vec<Area>,
}

impl std::fmt::Display for Facility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Facility {}", self.ident)
    }
}

impl Facility {
    /// Resolve a vessel by ident.
    pub fn vessel(&self, ident: &str) -> Option<&Vessel> {
        self.vessels.iter().find(|v| v.ident == ident)
    }
}

/// A producing area within a facility. `equity_share` is the operator's
/// ownership fraction in [0, 1]; it pro-rates shared equipment and vessel
/// costs uniformly for every component beneath the area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub ident: String,
    pub name: String,
    pub equity_share: f64,
    #[serde(default)]
    pub components: Vec<Component>,
}

impl std::fmt::Display for Area {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Area {}", self.ident)
    }
}

/// A physical equipment item (manifold, tree, pipeline section). Owns the
/// subcomponents the FMECA cross-products against the catalog, and the named
/// consequences that price the catalog's consequence labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub ident: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub service_type: String,
    #[serde(default)]
    pub subcomponents: Vec<SubComponent>,
    #[serde(default)]
    pub consequences: Vec<Consequence>,
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Component {}", self.ident)
    }
}

impl Component {
    /// The consequence matching a catalog `consequence_description`, if any.
    pub fn consequence(&self, name: &str) -> Option<&Consequence> {
        self.consequences.iter().find(|c| c.name == name)
    }
}

/// One sub-part of a component. `category` keys into the failure-mode
/// catalog; the subcomponent's failures are derived from the catalog, never
/// stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubComponent {
    pub ident: String,
    pub category: String,
}

impl std::fmt::Display for SubComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SubComponent {}", self.ident)
    }
}

/// A named, priced failure outcome on a component.
///
/// `mean_time_to_repair` is in days, `deferred_prod_rate` in production
/// units/day lost while under repair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consequence {
    pub ident: String,
    pub name: String,
    pub mean_time_to_repair: f64,
    pub replacement_cost: f64,
    pub deferred_prod_rate: f64,
    #[serde(default)]
    pub vessel_trips: Vec<VesselTrip>,
}

impl std::fmt::Display for Consequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Consequence {}", self.name)
    }
}

// ============================================================================
// Vessels
// ============================================================================

/// An intervention vessel available to a facility. `day_rate` is
/// currency/day, `mob_time` the mobilisation delay in days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vessel {
    pub ident: String,
    pub name: String,
    #[serde(default)]
    pub abbr: String,
    pub day_rate: f64,
    pub mob_time: f64,
}

impl std::fmt::Display for Vessel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.abbr.is_empty() {
            write!(f, "Vessel {}", self.ident)
        } else {
            write!(f, "Vessel {}", self.abbr)
        }
    }
}

/// One vessel mobilisation booked against a consequence.
/// `active_repair_time` is the on-site working time in days; the vessel is
/// paid for mobilisation as well.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselTrip {
    pub ident: String,
    pub active_repair_time: f64,
    pub vessel_ident: String,
}

impl VesselTrip {
    /// Total charter cost of the trip: (active repair time + mobilisation
    /// time) at the vessel's day rate.
    pub fn total_cost(&self, vessel: &Vessel) -> f64 {
        (self.active_repair_time + vessel.mob_time) * vessel.day_rate
    }
}

impl std::fmt::Display for VesselTrip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VesselTrip {}", self.ident)
    }
}

// ============================================================================
// Risk register (whole-tree persistence)
// ============================================================================

/// A portable snapshot of every facility under analysis. This is the JSON
/// document operators exchange; loading validates the whole tree before the
/// engine ever computes over it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskRegister {
    pub facilities: Vec<Facility>,
}

impl RiskRegister {
    /// Load and validate a register from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self, ModelError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ModelError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let register: Self =
            serde_json::from_str(&contents).map_err(|e| ModelError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        register.validate()?;
        info!(
            path = %path.display(),
            facilities = register.facilities.len(),
            "Loaded risk register"
        );
        Ok(register)
    }

    /// Serialize the register to pretty JSON at `path`.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ModelError> {
        let contents = serde_json::to_string_pretty(self).map_err(|e| ModelError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, contents).map_err(|e| ModelError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Validate invariants the engine relies on: equity shares in [0, 1],
    /// non-negative money/time figures, and every vessel trip resolving to a
    /// vessel on its facility.
    pub fn validate(&self) -> Result<(), ModelError> {
        for facility in &self.facilities {
            check_non_negative("Facility", &facility.ident, "risk_cut_off", facility.risk_cut_off)?;
            check_non_negative(
                "Facility",
                &facility.ident,
                "deferred_prod_cost",
                facility.deferred_prod_cost,
            )?;
            for vessel in &facility.vessels {
                check_non_negative("Vessel", &vessel.ident, "day_rate", vessel.day_rate)?;
                check_non_negative("Vessel", &vessel.ident, "mob_time", vessel.mob_time)?;
            }
            for area in &facility.areas {
                if !area.equity_share.is_finite()
                    || !(0.0..=1.0).contains(&area.equity_share)
                {
                    return Err(ModelError::InvalidEquityShare {
                        area: area.ident.clone(),
                        value: area.equity_share,
                    });
                }
                for component in &area.components {
                    for consequence in &component.consequences {
                        check_non_negative(
                            "Consequence",
                            &consequence.ident,
                            "mean_time_to_repair",
                            consequence.mean_time_to_repair,
                        )?;
                        check_non_negative(
                            "Consequence",
                            &consequence.ident,
                            "replacement_cost",
                            consequence.replacement_cost,
                        )?;
                        check_non_negative(
                            "Consequence",
                            &consequence.ident,
                            "deferred_prod_rate",
                            consequence.deferred_prod_rate,
                        )?;
                        for trip in &consequence.vessel_trips {
                            check_non_negative(
                                "VesselTrip",
                                &trip.ident,
                                "active_repair_time",
                                trip.active_repair_time,
                            )?;
                            if facility.vessel(&trip.vessel_ident).is_none() {
                                return Err(ModelError::UnknownVessel {
                                    trip: trip.ident.clone(),
                                    vessel: trip.vessel_ident.clone(),
                                    facility: facility.ident.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Find a component by ident, returning its facility and area context.
    pub fn find_component(
        &self,
        ident: &str,
    ) -> Result<(&Facility, &Area, &Component), ModelError> {
        for facility in &self.facilities {
            for area in &facility.areas {
                for component in &area.components {
                    if component.ident == ident {
                        return Ok((facility, area, component));
                    }
                }
            }
        }
        Err(ModelError::UnknownComponent(ident.to_string()))
    }
}

fn check_non_negative(
    entity: &'static str,
    ident: &str,
    field: &'static str,
    value: f64,
) -> Result<(), ModelError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ModelError::NegativeValue {
            entity,
            ident: ident.to_string(),
            field,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vessel() -> Vessel {
        Vessel {
            ident: "hlv-1".to_string(),
            name: "Heavy Lift Vessel".to_string(),
            abbr: "HLV".to_string(),
            day_rate: 1000.0,
            mob_time: 5.0,
        }
    }

    #[test]
    fn vessel_trip_total_cost_includes_mobilisation() {
        let trip = VesselTrip {
            ident: "trip-1".to_string(),
            active_repair_time: 10.0,
            vessel_ident: "hlv-1".to_string(),
        };
        assert!((trip.total_cost(&vessel()) - 15_000.0).abs() < 1e-9);
    }

    #[test]
    fn component_resolves_consequence_by_name() {
        let component = Component {
            ident: "M1".to_string(),
            category: "Manifold".to_string(),
            service_type: "Production".to_string(),
            subcomponents: vec![],
            consequences: vec![Consequence {
                ident: "cons-1".to_string(),
                name: "Minor Intervention".to_string(),
                mean_time_to_repair: 60.0,
                replacement_cost: 100_000.0,
                deferred_prod_rate: 1000.0,
                vessel_trips: vec![],
            }],
        };
        assert!(component.consequence("Minor Intervention").is_some());
        assert!(component.consequence("Major Intervention").is_none());
    }

    fn one_facility_register(equity_share: f64) -> RiskRegister {
        RiskRegister {
            facilities: vec![Facility {
                ident: "fac-1".to_string(),
                name: "facility-1".to_string(),
                operator: "Operator".to_string(),
                risk_cut_off: 302_500.0,
                deferred_prod_cost: 18.0,
                vessels: vec![vessel()],
                areas: vec![Area {
                    ident: "area-1".to_string(),
                    name: "area-1".to_string(),
                    equity_share,
                    components: vec![],
                }],
            }],
        }
    }

    #[test]
    fn equity_share_outside_unit_interval_fails_validation() {
        let register = one_facility_register(1.2);
        let err = register.validate().unwrap_err();
        assert!(matches!(err, ModelError::InvalidEquityShare { .. }));
        assert!(one_facility_register(0.72).validate().is_ok());
    }

    #[test]
    fn dangling_vessel_reference_fails_validation() {
        let mut register = one_facility_register(0.72);
        register.facilities[0].areas[0].components.push(Component {
            ident: "M1".to_string(),
            category: String::new(),
            service_type: String::new(),
            subcomponents: vec![],
            consequences: vec![Consequence {
                ident: "cons-1".to_string(),
                name: "Major Intervention".to_string(),
                mean_time_to_repair: 60.0,
                replacement_cost: 0.0,
                deferred_prod_rate: 0.0,
                vessel_trips: vec![VesselTrip {
                    ident: "trip-1".to_string(),
                    active_repair_time: 4.0,
                    vessel_ident: "no-such-vessel".to_string(),
                }],
            }],
        });
        let err = register.validate().unwrap_err();
        assert!(matches!(err, ModelError::UnknownVessel { .. }));
    }

    #[test]
    fn register_round_trips_through_json() {
        let register = one_facility_register(0.42);
        let json = serde_json::to_string(&register).unwrap();
        let back: RiskRegister = serde_json::from_str(&json).unwrap();
        assert_eq!(back.facilities.len(), 1);
        assert_eq!(back.facilities[0].areas[0].ident, "area-1");
        assert!((back.facilities[0].areas[0].equity_share - 0.42).abs() < f64::EPSILON);
    }

    #[test]
    fn find_component_reports_unknown_ident() {
        let register = one_facility_register(0.5);
        let err = register.find_component("missing").unwrap_err();
        assert!(matches!(err, ModelError::UnknownComponent(_)));
    }
}
