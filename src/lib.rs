//! subsea-rbi: Offshore FMECA & Risk-Based Inspection engine
//!
//! Models the reliability and commercial risk of offshore-facility equipment
//! and derives inspection intervals from a facility-level risk budget.
//!
//! ## Pipeline
//!
//! - **Catalog**: read-only failure-mode reference data per subcomponent
//!   category (MTTF, detectability, inspection type, consequence label)
//! - **Reliability**: MTTF → annual probability of failure (Poisson)
//! - **Cost**: consequence pricing (deferred production + equity-share
//!   pro-rated equipment and vessel mobilisation)
//! - **FMECA**: subcomponents × catalog failure modes → Failure rows
//! - **RBI**: filter by inspection type, discount by detectability,
//!   aggregate risk, derive the inspection interval
//!
//! Every figure is a pure derivation from current model + catalog state;
//! the engine stores no risk and invalidates nothing — callers recompute.

pub mod catalog;
pub mod config;
pub mod cost;
pub mod fmeca;
pub mod model;
pub mod rbi;
pub mod reliability;

// Re-export the engine surface
pub use catalog::{CatalogError, Detectability, FailureMode, FailureModeCatalog};
pub use config::{ConfigError, DetectabilityDiscounts, EngineConfig, MissingConsequencePolicy};
pub use cost::{consequence_cost, CostBreakdown, CostError};
pub use fmeca::{assemble_fmeca, Failure, Fmeca, FmecaError};
pub use model::{
    Area, Component, Consequence, Facility, ModelError, RiskRegister, SubComponent, Vessel,
    VesselTrip,
};
pub use rbi::{
    component_risk_summary, run_rbi, ComponentRiskReport, InspectionTypeRisk, RbiError, RbiResult,
};
pub use reliability::{annual_probability_of_failure, ReliabilityError};
