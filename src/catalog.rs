//! Failure-Mode Catalog
//!
//! Read-only reference data for the FMECA engine: for every subcomponent
//! category, the set of known failure modes with their mean time to failure,
//! detectability class, inspection type, time-dependence flag and the global
//! consequence label a component must price.
//!
//! The catalog is loaded once at startup from a JSON file keyed
//! `category -> failure description -> entry` and is never mutated afterwards,
//! so it can be shared read-only across threads. A missing category or
//! description is a lookup error surfaced to the caller, never a default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog I/O error ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog parse error ({path}): {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown subcomponent category '{0}'")]
    UnknownCategory(String),

    #[error("Unknown failure mode '{description}' for category '{category}'")]
    UnknownFailureMode {
        category: String,
        description: String,
    },

    #[error(
        "Invalid catalog entry '{description}' for category '{category}': \
         mean_time_to_failure must be a positive, finite number of years \
         (got {mttf})"
    )]
    InvalidEntry {
        category: String,
        description: String,
        mttf: f64,
    },
}

// ============================================================================
// Catalog types
// ============================================================================

/// Whether a failure mode can be caught by an inspection method before its
/// consequence materialises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Detectability {
    /// Inspection only sees the failure after degradation has started.
    Lagging,
    /// Inspection catches the precursor before the consequence.
    Leading,
    /// The mode cannot be observed by inspection at all.
    #[serde(rename = "Not Detectable")]
    NotDetectable,
}

impl std::fmt::Display for Detectability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Detectability::Lagging => write!(f, "Lagging"),
            Detectability::Leading => write!(f, "Leading"),
            Detectability::NotDetectable => write!(f, "Not Detectable"),
        }
    }
}

/// One catalog entry: everything known about a single failure mode of a
/// subcomponent category.
///
/// `mean_time_to_failure` is in years. `consequence_description` is the
/// label resolved against the owning component's consequence list during
/// FMECA assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureMode {
    pub mean_time_to_failure: f64,
    pub time_dependent: bool,
    pub detectable: Detectability,
    pub inspection_type: String,
    pub consequence_description: String,
}

/// The full failure-mode reference catalog.
///
/// Keyed by subcomponent category, then failure description. `BTreeMap` keeps
/// iteration order stable so assembled FMECA tables and reports are
/// deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureModeCatalog {
    modes: BTreeMap<String, BTreeMap<String, FailureMode>>,
}

impl FailureModeCatalog {
    /// Build a catalog from already-parsed entries, validating every one.
    pub fn new(
        modes: BTreeMap<String, BTreeMap<String, FailureMode>>,
    ) -> Result<Self, CatalogError> {
        let catalog = Self { modes };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load and validate a catalog from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let catalog: Self =
            serde_json::from_str(&contents).map_err(|e| CatalogError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        catalog.validate()?;
        info!(
            path = %path.display(),
            categories = catalog.category_count(),
            failure_modes = catalog.failure_mode_count(),
            "Loaded failure-mode catalog"
        );
        Ok(catalog)
    }

    /// Every entry must carry a usable MTTF; the probability formula divides
    /// by it, so a zero or negative value poisons every downstream figure.
    fn validate(&self) -> Result<(), CatalogError> {
        for (category, entries) in &self.modes {
            for (description, fm) in entries {
                if !fm.mean_time_to_failure.is_finite() || fm.mean_time_to_failure <= 0.0 {
                    return Err(CatalogError::InvalidEntry {
                        category: category.clone(),
                        description: description.clone(),
                        mttf: fm.mean_time_to_failure,
                    });
                }
            }
        }
        Ok(())
    }

    /// All failure modes known for a subcomponent category.
    pub fn modes_for_category(
        &self,
        category: &str,
    ) -> Result<&BTreeMap<String, FailureMode>, CatalogError> {
        self.modes
            .get(category)
            .ok_or_else(|| CatalogError::UnknownCategory(category.to_string()))
    }

    /// A single failure mode by category and description.
    pub fn lookup(
        &self,
        category: &str,
        description: &str,
    ) -> Result<&FailureMode, CatalogError> {
        self.modes_for_category(category)?
            .get(description)
            .ok_or_else(|| CatalogError::UnknownFailureMode {
                category: category.to_string(),
                description: description.to_string(),
            })
    }

    pub fn category_count(&self) -> usize {
        self.modes.len()
    }

    pub fn failure_mode_count(&self) -> usize {
        self.modes.values().map(BTreeMap::len).sum()
    }

    /// Every distinct inspection type named anywhere in the catalog.
    pub fn inspection_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .modes
            .values()
            .flat_map(|entries| entries.values())
            .map(|fm| fm.inspection_type.clone())
            .collect();
        types.sort();
        types.dedup();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mttf: f64) -> FailureMode {
        FailureMode {
            mean_time_to_failure: mttf,
            time_dependent: false,
            detectable: Detectability::Lagging,
            inspection_type: "ROV Inspection".to_string(),
            consequence_description: "Minor Intervention".to_string(),
        }
    }

    fn small_catalog() -> FailureModeCatalog {
        let mut entries = BTreeMap::new();
        entries.insert("Loss of Function due to Blockage".to_string(), entry(100.0));
        let mut modes = BTreeMap::new();
        modes.insert("Actuated Process Valve".to_string(), entries);
        FailureModeCatalog::new(modes).unwrap()
    }

    #[test]
    fn lookup_known_entry() {
        let catalog = small_catalog();
        let fm = catalog
            .lookup("Actuated Process Valve", "Loss of Function due to Blockage")
            .unwrap();
        assert!((fm.mean_time_to_failure - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_category_is_an_error() {
        let catalog = small_catalog();
        let err = catalog.modes_for_category("Subsea Pump").unwrap_err();
        assert!(matches!(err, CatalogError::UnknownCategory(_)));
        assert!(err.to_string().contains("Subsea Pump"));
    }

    #[test]
    fn unknown_failure_mode_is_an_error() {
        let catalog = small_catalog();
        let err = catalog
            .lookup("Actuated Process Valve", "Loss of Function due to Vibration")
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownFailureMode { .. }));
    }

    #[test]
    fn non_positive_mttf_fails_validation() {
        let mut entries = BTreeMap::new();
        entries.insert("Broken Entry".to_string(), entry(0.0));
        let mut modes = BTreeMap::new();
        modes.insert("Actuated Process Valve".to_string(), entries);
        let err = FailureModeCatalog::new(modes).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEntry { .. }));
    }

    #[test]
    fn detectability_deserializes_from_catalog_spelling() {
        let lagging: Detectability = serde_json::from_str("\"Lagging\"").unwrap();
        assert_eq!(lagging, Detectability::Lagging);
        let nd: Detectability = serde_json::from_str("\"Not Detectable\"").unwrap();
        assert_eq!(nd, Detectability::NotDetectable);
    }

    #[test]
    fn inspection_types_are_deduplicated() {
        let mut entries = BTreeMap::new();
        entries.insert("Mode A".to_string(), entry(10.0));
        entries.insert("Mode B".to_string(), entry(20.0));
        let mut diver = entry(30.0);
        diver.inspection_type = "Diver Inspection".to_string();
        entries.insert("Mode C".to_string(), diver);
        let mut modes = BTreeMap::new();
        modes.insert("Manifold".to_string(), entries);
        let catalog = FailureModeCatalog::new(modes).unwrap();
        assert_eq!(
            catalog.inspection_types(),
            vec!["Diver Inspection".to_string(), "ROV Inspection".to_string()]
        );
    }
}
