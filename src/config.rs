//! Engine Configuration
//!
//! Policy knobs for the FMECA/RBI engine as operator-tunable TOML values.
//!
//! ## Loading Order
//!
//! 1. `SUBSEA_RBI_CONFIG` environment variable (path to TOML file)
//! 2. `rbi_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! Defaults reproduce the documented engine behaviour: a missing consequence
//! fails the computation, and only `Lagging` detectability discounts risk
//! (by half).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::Detectability;

/// Environment variable pointing at a config file.
pub const CONFIG_ENV_VAR: &str = "SUBSEA_RBI_CONFIG";

/// Default config filename searched in the working directory.
pub const CONFIG_FILENAME: &str = "rbi_config.toml";

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error ({path}): {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {0}")]
    Validation(String),
}

// ============================================================================
// Policy types
// ============================================================================

/// What to do when a catalog consequence label has no match on the component.
///
/// The default is `Fail`: a silently unpriced failure mode understates risk,
/// which is the dangerous direction for an inspection interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingConsequencePolicy {
    /// Surface a missing-consequence error and abort the assembly.
    #[default]
    Fail,
    /// Price the failure mode at zero cost and log a warning.
    ZeroCost,
}

/// Detectability discount factors applied to risk during RBI aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectabilityDiscounts {
    /// A mode only caught after degradation starts is assumed half as likely
    /// to be intercepted before consequence.
    pub lagging: f64,
    pub leading: f64,
    pub not_detectable: f64,
}

impl Default for DetectabilityDiscounts {
    fn default() -> Self {
        Self {
            lagging: 0.5,
            leading: 1.0,
            not_detectable: 1.0,
        }
    }
}

impl DetectabilityDiscounts {
    /// The multiplier for one detectability class.
    pub fn factor(&self, detectable: Detectability) -> f64 {
        match detectable {
            Detectability::Lagging => self.lagging,
            Detectability::Leading => self.leading,
            Detectability::NotDetectable => self.not_detectable,
        }
    }
}

// ============================================================================
// Top-level config
// ============================================================================

/// Root engine configuration.
///
/// Load with `EngineConfig::load()`, which searches the env var, the local
/// `rbi_config.toml`, then falls back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub missing_consequence_policy: MissingConsequencePolicy,
    pub detectability_discounts: DetectabilityDiscounts,
}

impl EngineConfig {
    /// Load configuration using the standard search order:
    /// 1. `$SUBSEA_RBI_CONFIG` environment variable
    /// 2. `./rbi_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded engine config from {CONFIG_ENV_VAR}");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {CONFIG_ENV_VAR}, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{CONFIG_ENV_VAR} points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(CONFIG_FILENAME);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded engine config from ./{CONFIG_FILENAME}");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{CONFIG_FILENAME}, using defaults");
                }
            }
        }

        info!("No {CONFIG_FILENAME} found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Discount factors must stay within [0, 1]: a discount above 1 would
    /// inflate risk beyond the undiscounted figure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.detectability_discounts;
        for (name, value) in [
            ("lagging", d.lagging),
            ("leading", d.leading),
            ("not_detectable", d.not_detectable),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "detectability_discounts.{name} must be within [0, 1] (got {value})"
                )));
            }
        }
        Ok(())
    }
}
