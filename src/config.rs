//! User configuration.
//!
//! A JSON file holds the strictness presets, which preset is active, rested
//! cycles and search tuning. Every field has a default, so a partial file (or
//! none at all) is fine.
//!
//! ```json
//! {
//!   "strict": true,
//!   "rest_cycles": [0, 3],
//!   "result_limit": 50
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::WorkshopLimits;
use crate::optimizer::OptimizerOptions;
use crate::strictness::Strictness;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("rest cycle {cycle} is outside the {cycles}-cycle season")]
    RestCycleOutOfRange { cycle: usize, cycles: usize },
    #[error("invalid limits: {0}")]
    InvalidLimits(&'static str),
}

/// Persisted optimizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Use `strict_defaults` rather than `relaxed_defaults`
    pub strict: bool,
    pub strict_defaults: Strictness,
    pub relaxed_defaults: Strictness,
    /// Zero-based cycles the workshops rest in
    pub rest_cycles: Vec<usize>,
    pub limits: WorkshopLimits,
    pub work_per_call: u64,
    pub result_limit: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        let options = OptimizerOptions::default();
        Configuration {
            strict: false,
            strict_defaults: Strictness::strict_defaults(),
            relaxed_defaults: Strictness::relaxed_defaults(),
            rest_cycles: Vec::new(),
            limits: options.limits,
            work_per_call: options.work_per_call,
            result_limit: options.result_limit,
        }
    }
}

impl Configuration {
    /// Reads a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Configuration::load(path)
        } else {
            Ok(Configuration::default())
        }
    }

    /// The active strictness preset.
    pub fn strictness(&self) -> &Strictness {
        if self.strict {
            &self.strict_defaults
        } else {
            &self.relaxed_defaults
        }
    }

    /// Builds optimizer options from these settings.
    ///
    /// # Errors
    ///
    /// Fails if the season has no cycles or no workshops, or if a rest cycle
    /// lies outside the season.
    pub fn options(&self) -> Result<OptimizerOptions, ConfigError> {
        if self.limits.workshops == 0 {
            return Err(ConfigError::InvalidLimits("at least one workshop is required"));
        }
        if self.limits.cycles == 0 {
            return Err(ConfigError::InvalidLimits("a season needs at least one cycle"));
        }
        let cycles = self.limits.cycles;
        let mut rest_cycles = vec![false; cycles];
        for &cycle in &self.rest_cycles {
            let slot = rest_cycles
                .get_mut(cycle)
                .ok_or(ConfigError::RestCycleOutOfRange { cycle, cycles })?;
            *slot = true;
        }
        Ok(OptimizerOptions {
            strictness: self.strictness().clone(),
            rest_cycles,
            limits: self.limits,
            work_per_call: self.work_per_call,
            result_limit: self.result_limit,
        })
    }
}
