//! Analysis settings, read from an optional TOML file and overridden by
//! command-line flags.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::dendrogram::Linkage;
use crate::error::AnalysisError;

/// Cohesion threshold used when none is configured.
pub const DEFAULT_COHESION_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Keep calls into code outside the project as `[EXT] ` nodes.
    pub include_external: bool,
    pub linkage: Linkage,
    pub cohesion_threshold: f64,
    /// Worker threads; half the cores when unset.
    pub threads: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            include_external: true,
            linkage: Linkage::default(),
            cohesion_threshold: DEFAULT_COHESION_THRESHOLD,
            threads: None,
        }
    }
}

impl AnalysisConfig {
    /// Read a TOML config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: AnalysisConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.cohesion_threshold.is_finite() || !(0.0..=1.0).contains(&self.cohesion_threshold) {
            return Err(AnalysisError::invalid(
                "cohesion_threshold",
                format!("must be a number in [0, 1], got {}", self.cohesion_threshold),
            ));
        }
        if self.threads == Some(0) {
            return Err(AnalysisError::invalid("threads", "must be at least 1"));
        }
        Ok(())
    }
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Dot,
}

impl FromStr for OutputFormat {
    type Err = AnalysisError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "dot" => Ok(OutputFormat::Dot),
            _ => Err(AnalysisError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Dot => write!(f, "dot"),
        }
    }
}
