//! # Pipeline Configuration
//!
//! Loaded once at startup from an optional TOML file. Every field has a
//! default, and the defaults reproduce the baseline: entropy-seeded
//! generation, 25% markup, no record limit, no time limit.
//!
//! ```toml
//! seed = 42
//! markup_bp = 2500
//! record_limit = 100
//! run_for_ms = 5000
//! ```
//!
//! Buffer capacity is deliberately absent; it is fixed at
//! [`DEFAULT_CAPACITY`](certline_core::DEFAULT_CAPACITY).

use std::path::Path;
use std::time::Duration;

use certline_catalog::DEFAULT_MARKUP_BP;
use serde::Deserialize;

use crate::error::{PipelineError, PipelineResult};

/// Upper bound on the markup: 1000%.
const MARKUP_BP_MAX: u32 = 100_000;

/// Runtime knobs for a pipeline run.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Seed for the producer's random source. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Retail markup in basis points.
    pub markup_bp: u32,
    /// Stop both loops after this many records.
    pub record_limit: Option<u64>,
    /// Request a stop after this many milliseconds.
    pub run_for_ms: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            markup_bp: DEFAULT_MARKUP_BP,
            record_limit: None,
            run_for_ms: None,
        }
    }
}

impl PipelineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] on malformed TOML, unknown keys, or
    /// values that fail [`validate`](Self::validate).
    pub fn from_toml_str(source: &str) -> PipelineResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] for a zero record limit, a zero run
    /// time, or a markup above 1000%.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.record_limit == Some(0) {
            return Err(PipelineError::Config("record_limit must be positive".into()));
        }
        if self.run_for_ms == Some(0) {
            return Err(PipelineError::Config("run_for_ms must be positive".into()));
        }
        if self.markup_bp > MARKUP_BP_MAX {
            return Err(PipelineError::Config(format!(
                "markup_bp {} exceeds {MARKUP_BP_MAX}",
                self.markup_bp
            )));
        }
        Ok(())
    }

    /// `run_for_ms` as a duration.
    #[must_use]
    pub fn run_for(&self) -> Option<Duration> {
        self.run_for_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_baseline() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.markup_bp, 2_500);
        assert!(config.run_for().is_none());
    }

    #[test]
    fn test_full_document() {
        let config = PipelineConfig::from_toml_str(
            "seed = 42\nmarkup_bp = 1000\nrecord_limit = 10\nrun_for_ms = 250\n",
        )
        .unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.markup_bp, 1_000);
        assert_eq!(config.record_limit, Some(10));
        assert_eq!(config.run_for(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_capacity_is_not_configurable() {
        let err = PipelineConfig::from_toml_str("capacity = 16\n").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(PipelineConfig::from_toml_str("record_limit = 0").is_err());
        assert!(PipelineConfig::from_toml_str("run_for_ms = 0").is_err());
        assert!(PipelineConfig::from_toml_str("markup_bp = 100001").is_err());
        assert!(PipelineConfig::from_toml_str("seed = \"abc\"").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = PipelineConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
