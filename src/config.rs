//! Report settings: defaults, optional TOML file, CLI overrides on top.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// Settings of the fare report.
///
/// ```toml
/// confidence = 0.99
/// top_routes = 10
/// premium_class = "Preferente"
/// flexible_marker = "Flexible"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Confidence level of the interval around the mean price.
    pub confidence: f64,
    /// How many routes the busiest-routes section lists.
    pub top_routes: usize,
    /// `train_class` value that marks a premium ticket.
    pub premium_class: String,
    /// Substring of `fare` that marks a flexible ticket.
    pub flexible_marker: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            confidence: 0.95,
            top_routes: 5,
            premium_class: "Preferente".to_string(),
            flexible_marker: "Flexible".to_string(),
        }
    }
}

impl ReportConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("parsing report config")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    /// Reject settings the report cannot use.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.confidence > 0.0 && self.confidence < 1.0,
            "confidence level must lie in (0, 1), got {}",
            self.confidence
        );
        Ok(())
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                log::info!("using report config {}", p.display());
                Self::from_file(p)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ReportConfig::default();
        assert_eq!(cfg.confidence, 0.95);
        assert_eq!(cfg.top_routes, 5);
        assert_eq!(cfg.premium_class, "Preferente");
        assert_eq!(cfg.flexible_marker, "Flexible");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let cfg = ReportConfig::from_toml_str("confidence = 0.9\ntop_routes = 3\n").unwrap();
        assert_eq!(cfg.confidence, 0.9);
        assert_eq!(cfg.top_routes, 3);
        assert_eq!(cfg.premium_class, "Preferente");
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(ReportConfig::from_toml_str("confidance = 0.9").is_err());
    }

    #[test]
    fn test_confidence_outside_unit_interval_is_rejected() {
        assert!(ReportConfig::default().validate().is_ok());
        for confidence in [0.0, 1.0, 1.5, -0.2, f64::NAN] {
            let cfg = ReportConfig {
                confidence,
                ..ReportConfig::default()
            };
            assert!(cfg.validate().is_err(), "{confidence} accepted");
        }
        let cfg = ReportConfig::from_toml_str("confidence = 1.5").unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_load_without_path_is_default() {
        assert_eq!(ReportConfig::load(None).unwrap(), ReportConfig::default());
    }
}
