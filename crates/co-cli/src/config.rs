//! Run configuration
//!
//! Every section and key is optional; a missing file section falls back to
//! the defaults below. Command-line flags are applied on top by the binary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};

use co_core::clean::{Aggregation, Normalization};
use co_core::merge::JoinKind;
use co_core::SourceKind;
use co_models::{InformationCriterion, StationarityConfig};

/// Full pipeline configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data: DataConfig,
    pub preprocessing: PreprocessingConfig,
    pub stationarity: StationarityConfig,
    pub var: VarConfig,
    pub granger: GrangerConfig,
    pub plot: PlotConfig,
    pub validation: ValidationConfig,
    pub logging: LoggingConfig,
}

// ==================== Sections ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    pub temperature_path: PathBuf,
    pub secondary_path: PathBuf,
    /// `mortality` or `road_accidents`
    pub secondary_dataset: SourceKind,
    /// Temperature column carried into the analysis
    pub temperature_column: String,
    /// Secondary column carried into the analysis; defaults to the first
    /// value column of the dataset
    pub secondary_column: Option<String>,
    /// chrono format used for months in the report
    pub date_format: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            temperature_path: PathBuf::from("data/Moscow_Temp (2010-2024).csv"),
            secondary_path: PathBuf::from("data/Moscow/moscow_mortality.csv"),
            secondary_dataset: SourceKind::Mortality,
            temperature_column: "Temperature".to_string(),
            secondary_column: None,
            date_format: "%Y-%m".to_string(),
        }
    }
}

impl DataConfig {
    pub fn secondary_column(&self) -> &str {
        match &self.secondary_column {
            Some(name) => name,
            None => self.secondary_dataset.value_columns()[0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreprocessingConfig {
    pub temperature_normalization: Normalization,
    pub secondary_normalization: Normalization,
    pub temperature_aggregation: Aggregation,
    pub secondary_aggregation: Aggregation,
    pub join: JoinKind,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            temperature_normalization: Normalization::ZScore,
            secondary_normalization: Normalization::Log,
            temperature_aggregation: Aggregation::Mean,
            secondary_aggregation: Aggregation::Sum,
            join: JoinKind::Inner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VarConfig {
    /// Upper end of the lag scan, clipped to what the sample supports
    pub max_lag: usize,
    /// The first entry picks the fitted order
    pub criteria: Vec<InformationCriterion>,
}

impl Default for VarConfig {
    fn default() -> Self {
        Self {
            max_lag: 30,
            criteria: vec![InformationCriterion::Aic, InformationCriterion::Bic],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrangerConfig {
    pub alpha: f64,
    /// Lag of the tests; the fitted VAR order when unset
    pub max_lag: Option<usize>,
}

impl Default for GrangerConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            max_lag: None,
        }
    }
}

/// Carried for front ends that draw the series; nothing is rendered here
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotConfig {
    pub style: String,
    pub interactive: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            style: "seaborn-v0_8-darkgrid".to_string(),
            interactive: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    pub enabled: bool,
    pub bootstrap_iterations: usize,
    /// Rolling estimation window, in months
    pub cross_validation_window: usize,
    /// Forecast horizon per origin
    pub cross_validation_steps: usize,
    pub seed: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bootstrap_iterations: 1000,
            cross_validation_window: 24,
            cross_validation_steps: 3,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Level or full filter directive, e.g. `info` or `co_models=debug`
    pub level: String,
    /// Appended to when set
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some(PathBuf::from("analysis.log")),
        }
    }
}

// ==================== Loading ====================

impl Config {
    /// Read a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let levels = [
            ("stationarity.adf_alpha", self.stationarity.adf_alpha),
            ("stationarity.kpss_alpha", self.stationarity.kpss_alpha),
            ("granger.alpha", self.granger.alpha),
        ];
        for (key, alpha) in levels {
            ensure!(
                alpha > 0.0 && alpha < 1.0,
                "{} must lie in (0, 1), got {}",
                key,
                alpha
            );
        }

        ensure!(self.var.max_lag >= 1, "var.max_lag must be at least 1");
        ensure!(
            self.granger.max_lag != Some(0),
            "granger.max_lag must be at least 1"
        );
        if self.data.secondary_dataset == SourceKind::Temperature {
            bail!("data.secondary_dataset must be 'mortality' or 'road_accidents'");
        }
        ensure!(
            !self.data.date_format.trim().is_empty(),
            "data.date_format must not be empty"
        );

        let v = &self.validation;
        if v.enabled {
            ensure!(
                v.bootstrap_iterations >= 1,
                "validation.bootstrap_iterations must be at least 1"
            );
            ensure!(
                v.cross_validation_steps >= 1,
                "validation.cross_validation_steps must be at least 1"
            );
            ensure!(
                v.cross_validation_window >= 2,
                "validation.cross_validation_window must be at least 2"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data.secondary_dataset, SourceKind::Mortality);
        assert_eq!(config.data.secondary_column(), "Mortality");
        assert_eq!(config.preprocessing.temperature_normalization, Normalization::ZScore);
        assert_eq!(config.preprocessing.secondary_aggregation, Aggregation::Sum);
        assert_eq!(config.stationarity.max_diff_order, 2);
        assert_eq!(config.var.max_lag, 30);
        assert_eq!(
            config.var.criteria,
            vec![InformationCriterion::Aic, InformationCriterion::Bic]
        );
        assert_eq!(config.validation.cross_validation_window, 24);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [data]
            secondary_dataset = "road_accidents"

            [preprocessing]
            secondary_normalization = "none"

            [stationarity]
            kpss_alpha = 0.1

            [var]
            max_lag = 6
            criteria = ["bic"]
            "#,
        )
        .unwrap();

        assert_eq!(config.data.secondary_dataset, SourceKind::RoadAccidents);
        assert_eq!(config.data.secondary_column(), "Accidents");
        assert_eq!(config.preprocessing.secondary_normalization, Normalization::None);
        assert_eq!(config.preprocessing.temperature_normalization, Normalization::ZScore);
        assert_eq!(config.stationarity.kpss_alpha, 0.1);
        assert_eq!(config.stationarity.adf_alpha, 0.05);
        assert_eq!(config.var.criteria, vec![InformationCriterion::Bic]);
        assert_eq!(config.granger.alpha, 0.05);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(Config::from_toml("[var]\nmaxlag = 3\n").is_err());
        assert!(Config::from_toml("[granger]\nalpha = \"high\"\n").is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.granger.alpha = 1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.var.max_lag = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.data.secondary_dataset = SourceKind::Temperature;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.validation.bootstrap_iterations = 0;
        assert!(config.validate().is_err());
        config.validation.enabled = false;
        assert!(config.validate().is_ok());
    }
}
