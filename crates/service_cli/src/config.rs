//! CLI configuration management
//!
//! Settings come from an optional TOML file and are overridden by
//! command-line flags. Any key left unset falls back to the library
//! defaults when the [`TrainingConfig`] is built.
//!
//! ```toml
//! [training]
//! layers = [2, 50, 50, 50, 1]
//! learning_rate = 0.001
//! epochs = 5000
//! optimiser = "adam"
//!
//! [sampling]
//! n_collocation = 5000
//! n_boundary = 500
//!
//! [output]
//! directory = "runs/atm"
//! log_level = "debug"
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use pricer_pinn::optimiser::OptimiserKind;
use pricer_pinn::training::TrainingConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{CliError, Result};

/// Unknown log level name.
#[derive(Debug, Error)]
#[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
pub struct ParseLogLevelError(String);

/// Log levels accepted by `--log-level` and `[output] log_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ParseLogLevelError(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        LogLevel::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// `[training]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingSection {
    pub layers: Option<Vec<usize>>,
    pub learning_rate: Option<f64>,
    pub epochs: Option<usize>,
    pub log_every: Option<usize>,
    pub console_every: Option<usize>,
    pub seed: Option<u64>,
    pub optimiser: Option<OptimiserKind>,
    pub terminal_weight: Option<f64>,
    pub boundary_weight: Option<f64>,
    pub domain_multiplier: Option<f64>,
}

/// `[sampling]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplingSection {
    pub n_collocation: Option<usize>,
    pub n_boundary: Option<usize>,
    pub min_spot: Option<f64>,
}

/// `[output]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    /// Directory receiving `history.csv` and `training.json` when no
    /// explicit paths are given.
    pub directory: Option<PathBuf>,
    pub log_level: Option<LogLevel>,
}

/// Training options given on the command line. Each one set here wins
/// over the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingOverrides {
    pub layers: Option<Vec<usize>>,
    pub learning_rate: Option<f64>,
    pub epochs: Option<usize>,
    pub seed: Option<u64>,
    pub optimiser: Option<OptimiserKind>,
    pub n_collocation: Option<usize>,
    pub n_boundary: Option<usize>,
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub training: TrainingSection,
    pub sampling: SamplingSection,
    pub output: OutputSection,
}

impl CliConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file is not an error: every setting falls back to its
    /// default.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "configuration file not found, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents).map_err(|message| CliError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> std::result::Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    /// Builds the training configuration with CLI flags taking priority
    /// over file values.
    pub fn training_config(&self, overrides: &TrainingOverrides) -> Result<TrainingConfig> {
        let training = &self.training;
        let sampling = &self.sampling;
        let mut builder = TrainingConfig::builder();

        if let Some(layers) = overrides.layers.clone().or_else(|| training.layers.clone()) {
            builder = builder.layers(layers);
        }
        if let Some(lr) = overrides.learning_rate.or(training.learning_rate) {
            builder = builder.learning_rate(lr);
        }
        if let Some(epochs) = overrides.epochs.or(training.epochs) {
            builder = builder.epochs(epochs);
        }
        if let Some(seed) = overrides.seed.or(training.seed) {
            builder = builder.seed(seed);
        }
        if let Some(kind) = overrides.optimiser.or(training.optimiser) {
            builder = builder.optimiser(kind);
        }
        if let Some(n) = overrides.n_collocation.or(sampling.n_collocation) {
            builder = builder.n_collocation(n);
        }
        if let Some(n) = overrides.n_boundary.or(sampling.n_boundary) {
            builder = builder.n_boundary(n);
        }
        if let Some(min_spot) = sampling.min_spot {
            builder = builder.min_spot(min_spot);
        }
        if let Some(every) = training.log_every {
            builder = builder.log_every(every);
        }
        if let Some(every) = training.console_every {
            builder = builder.console_every(every);
        }
        if let Some(multiplier) = training.domain_multiplier {
            builder = builder.domain_multiplier(multiplier);
        }
        if training.terminal_weight.is_some() || training.boundary_weight.is_some() {
            let defaults = pricer_pinn::loss::LossWeights::default();
            builder = builder.loss_weights(
                training.terminal_weight.unwrap_or(defaults.terminal),
                training.boundary_weight.unwrap_or(defaults.boundary),
            );
        }

        Ok(builder.build()?)
    }

    /// Log level from the file, if any.
    pub fn log_level(&self) -> Option<LogLevel> {
        self.output.log_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_core::types::PricingError;
    use pricer_pinn::training::{DEFAULT_EPOCHS, DEFAULT_SEED};

    #[test]
    fn test_log_level_from_str() {
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("Warn").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("verbose").is_err());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = CliConfig::from_toml("").unwrap();
        assert_eq!(config, CliConfig::default());

        let training = config.training_config(&TrainingOverrides::default()).unwrap();
        assert_eq!(training.epochs(), DEFAULT_EPOCHS);
        assert_eq!(training.seed(), DEFAULT_SEED);
    }

    #[test]
    fn test_toml_deserialization() {
        let toml = r#"
            [training]
            layers = [2, 16, 16, 1]
            learning_rate = 0.01
            epochs = 250
            optimiser = "gradient_descent"
            boundary_weight = 5.0

            [sampling]
            n_collocation = 800
            n_boundary = 80

            [output]
            directory = "runs"
            log_level = "debug"
        "#;
        let config = CliConfig::from_toml(toml).unwrap();
        assert_eq!(config.training.layers, Some(vec![2, 16, 16, 1]));
        assert_eq!(config.training.optimiser, Some(OptimiserKind::GradientDescent));
        assert_eq!(config.output.directory, Some(PathBuf::from("runs")));
        assert_eq!(config.log_level(), Some(LogLevel::Debug));

        let training = config.training_config(&TrainingOverrides::default()).unwrap();
        assert_eq!(training.architecture().layers(), &[2, 16, 16, 1]);
        assert_eq!(training.epochs(), 250);
        assert_eq!(training.sampling().n_collocation, 800);
        assert_eq!(training.weights().boundary, 5.0);
        assert_eq!(training.weights().terminal, 10.0);
    }

    #[test]
    fn test_cli_overrides_file() {
        let config = CliConfig::from_toml("[training]\nepochs = 250\nseed = 1\n").unwrap();
        let overrides = TrainingOverrides {
            epochs: Some(40),
            ..Default::default()
        };
        let training = config.training_config(&overrides).unwrap();
        assert_eq!(training.epochs(), 40);
        assert_eq!(training.seed(), 1);
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_values() {
        assert!(CliConfig::from_toml("[training]\nepoch = 10\n").is_err());
        assert!(CliConfig::from_toml("[output]\nlog_level = \"loud\"\n").is_err());

        let config = CliConfig::from_toml("[training]\nlayers = [3, 8, 1]\n").unwrap();
        let err = config.training_config(&TrainingOverrides::default()).unwrap_err();
        assert!(matches!(err, CliError::Pricing(PricingError::InvalidInput(_))));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = CliConfig::from_file(Path::new("definitely/not/here/bs-pinn.toml")).unwrap();
        assert_eq!(config, CliConfig::default());
    }
}
