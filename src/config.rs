//! Configuration management via TOML files.
//!
//! Plain option structs with sensible defaults. The network section drives
//! learning, the preprocessing section drives event-file generation.

use std::fmt::{self, Display};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use toml::Value;

/// Weight initialization scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InitScheme {
    /// All weights start at zero.
    Zero,
    /// Small symmetric uniform noise, derived deterministically from the seed.
    Uniform,
}

impl FromStr for InitScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zero" => Ok(InitScheme::Zero),
            "uniform" => Ok(InitScheme::Uniform),
            other => Err(ConfigError::Parse(format!(
                "unknown init scheme: {:?}",
                other
            ))),
        }
    }
}

/// Output activation. The model is linear by definition; the variant exists
/// so configuration files state it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
}

impl FromStr for Activation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Activation::Linear),
            other => Err(ConfigError::Parse(format!(
                "unknown activation: {:?}",
                other
            ))),
        }
    }
}

/// Network structure and learning parameters.
///
/// # Examples
///
/// ```
/// use ndl_core::config::NetworkConfig;
///
/// let config = NetworkConfig::from_toml_str("[network]\nlearning_rate = 0.05").unwrap();
/// assert!((config.learning_rate - 0.05).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct NetworkConfig {
    pub init: InitScheme,
    pub activation: Activation,
    pub use_bias: bool,
    /// Positive fixed learning rate for the per-event update.
    pub learning_rate: f32,
    /// Lowercase cues and outcomes while reading event files.
    pub lowercase: bool,
    /// Seed for the uniform init scheme.
    pub seed: u64,
}

impl NetworkConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let value: Value =
            toml::from_str(toml_str).map_err(|err| ConfigError::Parse(err.to_string()))?;
        let table = value
            .get("network")
            .and_then(|v| v.as_table())
            .cloned()
            .unwrap_or_default();

        let defaults = Self::default();

        let init = table
            .get("init")
            .and_then(|v| v.as_str())
            .map(InitScheme::from_str)
            .transpose()?
            .unwrap_or(defaults.init);

        let activation = table
            .get("activation")
            .and_then(|v| v.as_str())
            .map(Activation::from_str)
            .transpose()?
            .unwrap_or(defaults.activation);

        let use_bias = table
            .get("use_bias")
            .and_then(|v| v.as_bool())
            .unwrap_or(defaults.use_bias);

        let learning_rate = table
            .get("learning_rate")
            .and_then(|v| v.as_float())
            .map(|v| v as f32)
            .unwrap_or(defaults.learning_rate);
        if learning_rate <= 0.0 || !learning_rate.is_finite() {
            return Err(ConfigError::Parse(format!(
                "learning_rate must be positive, got {}",
                learning_rate
            )));
        }

        let lowercase = table
            .get("lowercase")
            .and_then(|v| v.as_bool())
            .unwrap_or(defaults.lowercase);

        let seed = table
            .get("seed")
            .and_then(|v| v.as_integer())
            .map(|v| v as u64)
            .unwrap_or(defaults.seed);

        Ok(Self {
            init,
            activation,
            use_bias,
            learning_rate,
            lowercase,
            seed,
        })
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            init: InitScheme::Zero,
            activation: Activation::Linear,
            use_bias: false,
            learning_rate: 0.01,
            lowercase: true,
            seed: 42,
        }
    }
}

/// Event-structure parameters for turning raw corpus lines into events.
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingConfig {
    /// Character n-gram sizes used as cues.
    pub grams: Vec<usize>,
    /// Number of consecutive tokens forming one outcome window.
    pub outcomes_per_event: usize,
    pub unique_cues: bool,
    pub unique_outcomes: bool,
    pub lowercase: bool,
    pub remove_punctuation: bool,
}

impl PreprocessingConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let value: Value =
            toml::from_str(toml_str).map_err(|err| ConfigError::Parse(err.to_string()))?;
        let table = value
            .get("preprocessing")
            .and_then(|v| v.as_table())
            .cloned()
            .unwrap_or_default();

        let defaults = Self::default();

        let grams = table
            .get("grams")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_integer())
                    .filter(|&size| size > 0)
                    .map(|size| size as usize)
                    .collect::<Vec<_>>()
            })
            .filter(|grams| !grams.is_empty())
            .unwrap_or(defaults.grams);

        let outcomes_per_event = table
            .get("outcomes_per_event")
            .and_then(|v| v.as_integer())
            .map(|v| v.max(1) as usize)
            .unwrap_or(defaults.outcomes_per_event);

        let unique_cues = table
            .get("unique_cues")
            .and_then(|v| v.as_bool())
            .unwrap_or(defaults.unique_cues);

        let unique_outcomes = table
            .get("unique_outcomes")
            .and_then(|v| v.as_bool())
            .unwrap_or(defaults.unique_outcomes);

        let lowercase = table
            .get("lowercase")
            .and_then(|v| v.as_bool())
            .unwrap_or(defaults.lowercase);

        let remove_punctuation = table
            .get("remove_punctuation")
            .and_then(|v| v.as_bool())
            .unwrap_or(defaults.remove_punctuation);

        Ok(Self {
            grams,
            outcomes_per_event,
            unique_cues,
            unique_outcomes,
            lowercase,
            remove_punctuation,
        })
    }
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            grams: vec![1, 2],
            outcomes_per_event: 3,
            unique_cues: true,
            unique_outcomes: true,
            lowercase: true,
            remove_punctuation: true,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "IO error: {}", err),
            ConfigError::Parse(err) => write!(f, "Parse error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_config_defaults_when_section_missing() {
        let config = NetworkConfig::from_toml_str("").unwrap();
        assert_eq!(config.init, InitScheme::Zero);
        assert_eq!(config.activation, Activation::Linear);
        assert!(!config.use_bias);
        assert!((config.learning_rate - 0.01).abs() < 1e-6);
        assert!(config.lowercase);
    }

    #[test]
    fn network_config_parses_custom_values() {
        let toml = "[network]\ninit = \"uniform\"\nuse_bias = true\nlearning_rate = 0.1\nlowercase = false\nseed = 7";
        let config = NetworkConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.init, InitScheme::Uniform);
        assert!(config.use_bias);
        assert!((config.learning_rate - 0.1).abs() < 1e-6);
        assert!(!config.lowercase);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn network_config_rejects_unknown_init() {
        let toml = "[network]\ninit = \"glorot\"";
        assert!(NetworkConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn network_config_rejects_nonpositive_learning_rate() {
        let toml = "[network]\nlearning_rate = 0.0";
        assert!(NetworkConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn preprocessing_config_defaults() {
        let config = PreprocessingConfig::from_toml_str("").unwrap();
        assert_eq!(config.grams, vec![1, 2]);
        assert_eq!(config.outcomes_per_event, 3);
        assert!(config.remove_punctuation);
    }

    #[test]
    fn preprocessing_config_parses_custom_values() {
        let toml =
            "[preprocessing]\ngrams = [2, 3]\noutcomes_per_event = 1\nremove_punctuation = false";
        let config = PreprocessingConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.grams, vec![2, 3]);
        assert_eq!(config.outcomes_per_event, 1);
        assert!(!config.remove_punctuation);
    }
}
