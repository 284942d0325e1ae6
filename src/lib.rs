//! # namegen
//!
//! A character-level language model for short names: a learned character embedding
//! feeding a two-layer perceptron over a fixed context window, trained with
//! full-batch gradient descent and sampled autoregressively.
//!
//! ## Structure
//!
//! - [`data`] — Vocabulary, corpus loading, context→target example building
//! - [`core`] — Model parameters, forward pass, backpropagation
//! - [`training`] — Cross-entropy loss, Adam, the epoch loop
//! - [`sampling`] — Name generation from a trained model
//! - [`utils`] — Activations and (log-)softmax
//!
//! ## Usage
//!
//! ```rust,ignore
//! let vocab = Vocabulary::build(&names)?;
//! let (contexts, targets) = build_examples(&names, &vocab, config.context_length)?;
//! let mut model = Mlp::new(config.model_dims(vocab.size()), &mut rng)?;
//! let losses = fit(&mut model, contexts.view(), targets.view(), 0.01, 200)?;
//! let names = generate_many(&model, &vocab, config.context_length, 20, &config.generate_options())?;
//! ```

pub mod core;
pub mod data;
pub mod error;
pub mod sampling;
pub mod training;
pub mod utils;

use serde::{Deserialize, Serialize};
use std::path::Path;

pub use crate::core::{Activation, ForwardCache, Mlp, ModelDims, Params, ReluActivation, TanhActivation};
pub use data::{build_examples, load_names, Vocabulary, BOUNDARY, BOUNDARY_CODE};
pub use error::{NamegenError, NamegenResult};
pub use sampling::{generate, generate_many, GenerateOptions, GenerationPolicy};
pub use training::{cross_entropy, evaluate, fit, Adam, EpochMetrics, Trainer, TrainerConfig};

/// Model, training, and sampling configuration.
///
/// Every field has a default, so a JSON file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// C: width of the sliding context window.
    pub context_length: usize,
    /// D: width of each learned character vector.
    pub embedding_dim: usize,
    /// H: width of the hidden layer.
    pub hidden_units: usize,
    pub learning_rate: f32,
    /// Number of full-batch updates.
    pub epochs: usize,
    /// Number of names to generate after training.
    pub sample_count: usize,
    /// Generation safety bound, in characters.
    pub max_length_cap: usize,
    /// Seed for initialization and sampling.
    pub seed: u64,
    /// Log training progress every this many epochs.
    pub log_every: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            context_length: 3,
            embedding_dim: 2,
            hidden_units: 200,
            learning_rate: 0.01,
            epochs: 200,
            sample_count: 20,
            max_length_cap: 50,
            seed: 42,
            log_every: 10,
        }
    }
}

impl Config {
    /// Load a config from a JSON file; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `InvalidConfig` if it does not parse.
    pub fn from_json_file(path: &Path) -> NamegenResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| NamegenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|e| {
            NamegenError::InvalidConfig(format!("failed to parse {}: {e}", path.display()))
        })
    }

    /// # Errors
    ///
    /// - `InvalidContextLength` if `context_length < 1`
    /// - `InvalidConfig` for zero widths, a zero cap, or a bad learning rate
    pub fn validate(&self) -> NamegenResult<()> {
        if self.context_length < 1 {
            return Err(NamegenError::InvalidContextLength {
                context_length: self.context_length,
            });
        }
        if self.embedding_dim == 0 || self.hidden_units == 0 {
            return Err(NamegenError::InvalidConfig(
                "embedding_dim and hidden_units must be non-zero".to_string(),
            ));
        }
        if self.max_length_cap == 0 {
            return Err(NamegenError::InvalidConfig(
                "max_length_cap must be non-zero".to_string(),
            ));
        }
        self.trainer_config().validate()
    }

    /// Model dimensions for a vocabulary of `vocab_size` codes.
    #[must_use]
    pub fn model_dims(&self, vocab_size: usize) -> ModelDims {
        ModelDims {
            vocab_size,
            context_length: self.context_length,
            embedding_dim: self.embedding_dim,
            hidden_units: self.hidden_units,
        }
    }

    #[must_use]
    pub fn trainer_config(&self) -> TrainerConfig {
        TrainerConfig {
            learning_rate: self.learning_rate,
            epochs: self.epochs,
            log_every: self.log_every,
            ..TrainerConfig::default()
        }
    }

    /// Sampling options with the default fail-fast policy.
    #[must_use]
    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            max_length_cap: self.max_length_cap,
            seed: self.seed,
            policy: GenerationPolicy::FailFast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.context_length, 3);
        assert_eq!(config.embedding_dim, 2);
        assert_eq!(config.hidden_units, 200);
        assert!((config.learning_rate - 0.01).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            context_length: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(NamegenError::InvalidContextLength { context_length: 0 })
        ));

        let config = Config {
            learning_rate: -1.0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(NamegenError::InvalidConfig(_))
        ));

        let config = Config {
            max_length_cap: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"hidden_units": 64, "epochs": 5}"#).unwrap();
        assert_eq!(config.hidden_units, 64);
        assert_eq!(config.epochs, 5);
        assert_eq!(config.context_length, 3);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_from_json_file() {
        let dir = std::env::temp_dir().join("namegen_test_config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"context_length": 4, "sample_count": 3}"#).unwrap();

        let config = Config::from_json_file(&path).unwrap();
        assert_eq!(config.context_length, 4);
        assert_eq!(config.sample_count, 3);

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            Config::from_json_file(&path),
            Err(NamegenError::InvalidConfig(_))
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_derived_configs() {
        let config = Config::default();
        let dims = config.model_dims(27);
        assert_eq!(dims.vocab_size, 27);
        assert_eq!(dims.input_dim(), 6);
        assert_eq!(config.trainer_config().epochs, 200);
        assert_eq!(config.generate_options().max_length_cap, 50);
    }
}
