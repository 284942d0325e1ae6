//! Error type shared by every stage of the pipeline.
//!
//! Vocabulary and example-building errors are construction-time failures and
//! surface straight to the caller. [`NamegenError::NonFiniteLoss`] aborts a
//! training run at the epoch it is detected. [`NamegenError::GenerationCapExceeded`]
//! is local to one sample; see [`crate::sampling::GenerationPolicy`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by vocabulary, example building, the model, training and sampling.
#[derive(Debug, Error)]
pub enum NamegenError {
    /// The corpus has no names, or its names contain no characters.
    #[error("empty corpus: no characters to build a vocabulary from")]
    EmptyCorpus,

    /// A character was not seen when the vocabulary was built.
    #[error("unknown character {ch:?}")]
    UnknownCharacter {
        /// The offending character.
        ch: char,
    },

    /// A name contains the reserved boundary symbol.
    #[error("name {name:?} contains the reserved boundary symbol {ch:?}")]
    ReservedCharacter {
        /// The boundary symbol.
        ch: char,
        /// The name it was found in.
        name: String,
    },

    /// A code lies outside `[0, vocab_size - 1]`.
    #[error("invalid code {code} for vocabulary of size {vocab_size}")]
    InvalidCode {
        /// The offending code.
        code: i64,
        /// Size of the vocabulary it was checked against.
        vocab_size: usize,
    },

    /// Context window shorter than one position.
    #[error("invalid context length {context_length}: must be at least 1")]
    InvalidContextLength {
        /// The rejected context length.
        context_length: usize,
    },

    /// Training diverged: the loss became NaN or infinite.
    #[error("non-finite loss {loss} at epoch {epoch}")]
    NonFiniteLoss {
        /// Zero-based epoch at which the loss was observed.
        epoch: usize,
        /// The non-finite value.
        loss: f32,
    },

    /// A sample reached the length cap without producing the boundary code.
    #[error("generation exceeded cap of {cap} characters (partial: {partial:?})")]
    GenerationCapExceeded {
        /// The cap that was hit.
        cap: usize,
        /// Characters generated before the cap was hit.
        partial: String,
    },

    /// Tensor shapes disagree.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Invalid model or training configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The next-code distribution could not be sampled from.
    #[error("sampling failed: {0}")]
    Sampling(String),

    /// Reading an input file failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl NamegenError {
    /// Create a `ShapeMismatch` error describing expected vs actual.
    pub fn shape_mismatch(what: &str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch(format!("{what}: expected {expected}, got {actual}"))
    }
}

/// Result alias used throughout the crate.
pub type NamegenResult<T> = Result<T, NamegenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = NamegenError::UnknownCharacter { ch: 'q' };
        assert!(err.to_string().contains("'q'"));

        let err = NamegenError::NonFiniteLoss {
            epoch: 7,
            loss: f32::NAN,
        };
        assert!(err.to_string().contains("epoch 7"));

        let err = NamegenError::InvalidCode {
            code: -1,
            vocab_size: 27,
        };
        assert_eq!(err.to_string(), "invalid code -1 for vocabulary of size 27");
    }

    #[test]
    fn test_shape_mismatch_helper() {
        let err = NamegenError::shape_mismatch("context length", 3, 4);
        assert_eq!(
            err.to_string(),
            "shape mismatch: context length: expected 3, got 4"
        );
    }
}
