//! Autoregressive name generation.
//!
//! Starting from an all-boundary context, the model's logits are turned into a
//! categorical distribution with softmax and one code is drawn per step. Drawing
//! the boundary code ends the name; the boundary itself is never emitted.

use ndarray::Array1;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::core::Mlp;
use crate::data::vocab::{Vocabulary, BOUNDARY_CODE};
use crate::error::{NamegenError, NamegenResult};
use crate::utils;

/// What [`generate_many`] does when a single sample hits the length cap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenerationPolicy {
    /// Propagate the first failure (in sample order).
    #[default]
    FailFast,
    /// Drop samples that hit the cap and keep the rest. Other errors still propagate.
    BestEffort,
}

/// Options for batch generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerateOptions {
    /// Maximum characters per name before giving up.
    pub max_length_cap: usize,
    /// Seed of the master RNG that derives one stream per sample.
    pub seed: u64,
    pub policy: GenerationPolicy,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            max_length_cap: 50,
            seed: 42,
            policy: GenerationPolicy::FailFast,
        }
    }
}

fn check_compatible(
    model: &Mlp,
    vocab: &Vocabulary,
    context_length: usize,
    max_length_cap: usize,
) -> NamegenResult<()> {
    if max_length_cap == 0 {
        return Err(NamegenError::InvalidConfig(
            "max_length_cap must be non-zero".to_string(),
        ));
    }
    if context_length < 1 {
        return Err(NamegenError::InvalidContextLength { context_length });
    }
    if context_length != model.context_length() {
        return Err(NamegenError::shape_mismatch(
            "context length",
            model.context_length(),
            context_length,
        ));
    }
    if vocab.size() != model.vocab_size() {
        return Err(NamegenError::shape_mismatch(
            "vocabulary size",
            model.vocab_size(),
            vocab.size(),
        ));
    }
    Ok(())
}

/// Draw one code from the softmax of `logits`.
fn sample_code<R: Rng + ?Sized>(logits: &Array1<f32>, rng: &mut R) -> NamegenResult<usize> {
    let probs = utils::softmax(&logits.view());
    let dist = WeightedIndex::<f32>::new(probs.iter())
        .map_err(|e| NamegenError::Sampling(format!("{e} (probabilities: {probs})")))?;
    Ok(dist.sample(rng))
}

/// Generate one name.
///
/// # Errors
///
/// - `GenerationCapExceeded` once `max_length_cap` characters have been produced
///   without drawing the boundary code
/// - `InvalidContextLength` / `ShapeMismatch` if the arguments disagree with the model
/// - `InvalidConfig` if `max_length_cap` is zero
/// - `Sampling` if the model yields a degenerate distribution (e.g. NaN logits)
pub fn generate<R: Rng + ?Sized>(
    model: &Mlp,
    vocab: &Vocabulary,
    context_length: usize,
    max_length_cap: usize,
    rng: &mut R,
) -> NamegenResult<String> {
    check_compatible(model, vocab, context_length, max_length_cap)?;

    let mut context = vec![BOUNDARY_CODE; context_length];
    let mut name = String::new();
    let mut generated = 0;

    loop {
        let logits = model.forward(&context)?;
        let code = sample_code(&logits, rng)?;
        if code == BOUNDARY_CODE {
            return Ok(name);
        }

        name.push(vocab.decode(code as i64)?);
        generated += 1;
        if generated >= max_length_cap {
            return Err(NamegenError::GenerationCapExceeded {
                cap: max_length_cap,
                partial: name,
            });
        }

        context.rotate_left(1);
        context[context_length - 1] = code;
    }
}

/// Generate `count` independent names in parallel.
///
/// Each sample gets its own `StdRng`, seeded from a master RNG, so the output is
/// identical for a fixed `options.seed` regardless of thread scheduling.
///
/// # Errors
///
/// Under [`GenerationPolicy::FailFast`], the first error in sample order. Under
/// [`GenerationPolicy::BestEffort`], any error other than `GenerationCapExceeded`.
pub fn generate_many(
    model: &Mlp,
    vocab: &Vocabulary,
    context_length: usize,
    count: usize,
    options: &GenerateOptions,
) -> NamegenResult<Vec<String>> {
    check_compatible(model, vocab, context_length, options.max_length_cap)?;

    let mut master = StdRng::seed_from_u64(options.seed);
    let seeds: Vec<u64> = (0..count).map(|_| master.gen()).collect();

    let results: Vec<NamegenResult<String>> = seeds
        .par_iter()
        .map(|&seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            generate(model, vocab, context_length, options.max_length_cap, &mut rng)
        })
        .collect();

    match options.policy {
        GenerationPolicy::FailFast => results.into_iter().collect(),
        GenerationPolicy::BestEffort => {
            let mut names = Vec::with_capacity(count);
            let mut skipped = 0usize;
            for result in results {
                match result {
                    Ok(name) => names.push(name),
                    Err(NamegenError::GenerationCapExceeded { cap, partial }) => {
                        debug!(cap, partial = %partial, "skipping sample that hit the length cap");
                        skipped += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
            if skipped > 0 {
                warn!(skipped, requested = count, "some samples hit the length cap");
            }
            Ok(names)
        }
    }
}
