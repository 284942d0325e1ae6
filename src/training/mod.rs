//! Training loops, loss, optimizer, and per-epoch metrics.
//!
//! One epoch is one full-batch step:
//! ```text
//! logits = model.forward(all contexts)
//! loss   = -mean(log_softmax(logits)[i, target[i]])
//! grads  = 0; grads += ∂loss/∂params
//! params = adam(params, grads)
//! ```
//! A NaN or infinite loss aborts the run with [`NamegenError::NonFiniteLoss`].

use std::time::{Duration, Instant};

use ndarray::{Array, ArrayView1, ArrayView2, Dimension, Zip};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::{Mlp, ModelDims, Params};
use crate::error::{NamegenError, NamegenResult};
use crate::utils;

/// Metrics recorded for a single epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Zero-based epoch index
    pub epoch: usize,
    /// Mean cross-entropy before this epoch's update
    pub loss: f32,
    /// L2 norm of the full gradient
    pub grad_norm: f32,
    /// Wall-clock time spent on the epoch
    pub elapsed_secs: f32,
}

/// Trainer configuration: learning rate, schedule length, and Adam constants.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    pub learning_rate: f32,
    pub epochs: usize,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    /// Emit an `info` line every this many epochs (0 = only start and end).
    pub log_every: usize,
    /// Stop early, keeping the history so far, once this much time has passed.
    pub deadline: Option<Duration>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            epochs: 200,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            log_every: 10,
            deadline: None,
        }
    }
}

impl TrainerConfig {
    /// # Errors
    ///
    /// `InvalidConfig` for a non-positive or non-finite learning rate, or Adam
    /// constants outside their valid ranges.
    pub fn validate(&self) -> NamegenResult<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(NamegenError::InvalidConfig(format!(
                "learning_rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }
        if !(0.0..1.0).contains(&self.beta1) || !(0.0..1.0).contains(&self.beta2) {
            return Err(NamegenError::InvalidConfig(format!(
                "beta1/beta2 must lie in [0, 1), got {}/{}",
                self.beta1, self.beta2
            )));
        }
        if !(self.epsilon > 0.0) {
            return Err(NamegenError::InvalidConfig(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Adam optimizer state: first and second moment estimates per parameter.
#[derive(Debug, Clone)]
pub struct Adam {
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    t: i32,
    m: Params,
    v: Params,
}

/// Per-step scalars shared by every tensor update.
struct AdamStep {
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    bias1: f32,
    bias2: f32,
}

fn adam_update<D: Dimension>(
    param: &mut Array<f32, D>,
    grad: &Array<f32, D>,
    m: &mut Array<f32, D>,
    v: &mut Array<f32, D>,
    step: &AdamStep,
) {
    Zip::from(param)
        .and(grad)
        .and(m)
        .and(v)
        .for_each(|p, &g, m, v| {
            *m = step.beta1 * *m + (1.0 - step.beta1) * g;
            *v = step.beta2 * *v + (1.0 - step.beta2) * g * g;
            let m_hat = *m / step.bias1;
            let v_hat = *v / step.bias2;
            *p -= step.lr * m_hat / (v_hat.sqrt() + step.epsilon);
        });
}

impl Adam {
    pub fn new(dims: &ModelDims, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            beta1,
            beta2,
            epsilon,
            t: 0,
            m: Params::zeros(dims),
            v: Params::zeros(dims),
        }
    }

    /// Number of updates applied so far.
    pub fn steps(&self) -> i32 {
        self.t
    }

    /// Apply one bias-corrected Adam update to every tensor in `params`.
    pub fn step(&mut self, params: &mut Params, grads: &Params, learning_rate: f32) {
        self.t += 1;
        let step = AdamStep {
            lr: learning_rate,
            beta1: self.beta1,
            beta2: self.beta2,
            epsilon: self.epsilon,
            bias1: 1.0 - self.beta1.powi(self.t),
            bias2: 1.0 - self.beta2.powi(self.t),
        };

        adam_update(&mut params.embedding, &grads.embedding, &mut self.m.embedding, &mut self.v.embedding, &step);
        adam_update(&mut params.w1, &grads.w1, &mut self.m.w1, &mut self.v.w1, &step);
        adam_update(&mut params.b1, &grads.b1, &mut self.m.b1, &mut self.v.b1, &step);
        adam_update(&mut params.w2, &grads.w2, &mut self.m.w2, &mut self.v.w2, &step);
        adam_update(&mut params.b2, &grads.b2, &mut self.m.b2, &mut self.v.b2, &step);
    }
}

/// Mean categorical cross-entropy in the stable form
/// `-mean(log_softmax(logits)[i, target[i]])`.
///
/// Targets must already be valid codes. An empty batch has loss 0.
pub fn cross_entropy(logits: &ArrayView2<f32>, targets: &ArrayView1<usize>) -> f32 {
    let n = logits.nrows();
    if n == 0 {
        return 0.0;
    }
    let log_probs = utils::log_softmax_rows(logits);
    let total: f32 = targets
        .iter()
        .enumerate()
        .map(|(i, &t)| -log_probs[[i, t]])
        .sum();
    total / n as f32
}

/// Check that a dataset is non-empty and consistent with the model.
fn validate_examples(
    model: &Mlp,
    contexts: &ArrayView2<usize>,
    targets: &ArrayView1<usize>,
) -> NamegenResult<()> {
    if contexts.nrows() != targets.len() {
        return Err(NamegenError::shape_mismatch(
            "targets",
            contexts.nrows(),
            targets.len(),
        ));
    }
    if targets.is_empty() {
        return Err(NamegenError::EmptyCorpus);
    }
    let vocab_size = model.vocab_size();
    if let Some(&code) = targets.iter().find(|&&t| t >= vocab_size) {
        return Err(NamegenError::InvalidCode {
            code: code as i64,
            vocab_size,
        });
    }
    Ok(())
}

/// Mean loss of `model` on a dataset, without updating anything.
///
/// # Errors
///
/// Shape or code errors from validation and the forward pass.
pub fn evaluate(
    model: &Mlp,
    contexts: ArrayView2<usize>,
    targets: ArrayView1<usize>,
) -> NamegenResult<f32> {
    validate_examples(model, &contexts, &targets)?;
    let logits = model.forward_batch(contexts)?;
    Ok(cross_entropy(&logits.view(), &targets))
}

/// Full-batch trainer owning the optimizer state and the gradient buffer.
#[derive(Debug)]
pub struct Trainer {
    dims: ModelDims,
    config: TrainerConfig,
    optimizer: Adam,
    grads: Params,
    epoch: usize,
}

impl Trainer {
    /// # Errors
    ///
    /// `InvalidConfig` if `config` fails validation.
    pub fn new(dims: &ModelDims, config: TrainerConfig) -> NamegenResult<Self> {
        config.validate()?;
        Ok(Self {
            optimizer: Adam::new(dims, config.beta1, config.beta2, config.epsilon),
            grads: Params::zeros(dims),
            dims: *dims,
            epoch: 0,
            config,
        })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Gradients computed by the most recent step.
    pub fn grads(&self) -> &Params {
        &self.grads
    }

    /// Number of epochs completed.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// Run one full-batch epoch.
    ///
    /// # Errors
    ///
    /// - `NonFiniteLoss` if the loss is NaN or infinite; parameters are left untouched
    /// - `ShapeMismatch` if `model` was built with different dims than the trainer
    /// - `ShapeMismatch` / `InvalidCode` / `EmptyCorpus` for a malformed dataset
    pub fn step(
        &mut self,
        model: &mut Mlp,
        contexts: ArrayView2<usize>,
        targets: ArrayView1<usize>,
    ) -> NamegenResult<EpochMetrics> {
        let start = Instant::now();
        if model.dims() != &self.dims {
            return Err(NamegenError::ShapeMismatch(format!(
                "model dims {:?} do not match trainer dims {:?}",
                model.dims(),
                self.dims
            )));
        }
        validate_examples(model, &contexts, &targets)?;

        let cache = model.forward_cached(contexts)?;
        let loss = cross_entropy(&cache.logits.view(), &targets);
        if !loss.is_finite() {
            return Err(NamegenError::NonFiniteLoss {
                epoch: self.epoch,
                loss,
            });
        }

        self.grads.zero();
        model.backward(&cache, targets, &mut self.grads)?;
        let grad_norm = self.grads.squared_norm().sqrt();

        self.optimizer
            .step(&mut model.params, &self.grads, self.config.learning_rate);

        let metrics = EpochMetrics {
            epoch: self.epoch,
            loss,
            grad_norm,
            elapsed_secs: start.elapsed().as_secs_f32(),
        };
        self.epoch += 1;
        Ok(metrics)
    }

    /// Train for `config.epochs` epochs, calling `on_epoch` after each one.
    ///
    /// Returns the loss history, one entry per completed epoch.
    pub fn fit_with<F>(
        &mut self,
        model: &mut Mlp,
        contexts: ArrayView2<usize>,
        targets: ArrayView1<usize>,
        mut on_epoch: F,
    ) -> NamegenResult<Vec<f32>>
    where
        F: FnMut(&EpochMetrics),
    {
        let epochs = self.config.epochs;
        let started = Instant::now();
        let mut history = Vec::with_capacity(epochs);

        info!(
            examples = targets.len(),
            parameters = model.params.len(),
            epochs,
            learning_rate = self.config.learning_rate,
            "starting training"
        );

        for _ in 0..epochs {
            if let Some(deadline) = self.config.deadline {
                if started.elapsed() >= deadline {
                    warn!(
                        completed = history.len(),
                        requested = epochs,
                        "training deadline reached, stopping early"
                    );
                    break;
                }
            }

            let metrics = self.step(model, contexts.view(), targets.view())?;
            debug!(
                epoch = metrics.epoch,
                loss = metrics.loss,
                grad_norm = metrics.grad_norm,
                "epoch complete"
            );
            if self.config.log_every > 0 && metrics.epoch % self.config.log_every == 0 {
                info!(epoch = metrics.epoch, loss = metrics.loss, "training progress");
            }

            history.push(metrics.loss);
            on_epoch(&metrics);
        }

        info!(
            epochs = history.len(),
            final_loss = history.last().copied().unwrap_or(f32::NAN),
            elapsed_secs = started.elapsed().as_secs_f32(),
            "training finished"
        );
        Ok(history)
    }
}

/// Train `model` with full-batch Adam and default constants.
///
/// Returns one loss value per epoch.
///
/// # Errors
///
/// See [`Trainer::step`]; also `InvalidConfig` for a bad learning rate.
pub fn fit(
    model: &mut Mlp,
    contexts: ArrayView2<usize>,
    targets: ArrayView1<usize>,
    learning_rate: f32,
    epochs: usize,
) -> NamegenResult<Vec<f32>> {
    let config = TrainerConfig {
        learning_rate,
        epochs,
        ..TrainerConfig::default()
    };
    let mut trainer = Trainer::new(model.dims(), config)?;
    trainer.fit_with(model, contexts, targets, |_| {})
}
