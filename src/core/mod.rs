//! Core language model: learned character embedding plus a two-layer perceptron.
//!
//! This module provides the fundamental model structures and operations:
//! - Explicit parameter struct shared by the model, its gradients, and the optimizer
//! - Batched forward pass with cached intermediates
//! - Backpropagation of mean cross-entropy through both linear layers, the
//!   nonlinearity, and the embedding concatenation
//!
//! ## Shapes
//!
//! For a batch of `N` contexts of `C` codes, vocabulary `V`, embedding width `D`
//! and `H` hidden units:
//! ```text
//! contexts (N, C) ──gather──▶ (N, C, D) ──concat──▶ x (N, C·D)
//! pre    = x · W1 + b1        (N, H)      W1: (C·D, H), b1: (H)
//! hidden = f(pre)             (N, H)
//! logits = hidden · W2 + b2   (N, V)      W2: (H, V),   b2: (V)
//! ```
//!
//! Context position `j` occupies columns `j·D..(j+1)·D` of `x`. Logits are
//! unnormalized; softmax is the caller's responsibility.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use ndarray_rand::RandomExt;
use rand::distributions::Uniform;
use rand::Rng;

use crate::error::{NamegenError, NamegenResult};
use crate::utils;

/// Activation function trait for the hidden layer.
///
/// Implementations provide both the activation and its derivative, both evaluated
/// at the pre-activation values.
pub trait Activation: Send + Sync {
    /// Apply activation to a matrix (elementwise): f(X)
    fn apply_matrix(&self, x: &Array2<f32>) -> Array2<f32>;

    /// Derivative of activation applied to matrix (elementwise): f'(X)
    fn derivative_matrix(&self, x: &Array2<f32>) -> Array2<f32>;

    /// Name for debugging
    fn name(&self) -> &'static str;
}

/// Rectified linear activation: f(x) = max(0, x), f'(x) = 1 for x > 0 else 0.
#[derive(Debug, Clone, Copy)]
pub struct ReluActivation;

impl Activation for ReluActivation {
    fn apply_matrix(&self, x: &Array2<f32>) -> Array2<f32> {
        x.mapv(utils::relu)
    }

    fn derivative_matrix(&self, x: &Array2<f32>) -> Array2<f32> {
        x.mapv(utils::d_relu)
    }

    fn name(&self) -> &'static str {
        "relu"
    }
}

/// Tanh activation: f(x) = tanh(x), f'(x) = 1 - tanh²(x)
///
/// Smooth everywhere, which makes it the better choice for finite-difference
/// gradient checks.
#[derive(Debug, Clone, Copy)]
pub struct TanhActivation;

impl Activation for TanhActivation {
    fn apply_matrix(&self, x: &Array2<f32>) -> Array2<f32> {
        x.mapv(utils::tanh)
    }

    fn derivative_matrix(&self, x: &Array2<f32>) -> Array2<f32> {
        x.mapv(utils::d_tanh)
    }

    fn name(&self) -> &'static str {
        "tanh"
    }
}

/// Model dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDims {
    /// V: number of codes, boundary included.
    pub vocab_size: usize,
    /// C: number of codes in each context window.
    pub context_length: usize,
    /// D: width of each character embedding.
    pub embedding_dim: usize,
    /// H: width of the hidden layer.
    pub hidden_units: usize,
}

impl ModelDims {
    /// Width of the concatenated embedding input: `C·D`.
    #[must_use]
    pub fn input_dim(&self) -> usize {
        self.context_length * self.embedding_dim
    }

    /// Check that every dimension is usable.
    ///
    /// # Errors
    ///
    /// - `InvalidContextLength` if `context_length < 1`
    /// - `InvalidConfig` for a vocabulary smaller than 2 or a zero width
    pub fn validate(&self) -> NamegenResult<()> {
        if self.context_length < 1 {
            return Err(NamegenError::InvalidContextLength {
                context_length: self.context_length,
            });
        }
        if self.vocab_size < 2 {
            return Err(NamegenError::InvalidConfig(format!(
                "vocab_size must be at least 2 (boundary plus one character), got {}",
                self.vocab_size
            )));
        }
        if self.embedding_dim == 0 || self.hidden_units == 0 {
            return Err(NamegenError::InvalidConfig(
                "embedding_dim and hidden_units must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Every trainable tensor of the model.
///
/// The same layout holds gradients and optimizer moment estimates.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    /// Embedding table, shape `(V, D)`
    pub embedding: Array2<f32>,
    /// First layer weights, shape `(C·D, H)`
    pub w1: Array2<f32>,
    /// First layer bias, shape `(H)`
    pub b1: Array1<f32>,
    /// Second layer weights, shape `(H, V)`
    pub w2: Array2<f32>,
    /// Second layer bias, shape `(V)`
    pub b2: Array1<f32>,
}

impl Params {
    /// All-zero tensors with the shapes implied by `dims`.
    #[must_use]
    pub fn zeros(dims: &ModelDims) -> Self {
        Self {
            embedding: Array2::zeros((dims.vocab_size, dims.embedding_dim)),
            w1: Array2::zeros((dims.input_dim(), dims.hidden_units)),
            b1: Array1::zeros(dims.hidden_units),
            w2: Array2::zeros((dims.hidden_units, dims.vocab_size)),
            b2: Array1::zeros(dims.vocab_size),
        }
    }

    /// Randomly initialized parameters.
    ///
    /// - Embedding: `U(-1, 1)`
    /// - Weights: Xavier/Glorot uniform `U(-l, l)`, `l = sqrt(6 / (fan_in + fan_out))`
    /// - Biases: zero
    pub fn random<R: Rng>(dims: &ModelDims, rng: &mut R) -> Self {
        let xavier = |fan_in: usize, fan_out: usize| {
            let limit = (6.0f32 / (fan_in + fan_out) as f32).sqrt();
            Uniform::new(-limit, limit)
        };

        let embedding = Array2::random_using(
            (dims.vocab_size, dims.embedding_dim),
            Uniform::new(-1.0f32, 1.0),
            rng,
        );
        let w1 = Array2::random_using(
            (dims.input_dim(), dims.hidden_units),
            xavier(dims.input_dim(), dims.hidden_units),
            rng,
        );
        let w2 = Array2::random_using(
            (dims.hidden_units, dims.vocab_size),
            xavier(dims.hidden_units, dims.vocab_size),
            rng,
        );

        Self {
            embedding,
            w1,
            b1: Array1::zeros(dims.hidden_units),
            w2,
            b2: Array1::zeros(dims.vocab_size),
        }
    }

    /// Reset every tensor to zero in place.
    pub fn zero(&mut self) {
        self.embedding.fill(0.0);
        self.w1.fill(0.0);
        self.b1.fill(0.0);
        self.w2.fill(0.0);
        self.b2.fill(0.0);
    }

    /// Total number of scalars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.embedding.len() + self.w1.len() + self.b1.len() + self.w2.len() + self.b2.len()
    }

    /// `true` if there are no scalars at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of squares over every tensor.
    #[must_use]
    pub fn squared_norm(&self) -> f32 {
        let sq = |a: f32, &v: &f32| a + v * v;
        self.embedding.iter().fold(0.0, sq)
            + self.w1.iter().fold(0.0, sq)
            + self.b1.iter().fold(0.0, sq)
            + self.w2.iter().fold(0.0, sq)
            + self.b2.iter().fold(0.0, sq)
    }

    /// `true` if no entry is NaN or infinite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.embedding.iter().all(|v| v.is_finite())
            && self.w1.iter().all(|v| v.is_finite())
            && self.b1.iter().all(|v| v.is_finite())
            && self.w2.iter().all(|v| v.is_finite())
            && self.b2.iter().all(|v| v.is_finite())
    }

    /// Check every tensor against the shapes implied by `dims`.
    fn check_shapes(&self, dims: &ModelDims) -> NamegenResult<()> {
        let expected = Self::zeros(dims);
        let pairs = [
            ("embedding", self.embedding.shape(), expected.embedding.shape()),
            ("w1", self.w1.shape(), expected.w1.shape()),
            ("b1", self.b1.shape(), expected.b1.shape()),
            ("w2", self.w2.shape(), expected.w2.shape()),
            ("b2", self.b2.shape(), expected.b2.shape()),
        ];
        for (name, actual, wanted) in pairs {
            if actual != wanted {
                return Err(NamegenError::ShapeMismatch(format!(
                    "{name}: expected {wanted:?}, got {actual:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Intermediate tensors of one batched forward pass, kept for backpropagation.
#[derive(Debug, Clone)]
pub struct ForwardCache {
    /// Input codes, shape `(N, C)`
    pub contexts: Array2<usize>,
    /// Concatenated embeddings, shape `(N, C·D)`
    pub inputs: Array2<f32>,
    /// Hidden pre-activations, shape `(N, H)`
    pub pre: Array2<f32>,
    /// Hidden activations, shape `(N, H)`
    pub hidden: Array2<f32>,
    /// Output logits, shape `(N, V)`
    pub logits: Array2<f32>,
}

/// Fixed-context MLP language model.
///
/// # Architecture
///
/// - **Embedding:** `V × D` table, one row per code
/// - **Hidden layer:** `C·D → H` linear transform with bias, then activation
/// - **Output layer:** `H → V` linear transform with bias, producing logits
pub struct Mlp {
    dims: ModelDims,
    /// Trainable parameters; mutated only by the trainer.
    pub params: Params,
    /// Hidden-layer nonlinearity
    pub activation: Box<dyn Activation>,
}

impl std::fmt::Debug for Mlp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mlp")
            .field("dims", &self.dims)
            .field("params", &format!("<{} parameters>", self.params.len()))
            .field(
                "activation",
                &format!("<{} activation>", self.activation.name()),
            )
            .finish()
    }
}

impl Mlp {
    /// Create a randomly initialized model with ReLU hidden units.
    ///
    /// # Errors
    ///
    /// See [`ModelDims::validate`].
    pub fn new<R: Rng>(dims: ModelDims, rng: &mut R) -> NamegenResult<Self> {
        Self::with_activation(dims, Box::new(ReluActivation), rng)
    }

    /// Create a randomly initialized model with a custom activation function.
    pub fn with_activation<R: Rng>(
        dims: ModelDims,
        activation: Box<dyn Activation>,
        rng: &mut R,
    ) -> NamegenResult<Self> {
        dims.validate()?;
        let params = Params::random(&dims, rng);
        Ok(Self {
            dims,
            params,
            activation,
        })
    }

    /// Create a model from explicit parameters.
    ///
    /// # Errors
    ///
    /// Invalid dims, or any tensor whose shape disagrees with `dims`.
    pub fn from_params(
        dims: ModelDims,
        params: Params,
        activation: Box<dyn Activation>,
    ) -> NamegenResult<Self> {
        dims.validate()?;
        params.check_shapes(&dims)?;
        Ok(Self {
            dims,
            params,
            activation,
        })
    }

    /// Returns the model's dimensions.
    pub fn dims(&self) -> &ModelDims {
        &self.dims
    }

    /// Number of codes the model predicts over.
    pub fn vocab_size(&self) -> usize {
        self.dims.vocab_size
    }

    /// Number of codes in each input context.
    pub fn context_length(&self) -> usize {
        self.dims.context_length
    }

    /// Validate a batch of contexts: `C` columns, every code below `V`.
    fn check_contexts(&self, contexts: &ArrayView2<usize>) -> NamegenResult<()> {
        if contexts.ncols() != self.dims.context_length {
            return Err(NamegenError::shape_mismatch(
                "context length",
                self.dims.context_length,
                contexts.ncols(),
            ));
        }
        check_codes(contexts.iter(), self.dims.vocab_size)
    }

    /// Gather and concatenate embeddings: `(N, C)` codes to `(N, C·D)` features.
    fn embed(&self, contexts: &ArrayView2<usize>) -> Array2<f32> {
        let d = self.dims.embedding_dim;
        let mut inputs = Array2::zeros((contexts.nrows(), self.dims.input_dim()));
        for (i, context) in contexts.outer_iter().enumerate() {
            for (j, &code) in context.iter().enumerate() {
                inputs
                    .slice_mut(s![i, j * d..(j + 1) * d])
                    .assign(&self.params.embedding.row(code));
            }
        }
        inputs
    }

    /// Batched forward pass keeping every intermediate for [`backward`](Self::backward).
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` if `contexts` does not have `C` columns
    /// - `InvalidCode` if any code is `>= V`
    pub fn forward_cached(&self, contexts: ArrayView2<usize>) -> NamegenResult<ForwardCache> {
        self.check_contexts(&contexts)?;

        let inputs = self.embed(&contexts);

        let mut pre = inputs.dot(&self.params.w1);
        pre += &self.params.b1;

        let hidden = self.activation.apply_matrix(&pre);

        let mut logits = hidden.dot(&self.params.w2);
        logits += &self.params.b2;

        Ok(ForwardCache {
            contexts: contexts.to_owned(),
            inputs,
            pre,
            hidden,
            logits,
        })
    }

    /// Batched forward pass: `(N, C)` contexts to `(N, V)` logits.
    pub fn forward_batch(&self, contexts: ArrayView2<usize>) -> NamegenResult<Array2<f32>> {
        Ok(self.forward_cached(contexts)?.logits)
    }

    /// Forward pass for a single context of `C` codes, returning `V` logits.
    pub fn forward(&self, context: &[usize]) -> NamegenResult<Array1<f32>> {
        if context.len() != self.dims.context_length {
            return Err(NamegenError::shape_mismatch(
                "context length",
                self.dims.context_length,
                context.len(),
            ));
        }
        let batch = ArrayView2::from_shape((1, context.len()), context)
            .map_err(|e| NamegenError::ShapeMismatch(e.to_string()))?;
        let logits = self.forward_batch(batch)?;
        Ok(logits.index_axis_move(Axis(0), 0))
    }

    /// Accumulate gradients of the mean cross-entropy loss into `grads`.
    ///
    /// # Algorithm
    ///
    /// ```text
    /// dlogits = (softmax(logits) - onehot(targets)) / N      (N, V)
    /// dW2 += hiddenᵀ · dlogits,  db2 += Σ_rows dlogits
    /// dpre = (dlogits · W2ᵀ) ⊙ f'(pre)                       (N, H)
    /// dW1 += xᵀ · dpre,          db1 += Σ_rows dpre
    /// dx = dpre · W1ᵀ                                         (N, C·D)
    /// dEmbedding[code(i, j)] += dx[i, j·D..(j+1)·D]
    /// ```
    ///
    /// Gradients are added, not assigned: the caller zeroes `grads` between steps.
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` if `targets` and the cached batch disagree in length
    /// - `InvalidCode` if a target is `>= V`
    pub fn backward(
        &self,
        cache: &ForwardCache,
        targets: ArrayView1<usize>,
        grads: &mut Params,
    ) -> NamegenResult<()> {
        let n = cache.logits.nrows();
        if targets.len() != n {
            return Err(NamegenError::shape_mismatch("targets", n, targets.len()));
        }
        if n == 0 {
            return Ok(());
        }
        check_codes(targets.iter(), self.dims.vocab_size)?;

        let mut dlogits = utils::softmax_rows(&cache.logits.view());
        for (i, &t) in targets.iter().enumerate() {
            dlogits[[i, t]] -= 1.0;
        }
        dlogits /= n as f32;

        // Output layer
        grads.w2 += &cache.hidden.t().dot(&dlogits);
        grads.b2 += &dlogits.sum_axis(Axis(0));

        // Hidden layer, gated by the activation derivative
        let mut dpre = dlogits.dot(&self.params.w2.t());
        let f_prime = self.activation.derivative_matrix(&cache.pre);
        Zip::from(&mut dpre).and(&f_prime).for_each(|g, &fp| *g *= fp);

        grads.w1 += &cache.inputs.t().dot(&dpre);
        grads.b1 += &dpre.sum_axis(Axis(0));

        // Undo the concatenation and scatter into embedding rows
        let d = self.dims.embedding_dim;
        let dinputs = dpre.dot(&self.params.w1.t());
        for (i, context) in cache.contexts.outer_iter().enumerate() {
            for (j, &code) in context.iter().enumerate() {
                grads
                    .embedding
                    .row_mut(code)
                    .scaled_add(1.0, &dinputs.slice(s![i, j * d..(j + 1) * d]));
            }
        }

        Ok(())
    }
}

/// Reject any code outside `[0, vocab_size)`.
fn check_codes<'a>(codes: impl Iterator<Item = &'a usize>, vocab_size: usize) -> NamegenResult<()> {
    for &code in codes {
        if code >= vocab_size {
            return Err(NamegenError::InvalidCode {
                code: code as i64,
                vocab_size,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::cross_entropy;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dims() -> ModelDims {
        ModelDims {
            vocab_size: 4,
            context_length: 3,
            embedding_dim: 2,
            hidden_units: 5,
        }
    }

    fn model(seed: u64) -> Mlp {
        Mlp::new(dims(), &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn test_network_init_shapes() {
        let m = model(0);
        assert_eq!(m.params.embedding.shape(), &[4, 2]);
        assert_eq!(m.params.w1.shape(), &[6, 5]);
        assert_eq!(m.params.b1.len(), 5);
        assert_eq!(m.params.w2.shape(), &[5, 4]);
        assert_eq!(m.params.b2.len(), 4);
        assert_eq!(m.params.len(), 8 + 30 + 5 + 20 + 4);
    }

    #[test]
    fn test_init_breaks_symmetry() {
        let m = model(1);
        let first = m.params.w1[[0, 0]];
        assert!(m.params.w1.iter().any(|&v| v != first));
        assert!(m.params.embedding.iter().any(|&v| v != 0.0));
        assert!(m.params.w2.iter().any(|&v| v != 0.0));
    }

    #[test]
    fn test_init_is_seeded() {
        assert_eq!(model(7).params, model(7).params);
        assert_ne!(model(7).params, model(8).params);
    }

    #[test]
    fn test_invalid_dims() {
        let mut rng = StdRng::seed_from_u64(0);
        let bad_context = ModelDims {
            context_length: 0,
            ..dims()
        };
        assert!(matches!(
            Mlp::new(bad_context, &mut rng),
            Err(NamegenError::InvalidContextLength { context_length: 0 })
        ));

        let bad_vocab = ModelDims {
            vocab_size: 1,
            ..dims()
        };
        assert!(matches!(
            Mlp::new(bad_vocab, &mut rng),
            Err(NamegenError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_forward_shapes() {
        let m = model(2);
        let logits = m.forward(&[0, 1, 2]).unwrap();
        assert_eq!(logits.len(), 4);

        let batch = array![[0, 0, 0], [0, 1, 2], [3, 3, 3]];
        let logits = m.forward_batch(batch.view()).unwrap();
        assert_eq!(logits.shape(), &[3, 4]);
    }

    #[test]
    fn test_forward_batch_matches_single() {
        let m = model(3);
        let batch = array![[0, 1, 2], [2, 1, 0]];
        let logits = m.forward_batch(batch.view()).unwrap();
        for (i, row) in batch.outer_iter().enumerate() {
            let single = m.forward(row.as_slice().unwrap()).unwrap();
            for (a, b) in single.iter().zip(logits.row(i).iter()) {
                assert!((a - b).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_concatenation_preserves_position() {
        let m = model(4);
        let cache = m.forward_cached(array![[1, 2, 3]].view()).unwrap();
        assert_eq!(cache.inputs.slice(s![0, 0..2]), m.params.embedding.row(1));
        assert_eq!(cache.inputs.slice(s![0, 2..4]), m.params.embedding.row(2));
        assert_eq!(cache.inputs.slice(s![0, 4..6]), m.params.embedding.row(3));
    }

    #[test]
    fn test_relu_hidden_is_non_negative() {
        let m = model(5);
        let cache = m.forward_cached(array![[0, 1, 2], [3, 2, 1]].view()).unwrap();
        assert!(cache.hidden.iter().all(|&h| h >= 0.0));
    }

    #[test]
    fn test_forward_rejects_bad_input() {
        let m = model(6);
        assert!(matches!(
            m.forward(&[0, 1]),
            Err(NamegenError::ShapeMismatch(_))
        ));
        assert!(matches!(
            m.forward(&[0, 1, 4]),
            Err(NamegenError::InvalidCode {
                code: 4,
                vocab_size: 4
            })
        ));
    }

    #[test]
    fn test_from_params_checks_shapes() {
        let mut params = Params::zeros(&dims());
        assert!(Mlp::from_params(dims(), params.clone(), Box::new(ReluActivation)).is_ok());

        params.b2 = Array1::zeros(3);
        assert!(matches!(
            Mlp::from_params(dims(), params, Box::new(ReluActivation)),
            Err(NamegenError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_params_zero() {
        let mut p = model(9).params;
        assert!(p.squared_norm() > 0.0);
        p.zero();
        assert_eq!(p.squared_norm(), 0.0);
        assert!(p.is_finite());
    }

    /// Compare analytic gradients with central finite differences.
    #[test]
    fn test_backward_matches_finite_differences() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut m = Mlp::with_activation(dims(), Box::new(TanhActivation), &mut rng).unwrap();
        let contexts = array![[0, 0, 0], [0, 0, 1], [0, 1, 2], [1, 2, 3], [2, 3, 0]];
        let targets = array![1, 2, 3, 0, 0];

        let cache = m.forward_cached(contexts.view()).unwrap();
        let mut grads = Params::zeros(m.dims());
        m.backward(&cache, targets.view(), &mut grads).unwrap();

        let loss_at = |m: &Mlp| {
            let logits = m.forward_batch(contexts.view()).unwrap();
            cross_entropy(&logits.view(), &targets.view())
        };

        let h = 1e-2f32;
        let tol = 2e-3f32;

        macro_rules! check {
            ($field:ident, $idx:expr) => {{
                let orig = m.params.$field[$idx];
                m.params.$field[$idx] = orig + h;
                let up = loss_at(&m);
                m.params.$field[$idx] = orig - h;
                let down = loss_at(&m);
                m.params.$field[$idx] = orig;
                let numeric = (up - down) / (2.0 * h);
                let analytic = grads.$field[$idx];
                assert!(
                    (numeric - analytic).abs() < tol,
                    "{}[{:?}]: numeric {} vs analytic {}",
                    stringify!($field),
                    $idx,
                    numeric,
                    analytic
                );
            }};
        }

        check!(embedding, [0, 0]);
        check!(embedding, [2, 1]);
        check!(w1, [0, 0]);
        check!(w1, [5, 4]);
        check!(b1, 2);
        check!(w2, [1, 3]);
        check!(w2, [4, 0]);
        check!(b2, 0);
        check!(b2, 3);
    }

    #[test]
    fn test_backward_accumulates() {
        let m = model(12);
        let contexts = array![[0, 1, 2]];
        let targets = array![3];
        let cache = m.forward_cached(contexts.view()).unwrap();

        let mut once = Params::zeros(m.dims());
        m.backward(&cache, targets.view(), &mut once).unwrap();
        let mut twice = Params::zeros(m.dims());
        m.backward(&cache, targets.view(), &mut twice).unwrap();
        m.backward(&cache, targets.view(), &mut twice).unwrap();

        for (a, b) in once.b2.iter().zip(twice.b2.iter()) {
            assert!((2.0 * a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_backward_rejects_mismatched_targets() {
        let m = model(13);
        let cache = m.forward_cached(array![[0, 1, 2]].view()).unwrap();
        let mut grads = Params::zeros(m.dims());
        assert!(matches!(
            m.backward(&cache, array![1, 2].view(), &mut grads),
            Err(NamegenError::ShapeMismatch(_))
        ));
    }
}
