//! Math utilities: activations and (log-)softmax.
//!
//! All softmax variants subtract the row maximum before exponentiating, so large
//! logits never overflow and `log_softmax` never takes the log of an underflowed zero.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Activation function: rectified linear unit.
#[inline]
pub fn relu(x: f32) -> f32 {
    x.max(0.0)
}

/// Derivative of ReLU, taken as 0 at the origin.
#[inline]
pub fn d_relu(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Activation function: tanh.
#[inline]
pub fn tanh(x: f32) -> f32 {
    x.tanh()
}

/// Derivative of tanh.
#[inline]
pub fn d_tanh(x: f32) -> f32 {
    let t = x.tanh();
    1.0 - t * t
}

/// Maximum of a slice of logits, `-inf` when empty.
fn max_of(logits: &ArrayView1<f32>) -> f32 {
    logits.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

/// Numerically stable softmax of a single logit vector.
#[must_use]
pub fn softmax(logits: &ArrayView1<f32>) -> Array1<f32> {
    let max = max_of(logits);
    let mut exp = logits.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp /= sum;
    exp
}

/// Numerically stable log-softmax of a single logit vector:
/// `x - max - ln(Σ exp(x - max))`.
#[must_use]
pub fn log_softmax(logits: &ArrayView1<f32>) -> Array1<f32> {
    let max = max_of(logits);
    let log_sum = logits.iter().map(|&v| (v - max).exp()).sum::<f32>().ln();
    logits.mapv(|v| v - max - log_sum)
}

/// Row-wise softmax of an `(N, V)` logit matrix.
#[must_use]
pub fn softmax_rows(logits: &ArrayView2<f32>) -> Array2<f32> {
    let mut out = Array2::zeros(logits.dim());
    for (src, mut dst) in logits.axis_iter(Axis(0)).zip(out.axis_iter_mut(Axis(0))) {
        dst.assign(&softmax(&src));
    }
    out
}

/// Row-wise log-softmax of an `(N, V)` logit matrix.
#[must_use]
pub fn log_softmax_rows(logits: &ArrayView2<f32>) -> Array2<f32> {
    let mut out = Array2::zeros(logits.dim());
    for (src, mut dst) in logits.axis_iter(Axis(0)).zip(out.axis_iter_mut(Axis(0))) {
        dst.assign(&log_softmax(&src));
    }
    out
}
