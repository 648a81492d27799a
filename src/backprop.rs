//! Differentiable operations and autograd utilities.
//!
//! # Backpropagation Primitives
//!
//! Provides the core operations of the crate with built-in autograd support,
//! centered on the multiclass hinge (structured SVM) loss.
//!
//! **Key Features:**
//! - **Hinge Loss:** Vectorized structured SVM loss with gradient generator.
//! - **Matrix Multiplication:** m×k · k×n implementation with gradient closures.
//! - **Elementwise Activation (ReLU):** Zero-out negatives and propagate gradients accordingly.
//! - **Optimizer (SGD):** In-place parameter update with gradient reset.
//!
//! ## Autograd Pattern
//!
//! Each operation follows a simple pattern:
//! 1. **Inputs** are references to `WithGrad<Ten64>` for tensor ops.
//! 2. **Forward Pass** computes an output value.
//! 3. **Backward Pass** returns a closure capturing minimal cloned data to compute gradients.
//! 4. **Gradient Application** uses these results to update `WithGrad` wrappers.
//!
//! ## Usage Guidelines
//!
//! - Operations **panic** on shape mismatches and out-of-range labels; a
//!   malformed input can never produce a silently wrong-shaped result.
//! - The backward closures implement `Fn`, allowing multiple invocations if needed.
//! - Each call is pure and self-contained: no state survives between
//!   invocations, so independent calls may run concurrently as long as the
//!   caller does not mutate the inputs underneath them.

use crate::tensors::{Ten64, Tensor, WithGrad};

/// Performs matrix multiplication of two 2D tensors: `a` (m×k) · `b` (k×n).
///
/// # Returns
/// - `out`: Product tensor (m×n).
/// - `back`: Closure that given `dL/d(out)` returns `(dL/d(a), dL/d(b))`.
///
/// # Panics
/// Panics if internal dimensions do not match (`a.shape[1] != b.shape[0]`).
///
/// # Performance
/// Uses Rayon for outer parallelism in both the forward and backward pass.
///
/// # Example
/// ```rust
/// use margin_ai::backprop::matmul;
/// use margin_ai::{tensor, tensors::WithGrad};
///
/// let a = WithGrad::new(tensor!([[1.0, 2.0], [3.0, 4.0]]));
/// let b = WithGrad::new(tensor!([[5.0, 6.0], [7.0, 8.0]]));
/// let (out, back) = matmul(&a, &b);
/// assert_eq!(out.data, vec![19.0, 22.0, 43.0, 50.0]);
///
/// let (da, db) = back(&tensor!([[1.0, 0.0], [0.0, 0.0]]));
/// assert_eq!(da.data, vec![5.0, 7.0, 0.0, 0.0]);
/// assert_eq!(db.data, vec![1.0, 0.0, 2.0, 0.0]);
/// ```
pub fn matmul(
    a: &WithGrad<Ten64>,
    b: &WithGrad<Ten64>,
) -> (Ten64, impl Fn(&Ten64) -> (Ten64, Ten64)) {
    assert_eq!(a.value.shape.len(), 2, "matmul expects 2D tensors");
    assert_eq!(b.value.shape.len(), 2, "matmul expects 2D tensors");
    crate::ops::cpu::matmul(a, b)
}

/// Applies the ReLU activation (Rectified Linear Unit): `max(0, x)` elementwise.
///
/// # Returns
/// - `out`: Tensor with negatives zeroed.
/// - `back`: Closure mapping `dL/d(out)` to `dL/d(input)` by passing gradients
///   only where the input is strictly positive.
///
/// # Example
/// ```rust
/// use margin_ai::backprop::relu;
/// use margin_ai::{tensor, tensors::WithGrad};
///
/// let input = WithGrad::new(tensor!([[-1.0, 2.0]]));
/// let (out, back) = relu(&input);
/// assert_eq!(out.data, vec![0.0, 2.0]);
///
/// let grad_in = back(&tensor!([[1.0, 1.0]]));
/// assert_eq!(grad_in.data, vec![0.0, 1.0]);
/// ```
pub fn relu(input: &WithGrad<Ten64>) -> (Ten64, impl Fn(&Ten64) -> Ten64) {
    crate::ops::cpu::relu(input)
}

/// Computes the multiclass hinge (structured SVM) loss and its gradient with
/// respect to the weight matrix.
///
/// For weights `w` of shape `(d, c)`, a minibatch `x` of shape `(n, d)`,
/// labels `y` of length `n` with values in `[0, c)`, and regularization
/// strength `reg`, each row contributes `max(score_j − score_correct + 1, 0)`
/// for every incorrect class `j`; contributions are averaged over the batch
/// and `reg · ΣW²` is added. The gradient returned by the backward closure is
/// batch-averaged the same way, plus `2·reg·W`.
///
/// # Returns
/// - Scalar loss value
/// - Closure that maps `dL/dloss` into a gradient tensor shaped like `w`
///
/// # Panics
/// - If `x`'s feature dimension does not match `w`'s row count.
/// - If `y`'s length does not match `x`'s row count.
/// - If any label is out of range for `w`'s column count.
///
/// Negative `reg` is not validated; it is a caller configuration error.
///
/// # Performance
/// The forward pass is parallelized over batch rows, the backward pass over
/// weight rows, using Rayon.
///
/// # Example
/// ```rust
/// use margin_ai::backprop::hinge_loss;
/// use margin_ai::{tensor, tensors::{Tensor, WithGrad}};
///
/// // all-zero weights: every incorrect class sits exactly on margin 1
/// let w = WithGrad::new(Tensor::zeros(vec![2, 3]));
/// let x = tensor!([[1.0, 2.0]]);
/// let y = Tensor::new(vec![1], vec![0usize]);
///
/// let (loss, back) = hinge_loss(&w, &x, &y, 0.0);
/// assert_eq!(loss, 2.0);
///
/// let dw = back(1.0);
/// assert_eq!(dw.data, vec![-2.0, 1.0, 1.0, -4.0, 2.0, 2.0]);
/// ```
pub fn hinge_loss(
    w: &WithGrad<Ten64>,
    x: &Ten64,
    y: &Tensor<usize>,
    reg: f64,
) -> (f64, impl Fn(f64) -> Ten64 + use<>) {
    assert_eq!(w.value.shape.len(), 2, "hinge_loss expects 2D weights");
    assert_eq!(x.shape.len(), 2, "hinge_loss expects a 2D minibatch");
    assert_eq!(
        x.shape[1], w.value.shape[0],
        "hinge_loss feature dimension mismatch"
    );
    assert_eq!(
        y.shape,
        vec![x.shape[0]],
        "hinge_loss label count mismatch"
    );
    let c = w.value.shape[1];
    assert!(
        y.data.iter().all(|&label| label < c),
        "hinge_loss label out of range"
    );
    crate::ops::cpu::hinge_loss(w, x, y, reg)
}

/// Performs an in-place Stochastic Gradient Descent (SGD) update.
///
/// Applies: `param = param - learning_rate * gradient` and then zeros the
/// gradient.
///
/// # Example
/// ```rust
/// use margin_ai::backprop::sgd;
/// use margin_ai::{tensor, tensors::WithGrad};
///
/// let mut w = WithGrad::new(tensor!([1.0, 2.0]));
/// w.grad = tensor!([0.1, 0.2]);
/// sgd(&mut w, 0.5);
/// assert_eq!(w.value.data, vec![0.95, 1.9]);
/// assert_eq!(w.grad.data, vec![0.0, 0.0]);
/// ```
pub fn sgd(w: &mut WithGrad<Ten64>, lr: f64) {
    crate::ops::cpu::sgd(w, lr)
}
