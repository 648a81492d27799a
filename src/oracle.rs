//! Reference implementations used to cross-check the production kernel.
//!
//! Nothing in this module is a production path. [`hinge_loss_naive`] is the
//! looped form of the loss, slow but transparently correct, and
//! [`hinge_loss_autodiff`] rebuilds the identical scalar loss out of the
//! crate's differentiable primitives and recovers the weight gradient by
//! running their backward closures in reverse. Both exist so the vectorized
//! kernel in [`crate::backprop::hinge_loss`] has independent oracles to agree
//! with, alongside the finite-difference check in [`numerical_gradient`].
//!
//! The oracles are deliberately single-threaded.

use crate::backprop::{matmul, relu};
use crate::tensors::{Ten64, Tensor, WithGrad};

/// Multiclass hinge loss and weight gradient, naive looped form.
///
/// Walks every example and every class with plain nested loops, accumulating
/// margin violations into the loss and `±X[i]` contributions into the
/// gradient. Loss and gradient are both averaged over the batch, then the
/// regularization term `reg·ΣW²` and its gradient `2·reg·W` are added.
///
/// # Panics
/// Panics on shape mismatch between `w`, `x`, and `y`, or on an out-of-range
/// label.
pub fn hinge_loss_naive(w: &Ten64, x: &Ten64, y: &Tensor<usize>, reg: f64) -> (f64, Ten64) {
    let n = x.shape[0];
    let d = x.shape[1];
    let c = w.shape[1];
    assert_eq!(d, w.shape[0], "hinge_loss feature dimension mismatch");
    assert_eq!(y.shape, vec![n], "hinge_loss label count mismatch");

    let mut loss = 0.0;
    let mut dw = vec![0.0f64; d * c];

    for i in 0..n {
        let xi = &x.data[i * d..(i + 1) * d];
        let yi = y.data[i];
        assert!(yi < c, "hinge_loss label out of range");

        let mut scores = vec![0.0f64; c];
        for (l, &xv) in xi.iter().enumerate() {
            for (j, s) in scores.iter_mut().enumerate() {
                *s += xv * w.data[l * c + j];
            }
        }

        let correct = scores[yi];
        for (j, &s) in scores.iter().enumerate() {
            if j == yi {
                continue;
            }
            let margin = s - correct + 1.0;
            if margin > 0.0 {
                loss += margin;
                for (l, &xv) in xi.iter().enumerate() {
                    dw[l * c + j] += xv;
                    dw[l * c + yi] -= xv;
                }
            }
        }
    }

    loss /= n as f64;
    loss += reg * w.data.iter().map(|v| v * v).sum::<f64>();
    for (g, &wv) in dw.iter_mut().zip(&w.data) {
        *g = *g / n as f64 + 2.0 * reg * wv;
    }

    (loss, Tensor::new(vec![d, c], dw))
}

/// Multiclass hinge loss and weight gradient via reverse-mode differentiation.
///
/// Builds the loss as a chain of differentiable ops — `scores = X·W`, per-row
/// margin shift, [`relu`] clip, batch mean — and then calls each op's backward
/// closure in reverse order with the upstream gradient, exactly the way a
/// training loop would. The regularization gradient enters at the root, since
/// `reg·ΣW²` attaches to `W` directly rather than flowing through the chain.
///
/// The row's own class has margin exactly `1`, which the clip passes through
/// unchanged; its score gradient cancels structurally in the margin backward
/// (`δ_jk − δ_k,y` sums to zero over the row), so no special casing is needed.
///
/// # Panics
/// Panics on shape mismatch or out-of-range labels, surfaced by the ops in
/// the chain.
pub fn hinge_loss_autodiff(w: &Ten64, x: &Ten64, y: &Tensor<usize>, reg: f64) -> (f64, Ten64) {
    let xg = WithGrad::new(x.clone());
    let wg = WithGrad::new(w.clone());

    let (scores, back_scores) = matmul(&xg, &wg);
    let (shifted, back_margins) = margins(&scores, y);
    let mg = WithGrad::new(shifted);
    let (clipped, back_clip) = relu(&mg);
    let (data_loss, back_mean) = batch_mean(&clipped);

    let loss = data_loss + reg * w.data.iter().map(|v| v * v).sum::<f64>();

    let dclipped = back_mean(1.0);
    let dmargins = back_clip(&dclipped);
    let dscores = back_margins(&dmargins);
    let (_dx, mut dw) = back_scores(&dscores);
    for (g, &wv) in dw.data.iter_mut().zip(&w.data) {
        *g += 2.0 * reg * wv;
    }

    (loss, dw)
}

/// Margin shift: `m[i][j] = s[i][j] − s[i][y[i]] + 1`.
///
/// Backward: `ds[i][k] = dm[i][k] − δ_{k,y[i]} · Σ_j dm[i][j]`.
fn margins(scores: &Ten64, y: &Tensor<usize>) -> (Ten64, impl Fn(&Ten64) -> Ten64) {
    let n = scores.shape[0];
    let c = scores.shape[1];
    assert_eq!(y.shape, vec![n], "margins label count mismatch");

    let mut out = vec![0.0f64; n * c];
    for i in 0..n {
        let srow = &scores.data[i * c..(i + 1) * c];
        let correct = srow[y.data[i]];
        for (j, m) in out[i * c..(i + 1) * c].iter_mut().enumerate() {
            *m = srow[j] - correct + 1.0;
        }
    }

    let labels = y.data.clone();
    let back = move |grad: &Ten64| {
        let mut ds = grad.data.clone();
        for (i, &yi) in labels.iter().enumerate() {
            let row_sum: f64 = grad.data[i * c..(i + 1) * c].iter().sum();
            ds[i * c + yi] -= row_sum;
        }
        Tensor::new(vec![n, c], ds)
    };

    (Tensor::new(vec![n, c], out), back)
}

/// Batch mean of clipped margins, less each row's constant self term.
///
/// Backward spreads the upstream scalar uniformly: `d/d(clipped[i][j]) = 1/n`.
fn batch_mean(clipped: &Ten64) -> (f64, impl Fn(f64) -> Ten64) {
    let n = clipped.shape[0];
    let c = clipped.shape[1];

    // every row carries a spurious +1 from its own class
    let total: f64 = clipped.data.iter().sum();
    let loss = (total - n as f64) / n as f64;

    let back = move |grad_output: f64| {
        Tensor::new(vec![n, c], vec![grad_output / n as f64; n * c])
    };

    (loss, back)
}

/// Central finite-difference gradient of a scalar function of a tensor.
///
/// Probes every entry of `w` at `±h` and returns `(f(w+h) − f(w−h)) / 2h`
/// entry-wise. `h` around `1e-5` balances truncation against cancellation for
/// inputs of order one.
pub fn numerical_gradient<F>(f: F, w: &Ten64, h: f64) -> Ten64
where
    F: Fn(&Ten64) -> f64,
{
    let mut probe = w.clone();
    let mut grad = vec![0.0f64; w.data.len()];

    for (idx, g) in grad.iter_mut().enumerate() {
        let orig = probe.data[idx];
        probe.data[idx] = orig + h;
        let up = f(&probe);
        probe.data[idx] = orig - h;
        let down = f(&probe);
        probe.data[idx] = orig;
        *g = (up - down) / (2.0 * h);
    }

    Tensor::new(w.shape.clone(), grad)
}
