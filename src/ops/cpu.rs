//! Parallel CPU tensor operations
//!
//! # CPU Kernels
//!
//! This module provides the CPU implementations of the differentiable
//! operations exposed through [`crate::backprop`].
//!
//! ## Features
//!
//! - Parallel execution using [`rayon`](https://docs.rs/rayon)
//! - Pure Rust, no BLAS or GPU dependencies
//!
//! ## Implemented Ops
//!
//! - `matmul`: Matrix multiplication with multithreading
//! - `relu`: Elementwise `max(0, x)` with forward and backward pass
//! - `hinge_loss`: Vectorized multiclass hinge (structured SVM) loss with
//!   autograd
//! - `sgd`: In-place stochastic gradient descent step
//!
//! ## Design Goals
//!
//! - Deterministic results at the op boundary: parallelism only changes how
//!   work is scheduled, never which contributions a gradient entry receives
//! - Modular: kernels are separate from the documented public facade

use crate::ops::{FnF64Ten64, FnTen64To, FnToDoubleTen64};
use crate::tensors::{Ten64, Tensor, WithGrad};
use rayon::prelude::*;

/// Performs a matrix multiplication `C = A × B` on two 2D tensors (`A: m×k`,
/// `B: k×n`), returning the result tensor and a closure for backpropagation.
///
/// # Returns
/// - Output tensor of shape `[m, n]`
/// - Backward function mapping `dL/dC` to `(dL/dA, dL/dB)`:
///   `dL/dA = dL/dC · Bᵀ` and `dL/dB = Aᵀ · dL/dC`
///
/// # Panics
/// - If the inner dimensions of `A` and `B` do not match.
pub fn matmul(a: &WithGrad<Ten64>, b: &WithGrad<Ten64>) -> (Ten64, Box<FnToDoubleTen64>) {
    let m = a.value.shape[0];
    let k = a.value.shape[1];
    let n = b.value.shape[1];
    assert_eq!(k, b.value.shape[0], "matmul shape mismatch");

    let a_data = &a.value.data;
    let b_data = &b.value.data;

    let mut out_data = vec![0.0; m * n];
    out_data.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
        for (l, &av) in a_data[i * k..(i + 1) * k].iter().enumerate() {
            if av == 0.0 {
                continue;
            }
            for (j, out) in row.iter_mut().enumerate() {
                *out += av * b_data[l * n + j];
            }
        }
    });

    let out = Tensor::new(vec![m, n], out_data);

    let a_data = a.value.data.clone();
    let b_data = b.value.data.clone();

    let back = move |grad: &Ten64| {
        assert_eq!(grad.shape, vec![m, n], "matmul gradient shape mismatch");

        let mut da = vec![0.0; m * k];
        da.par_chunks_mut(k).enumerate().for_each(|(i, row)| {
            let grow = &grad.data[i * n..(i + 1) * n];
            for (l, out) in row.iter_mut().enumerate() {
                let mut sum = 0.0;
                for (j, &g) in grow.iter().enumerate() {
                    sum += g * b_data[l * n + j];
                }
                *out = sum;
            }
        });

        let mut db = vec![0.0; k * n];
        db.par_chunks_mut(n).enumerate().for_each(|(l, row)| {
            for i in 0..m {
                let av = a_data[i * k + l];
                if av == 0.0 {
                    continue;
                }
                let grow = &grad.data[i * n..(i + 1) * n];
                for (j, out) in row.iter_mut().enumerate() {
                    *out += av * grow[j];
                }
            }
        });

        (Tensor::new(vec![m, k], da), Tensor::new(vec![k, n], db))
    };

    (out, Box::new(back))
}

/// Applies the ReLU activation function element-wise on the input tensor:
/// `f(x) = max(0, x)`.
///
/// # Returns
/// - Output tensor of same shape
/// - Backward function which propagates upstream gradients only where the
///   input was strictly positive
pub fn relu(input: &WithGrad<Ten64>) -> (Ten64, Box<FnTen64To>) {
    let shape = input.value.shape.clone();
    let mut data = vec![0.0f64; input.value.data.len()];

    data.par_iter_mut()
        .zip(input.value.data.par_iter())
        .for_each(|(y, &x)| {
            *y = if x > 0.0 { x } else { 0.0 };
        });

    let out = Tensor::new(shape.clone(), data);
    let input_data = input.value.data.clone();

    let back = move |grad_output: &Ten64| {
        let mut grad = vec![0.0f64; grad_output.data.len()];
        grad.par_iter_mut()
            .zip(input_data.par_iter())
            .zip(grad_output.data.par_iter())
            .for_each(|((g, &x), &dy)| {
                *g = if x > 0.0 { dy } else { 0.0 };
            });
        Tensor::new(shape.clone(), grad)
    };

    (out, Box::new(back))
}

/// Computes the multiclass hinge (structured SVM) loss over a minibatch,
/// returning the scalar loss and a gradient function for the weights.
///
/// For weights `W: d×c`, data `X: n×d`, and labels `y: n`, the loss is
///
/// ```text
/// L = mean_i( Σ_j max(X[i]·W[:,j] − X[i]·W[:,y[i]] + 1, 0) − 1 ) + reg·ΣW²
/// ```
///
/// The `− 1` removes the contribution of each row's own class, whose margin
/// is the constant `1`. A margin counts as active only when strictly
/// positive; this is the subgradient convention shared with [`relu`]'s
/// backward mask, so ties at exactly zero contribute nothing.
///
/// The forward pass computes scores, margins, and the per-row score
/// gradients in a single parallel sweep over rows. The backward function
/// contracts those against `Xᵀ`, averages over the batch, and adds the
/// regularization gradient `2·reg·W`.
///
/// Shape preconditions are enforced by the [`crate::backprop::hinge_loss`]
/// facade.
pub fn hinge_loss(
    w: &WithGrad<Ten64>,
    x: &Ten64,
    y: &Tensor<usize>,
    reg: f64,
) -> (f64, Box<FnF64Ten64>) {
    let n = x.shape[0];
    let d = x.shape[1];
    let c = w.value.shape[1];

    let w_data = &w.value.data;
    let x_data = &x.data;
    let labels = &y.data;

    // dscores[i][j] counts each active margin once, and the correct class
    // minus the number of active margins in the row
    let mut dscores = vec![0.0f64; n * c];
    let hinge_sum: f64 = dscores
        .par_chunks_mut(c)
        .enumerate()
        .map(|(i, ds_row)| {
            let xi = &x_data[i * d..(i + 1) * d];
            let yi = labels[i];

            let mut srow = vec![0.0f64; c];
            for (l, &xv) in xi.iter().enumerate() {
                if xv == 0.0 {
                    continue;
                }
                let wrow = &w_data[l * c..(l + 1) * c];
                for (j, s) in srow.iter_mut().enumerate() {
                    *s += xv * wrow[j];
                }
            }

            let correct = srow[yi];
            let mut row_loss = 0.0;
            let mut active = 0usize;
            for (j, &s) in srow.iter().enumerate() {
                if j == yi {
                    continue;
                }
                let margin = s - correct + 1.0;
                if margin > 0.0 {
                    row_loss += margin;
                    ds_row[j] = 1.0;
                    active += 1;
                }
            }
            ds_row[yi] = -(active as f64);
            row_loss
        })
        .sum();

    let reg_sum: f64 = w_data.iter().map(|v| v * v).sum();
    let loss = hinge_sum / n as f64 + reg * reg_sum;

    let x_data = x.data.clone();
    let w_data = w.value.data.clone();

    let back = move |grad_output: f64| {
        let scale = grad_output / n as f64;
        let mut grad = vec![0.0f64; d * c];
        grad.par_chunks_mut(c).enumerate().for_each(|(l, grow)| {
            for i in 0..n {
                let xv = x_data[i * d + l];
                if xv == 0.0 {
                    continue;
                }
                let ds_row = &dscores[i * c..(i + 1) * c];
                for (j, out) in grow.iter_mut().enumerate() {
                    *out += xv * ds_row[j];
                }
            }
            let wrow = &w_data[l * c..(l + 1) * c];
            for (j, out) in grow.iter_mut().enumerate() {
                *out = *out * scale + grad_output * 2.0 * reg * wrow[j];
            }
        });
        Tensor::new(vec![d, c], grad)
    };

    (loss, Box::new(back))
}

/// Performs one step of stochastic gradient descent (SGD) on the given
/// parameter tensor: `w := w − lr · dL/dw`, then zeros the gradient.
pub fn sgd(w: &mut WithGrad<Ten64>, lr: f64) {
    for (param, grad) in w.value.data.iter_mut().zip(&w.grad.data) {
        *param -= lr * *grad;
    }
    for grad in &mut w.grad.data {
        *grad = 0.0;
    }
}
