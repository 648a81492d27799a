//! margin_ai: a minimal multiclass hinge (structured SVM) loss engine in Rust.
//!
//! Computes the structured SVM loss and its gradient with respect to a linear
//! classifier's weight matrix, given a minibatch of feature vectors and
//! integer labels, with a focus on explicit shapes and cross-checkable
//! gradients.
//!
//! # Features
//!
//! - Strongly typed dense tensors with runtime shape enforcement.
//! - A vectorized, rayon-parallel loss/gradient kernel with manual
//!   backpropagation closures.
//! - Independent reference paths — a naive looped oracle, a reverse-mode
//!   autodiff oracle built from the same primitives, and a finite-difference
//!   checker — so the hand-derived gradient never has to be taken on faith.
//!
//! # Goals
//!
//! - Prioritize correctness, explicitness, and determinism over black-box
//!   abstraction.
//! - Keep every call pure: no state survives a single loss/gradient
//!   evaluation.
//!
//! # Modules
//!
//! - [`tensors`] — Core tensor data structures.
//! - [`backprop`] — Differentiable operations and autograd utilities.
//! - [`oracle`] — Reference implementations for cross-checking gradients.
//! - [`approx`] — Tolerance-tiered float comparison for tests.
//!
//! # Example
//!
//! ```rust
//! use margin_ai::backprop::hinge_loss;
//! use margin_ai::{tensor, tensors::{Tensor, WithGrad}};
//!
//! let w = WithGrad::new(Tensor::zeros(vec![2, 3]));
//! let x = tensor!([[0.5, -1.0], [2.0, 1.0]]);
//! let y = Tensor::new(vec![2], vec![0usize, 2]);
//!
//! let (loss, back) = hinge_loss(&w, &x, &y, 0.0);
//! assert_eq!(loss, 2.0); // zero weights: every incorrect margin is exactly 1
//! let dw = back(1.0);
//! assert_eq!(dw.shape, vec![2, 3]);
//! ```

pub mod approx;
pub mod backprop;
pub mod oracle;
pub mod tensors;

mod ops;
