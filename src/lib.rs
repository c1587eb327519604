//! vecgrad: reverse-mode automatic differentiation over numeric vectors.
//!
//! Applying elementwise operations to tracked vectors builds a dynamic
//! computation graph; calling `backward` on an output propagates gradients
//! through that graph to every input that asked for them.
//!
//! # Features
//!
//! - 1-D `f64` vectors with elementwise arithmetic and size-1 broadcasting.
//! - Graph nodes shared by reference counting, so one value can feed many
//!   sub-expressions before any backward pass.
//! - Gradients that accumulate across calls and paths, reset by `zero_grad`,
//!   which also detaches the node from its history.
//! - Optional rayon-parallel kernels and fork-join backward for long vectors.
//!
//! # Non-goals
//!
//! Not a tensor library (vectors only), not a training framework, and not
//! concerned with hardware acceleration.
//!
//! # Modules
//!
//! - [`vector`] — the numeric vector value type.
//! - [`node`] — graph nodes, `backward`, `zero_grad`.
//! - [`backprop`] — differentiable operation builders.
//! - [`grad_fn`] — dependency edges and local derivatives.
//! - [`backend`] — serial/parallel execution switch.
//! - [`error`] — the crate error type.
//! - [`approx`], [`finite_diff`] — helpers for checking gradients.
//!
//! # Example
//!
//! Gradient descent on `sum(x * x)`:
//!
//! ```rust
//! use vecgrad::{vector, Node};
//!
//! let mut x = Node::tracked(vector![2.0, -2.0]);
//! for _ in 0..100 {
//!     let loss = (&x * &x).sum();
//!     loss.backward().unwrap();
//!     let step = Node::constant(x.get_grad().unwrap() * 0.1);
//!     x = &x - &step;
//!     x.zero_grad();
//! }
//! assert!(x.get_value().iter().all(|v| v.abs() < 1e-3));
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod approx;
pub mod backend;
pub mod backprop;
pub mod error;
pub mod finite_diff;
pub mod grad_fn;
pub mod node;
pub mod ops;
pub mod vector;

pub use error::{GradError, Result};
pub use node::Node;
pub use vector::Vector;
