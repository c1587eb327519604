//! # Elementwise Kernel Layer
//!
//! The arithmetic underneath [`Vector`](crate::vector::Vector).
//!
//! ## Submodules
//!
//! - [`cpu`] — serial and rayon-parallel kernels over `f64` slices
//! - [`dispatch`] — shape validation plus the serial/parallel choice
//!
//! ## Backend Selection
//!
//! Which kernel runs is decided per call from the global
//! [`Backend`](crate::backend::Backend) and the vector length; see
//! [`crate::backend`]. Callers never pick a kernel themselves.
//!
//! ## Notes
//!
//! - Kernels assume validated shapes; only `dispatch` returns errors.
//! - Parallel `sum` may round differently from the serial loop.

pub mod cpu;
pub mod dispatch;
