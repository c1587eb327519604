//! Execution backend selection.
//!
//! This module defines how elementwise kernels and the backward traversal
//! are scheduled, and provides functions to set and get the current choice.
//!
//! # Supported Backends
//!
//! - `Serial` — single-threaded loops and a depth-first backward pass (default).
//! - `Rayon` — kernels run on the rayon pool, and the two parents of a binary
//!   edge are differentiated under `rayon::join`.
//!
//! Both settings are stored globally in atomics, so switching is cheap and
//! can happen between training iterations. Parallel paths are only taken for
//! vectors at least [`parallel_threshold`] elements long; below that the
//! serial path is faster.

use core::convert::TryFrom;
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Default minimum vector length for the parallel paths.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// Enumeration of supported execution backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Backend {
    /// Single-threaded execution (default).
    #[default]
    Serial = 0,
    /// Data-parallel kernels and fork-join backward on the rayon pool.
    Rayon = 1,
}

impl TryFrom<u8> for Backend {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Serial),
            1 => Ok(Self::Rayon),
            _ => Err(()),
        }
    }
}

static GLOBAL_BACKEND: AtomicU8 = AtomicU8::new(Backend::Serial as u8);

static PARALLEL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Sets the active backend.
///
/// # Example
///
/// ```
/// use vecgrad::backend::{get_backend, set_backend, Backend};
/// set_backend(Backend::Rayon);
/// assert_eq!(get_backend(), Backend::Rayon);
/// set_backend(Backend::Serial);
/// ```
pub fn set_backend(b: Backend) {
    GLOBAL_BACKEND.store(b as u8, Ordering::Release);
}

/// Returns the currently active backend.
///
/// If the stored value is invalid, defaults to [`Backend::Serial`].
pub fn get_backend() -> Backend {
    Backend::try_from(GLOBAL_BACKEND.load(Ordering::Acquire)).unwrap_or_default()
}

/// Sets the minimum vector length at which parallel paths kick in.
pub fn set_parallel_threshold(len: usize) {
    PARALLEL_THRESHOLD.store(len, Ordering::Release);
}

/// Returns the minimum vector length at which parallel paths kick in.
pub fn parallel_threshold() -> usize {
    PARALLEL_THRESHOLD.load(Ordering::Acquire)
}

/// Whether work over `len` elements should go to the rayon pool.
pub(crate) fn use_parallel(len: usize) -> bool {
    get_backend() == Backend::Rayon && len >= parallel_threshold()
}
