// crates/sparse-blas/src/config.rs

//! `KernelConfig`: the explicit, per-call replacement for the source's
//! process-wide `OMPTileSize`/`OMPThreshold`/`task_recursion_cutoff_level`
//! globals.

/// Controls how deeply the recursive kernels fan out into parallel tasks
/// before degrading to a sequential [`crate::leaf::SequentialBlas`] call.
///
/// Threaded by value/reference through every `sparse-blas` entry point
/// rather than read from a global.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KernelConfig {
    /// Recursion depth at which spawning stops and every remaining call is
    /// sequential, bounding the total task count.
    pub task_recursion_cutoff_level: u32,
    /// `OMPTileSize`: below this size in every dimension, a problem is
    /// small enough to hand straight to the sequential leaf.
    pub tile_size: usize,
    /// `OMPThreshold`: below this total operation count (`m*n*k` for
    /// `gemm`-shaped kernels), a problem is handed to the sequential leaf
    /// regardless of individual dimension sizes.
    pub threshold: usize,
}

impl Default for KernelConfig {
    /// `tile_size = 64`, `threshold = 64³`, matching the source's
    /// `OMPTileSize`/`OMPThreshold` defaults.
    fn default() -> Self {
        Self {
            task_recursion_cutoff_level: 16,
            tile_size: 64,
            threshold: 64 * 64 * 64,
        }
    }
}

impl KernelConfig {
    /// A config that never spawns: every kernel call degrades straight to
    /// the sequential leaf. Used by cutoff-consistency tests and by callers
    /// that want deterministic single-threaded timing.
    #[must_use]
    pub const fn sequential() -> Self {
        Self {
            task_recursion_cutoff_level: 0,
            tile_size: usize::MAX,
            threshold: usize::MAX,
        }
    }

    /// Whether a problem of the given dimensions, at the given recursion
    /// `depth`, must be handed to the sequential leaf rather than split
    /// further.
    #[must_use]
    pub fn is_leaf(&self, depth: u32, dims: &[usize]) -> bool {
        if depth >= self.task_recursion_cutoff_level {
            return true;
        }
        if dims.iter().all(|&d| d <= self.tile_size) {
            return true;
        }
        let total: usize = dims.iter().product();
        total <= self.threshold
    }
}
