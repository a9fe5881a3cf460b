// crates/sparse-blas/src/task.rs

//! Fork/join over the current recursion `depth` and a [`KernelConfig`]
//! cutoff: below the cutoff, spawn both halves via `rayon::join` (each
//! "task" is one cooperative fork, matching the corpus's `rayon::join`
//! hint for this domain); at or past the cutoff, run the two halves
//! sequentially on the calling thread.

use crate::config::KernelConfig;

/// Run `a` and `b`, in parallel if `depth < cfg.task_recursion_cutoff_level`,
/// sequentially otherwise. Every spawn has a matching join here before this
/// function returns, so no task ever outlives its parent's stack frame.
pub fn fork_join<RA, RB, A, B>(depth: u32, cfg: &KernelConfig, a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    if depth < cfg.task_recursion_cutoff_level {
        rayon::join(a, b)
    } else {
        (a(), b())
    }
}
