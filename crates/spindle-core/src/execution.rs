//! Execution engines for batches of independent work items
//!
//! The permutation null of the directionality analysis is a batch of fully
//! independent iterations. An engine decides whether those run on the
//! calling thread or on a fixed-size rayon pool; the algorithm code is the
//! same either way.
//!
//! # Design Philosophy
//!
//! - **Unified Control**: one type parameter selects sequential or parallel
//! - **Ordered Results**: results come back in item order regardless of
//!   completion order
//! - **Fail Whole Batch**: a failing item aborts the batch, nothing is
//!   silently dropped

#[cfg(feature = "parallel")]
use crate::{Error, Result};

/// Execution strategy for batch operations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Process items sequentially
    Sequential,
    /// Process items in parallel
    Parallel,
}

/// Trait for execution engines that control how batches are run
pub trait ExecutionEngine: Clone + Send + Sync {
    /// Execute operations on `count` independent items
    fn execute_batch<F, R>(&self, count: usize, f: F) -> Vec<R>
    where
        F: Fn(usize) -> R + Sync + Send,
        R: Send;

    /// Execute fallible operations; the first error aborts the batch
    fn try_execute_batch<F, R, E>(&self, count: usize, f: F) -> std::result::Result<Vec<R>, E>
    where
        F: Fn(usize) -> std::result::Result<R, E> + Sync + Send,
        R: Send,
        E: Send;

    /// Get the execution strategy
    fn strategy(&self) -> ExecutionStrategy;

    /// Check if parallel execution is available
    fn is_parallel(&self) -> bool {
        self.strategy() == ExecutionStrategy::Parallel
    }

    /// Get the number of threads available
    fn num_threads(&self) -> usize;
}

/// Sequential execution engine
///
/// Executes all operations sequentially in the current thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialEngine;

impl SequentialEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ExecutionEngine for SequentialEngine {
    fn execute_batch<F, R>(&self, count: usize, f: F) -> Vec<R>
    where
        F: Fn(usize) -> R + Sync + Send,
        R: Send,
    {
        (0..count).map(f).collect()
    }

    fn try_execute_batch<F, R, E>(&self, count: usize, f: F) -> std::result::Result<Vec<R>, E>
    where
        F: Fn(usize) -> std::result::Result<R, E> + Sync + Send,
        R: Send,
        E: Send,
    {
        (0..count).map(f).collect()
    }

    fn strategy(&self) -> ExecutionStrategy {
        ExecutionStrategy::Sequential
    }

    fn num_threads(&self) -> usize {
        1
    }
}

/// Parallel execution engine using Rayon
///
/// Executes operations in parallel using Rayon's global pool or a dedicated
/// fixed-size pool.
#[cfg(feature = "parallel")]
#[derive(Clone, Debug, Default)]
pub struct ParallelEngine {
    thread_pool: Option<std::sync::Arc<rayon::ThreadPool>>,
}

#[cfg(feature = "parallel")]
impl ParallelEngine {
    /// Create a new parallel engine with default thread pool
    pub fn new() -> Self {
        Self { thread_pool: None }
    }

    /// Create a new parallel engine with a custom thread pool
    pub fn with_thread_pool(pool: std::sync::Arc<rayon::ThreadPool>) -> Self {
        Self {
            thread_pool: Some(pool),
        }
    }

    /// Create with a specific number of threads
    pub fn with_num_threads(num_threads: usize) -> Result<Self> {
        if num_threads == 0 {
            return Err(Error::InvalidParameter(
                "Thread pool needs at least one thread".to_string(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| Error::Execution(format!("Failed to create thread pool: {e}")))?;

        Ok(Self {
            thread_pool: Some(std::sync::Arc::new(pool)),
        })
    }

    fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.thread_pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}

#[cfg(feature = "parallel")]
impl ExecutionEngine for ParallelEngine {
    fn execute_batch<F, R>(&self, count: usize, f: F) -> Vec<R>
    where
        F: Fn(usize) -> R + Sync + Send,
        R: Send,
    {
        use rayon::prelude::*;
        self.install(|| (0..count).into_par_iter().map(f).collect())
    }

    fn try_execute_batch<F, R, E>(&self, count: usize, f: F) -> std::result::Result<Vec<R>, E>
    where
        F: Fn(usize) -> std::result::Result<R, E> + Sync + Send,
        R: Send,
        E: Send,
    {
        use rayon::prelude::*;
        self.install(|| (0..count).into_par_iter().map(f).collect())
    }

    fn strategy(&self) -> ExecutionStrategy {
        ExecutionStrategy::Parallel
    }

    fn num_threads(&self) -> usize {
        match &self.thread_pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

/// Engine used when the caller does not pick one
#[cfg(feature = "parallel")]
pub type DefaultEngine = ParallelEngine;

/// Engine used when the caller does not pick one
#[cfg(not(feature = "parallel"))]
pub type DefaultEngine = SequentialEngine;

/// Create a sequential engine
pub fn sequential() -> SequentialEngine {
    SequentialEngine
}

/// Create a parallel engine on the global rayon pool
#[cfg(feature = "parallel")]
pub fn parallel() -> ParallelEngine {
    ParallelEngine::new()
}

/// Best engine for this build: a parallel engine sized to the machine when
/// the `parallel` feature is on, sequential otherwise
pub fn auto_engine() -> DefaultEngine {
    #[cfg(feature = "parallel")]
    {
        ParallelEngine::with_num_threads(num_cpus::get().max(1)).unwrap_or_default()
    }
    #[cfg(not(feature = "parallel"))]
    {
        SequentialEngine
    }
}

/// Number of logical CPUs visible to this process
pub fn available_threads() -> usize {
    num_cpus::get().max(1)
}
