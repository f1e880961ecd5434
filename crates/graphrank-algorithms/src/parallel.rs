//! Partitioned multi-threaded PageRank
//!
//! The dense id space is split into contiguous partitions, one per worker.
//! Each iteration is a fork-join step on a [`WorkerPool`]: every partition
//! task scans its source nodes into a private buffer, the coordinator waits
//! for all of them, then merges the buffers single-threaded into the next
//! generation. Dangling mass and the teleport term are added once, during
//! the merge.

use crate::common::AdjacencyIndex;
use crate::error::{AlgoError, AlgoResult};
use crate::pagerank::{PageRank, PageRankConfig, RankEntry, INITIAL_RANK};
use crate::source::{GraphSource, NodeId};
use crate::storage::{ArrayRankStore, RankStore};
use rayon::prelude::*;
use std::ops::Range;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Worker pool sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfig {
    /// Number of worker threads (and partitions per iteration)
    pub workers: usize,
    /// Maximum number of tasks accepted per fork-join batch
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 100,
        }
    }
}

/// Shared flag checked by partition tasks before they start
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Fixed-size worker pool with a bounded task queue.
///
/// Threads are created once and released when the pool is dropped.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    config: PoolConfig,
    cancel: CancelToken,
}

impl WorkerPool {
    pub fn new(config: PoolConfig) -> AlgoResult<Self> {
        if config.workers == 0 {
            return Err(AlgoError::InvalidConfig(
                "worker pool needs at least one worker".to_string(),
            ));
        }
        if config.queue_capacity == 0 {
            return Err(AlgoError::InvalidConfig(
                "worker pool queue capacity must be positive".to_string(),
            ));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("pagerank-worker-{}", i))
            .build()
            .map_err(|e| AlgoError::PoolBuild(e.to_string()))?;

        info!(
            "Worker pool ready: {} workers, queue capacity {}",
            config.workers, config.queue_capacity
        );

        Ok(Self {
            pool,
            config,
            cancel: CancelToken::default(),
        })
    }

    /// Shorthand for `WorkerPool::new(PoolConfig { workers, queue_capacity })`
    pub fn with_size(workers: usize, queue_capacity: usize) -> AlgoResult<Self> {
        Self::new(PoolConfig {
            workers,
            queue_capacity,
        })
    }

    pub fn workers(&self) -> usize {
        self.config.workers
    }

    pub fn queue_capacity(&self) -> usize {
        self.config.queue_capacity
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run every task and block until all have finished.
    ///
    /// Results come back in submission order. The whole batch fails if it
    /// exceeds the queue capacity, if any task fails or panics, or if the
    /// pool was cancelled.
    pub fn fork_join<T, F>(&self, tasks: Vec<F>) -> AlgoResult<Vec<T>>
    where
        T: Send,
        F: FnOnce() -> AlgoResult<T> + Send,
    {
        if tasks.len() > self.config.queue_capacity {
            warn!(
                "Rejecting {} partition tasks: queue capacity is {}",
                tasks.len(),
                self.config.queue_capacity
            );
            return Err(AlgoError::PoolSaturation {
                submitted: tasks.len(),
                capacity: self.config.queue_capacity,
            });
        }

        let cancel = &self.cancel;
        let results: Vec<AlgoResult<T>> = self.pool.install(|| {
            tasks
                .into_par_iter()
                .enumerate()
                .map(|(partition, task)| {
                    if cancel.is_cancelled() {
                        return Err(AlgoError::Cancelled);
                    }
                    catch_unwind(AssertUnwindSafe(task)).unwrap_or_else(|panic| {
                        Err(AlgoError::PartitionFailed {
                            partition,
                            reason: panic_message(panic.as_ref()),
                        })
                    })
                })
                .collect()
        });

        results.into_iter().collect()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Split `0..node_count` into at most `partitions` contiguous, non-empty
/// ranges whose sizes differ by at most one.
pub fn partition_ranges(node_count: usize, partitions: usize) -> Vec<Range<usize>> {
    let partitions = partitions.max(1).min(node_count);
    if partitions == 0 {
        return Vec::new();
    }
    let base = node_count / partitions;
    let extra = node_count % partitions;

    let mut ranges = Vec::with_capacity(partitions);
    let mut start = 0;
    for p in 0..partitions {
        let len = base + usize::from(p < extra);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

/// Scan the source nodes of one partition into a private next-buffer
fn scatter_partition(
    index: &AdjacencyIndex,
    current: &[f64],
    damping_factor: f64,
    range: Range<usize>,
) -> Vec<f64> {
    let mut private = vec![0.0; index.node_count()];
    for v in range {
        let degree = index.out_degree(v);
        if degree == 0 {
            continue;
        }
        let contribution = current[v] * damping_factor / degree as f64;
        for &u in index.successors(v) {
            private[u] += contribution;
        }
    }
    private
}

/// Array-backed engine whose iterations run on a [`WorkerPool`]
pub struct PageRankArrayStorageParallel<'g, G: GraphSource + ?Sized> {
    source: &'g G,
    config: PageRankConfig,
    pool: WorkerPool,
    index: Option<AdjacencyIndex>,
    current: ArrayRankStore,
    next: ArrayRankStore,
    generation: usize,
}

impl<'g, G: GraphSource + ?Sized> PageRankArrayStorageParallel<'g, G> {
    /// The engine owns `pool` and reuses it for every iteration.
    pub fn new(source: &'g G, pool: WorkerPool) -> Self {
        Self::with_config(source, pool, PageRankConfig::default())
    }

    pub fn with_config(source: &'g G, pool: WorkerPool, config: PageRankConfig) -> Self {
        Self {
            source,
            config,
            pool,
            index: None,
            current: ArrayRankStore::default(),
            next: ArrayRankStore::default(),
            generation: 0,
        }
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn index(&self) -> Option<&AdjacencyIndex> {
        self.index.as_ref()
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn rank_of_dense(&self, idx: usize) -> AlgoResult<f64> {
        if idx >= self.number_of_nodes() {
            return Err(AlgoError::NodeNotFound(idx as u64));
        }
        Ok(self.current.get(idx as u64))
    }

    pub fn total_rank(&self) -> f64 {
        self.current.as_slice().iter().sum()
    }

    fn reset(&mut self) {
        self.index = None;
        self.current = ArrayRankStore::default();
        self.next = ArrayRankStore::default();
        self.generation = 0;
    }

    fn step(&mut self, index: &AdjacencyIndex, partitions: &[Range<usize>]) -> AlgoResult<()> {
        let n = index.node_count();
        let d = self.config.damping_factor;
        let current = self.current.as_slice();

        let tasks: Vec<_> = partitions
            .iter()
            .cloned()
            .map(|range| move || AlgoResult::Ok(scatter_partition(index, current, d, range)))
            .collect();
        let privates = self.pool.fork_join(tasks)?;

        // Merge: teleport and dangling share once, then each private buffer in partition order
        let dangling_mass: f64 = index.dangling().iter().map(|&v| current[v]).sum();
        let base = (1.0 - d) + d * dangling_mass / n as f64;

        let next = self.next.as_mut_slice();
        next.fill(base);
        for private in &privates {
            for (slot, contribution) in next.iter_mut().zip(private) {
                *slot += contribution;
            }
        }

        std::mem::swap(&mut self.current, &mut self.next);
        self.generation += 1;
        debug!(
            "PageRank generation {} merged from {} partitions",
            self.generation,
            privates.len()
        );
        Ok(())
    }
}

impl<G: GraphSource + ?Sized> PageRank for PageRankArrayStorageParallel<'_, G> {
    fn compute_page_rank(&mut self, label: &str, rel_type: &str, iterations: usize) -> AlgoResult<()> {
        self.reset();
        self.config.validate()?;

        let index = AdjacencyIndex::build(self.source, label, rel_type)?;
        let n = index.node_count();
        self.current = ArrayRankStore::filled(n, INITIAL_RANK);
        self.next = ArrayRankStore::new(n);

        let partitions = partition_ranges(n, self.pool.workers());
        for _ in 0..iterations {
            if n == 0 {
                self.generation += 1;
                continue;
            }
            if let Err(e) = self.step(&index, &partitions) {
                self.reset();
                return Err(e);
            }
        }

        info!(
            "PageRank (parallel array storage) finished {} iterations over {} nodes with {} partitions",
            iterations,
            n,
            partitions.len()
        );
        self.index = Some(index);
        Ok(())
    }

    fn rank_of_node(&self, node: NodeId) -> AlgoResult<f64> {
        let idx = self
            .index
            .as_ref()
            .and_then(|index| index.dense_id(node))
            .ok_or(AlgoError::NodeNotFound(node))?;
        self.rank_of_dense(idx)
    }

    fn number_of_nodes(&self) -> usize {
        self.index.as_ref().map_or(0, AdjacencyIndex::node_count)
    }

    fn ranked_nodes(&self) -> Vec<RankEntry> {
        let Some(index) = &self.index else {
            return Vec::new();
        };
        self.current
            .as_slice()
            .iter()
            .enumerate()
            .filter_map(|(idx, &pagerank)| {
                index.native_id(idx).map(|id| RankEntry { id, pagerank })
            })
            .collect()
    }
}
