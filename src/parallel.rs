//! Structured parallel-for over a dedicated rayon pool.
//!
//! Every parallel region of the crate (pairwise similarity, edge emission,
//! per-document perplexity and resolution sweeps) goes through
//! [`WorkerPool`], so the zero-worker failure and the join/merge step exist
//! in one place.
//!
//! Three shapes are offered, all of which block until every task has joined:
//!
//! | Method | Work unit | Output |
//! |--------|-----------|--------|
//! | [`WorkerPool::for_each_block`] | contiguous row range + its own `&mut` slice | written in place |
//! | [`WorkerPool::map_blocks`] | contiguous row range | one private value per range, in range order |
//! | [`WorkerPool::map_indexed`] | single index | one value per index, index-addressed |
//!
//! No shape hands a task anything another task can write to, so the numeric
//! work runs without locks.

use crate::config::RuntimeConfig;
use crate::error::{Error, Result};
use log::debug;
use rayon::prelude::*;
use std::ops::Range;

/// A fixed-size pool of worker threads.
#[derive(Debug)]
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    n_workers: usize,
}

impl WorkerPool {
    /// Build a pool sized by `config`, falling back to the hardware concurrency.
    ///
    /// # Errors
    ///
    /// [`Error::NoWorkers`] if the resolved worker count is zero or the runtime
    /// cannot report its concurrency; [`Error::ThreadPool`] if the threads
    /// cannot be spawned.
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let n_workers = match config.effective_threads() {
            Some(n) => n,
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .map_err(|_| Error::NoWorkers)?,
        };
        // rayon treats 0 as "pick for me"; here it is a misconfiguration.
        if n_workers == 0 {
            return Err(Error::NoWorkers);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_workers)
            .thread_name(|i| format!("spine-worker-{i}"))
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;

        debug!("Worker pool ready with {} threads", n_workers);
        Ok(Self { pool, n_workers })
    }

    /// Number of worker threads.
    pub fn n_workers(&self) -> usize {
        self.n_workers
    }

    /// Partition the rows of an upper-triangular workload, one range per worker.
    pub fn row_ranges(&self, n_rows: usize) -> Vec<Range<usize>> {
        triangular_row_ranges(n_rows, self.n_workers)
    }

    /// Run `op` on every `(rows, slice)` block, each on its own task.
    pub fn for_each_block<T, F>(&self, blocks: Vec<(Range<usize>, &mut [T])>, op: F)
    where
        T: Send,
        F: Fn(Range<usize>, &mut [T]) + Sync,
    {
        self.pool.install(|| {
            blocks
                .into_par_iter()
                .for_each(|(rows, out)| op(rows, out));
        });
    }

    /// Map every row range to a private result. Results come back in range order.
    pub fn map_blocks<T, F>(&self, ranges: &[Range<usize>], op: F) -> Vec<T>
    where
        T: Send,
        F: Fn(Range<usize>) -> T + Sync,
    {
        self.pool
            .install(|| ranges.par_iter().map(|rows| op(rows.clone())).collect())
    }

    /// Map every index in `0..n` to a value; slot `i` of the output holds `op(i)`.
    pub fn map_indexed<T, F>(&self, n: usize, op: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync,
    {
        self.pool
            .install(|| (0..n).into_par_iter().map(|i| op(i)).collect())
    }
}

/// Split rows `0..n_rows` into at most `parts` contiguous ranges of roughly
/// equal pair count, where row `i` owns `n_rows - 1 - i` pairs.
///
/// The ranges are non-overlapping, ascending and cover every row.
pub fn triangular_row_ranges(n_rows: usize, parts: usize) -> Vec<Range<usize>> {
    if n_rows == 0 {
        return Vec::new();
    }
    let parts = parts.max(1);
    let total = n_rows * (n_rows - 1) / 2;
    let target = total.div_ceil(parts).max(1);

    let mut ranges = Vec::with_capacity(parts);
    let mut start = 0;
    let mut acc = 0;
    for row in 0..n_rows {
        acc += n_rows - 1 - row;
        if acc >= target && ranges.len() + 1 < parts {
            ranges.push(start..row + 1);
            start = row + 1;
            acc = 0;
        }
    }
    if start < n_rows {
        ranges.push(start..n_rows);
    }
    ranges
}

/// Cut `buffer` into one mutable slice per range.
///
/// `offset_of(row)` gives the first buffer slot owned by `row`; ranges must be
/// contiguous from row 0 and `offset_of(last.end)` must not exceed the buffer.
pub(crate) fn split_blocks_mut<'a, T>(
    mut buffer: &'a mut [T],
    ranges: &[Range<usize>],
    offset_of: impl Fn(usize) -> usize,
) -> Vec<(Range<usize>, &'a mut [T])> {
    let mut blocks = Vec::with_capacity(ranges.len());
    for rows in ranges {
        let len = offset_of(rows.end) - offset_of(rows.start);
        let (head, tail) = std::mem::take(&mut buffer).split_at_mut(len);
        blocks.push((rows.clone(), head));
        buffer = tail;
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pool(n: usize) -> WorkerPool {
        WorkerPool::new(&RuntimeConfig::new().with_max_threads(n)).unwrap()
    }

    #[test]
    fn test_zero_workers_is_fatal() {
        let err = WorkerPool::new(&RuntimeConfig::new().with_max_threads(0)).unwrap_err();
        assert_eq!(err, Error::NoWorkers);
    }

    #[test]
    fn test_default_pool_has_workers() {
        let pool = WorkerPool::new(&RuntimeConfig::default()).unwrap();
        assert!(pool.n_workers() >= 1);
    }

    #[test]
    fn test_map_indexed_is_index_addressed() {
        let out = pool(4).map_indexed(100, |i| i * i);
        assert_eq!(out.len(), 100);
        for (i, v) in out.iter().enumerate() {
            assert_eq!(*v, i * i);
        }
    }

    #[test]
    fn test_map_blocks_keeps_range_order() {
        let pool = pool(3);
        let ranges = pool.row_ranges(30);
        let firsts = pool.map_blocks(&ranges, |rows| rows.start);
        let expected: Vec<usize> = ranges.iter().map(|r| r.start).collect();
        assert_eq!(firsts, expected);
    }

    #[test]
    fn test_for_each_block_writes_own_slice() {
        let pool = pool(4);
        let mut buf = vec![0usize; 20];
        let ranges = vec![0..5, 5..12, 12..20];
        let blocks = split_blocks_mut(&mut buf, &ranges, |row| row);
        pool.for_each_block(blocks, |rows, out| {
            for (slot, row) in out.iter_mut().zip(rows) {
                *slot = row + 1;
            }
        });
        assert_eq!(buf, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_triangular_ranges_balance() {
        let ranges = triangular_row_ranges(100, 4);
        assert_eq!(ranges.len(), 4);
        // Early rows own more pairs, so the first range is the shortest.
        assert!(ranges[0].len() < ranges[3].len());
    }

    #[test]
    fn test_triangular_ranges_small() {
        assert!(triangular_row_ranges(0, 4).is_empty());
        assert_eq!(triangular_row_ranges(1, 4), vec![0..1]);
        assert_eq!(triangular_row_ranges(5, 1), vec![0..5]);
    }

    proptest! {
        #[test]
        fn triangular_ranges_cover_rows_once(n in 0usize..300, parts in 1usize..17) {
            let ranges = triangular_row_ranges(n, parts);
            prop_assert!(ranges.len() <= parts);
            let mut next = 0;
            for r in &ranges {
                prop_assert_eq!(r.start, next);
                prop_assert!(r.end > r.start);
                next = r.end;
            }
            prop_assert_eq!(next, n);
        }
    }
}
