//! Pairwise cosine distances in packed upper-triangular storage.
//!
//! # Layout
//!
//! A symmetric N×N matrix with an irrelevant diagonal needs only the pairs
//! `i < j`. They are stored row-major in a flat buffer of length `N(N-1)/2`:
//!
//! ```text
//!            j=1   j=2   j=3
//!   i=0    [ 0 ]  [ 1 ]  [ 2 ]
//!   i=1           [ 3 ]  [ 4 ]
//!   i=2                  [ 5 ]
//!
//! idx(i, j) = i·(2N − i − 1)/2 + (j − i − 1)
//! ```
//!
//! Row `i` owns the contiguous run `idx(i, i+1) ..= idx(i, N-1)`, which is what
//! lets workers fill disjoint row ranges without coordination.
//!
//! # Weight convention
//!
//! Each slot holds the cosine *distance* `1 − cos(v_i, v_j)`, so "more
//! similar" means "lighter". Kruskal connects light edges first, so the
//! spanning tree links similar documents. A pair involving a zero vector has
//! no defined angle and is stored as 0.

use crate::corpus::DocumentTopics;
use crate::error::{Error, Result};
use crate::parallel::{split_blocks_mut, WorkerPool};
use log::{debug, info};
use ndarray::ArrayView1;

/// Number of unordered pairs among `n` nodes.
pub fn packed_len(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// First packed slot owned by row `i`. Callers keep `i <= n`.
pub(crate) fn row_offset(n: usize, i: usize) -> usize {
    debug_assert!(i <= n, "row_offset({i}) past {n} rows");
    if i == 0 {
        return 0;
    }
    i * (2 * n - i - 1) / 2
}

/// Packed slot of the pair `(i, j)`, or `None` unless `i < j < n`.
pub fn packed_index(n: usize, i: usize, j: usize) -> Option<usize> {
    if i >= j || j >= n {
        return None;
    }
    Some(row_offset(n, i) + (j - i - 1))
}

/// Cosine distance between two vectors, 0 if either has zero norm.
pub fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    let a = ArrayView1::from(a);
    let b = ArrayView1::from(b);
    let na = a.dot(&a).sqrt();
    let nb = b.dot(&b).sqrt();
    distance_with_norms(a, b, na, nb)
}

#[inline]
fn distance_with_norms(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, na: f64, nb: f64) -> f64 {
    if na > 0.0 && nb > 0.0 {
        // Rounding can push identical directions a hair below zero.
        (1.0 - a.dot(&b) / (na * nb)).max(0.0)
    } else {
        0.0
    }
}

/// One distance per unordered document pair.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackedSimilarityMatrix {
    n_nodes: usize,
    values: Vec<f64>,
}

impl PackedSimilarityMatrix {
    /// All-zero matrix over `n_nodes` nodes.
    pub fn zeros(n_nodes: usize) -> Self {
        Self {
            n_nodes,
            values: vec![0.0; packed_len(n_nodes)],
        }
    }

    /// Rebuild from a packed buffer.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] if `values.len() != n_nodes·(n_nodes−1)/2`.
    pub fn from_values(n_nodes: usize, values: Vec<f64>) -> Result<Self> {
        let expected = packed_len(n_nodes);
        if values.len() != expected {
            return Err(Error::ShapeMismatch {
                expected: format!("{expected} packed entries for {n_nodes} nodes"),
                actual: format!("{} entries", values.len()),
            });
        }
        Ok(Self { n_nodes, values })
    }

    /// Number of nodes (N).
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no pairs (N < 2).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Slot of the pair `{i, j}` in either argument order.
    pub fn index(&self, i: usize, j: usize) -> Option<usize> {
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        packed_index(self.n_nodes, lo, hi)
    }

    /// Stored distance of the pair `{i, j}`.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.index(i, j).map(|idx| self.values[idx])
    }

    /// Distances from row `i` to every `j > i`.
    pub fn row(&self, i: usize) -> &[f64] {
        if i >= self.n_nodes {
            return &[];
        }
        &self.values[row_offset(self.n_nodes, i)..row_offset(self.n_nodes, i + 1)]
    }

    /// The packed buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Iterate `(i, j, distance)` for all `i < j` in packed order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let n = self.n_nodes;
        (0..n).flat_map(move |i| {
            self.row(i)
                .iter()
                .enumerate()
                .map(move |(k, &w)| (i, i + 1 + k, w))
        })
    }
}

/// Computes the packed distance matrix of a corpus in parallel.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityMatrixBuilder<'a> {
    pool: &'a WorkerPool,
}

impl<'a> SimilarityMatrixBuilder<'a> {
    /// Create a builder that runs on `pool`.
    pub fn new(pool: &'a WorkerPool) -> Self {
        Self { pool }
    }

    /// Compute `1 − cos` for every document pair.
    pub fn build(&self, docs: &DocumentTopics) -> PackedSimilarityMatrix {
        let n = docs.n_docs();
        info!(
            "Computing {} pairwise distances for {} documents over {} topics",
            packed_len(n),
            n,
            docs.n_topics()
        );

        let norms = docs.norms();
        let zero_norm = norms.iter().filter(|&&m| m == 0.0).count();
        if zero_norm > 0 {
            debug!("{} documents have a zero topic vector", zero_norm);
        }

        let mut matrix = PackedSimilarityMatrix::zeros(n);
        let ranges = self.pool.row_ranges(n);
        debug!("Similarity rows split into {} blocks", ranges.len());

        let view = docs.view();
        let blocks = split_blocks_mut(&mut matrix.values, &ranges, |row| row_offset(n, row));
        self.pool.for_each_block(blocks, |rows, out| {
            let mut slot = 0;
            for i in rows {
                let vi = view.row(i);
                for j in (i + 1)..n {
                    out[slot] = distance_with_norms(vi, view.row(j), norms[i], norms[j]);
                    slot += 1;
                }
            }
        });

        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use proptest::prelude::*;

    fn pool(n: usize) -> WorkerPool {
        WorkerPool::new(&RuntimeConfig::new().with_max_threads(n)).unwrap()
    }

    fn naive(rows: &[Vec<f64>]) -> Vec<f64> {
        let mut out = Vec::new();
        for i in 0..rows.len() {
            for j in (i + 1)..rows.len() {
                out.push(cosine_distance(&rows[i], &rows[j]));
            }
        }
        out
    }

    #[test]
    fn test_packed_len() {
        assert_eq!(packed_len(0), 0);
        assert_eq!(packed_len(1), 0);
        assert_eq!(packed_len(2), 1);
        assert_eq!(packed_len(5), 10);
    }

    #[test]
    fn test_packed_index_layout() {
        // Matches the diagram in the module docs (N = 4).
        assert_eq!(packed_index(4, 0, 1), Some(0));
        assert_eq!(packed_index(4, 0, 3), Some(2));
        assert_eq!(packed_index(4, 1, 2), Some(3));
        assert_eq!(packed_index(4, 2, 3), Some(5));
        assert_eq!(row_offset(4, 4), packed_len(4));
    }

    #[test]
    fn test_packed_index_rejects_invalid_pairs() {
        assert_eq!(packed_index(4, 2, 2), None);
        assert_eq!(packed_index(4, 3, 1), None);
        assert_eq!(packed_index(4, 1, 4), None);
        assert_eq!(packed_index(4, 5, 9), None);
        assert_eq!(packed_index(0, 0, 1), None);
    }

    #[test]
    fn test_cosine_distance() {
        assert_eq!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_distance(&[1.0, 0.0], &[0.0, 1.0]), 1.0);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[0.3, 0.7]), 0.0);
        let d = cosine_distance(&[1.0, 1.0], &[1.0, 0.0]);
        assert!((d - (1.0 - 1.0 / 2f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn test_build_two_groups() {
        let docs = DocumentTopics::from_rows(&[
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
        ])
        .unwrap();
        let m = SimilarityMatrixBuilder::new(&pool(2)).build(&docs);
        assert_eq!(m.as_slice(), &[0.0, 1.0, 1.0, 1.0, 1.0, 0.0]);
        assert_eq!(m.get(3, 2), Some(0.0));
        assert_eq!(m.get(2, 0), Some(1.0));
        assert_eq!(m.get(1, 1), None);
        assert_eq!(m.get(0, 4), None);
    }

    #[test]
    fn test_zero_vector_row_is_zero() {
        let docs = DocumentTopics::from_rows(&[
            vec![0.2, 0.8],
            vec![0.0, 0.0],
            vec![0.9, 0.1],
        ])
        .unwrap();
        let m = SimilarityMatrixBuilder::new(&pool(2)).build(&docs);
        assert_eq!(m.get(0, 1), Some(0.0));
        assert_eq!(m.get(1, 2), Some(0.0));
        assert!(m.get(0, 2).unwrap() > 0.0);
    }

    #[test]
    fn test_single_document_has_no_pairs() {
        let docs = DocumentTopics::from_rows(&[vec![0.5, 0.5]]).unwrap();
        let m = SimilarityMatrixBuilder::new(&pool(4)).build(&docs);
        assert!(m.is_empty());
        assert_eq!(m.n_nodes(), 1);
        assert_eq!(m.pairs().count(), 0);
    }

    #[test]
    fn test_from_values_checks_length() {
        assert!(PackedSimilarityMatrix::from_values(4, vec![0.0; 6]).is_ok());
        let err = PackedSimilarityMatrix::from_values(4, vec![0.0; 5]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_pairs_follow_packed_order() {
        let m = PackedSimilarityMatrix::from_values(3, vec![0.1, 0.2, 0.3]).unwrap();
        let pairs: Vec<_> = m.pairs().collect();
        assert_eq!(pairs, vec![(0, 1, 0.1), (0, 2, 0.2), (1, 2, 0.3)]);
        assert_eq!(m.row(1), &[0.3]);
        assert!(m.row(2).is_empty());
    }

    proptest! {
        #[test]
        fn packed_index_is_bijection(n in 0usize..60) {
            let mut seen = vec![false; packed_len(n)];
            for i in 0..n {
                for j in (i + 1)..n {
                    let idx = packed_index(n, i, j).unwrap();
                    prop_assert!(idx < seen.len());
                    prop_assert!(!seen[idx]);
                    seen[idx] = true;
                }
            }
            prop_assert!(seen.iter().all(|&s| s));
        }

        #[test]
        fn build_matches_naive_for_any_worker_count(
            rows in proptest::collection::vec(proptest::collection::vec(0.0f64..1.0, 3), 1..25),
            workers in 1usize..6,
        ) {
            let docs = DocumentTopics::from_rows(&rows).unwrap();
            let m = SimilarityMatrixBuilder::new(&pool(workers)).build(&docs);
            prop_assert_eq!(m.len(), packed_len(rows.len()));
            for (got, want) in m.as_slice().iter().zip(naive(&rows)) {
                prop_assert!((got - want).abs() < 1e-12);
            }
        }

        #[test]
        fn swapping_documents_keeps_pair_value(
            rows in proptest::collection::vec(proptest::collection::vec(0.0f64..1.0, 4), 2..12),
        ) {
            let n = rows.len();
            let mut swapped = rows.clone();
            swapped.swap(0, n - 1);

            let p = pool(2);
            let builder = SimilarityMatrixBuilder::new(&p);
            let a = builder.build(&DocumentTopics::from_rows(&rows).unwrap());
            let b = builder.build(&DocumentTopics::from_rows(&swapped).unwrap());
            let before = a.get(0, n - 1).unwrap();
            let after = b.get(n - 1, 0).unwrap();
            prop_assert!((before - after).abs() < 1e-12);
        }
    }
}
