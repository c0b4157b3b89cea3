//! Packed distance matrix → weight-ascending edge list.
//!
//! Every pair with a strictly positive distance becomes an edge. Zero marks
//! either identical directions or an undefined angle (zero vector); neither is
//! a relationship worth keeping, so those pairs are dropped.
//!
//! Rows are scanned in parallel, each worker into a private buffer. Ids are
//! then assigned from each buffer's prefix offset, which reproduces the
//! row-major emission order of a serial scan regardless of the worker count.

use super::edge::{Edge, EdgeSet};
use super::similarity::PackedSimilarityMatrix;
use crate::parallel::WorkerPool;
use log::{debug, info};

/// Builds the document network from a packed distance matrix.
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder<'a> {
    pool: &'a WorkerPool,
}

impl<'a> GraphBuilder<'a> {
    /// Create a builder that runs on `pool`.
    pub fn new(pool: &'a WorkerPool) -> Self {
        Self { pool }
    }

    /// Emit one edge per positive-weight pair, sorted by `(weight, id)`.
    pub fn build(&self, matrix: &PackedSimilarityMatrix) -> EdgeSet {
        let n = matrix.n_nodes();
        let ranges = self.pool.row_ranges(n);

        // (i, j, w) per worker; ids are not known until every block is counted.
        let blocks: Vec<Vec<(usize, usize, f64)>> = self.pool.map_blocks(&ranges, |rows| {
            let mut local = Vec::new();
            for i in rows {
                for (k, &w) in matrix.row(i).iter().enumerate() {
                    if w > 0.0 {
                        local.push((i, i + 1 + k, w));
                    }
                }
            }
            local
        });

        let total: usize = blocks.iter().map(Vec::len).sum();
        debug!(
            "Kept {} of {} pairs across {} blocks",
            total,
            matrix.len(),
            blocks.len()
        );

        let mut edges = EdgeSet::with_capacity(total);
        let mut offset = 0;
        for block in blocks {
            let len = block.len();
            for (local_id, (i, j, w)) in block.into_iter().enumerate() {
                // i < j by construction of the packed layout.
                edges.push(Edge::from_ordered_pair(i, j, w, offset + local_id));
            }
            offset += len;
        }

        edges.sort_by_weight();
        info!("Network built with {} nodes and {} edges", n, edges.len());
        edges
    }
}
