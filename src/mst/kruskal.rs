//! Kruskal's algorithm over a weight-sorted edge set.
//!
//! # Algorithm
//!
//! ```text
//! for (u, v) in edges, lightest first:
//!     if find(u) != find(v):
//!         accept (u, v); unite(u, v)
//! ```
//!
//! Each accepted edge joins two different components, so the accepted set is
//! always acyclic and every acceptance removes exactly one component. After
//! the pass, every component of the input graph is spanned by a minimum tree.
//! A disconnected input therefore yields a minimum spanning *forest*, which is
//! a normal result, not an error.
//!
//! # Cost
//!
//! One linear pass with near-constant union-find operations. The `O(E log E)`
//! sort done by [`GraphBuilder`](crate::graph::GraphBuilder) dominates.
//!
//! # Ties
//!
//! With repeated weights, several minimum trees may exist. Which one is
//! returned depends only on the input order, which the graph builder makes
//! deterministic.

use super::disjoint_set::DisjointSet;
use crate::error::{Error, Result};
use crate::graph::{Edge, EdgeSet};
use log::{debug, info};

/// Minimum spanning tree (or forest) of a document network.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpanningForest {
    edges: Vec<Edge>,
    total_weight: f64,
    n_nodes: usize,
    n_components: usize,
    labels: Vec<usize>,
}

impl SpanningForest {
    /// Accepted edges, in acceptance (ascending weight) order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Sum of accepted edge weights.
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Number of accepted edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// True if no edge was accepted.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of nodes the forest spans.
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Number of connected components (trees) in the forest.
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// True if the forest is a single tree over all nodes.
    pub fn is_spanning_tree(&self) -> bool {
        self.n_components == 1
    }

    /// Dense component label of every node.
    pub fn component_labels(&self) -> &[usize] {
        &self.labels
    }

    /// `(source, target, weight)` with the raw stored distance, for exporters.
    pub fn weighted_pairs(&self) -> Vec<(usize, usize, f64)> {
        self.edges
            .iter()
            .map(|e| (e.source(), e.target(), e.weight()))
            .collect()
    }
}

/// Kruskal minimum spanning tree builder.
#[derive(Debug, Clone)]
pub struct MstBuilder {
    /// Stop scanning once a single component remains.
    early_exit: bool,
}

impl MstBuilder {
    /// Create a builder with early exit enabled.
    pub fn new() -> Self {
        Self { early_exit: true }
    }

    /// Set whether to stop scanning once every node is connected.
    ///
    /// Endpoints are range-checked up front either way.
    pub fn with_early_exit(mut self, early_exit: bool) -> Self {
        self.early_exit = early_exit;
        self
    }

    /// Run Kruskal over `edges`, uniting components in `forest`.
    ///
    /// `forest` is normally a fresh [`DisjointSet::new(n)`](DisjointSet::new);
    /// a pre-merged one treats its existing unions as already connected.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsortedEdges`] if `edges` is not weight-ascending.
    /// - [`Error::NodeOutOfRange`] if an edge endpoint is not in `forest`.
    pub fn build(&self, edges: &EdgeSet, forest: &mut DisjointSet) -> Result<SpanningForest> {
        if let Some(position) = edges.first_unsorted() {
            return Err(Error::UnsortedEdges { position });
        }

        let n = forest.len();
        if let Some(node) = edges
            .iter()
            .map(|e| e.source().max(e.target()))
            .find(|&node| node >= n)
        {
            return Err(Error::NodeOutOfRange { node, n_nodes: n });
        }

        info!(
            "Finding minimum spanning tree over {} nodes and {} edges",
            n,
            edges.len()
        );

        let mut accepted = Vec::with_capacity(n.saturating_sub(1));
        let mut total_weight = 0.0;
        let mut scanned = 0;

        for edge in edges {
            if self.early_exit && forest.n_components() <= 1 {
                break;
            }
            scanned += 1;
            // unite() merges iff find(u) != find(v).
            if forest.unite(edge.source(), edge.target())? {
                accepted.push(*edge);
                total_weight += edge.weight();
            }
        }

        let n_components = forest.n_components();
        let labels = forest.labels();
        debug!(
            "Scanned {} of {} edges, accepted {}",
            scanned,
            edges.len(),
            accepted.len()
        );
        if n_components > 1 {
            info!(
                "Graph is disconnected: minimum spanning forest with {} components",
                n_components
            );
        }
        info!(
            "MST successfully calculated. Total weight: {}",
            total_weight
        );

        Ok(SpanningForest {
            edges: accepted,
            total_weight,
            n_nodes: n,
            n_components,
            labels,
        })
    }
}

impl Default for MstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimum spanning forest of a weight-sorted edge set over `n_nodes` nodes.
pub fn minimum_spanning_forest(edges: &EdgeSet, n_nodes: usize) -> Result<SpanningForest> {
    MstBuilder::new().build(edges, &mut DisjointSet::new(n_nodes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sorted(triples: &[(usize, usize, f64)]) -> EdgeSet {
        let mut set: EdgeSet = triples
            .iter()
            .enumerate()
            .map(|(id, &(a, b, w))| Edge::new(a, b, w, id).unwrap())
            .collect();
        set.sort_by_weight();
        set
    }

    fn complete(n: usize, mut weight: impl FnMut(usize, usize) -> f64) -> Vec<(usize, usize, f64)> {
        let mut out = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                out.push((i, j, weight(i, j)));
            }
        }
        out
    }

    /// Minimum weight over every (n-1)-subset that spans all n nodes.
    fn brute_force_mst_weight(n: usize, triples: &[(usize, usize, f64)]) -> f64 {
        let m = triples.len();
        let mut best = f64::INFINITY;
        for mask in 0u32..(1 << m) {
            if mask.count_ones() as usize != n - 1 {
                continue;
            }
            let mut ds = DisjointSet::new(n);
            let mut weight = 0.0;
            let mut acyclic = true;
            for (k, &(a, b, w)) in triples.iter().enumerate() {
                if mask & (1 << k) != 0 {
                    acyclic &= ds.unite(a, b).unwrap();
                    weight += w;
                }
            }
            if acyclic && weight < best {
                best = weight;
            }
        }
        best
    }

    fn assert_acyclic(forest: &SpanningForest) {
        let mut ds = DisjointSet::new(forest.n_nodes());
        for e in forest.edges() {
            assert!(
                ds.unite(e.source(), e.target()).unwrap(),
                "edge {:?} closes a cycle",
                e
            );
        }
    }

    #[test]
    fn test_complete_graph_n5_matches_brute_force() {
        let triples = complete(5, |i, j| ((i * 7 + j * 13) % 17) as f64 / 17.0 + 0.01 * i as f64);
        let set = sorted(&triples);
        let forest = minimum_spanning_forest(&set, 5).unwrap();

        assert_eq!(forest.len(), 4);
        assert!(forest.is_spanning_tree());
        assert_acyclic(&forest);
        let expected = brute_force_mst_weight(5, &triples);
        assert!((forest.total_weight() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_two_disjoint_cliques() {
        let mut triples = complete(3, |i, j| 0.1 * (i + j) as f64 + 0.05);
        for (a, b, w) in complete(4, |i, j| 0.2 * (i + j) as f64 + 0.03) {
            triples.push((a + 3, b + 3, w));
        }
        let forest = minimum_spanning_forest(&sorted(&triples), 7).unwrap();

        assert_eq!(forest.len(), (3 - 1) + (4 - 1));
        assert_eq!(forest.n_components(), 2);
        assert!(!forest.is_spanning_tree());
        assert_acyclic(&forest);

        let labels = forest.component_labels();
        assert!(labels[..3].iter().all(|&l| l == labels[0]));
        assert!(labels[3..].iter().all(|&l| l == labels[3]));
        assert_ne!(labels[0], labels[3]);
    }

    #[test]
    fn test_isolated_nodes_are_components() {
        let forest = minimum_spanning_forest(&sorted(&[(0, 1, 0.5)]), 4).unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest.n_components(), 3);
        assert_eq!(forest.component_labels(), &[0, 0, 1, 2]);
    }

    #[test]
    fn test_unsorted_edges_rejected() {
        let set = EdgeSet::from_edges(vec![
            Edge::new(0, 1, 0.9, 0).unwrap(),
            Edge::new(1, 2, 0.1, 1).unwrap(),
        ]);
        let err = minimum_spanning_forest(&set, 3).unwrap_err();
        assert_eq!(err, Error::UnsortedEdges { position: 1 });
    }

    #[test]
    fn test_out_of_range_endpoint_rejected() {
        let set = sorted(&[(0, 1, 0.1), (1, 5, 0.2)]);
        let err = minimum_spanning_forest(&set, 3).unwrap_err();
        assert_eq!(
            err,
            Error::NodeOutOfRange {
                node: 5,
                n_nodes: 3
            }
        );
    }

    #[test]
    fn test_out_of_range_edge_after_spanning_point_rejected() {
        // The trailing edge sorts after the tree is complete.
        let set = sorted(&[(0, 1, 0.1), (1, 2, 0.2), (0, 9, 0.3)]);
        for early_exit in [true, false] {
            let builder = MstBuilder::new().with_early_exit(early_exit);
            let err = builder.build(&set, &mut DisjointSet::new(3)).unwrap_err();
            assert_eq!(
                err,
                Error::NodeOutOfRange {
                    node: 9,
                    n_nodes: 3
                }
            );
        }
    }

    #[test]
    fn test_early_exit_matches_full_scan() {
        let triples = complete(6, |i, j| ((i * 5 + j * 11) % 13) as f64 / 13.0 + 0.01);
        let set = sorted(&triples);
        let fast = MstBuilder::new().build(&set, &mut DisjointSet::new(6)).unwrap();
        let full = MstBuilder::new()
            .with_early_exit(false)
            .build(&set, &mut DisjointSet::new(6))
            .unwrap();
        assert_eq!(fast, full);
    }

    #[test]
    fn test_weighted_pairs_keep_raw_distances() {
        let forest = minimum_spanning_forest(&sorted(&[(0, 1, 0.25), (1, 2, 0.75)]), 3).unwrap();
        assert_eq!(forest.weighted_pairs(), vec![(0, 1, 0.25), (1, 2, 0.75)]);
        assert!((forest.total_weight() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_graph() {
        let forest = minimum_spanning_forest(&EdgeSet::new(), 0).unwrap();
        assert!(forest.is_empty());
        assert_eq!(forest.n_components(), 0);
        assert!(!forest.is_spanning_tree());
    }

    proptest! {
        #[test]
        fn kruskal_matches_brute_force_on_k5(
            weights in proptest::collection::vec(0.001f64..1.0, 10),
        ) {
            let mut k = 0;
            let triples = complete(5, |_, _| { k += 1; weights[k - 1] });
            let forest = minimum_spanning_forest(&sorted(&triples), 5).unwrap();
            prop_assert_eq!(forest.len(), 4);
            let expected = brute_force_mst_weight(5, &triples);
            prop_assert!((forest.total_weight() - expected).abs() < 1e-9);
        }

        #[test]
        fn forest_has_n_minus_components_edges(
            n in 1usize..30,
            raw in proptest::collection::vec((0usize..30, 0usize..30, 0.0f64..1.0), 0..60),
        ) {
            let triples: Vec<(usize, usize, f64)> = raw
                .into_iter()
                .map(|(a, b, w)| (a % n, b % n, w))
                .filter(|(a, b, _)| a != b)
                .collect();
            let forest = minimum_spanning_forest(&sorted(&triples), n).unwrap();
            prop_assert_eq!(forest.len(), n - forest.n_components());
            assert_acyclic(&forest);
        }
    }
}
