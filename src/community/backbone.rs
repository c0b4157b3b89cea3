//! Spanning forest → petgraph graph for community detection.

use crate::mst::SpanningForest;
use petgraph::graph::{NodeIndex, UnGraph};

/// Affinity of an edge with distance `distance`: `max(0, 1 - distance)`.
pub fn affinity(distance: f64) -> f64 {
    (1.0 - distance).max(0.0)
}

/// One node per document and one edge per forest edge, weighted by
/// [`affinity`].
///
/// Node `i` of the result is document `i`; documents without any forest edge
/// are kept as isolated nodes.
pub fn backbone_graph(forest: &SpanningForest) -> UnGraph<(), f64> {
    let mut graph = UnGraph::with_capacity(forest.n_nodes(), forest.len());
    for _ in 0..forest.n_nodes() {
        let _ = graph.add_node(());
    }
    for edge in forest.edges() {
        let _ = graph.add_edge(
            NodeIndex::new(edge.source()),
            NodeIndex::new(edge.target()),
            affinity(edge.weight()),
        );
    }
    graph
}
