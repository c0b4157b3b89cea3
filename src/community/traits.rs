//! Community detection traits.

use crate::error::Result;
use petgraph::graph::UnGraph;

/// Trait for community detection on affinity-weighted graphs.
pub trait CommunityDetection {
    /// Detect communities in a graph.
    ///
    /// Returns a mapping from node index to dense community ID.
    fn detect<N>(&self, graph: &UnGraph<N, f64>) -> Result<Vec<usize>>;

    /// Get the resolution parameter (if applicable).
    fn resolution(&self) -> f64 {
        1.0
    }
}
