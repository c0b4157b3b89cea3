//! Community structure of a document backbone.
//!
//! The spanning forest is turned into an affinity-weighted graph
//! ([`backbone_graph`]) and partitioned with Leiden, usually across a grid of
//! resolutions ([`ResolutionSweep`]).
//!
//! ## The Modularity Objective
//!
//! Leiden optimizes **modularity** Q, which compares the actual weight of
//! edges within communities to the expected weight in a random graph with the
//! same degree sequence:
//!
//! ```text
//! Q = (1/2m) × Σ[A_ij - γ(k_i × k_j)/(2m)] × δ(c_i, c_j)
//! ```
//!
//! Where:
//! - m = total edge weight (sum of all edges)
//! - A_ij = edge weight (affinity) between i and j
//! - k_i = weighted degree of node i
//! - γ = resolution parameter
//! - δ(c_i, c_j) = 1 if i and j are in same community
//!
//! ## The Resolution Parameter γ
//!
//! - **γ = 1**: standard modularity
//! - **γ > 1**: smaller communities (higher penalty for merging)
//! - **γ < 1**: larger communities (lower penalty for merging)
//!
//! A tree has few edges per node, so meaningful splits of an MST backbone
//! show up at small γ; the default sweep grid is `1e-4 ..= 99e-4`.
//!
//! ## Usage
//!
//! ```rust
//! use petgraph::graph::UnGraph;
//! use spine::community::{Leiden, CommunityDetection};
//!
//! let mut graph = UnGraph::<(), f64>::new_undirected();
//! let a = graph.add_node(());
//! let b = graph.add_node(());
//! let c = graph.add_node(());
//! graph.add_edge(a, b, 0.9);
//! graph.add_edge(b, c, 0.8);
//!
//! let communities = Leiden::new().detect(&graph).unwrap();
//! assert_eq!(communities.len(), 3);
//! ```

mod backbone;
mod leiden;
mod sweep;
mod traits;

pub use backbone::{affinity, backbone_graph};
pub use leiden::Leiden;
pub use sweep::{ResolutionInterval, ResolutionPoint, ResolutionSweep, SweepResult};
pub use traits::CommunityDetection;
