//! Document networks built from topic vectors.
//!
//! ```text
//! DocumentTopics ──SimilarityMatrixBuilder──▶ PackedSimilarityMatrix
//!                                                   │
//!                                             GraphBuilder
//!                                                   ▼
//!                                   EdgeSet (weight-ascending)
//! ```
//!
//! The whole layer speaks the distance convention: an edge weight is
//! `1 − cos(v_i, v_j)`, so lighter edges join more similar documents.

pub mod builder;
pub mod edge;
pub mod similarity;

pub use builder::GraphBuilder;
pub use edge::{Edge, EdgeSet};
pub use similarity::{
    cosine_distance, packed_index, packed_len, PackedSimilarityMatrix, SimilarityMatrixBuilder,
};
