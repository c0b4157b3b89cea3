//! # spine
//!
//! Similarity backbones and perplexity for topic-model corpora.
//!
//! Documents are points on the topic simplex. `spine` connects every pair by
//! its cosine distance, keeps the minimum spanning tree of that network as
//! the corpus *backbone*, and scores the topic model itself by perplexity and
//! averaged per-topic diagnostics.
//!
//! ```text
//! DocumentTopics ─▶ PackedSimilarityMatrix ─▶ EdgeSet ─▶ SpanningForest ─▶ communities
//!        │
//!        └── + TopicWords ─▶ PerplexityReport
//! ```
//!
//! Pairwise similarity, edge emission and per-document perplexity run on a
//! [`WorkerPool`]; results are identical for any worker count.
//!
//! ```rust
//! use spine::{DocumentTopics, NetworkSynthesizer, RuntimeConfig};
//!
//! let docs = DocumentTopics::from_rows(&[
//!     vec![0.9, 0.1],
//!     vec![0.8, 0.2],
//!     vec![0.1, 0.9],
//! ])
//! .unwrap();
//! let synth = NetworkSynthesizer::new(&RuntimeConfig::new().with_max_threads(2)).unwrap();
//! let backbone = synth.synthesize(&docs).unwrap();
//! assert_eq!(backbone.forest.len(), 2);
//! ```
//!
//! Community detection on the backbone (Leiden, resolution sweeps) is behind
//! the default `community` feature.

#[cfg(feature = "community")]
pub mod community;
pub mod config;
pub mod corpus;
/// Error types used across `spine`.
pub mod error;
pub mod graph;
pub mod mst;
pub mod parallel;
pub mod perplexity;
pub mod synthesizer;


pub use config::RuntimeConfig;
pub use corpus::{DocumentTopics, TopicWords};
pub use error::{Error, Result};
pub use graph::{
    cosine_distance, Edge, EdgeSet, GraphBuilder, PackedSimilarityMatrix, SimilarityMatrixBuilder,
};
pub use mst::{minimum_spanning_forest, DisjointSet, MstBuilder, SpanningForest};
pub use parallel::WorkerPool;
pub use perplexity::{
    corpus_perplexity, document_log_probability, total_tokens, total_word_count, DiagnosticMeans,
    DiagnosticMetric, PerplexityEvaluator, PerplexityReport, TopicDiagnostics,
};
pub use synthesizer::{Backbone, NetworkSynthesizer};

#[cfg(feature = "community")]
pub use community::{
    backbone_graph, CommunityDetection, Leiden, ResolutionInterval, ResolutionSweep, SweepResult,
};
