//! End-to-end driver: topic vectors → document network → backbone.
//!
//! [`NetworkSynthesizer`] owns the worker pool and runs each stage in turn,
//! logging sizes and elapsed time. Every stage is also callable on its own.

use crate::config::RuntimeConfig;
use crate::corpus::{DocumentTopics, TopicWords};
use crate::error::Result;
use crate::graph::{EdgeSet, GraphBuilder, PackedSimilarityMatrix, SimilarityMatrixBuilder};
use crate::mst::{DisjointSet, MstBuilder, SpanningForest};
use crate::parallel::WorkerPool;
use crate::perplexity::{PerplexityEvaluator, PerplexityReport};
use log::info;
use std::time::Instant;

/// Result of [`NetworkSynthesizer::synthesize`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Backbone {
    /// Number of documents.
    pub n_nodes: usize,
    /// Number of edges in the full document network.
    pub n_network_edges: usize,
    /// Minimum spanning tree (or forest) of the network.
    pub forest: SpanningForest,
}

/// Runs the similarity → network → MST pipeline on one worker pool.
#[derive(Debug)]
pub struct NetworkSynthesizer {
    pool: WorkerPool,
    mst: MstBuilder,
}

impl NetworkSynthesizer {
    /// Build the worker pool described by `config`.
    ///
    /// # Errors
    ///
    /// Fails if the pool cannot be created (see [`WorkerPool::new`]).
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        Ok(Self {
            pool: WorkerPool::new(config)?,
            mst: MstBuilder::new(),
        })
    }

    /// The pool every stage runs on.
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Pairwise cosine distances of all documents.
    pub fn calculate_similarity(&self, docs: &DocumentTopics) -> PackedSimilarityMatrix {
        let start = Instant::now();
        info!("Calculating similarity for {} documents...", docs.n_docs());
        let matrix = SimilarityMatrixBuilder::new(&self.pool).build(docs);
        info!(
            "Similarity calculated: {} pairs in {:.3}s",
            matrix.len(),
            start.elapsed().as_secs_f64()
        );
        matrix
    }

    /// Weight-ascending edge list of the document network.
    pub fn build_network(&self, matrix: &PackedSimilarityMatrix) -> EdgeSet {
        let start = Instant::now();
        info!("Building network...");
        let edges = GraphBuilder::new(&self.pool).build(matrix);
        info!(
            "Network built: {} edges in {:.3}s",
            edges.len(),
            start.elapsed().as_secs_f64()
        );
        edges
    }

    /// Minimum spanning forest of a network over `n_nodes` documents.
    ///
    /// # Errors
    ///
    /// Propagates [`MstBuilder::build`] failures.
    pub fn find_mst(&self, edges: &EdgeSet, n_nodes: usize) -> Result<SpanningForest> {
        let start = Instant::now();
        info!("Finding MST...");
        let forest = self.mst.build(edges, &mut DisjointSet::new(n_nodes))?;
        info!(
            "MST found: {} edges, {} components in {:.3}s",
            forest.len(),
            forest.n_components(),
            start.elapsed().as_secs_f64()
        );
        Ok(forest)
    }

    /// Run all three stages.
    ///
    /// # Errors
    ///
    /// Propagates stage failures.
    pub fn synthesize(&self, docs: &DocumentTopics) -> Result<Backbone> {
        let start = Instant::now();
        let matrix = self.calculate_similarity(docs);
        let edges = self.build_network(&matrix);
        drop(matrix);
        let forest = self.find_mst(&edges, docs.n_docs())?;
        info!(
            "Backbone synthesized in {:.3}s",
            start.elapsed().as_secs_f64()
        );
        Ok(Backbone {
            n_nodes: docs.n_docs(),
            n_network_edges: edges.len(),
            forest,
        })
    }

    /// Perplexity of the topic model on its own corpus.
    ///
    /// # Errors
    ///
    /// Propagates [`PerplexityEvaluator::evaluate`] failures.
    pub fn evaluate_perplexity(
        &self,
        doc_topics: &DocumentTopics,
        topic_words: &TopicWords,
        total_words: u64,
    ) -> Result<PerplexityReport> {
        let start = Instant::now();
        let report =
            PerplexityEvaluator::new(&self.pool).evaluate(doc_topics, topic_words, total_words)?;
        info!(
            "Perplexity evaluated in {:.3}s",
            start.elapsed().as_secs_f64()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::graph::Edge;

    #[test]
    fn test_zero_workers_rejected() {
        let err = NetworkSynthesizer::new(&RuntimeConfig::new().with_max_threads(0)).unwrap_err();
        assert_eq!(err, Error::NoWorkers);
    }

    #[test]
    fn test_stages_compose() {
        let synth = NetworkSynthesizer::new(&RuntimeConfig::new().with_max_threads(2)).unwrap();
        let docs = DocumentTopics::from_rows(&[
            vec![0.9, 0.1, 0.0],
            vec![0.8, 0.2, 0.0],
            vec![0.0, 0.1, 0.9],
            vec![0.1, 0.0, 0.9],
        ])
        .unwrap();

        let matrix = synth.calculate_similarity(&docs);
        assert_eq!(matrix.len(), 6);
        let edges = synth.build_network(&matrix);
        let forest = synth.find_mst(&edges, 4).unwrap();

        let backbone = synth.synthesize(&docs).unwrap();
        assert_eq!(backbone.forest, forest);
        assert_eq!(backbone.n_network_edges, edges.len());
        assert_eq!(backbone.n_nodes, 4);
        assert!(backbone.forest.is_spanning_tree());
        assert_eq!(synth.pool().n_workers(), 2);
    }

    #[test]
    fn test_single_document() {
        let config = RuntimeConfig::new().with_single_thread(true);
        let synth = NetworkSynthesizer::new(&config).unwrap();
        let docs = DocumentTopics::from_rows(&[vec![0.5, 0.5]]).unwrap();
        let backbone = synth.synthesize(&docs).unwrap();
        assert_eq!(backbone.n_network_edges, 0);
        assert!(backbone.forest.is_empty());
        assert!(backbone.forest.is_spanning_tree());
    }

    #[test]
    fn test_find_mst_rejects_out_of_range_endpoint() {
        let synth = NetworkSynthesizer::new(&RuntimeConfig::new().with_max_threads(1)).unwrap();
        let edges = EdgeSet::from_edges(vec![
            Edge::new(0, 1, 0.1, 0).unwrap(),
            Edge::new(1, 2, 0.2, 1).unwrap(),
            Edge::new(0, 9, 0.3, 2).unwrap(),
        ]);
        let err = synth.find_mst(&edges, 3).unwrap_err();
        assert_eq!(
            err,
            Error::NodeOutOfRange {
                node: 9,
                n_nodes: 3
            }
        );
    }
}
