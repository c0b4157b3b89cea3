//! Held-in perplexity of a topic model.
//!
//! For document `d` and word `w`:
//!
//! ```text
//! P(w|d)   = Σ_t P(t|d) · P(w|t)
//! ln P(d)  = Σ_{w : P(w|d) > 0} ln P(w|d)
//! PPL      = exp( -Σ_{d : P(d) > 0} ln P(d) / total_words )
//! ```
//!
//! Zero-probability words are skipped rather than sending the document score
//! to `-∞`. Long documents routinely underflow `P(d) = exp(ln P(d))` to zero;
//! those documents keep their finite log-probability in the report but drop
//! out of the corpus sum.
//!
//! Each document is an independent task on the [`WorkerPool`]; within a
//! document the accumulation order is fixed, so results do not depend on the
//! worker count.

use crate::corpus::{DocumentTopics, TopicWords};
use crate::error::{Error, Result};
use crate::parallel::WorkerPool;
use log::{debug, info, warn};
use ndarray::{ArrayView1, ArrayView2};
use std::collections::HashMap;

/// Per-document scores and corpus perplexity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerplexityReport {
    /// `ln P(d)` for every document.
    pub doc_log_probs: Vec<f64>,
    /// `P(d) = exp(ln P(d))`; may underflow to 0.
    pub doc_probs: Vec<f64>,
    /// Corpus perplexity.
    pub perplexity: f64,
    /// Word total the perplexity was normalized by.
    pub total_words: u64,
}

impl PerplexityReport {
    /// Number of documents whose probability underflowed to zero.
    pub fn n_underflowed(&self) -> usize {
        self.doc_probs.iter().filter(|&&p| p <= 0.0).count()
    }
}

/// Evaluates perplexity on a worker pool.
#[derive(Debug, Clone, Copy)]
pub struct PerplexityEvaluator<'a> {
    pool: &'a WorkerPool,
}

impl<'a> PerplexityEvaluator<'a> {
    /// Create an evaluator that runs on `pool`.
    pub fn new(pool: &'a WorkerPool) -> Self {
        Self { pool }
    }

    /// Score every document and the corpus.
    ///
    /// # Errors
    ///
    /// - [`Error::DimensionMismatch`] if the two matrices disagree on the topic count.
    /// - [`Error::InvalidParameter`] if `total_words == 0`.
    pub fn evaluate(
        &self,
        doc_topics: &DocumentTopics,
        topic_words: &TopicWords,
        total_words: u64,
    ) -> Result<PerplexityReport> {
        if doc_topics.n_topics() != topic_words.n_topics() {
            return Err(Error::DimensionMismatch {
                expected: doc_topics.n_topics(),
                found: topic_words.n_topics(),
            });
        }
        if total_words == 0 {
            return Err(Error::InvalidParameter {
                name: "total_words",
                message: "must be positive",
            });
        }

        let n_docs = doc_topics.n_docs();
        info!(
            "Calculating perplexity over {} documents, {} topics, {} words",
            n_docs,
            doc_topics.n_topics(),
            topic_words.n_words()
        );

        let phi = topic_words.view();
        let doc_log_probs = self
            .pool
            .map_indexed(n_docs, |d| document_log_probability(doc_topics.row(d), phi));
        let doc_probs: Vec<f64> = doc_log_probs.iter().map(|lp| lp.exp()).collect();

        let underflowed = doc_probs.iter().filter(|&&p| p <= 0.0).count();
        if underflowed > 0 {
            warn!(
                "{} of {} document probabilities underflowed to zero and are excluded",
                underflowed, n_docs
            );
        }

        let perplexity = corpus_perplexity(&doc_log_probs, &doc_probs, total_words)?;
        debug!("Perplexity normalized by {} words", total_words);
        info!("Perplexity: {}", perplexity);

        Ok(PerplexityReport {
            doc_log_probs,
            doc_probs,
            perplexity,
            total_words,
        })
    }
}

/// `ln P(d)` for one document: the sum of `ln P(w|d)` over words with `P(w|d) > 0`.
///
/// `theta` is the document's topic distribution (length T) and `phi` the
/// topic-word matrix (T × W).
pub fn document_log_probability(theta: ArrayView1<'_, f64>, phi: ArrayView2<'_, f64>) -> f64 {
    let mut log_sum = 0.0;
    for w in 0..phi.ncols() {
        let mut p = 0.0;
        for (t, &weight) in theta.iter().enumerate() {
            p += weight * phi[[t, w]];
        }
        if p > 0.0 {
            log_sum += p.ln();
        }
    }
    log_sum
}

/// `exp(-Σ ln P(d) / total_words)` over documents with `P(d) > 0`.
///
/// `doc_log_probs` and `doc_probs` are parallel arrays; a document contributes
/// its log-probability only when its probability is strictly positive.
///
/// # Errors
///
/// - [`Error::InvalidParameter`] if `total_words == 0`.
/// - [`Error::DimensionMismatch`] if the two slices differ in length.
pub fn corpus_perplexity(
    doc_log_probs: &[f64],
    doc_probs: &[f64],
    total_words: u64,
) -> Result<f64> {
    if total_words == 0 {
        return Err(Error::InvalidParameter {
            name: "total_words",
            message: "must be positive",
        });
    }
    if doc_log_probs.len() != doc_probs.len() {
        return Err(Error::DimensionMismatch {
            expected: doc_log_probs.len(),
            found: doc_probs.len(),
        });
    }

    let log_likelihood: f64 = doc_log_probs
        .iter()
        .zip(doc_probs)
        .filter(|(_, p)| **p > 0.0)
        .map(|(lp, _)| *lp)
        .sum();
    Ok((-log_likelihood / total_words as f64).exp())
}

/// Total token count of a `word → count` map.
pub fn total_word_count(counts: &HashMap<String, u64>) -> u64 {
    counts.values().sum()
}
