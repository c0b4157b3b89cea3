//! Per-topic quality diagnostics and their corpus means.
//!
//! The twelve metrics are the ones topic-modeling toolkits report per topic
//! in their diagnostics output. Nothing here computes them; they are read
//! from the trainer and averaged for a model-level summary.

use crate::error::{Error, Result};

/// One of the twelve per-topic diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticMetric {
    /// Tokens assigned to the topic.
    Tokens,
    /// Entropy of the topic's distribution over documents.
    DocumentEntropy,
    /// Mean character length of the top words.
    WordLength,
    /// Co-document coherence of the top words.
    Coherence,
    /// Distance from the uniform word distribution.
    UniformDist,
    /// Distance from the corpus word distribution.
    CorpusDist,
    /// Effective number of words.
    EffNumWords,
    /// Token/document frequency difference.
    TokenDocDiff,
    /// Documents where this is the top-ranked topic.
    Rank1Docs,
    /// Allocation ratio.
    AllocationRatio,
    /// Allocation count.
    AllocationCount,
    /// Exclusivity of the top words.
    Exclusivity,
}

impl DiagnosticMetric {
    /// Every metric in canonical order.
    pub const ALL: [DiagnosticMetric; 12] = [
        DiagnosticMetric::Tokens,
        DiagnosticMetric::DocumentEntropy,
        DiagnosticMetric::WordLength,
        DiagnosticMetric::Coherence,
        DiagnosticMetric::UniformDist,
        DiagnosticMetric::CorpusDist,
        DiagnosticMetric::EffNumWords,
        DiagnosticMetric::TokenDocDiff,
        DiagnosticMetric::Rank1Docs,
        DiagnosticMetric::AllocationRatio,
        DiagnosticMetric::AllocationCount,
        DiagnosticMetric::Exclusivity,
    ];

    /// Attribute name used in diagnostics files.
    pub fn name(self) -> &'static str {
        match self {
            DiagnosticMetric::Tokens => "tokens",
            DiagnosticMetric::DocumentEntropy => "document_entropy",
            DiagnosticMetric::WordLength => "word-length",
            DiagnosticMetric::Coherence => "coherence",
            DiagnosticMetric::UniformDist => "uniform_dist",
            DiagnosticMetric::CorpusDist => "corpus_dist",
            DiagnosticMetric::EffNumWords => "eff_num_words",
            DiagnosticMetric::TokenDocDiff => "token-doc-diff",
            DiagnosticMetric::Rank1Docs => "rank_1_docs",
            DiagnosticMetric::AllocationRatio => "allocation_ratio",
            DiagnosticMetric::AllocationCount => "allocation_count",
            DiagnosticMetric::Exclusivity => "exclusivity",
        }
    }

    /// Look a metric up by its attribute name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// The twelve diagnostics of a single topic.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopicDiagnostics {
    pub tokens: f64,
    pub document_entropy: f64,
    pub word_length: f64,
    pub coherence: f64,
    pub uniform_dist: f64,
    pub corpus_dist: f64,
    pub eff_num_words: f64,
    pub token_doc_diff: f64,
    pub rank_1_docs: f64,
    pub allocation_ratio: f64,
    pub allocation_count: f64,
    pub exclusivity: f64,
}

impl TopicDiagnostics {
    /// Value of `metric`.
    pub fn get(&self, metric: DiagnosticMetric) -> f64 {
        match metric {
            DiagnosticMetric::Tokens => self.tokens,
            DiagnosticMetric::DocumentEntropy => self.document_entropy,
            DiagnosticMetric::WordLength => self.word_length,
            DiagnosticMetric::Coherence => self.coherence,
            DiagnosticMetric::UniformDist => self.uniform_dist,
            DiagnosticMetric::CorpusDist => self.corpus_dist,
            DiagnosticMetric::EffNumWords => self.eff_num_words,
            DiagnosticMetric::TokenDocDiff => self.token_doc_diff,
            DiagnosticMetric::Rank1Docs => self.rank_1_docs,
            DiagnosticMetric::AllocationRatio => self.allocation_ratio,
            DiagnosticMetric::AllocationCount => self.allocation_count,
            DiagnosticMetric::Exclusivity => self.exclusivity,
        }
    }

    /// Set `metric` to `value`.
    pub fn set(&mut self, metric: DiagnosticMetric, value: f64) {
        let slot = match metric {
            DiagnosticMetric::Tokens => &mut self.tokens,
            DiagnosticMetric::DocumentEntropy => &mut self.document_entropy,
            DiagnosticMetric::WordLength => &mut self.word_length,
            DiagnosticMetric::Coherence => &mut self.coherence,
            DiagnosticMetric::UniformDist => &mut self.uniform_dist,
            DiagnosticMetric::CorpusDist => &mut self.corpus_dist,
            DiagnosticMetric::EffNumWords => &mut self.eff_num_words,
            DiagnosticMetric::TokenDocDiff => &mut self.token_doc_diff,
            DiagnosticMetric::Rank1Docs => &mut self.rank_1_docs,
            DiagnosticMetric::AllocationRatio => &mut self.allocation_ratio,
            DiagnosticMetric::AllocationCount => &mut self.allocation_count,
            DiagnosticMetric::Exclusivity => &mut self.exclusivity,
        };
        *slot = value;
    }

    /// Build from `(attribute name, value)` pairs; unknown names are ignored
    /// and missing ones stay 0.
    pub fn from_attributes<'s, I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'s str, f64)>,
    {
        let mut out = Self::default();
        for (name, value) in attributes {
            if let Some(metric) = DiagnosticMetric::from_name(name) {
                out.set(metric, value);
            }
        }
        out
    }
}

/// Mean of each diagnostic over all topics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosticMeans(TopicDiagnostics);

impl DiagnosticMeans {
    /// Average every metric over `topics`.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyInput`] if `topics` is empty.
    pub fn from_topics(topics: &[TopicDiagnostics]) -> Result<Self> {
        if topics.is_empty() {
            return Err(Error::EmptyInput);
        }
        let n = topics.len() as f64;
        let mut means = TopicDiagnostics::default();
        for metric in DiagnosticMetric::ALL {
            let sum: f64 = topics.iter().map(|t| t.get(metric)).sum();
            means.set(metric, sum / n);
        }
        Ok(Self(means))
    }

    /// Mean of `metric`.
    pub fn get(&self, metric: DiagnosticMetric) -> f64 {
        self.0.get(metric)
    }

    /// The means in [`DiagnosticMetric::ALL`] order.
    pub fn as_array(&self) -> [f64; 12] {
        DiagnosticMetric::ALL.map(|m| self.0.get(m))
    }

    /// The means as a [`TopicDiagnostics`] record.
    pub fn as_diagnostics(&self) -> &TopicDiagnostics {
        &self.0
    }
}

/// Sum of per-topic token counts, i.e. the corpus word total.
///
/// Counts are stored as reals; the sum is rounded to the nearest integer and
/// negative sums map to 0.
pub fn total_tokens(topics: &[TopicDiagnostics]) -> u64 {
    let sum: f64 = topics.iter().map(|t| t.tokens).sum();
    if sum.is_finite() && sum > 0.0 {
        sum.round() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn topic(base: f64) -> TopicDiagnostics {
        let mut t = TopicDiagnostics::default();
        for (k, m) in DiagnosticMetric::ALL.into_iter().enumerate() {
            t.set(m, base + k as f64);
        }
        t
    }

    #[test]
    fn test_means_per_metric() {
        let means = DiagnosticMeans::from_topics(&[topic(0.0), topic(10.0)]).unwrap();
        let arr = means.as_array();
        for (k, v) in arr.iter().enumerate() {
            assert_relative_eq!(*v, 5.0 + k as f64);
        }
        assert_relative_eq!(means.get(DiagnosticMetric::Exclusivity), 16.0);
        assert_relative_eq!(means.as_diagnostics().tokens, 5.0);
    }

    #[test]
    fn test_empty_topics_rejected() {
        assert_eq!(DiagnosticMeans::from_topics(&[]).unwrap_err(), Error::EmptyInput);
    }

    #[test]
    fn test_names_round_trip() {
        for m in DiagnosticMetric::ALL {
            assert_eq!(DiagnosticMetric::from_name(m.name()), Some(m));
        }
        assert_eq!(DiagnosticMetric::WordLength.name(), "word-length");
        assert_eq!(DiagnosticMetric::TokenDocDiff.name(), "token-doc-diff");
        assert_eq!(DiagnosticMetric::from_name("perplexity"), None);
    }

    #[test]
    fn test_from_attributes() {
        let t = TopicDiagnostics::from_attributes([
            ("tokens", 120.0),
            ("word-length", 6.5),
            ("unknown", 1.0),
        ]);
        assert_relative_eq!(t.tokens, 120.0);
        assert_relative_eq!(t.word_length, 6.5);
        assert_relative_eq!(t.coherence, 0.0);
    }

    #[test]
    fn test_total_tokens() {
        let mut a = TopicDiagnostics::default();
        a.tokens = 40.0;
        let mut b = TopicDiagnostics::default();
        b.tokens = 60.0;
        assert_eq!(total_tokens(&[a, b]), 100);
        assert_eq!(total_tokens(&[]), 0);
    }
}
