//! Topic-model evaluation: perplexity and per-topic diagnostics.

pub mod diagnostics;
pub mod evaluator;

pub use diagnostics::{total_tokens, DiagnosticMeans, DiagnosticMetric, TopicDiagnostics};
pub use evaluator::{
    corpus_perplexity, document_log_probability, total_word_count, PerplexityEvaluator,
    PerplexityReport,
};
