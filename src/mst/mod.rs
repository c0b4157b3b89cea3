//! Minimum spanning trees over document networks.
//!
//! The tree keeps, for every document, its strongest connection to the rest
//! of the corpus without introducing cycles. Disconnected corpora yield a
//! spanning forest with one tree per component.

pub mod disjoint_set;
pub mod kruskal;

pub use disjoint_set::DisjointSet;
pub use kruskal::{minimum_spanning_forest, MstBuilder, SpanningForest};
