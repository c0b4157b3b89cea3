//! Undirected weighted edges and ordered edge collections.

use crate::error::{Error, Result};
use std::cmp::Ordering;

/// An undirected edge between two distinct documents.
///
/// `weight` follows the distance convention: 0 = identical, 1 = orthogonal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    source: usize,
    target: usize,
    weight: f64,
    id: usize,
}

impl Edge {
    /// Create an edge.
    ///
    /// # Errors
    ///
    /// [`Error::SelfLoop`] if `source == target`.
    pub fn new(source: usize, target: usize, weight: f64, id: usize) -> Result<Self> {
        if source == target {
            return Err(Error::SelfLoop { node: source });
        }
        Ok(Self {
            source,
            target,
            weight,
            id,
        })
    }

    /// Edge between `i < j`, which cannot be a self-loop.
    pub(crate) fn from_ordered_pair(i: usize, j: usize, weight: f64, id: usize) -> Self {
        debug_assert!(i < j);
        Self {
            source: i,
            target: j,
            weight,
            id,
        }
    }

    /// First endpoint.
    pub fn source(&self) -> usize {
        self.source
    }

    /// Second endpoint.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Edge weight (distance).
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Dense id, unique within the owning [`EdgeSet`].
    pub fn id(&self) -> usize {
        self.id
    }

    /// Endpoints with the smaller id first.
    pub fn endpoints(&self) -> (usize, usize) {
        if self.source < self.target {
            (self.source, self.target)
        } else {
            (self.target, self.source)
        }
    }

    /// Total order used for Kruskal: weight, then id.
    pub fn weight_order(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then(self.id.cmp(&other.id))
    }
}

/// An ordered sequence of edges.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeSet {
    edges: Vec<Edge>,
}

impl EdgeSet {
    /// Create an empty edge set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an edge set with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            edges: Vec::with_capacity(capacity),
        }
    }

    /// Wrap edges as given, without reordering.
    pub fn from_edges(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    /// Append an edge.
    pub fn push(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// True if there are no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Iterate edges in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Edge> {
        self.edges.iter()
    }

    /// Borrow the edges.
    pub fn as_slice(&self) -> &[Edge] {
        &self.edges
    }

    /// Sort by ascending weight, ties by id.
    pub fn sort_by_weight(&mut self) {
        self.edges.sort_by(Edge::weight_order);
    }

    /// Index of the first edge lighter than its predecessor, if any.
    pub fn first_unsorted(&self) -> Option<usize> {
        self.edges
            .windows(2)
            .position(|w| w[0].weight.total_cmp(&w[1].weight) == Ordering::Greater)
            .map(|i| i + 1)
    }

    /// True if weights never decrease along the sequence.
    pub fn is_sorted_by_weight(&self) -> bool {
        self.first_unsorted().is_none()
    }

    /// Sum of all edge weights.
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Unwrap into the underlying vector.
    pub fn into_vec(self) -> Vec<Edge> {
        self.edges
    }
}

impl<'a> IntoIterator for &'a EdgeSet {
    type Item = &'a Edge;
    type IntoIter = std::slice::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

impl FromIterator<Edge> for EdgeSet {
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        Self {
            edges: iter.into_iter().collect(),
        }
    }
}
