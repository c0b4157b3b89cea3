//! Union-find over node ids `0..n`.
//!
//! Union by rank keeps trees shallow and `find` compresses every path it
//! walks, giving near-constant amortized cost per operation. The structure
//! is single-owner: every operation takes `&mut self`, so sharing it across
//! threads requires external synchronization.

use crate::error::{Error, Result};

/// A partition of `0..n` into disjoint components.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
    n_components: usize,
}

impl DisjointSet {
    /// Every node starts as its own singleton component.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            n_components: n,
        }
    }

    fn check(&self, node: usize) -> Result<()> {
        if node >= self.parent.len() {
            return Err(Error::NodeOutOfRange {
                node,
                n_nodes: self.parent.len(),
            });
        }
        Ok(())
    }

    /// Representative of the component containing `node`.
    ///
    /// # Errors
    ///
    /// [`Error::NodeOutOfRange`] if `node >= len()`.
    pub fn find(&mut self, node: usize) -> Result<usize> {
        self.check(node)?;

        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        // Second pass: point everything on the path straight at the root.
        let mut node = node;
        while self.parent[node] != node {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }

        Ok(root)
    }

    /// Merge the components of `a` and `b`.
    ///
    /// Returns `false` (and changes nothing) if they were already joined.
    pub fn unite(&mut self, a: usize, b: usize) -> Result<bool> {
        let mut ra = self.find(a)?;
        let mut rb = self.find(b)?;
        if ra == rb {
            return Ok(false);
        }

        if self.rank[ra] < self.rank[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        if self.rank[ra] == self.rank[rb] {
            self.rank[ra] = self.rank[ra].saturating_add(1);
        }
        self.n_components -= 1;
        Ok(true)
    }

    /// True if `a` and `b` are in the same component.
    pub fn connected(&mut self, a: usize, b: usize) -> Result<bool> {
        Ok(self.find(a)? == self.find(b)?)
    }

    /// Current number of components.
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// True if there are no nodes.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Dense component label (0, 1, …) for every node, in order of first appearance.
    pub fn labels(&mut self) -> Vec<usize> {
        let n = self.parent.len();
        let mut label_of_root = vec![usize::MAX; n];
        let mut next = 0;
        let mut labels = Vec::with_capacity(n);
        for node in 0..n {
            let mut root = node;
            while self.parent[root] != root {
                root = self.parent[root];
            }
            self.parent[node] = root;
            if label_of_root[root] == usize::MAX {
                label_of_root[root] = next;
                next += 1;
            }
            labels.push(label_of_root[root]);
        }
        labels
    }
}
