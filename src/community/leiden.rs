//! Weighted Leiden community detection.
//!
//! ## Phases
//!
//! 1. **Local moving**: greedily move each node to the neighboring community
//!    with the best modularity gain, revisiting neighbors of moved nodes.
//! 2. **Refinement**: split every community that is not internally
//!    connected, so no community label ever spans two disconnected pieces.
//! 3. **Aggregation**: contract each refined community into a single node
//!    and repeat on the smaller graph.
//!
//! Levels repeat until local moving stops improving.
//!
//! ```text
//! Local moving can produce:   Refinement guarantees:
//!     A---B                       A---B
//!         |                           |
//!     C   D                       C   D
//! [A,B,C,D] one community       [A,B,D] and [C]
//! ```
//!
//! Edge weights are affinities: larger means more strongly tied. Every
//! iteration visits nodes and candidate communities in ascending index
//! order, so a given graph and resolution always give the same partition.
//!
//! ## References
//!
//! Traag, Waltman, van Eck (2019). "From Louvain to Leiden: guaranteeing
//! well-connected communities." Scientific Reports 9, 5233.

use super::traits::CommunityDetection;
use crate::error::{Error, Result};
use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;
use std::collections::VecDeque;

/// Leiden community detection on affinity-weighted graphs.
#[derive(Debug, Clone)]
pub struct Leiden {
    /// Resolution parameter (gamma). Higher = smaller communities.
    resolution: f64,
    /// Maximum local-moving/refinement rounds.
    max_iter: usize,
    /// Minimum modularity gain for a move.
    min_gain: f64,
}

impl Leiden {
    /// Create a detector with resolution 1.
    pub fn new() -> Self {
        Self {
            resolution: 1.0,
            max_iter: 100,
            min_gain: 1e-10,
        }
    }

    /// Set resolution parameter.
    ///
    /// Higher values produce smaller communities.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set minimum modularity gain threshold.
    pub fn with_min_gain(mut self, min_gain: f64) -> Self {
        self.min_gain = min_gain;
        self
    }

    /// Partition an already-converted graph.
    pub(crate) fn detect_weighted(&self, wg: &WeightedGraph) -> Result<Vec<usize>> {
        if wg.n == 0 {
            return Err(Error::EmptyInput);
        }
        if wg.total_weight == 0.0 {
            return Ok((0..wg.n).collect());
        }

        // membership[v] = aggregate node currently holding input node v
        let mut membership: Vec<usize> = (0..wg.n).collect();
        let mut aggregated: Option<WeightedGraph> = None;

        for _level in 0..self.max_iter {
            let current = aggregated.as_ref().unwrap_or(wg);
            let mut state = CommunityState::new_singletons(current.n, &current.degrees);
            if !self.local_moving_phase(current, &mut state) {
                break;
            }
            self.refinement_phase(current, &mut state);

            let labels = renumber_communities(&state.assignment);
            for m in membership.iter_mut() {
                *m = labels[*m];
            }
            let next = current.aggregate(&labels);
            aggregated = Some(next);
        }

        Ok(renumber_communities(&membership))
    }
}

impl Default for Leiden {
    fn default() -> Self {
        Self::new()
    }
}

/// Adjacency-list view of a weighted undirected graph.
#[derive(Debug, Clone)]
pub(crate) struct WeightedGraph {
    n: usize,
    /// node -> [(neighbor, weight)]
    adj: Vec<Vec<(usize, f64)>>,
    /// Weighted degree of each node.
    degrees: Vec<f64>,
    /// Sum of degrees (2m).
    total_weight: f64,
}

impl WeightedGraph {
    pub(crate) fn from_edges(n: usize, edges: &[(usize, usize, f64)]) -> Self {
        let mut adj = vec![Vec::new(); n];
        let mut degrees = vec![0.0; n];
        let mut total_weight = 0.0;

        for &(i, j, w) in edges {
            adj[i].push((j, w));
            adj[j].push((i, w));
            degrees[i] += w;
            degrees[j] += w;
            total_weight += 2.0 * w;
        }

        Self {
            n,
            adj,
            degrees,
            total_weight,
        }
    }

    /// Convert a petgraph graph, dropping self-loops.
    pub(crate) fn from_graph<N>(graph: &UnGraph<N, f64>) -> Self {
        let edges: Vec<(usize, usize, f64)> = graph
            .edge_references()
            .filter(|e| e.source() != e.target())
            .map(|e| (e.source().index(), e.target().index(), *e.weight()))
            .collect();
        Self::from_edges(graph.node_count(), &edges)
    }

    /// Contract every community of `labels` (dense, `0..k`) into one node.
    ///
    /// Internal weight stays in the node degree; only edges between different
    /// communities remain in the adjacency.
    fn aggregate(&self, labels: &[usize]) -> Self {
        let k = labels.iter().copied().max().map_or(0, |c| c + 1);
        let mut adj: Vec<Vec<(usize, f64)>> = vec![Vec::new(); k];
        let mut degrees = vec![0.0; k];

        for node in 0..self.n {
            let c = labels[node];
            degrees[c] += self.degrees[node];
            for &(neighbor, w) in &self.adj[node] {
                let cn = labels[neighbor];
                if cn != c {
                    adj[c].push((cn, w));
                }
            }
        }

        for list in adj.iter_mut() {
            list.sort_by_key(|&(c, _)| c);
            let mut merged: Vec<(usize, f64)> = Vec::with_capacity(list.len());
            for &(c, w) in list.iter() {
                if let Some(last) = merged.last_mut() {
                    if last.0 == c {
                        last.1 += w;
                        continue;
                    }
                }
                merged.push((c, w));
            }
            *list = merged;
        }

        Self {
            n: k,
            adj,
            degrees,
            total_weight: self.total_weight,
        }
    }

    /// Modularity gain from moving `node` into `target_comm`.
    ///
    /// delta_Q = k_i,in / m - gamma * sigma_tot * k_i / (2m^2)
    fn modularity_gain(
        &self,
        node: usize,
        target_comm: usize,
        communities: &[usize],
        comm_total_weight: &[f64],
        resolution: f64,
    ) -> f64 {
        let m = self.total_weight / 2.0;
        let ki = self.degrees[node];

        let ki_in: f64 = self.adj[node]
            .iter()
            .filter(|(neighbor, _)| communities[*neighbor] == target_comm)
            .map(|(_, w)| w)
            .sum();

        let sigma_tot = comm_total_weight[target_comm];

        ki_in / m - resolution * sigma_tot * ki / (2.0 * m * m)
    }

    /// Modularity of `assignment` at `resolution`.
    pub(crate) fn modularity(&self, assignment: &[usize], resolution: f64) -> f64 {
        if self.total_weight == 0.0 {
            return 0.0;
        }
        let two_m = self.total_weight;
        let n_comms = assignment.iter().copied().max().map_or(0, |c| c + 1);
        let mut internal = vec![0.0; n_comms];
        let mut totals = vec![0.0; n_comms];
        for node in 0..self.n {
            let c = assignment[node];
            totals[c] += self.degrees[node];
            for &(neighbor, w) in &self.adj[node] {
                if assignment[neighbor] == c {
                    internal[c] += w;
                }
            }
        }
        internal
            .iter()
            .zip(&totals)
            .map(|(&a, &k)| a / two_m - resolution * (k / two_m) * (k / two_m))
            .sum()
    }
}

/// Community assignment with cached statistics.
struct CommunityState {
    assignment: Vec<usize>,
    /// Total weighted degree in each community.
    comm_total_weight: Vec<f64>,
    /// Number of community slots (some may be empty).
    n_communities: usize,
}

impl CommunityState {
    fn new_singletons(n: usize, degrees: &[f64]) -> Self {
        Self {
            assignment: (0..n).collect(),
            comm_total_weight: degrees.to_vec(),
            n_communities: n,
        }
    }

    fn move_node(&mut self, node: usize, from: usize, to: usize, degree: f64) {
        self.assignment[node] = to;
        self.comm_total_weight[from] -= degree;
        self.comm_total_weight[to] += degree;
    }
}

impl CommunityDetection for Leiden {
    fn detect<N>(&self, graph: &UnGraph<N, f64>) -> Result<Vec<usize>> {
        self.detect_weighted(&WeightedGraph::from_graph(graph))
    }

    fn resolution(&self) -> f64 {
        self.resolution
    }
}

impl Leiden {
    /// Phase 1: greedy local moving. Returns true if any node moved.
    fn local_moving_phase(&self, wg: &WeightedGraph, state: &mut CommunityState) -> bool {
        let mut improved = false;
        let mut queue: VecDeque<usize> = (0..wg.n).collect();
        let mut in_queue = vec![true; wg.n];
        let mut candidates: Vec<usize> = Vec::new();

        while let Some(node) = queue.pop_front() {
            in_queue[node] = false;
            let current_comm = state.assignment[node];

            candidates.clear();
            candidates.push(current_comm);
            candidates.extend(wg.adj[node].iter().map(|&(nb, _)| state.assignment[nb]));
            candidates.sort_unstable();
            candidates.dedup();

            // Evaluate with the node taken out of its own community.
            state.comm_total_weight[current_comm] -= wg.degrees[node];

            let mut best_comm = current_comm;
            let mut best_gain = wg.modularity_gain(
                node,
                current_comm,
                &state.assignment,
                &state.comm_total_weight,
                self.resolution,
            );
            for &target_comm in &candidates {
                if target_comm == current_comm {
                    continue;
                }
                let gain = wg.modularity_gain(
                    node,
                    target_comm,
                    &state.assignment,
                    &state.comm_total_weight,
                    self.resolution,
                );
                if gain > best_gain + self.min_gain {
                    best_gain = gain;
                    best_comm = target_comm;
                }
            }

            state.comm_total_weight[current_comm] += wg.degrees[node];

            if best_comm != current_comm {
                state.move_node(node, current_comm, best_comm, wg.degrees[node]);
                improved = true;

                for &(neighbor, _) in &wg.adj[node] {
                    if !in_queue[neighbor] {
                        queue.push_back(neighbor);
                        in_queue[neighbor] = true;
                    }
                }
            }
        }

        improved
    }

    /// Phase 2: split every community into its connected pieces.
    fn refinement_phase(&self, wg: &WeightedGraph, state: &mut CommunityState) {
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); state.n_communities];
        for (node, &comm) in state.assignment.iter().enumerate() {
            members[comm].push(node);
        }

        let mut in_subset = vec![false; wg.n];
        let mut visited = vec![false; wg.n];
        for nodes in members.iter().filter(|m| m.len() > 1) {
            self.refine_community(wg, state, nodes, &mut in_subset, &mut visited);
        }
    }

    /// Keep the first connected piece of `nodes` in place and give every
    /// other piece a fresh community.
    fn refine_community(
        &self,
        wg: &WeightedGraph,
        state: &mut CommunityState,
        nodes: &[usize],
        in_subset: &mut [bool],
        visited: &mut [bool],
    ) {
        for &node in nodes {
            in_subset[node] = true;
        }
        let components = components_in_subset(wg, nodes, in_subset, visited);
        for &node in nodes {
            in_subset[node] = false;
            visited[node] = false;
        }

        if components.len() <= 1 {
            return;
        }

        for component in components.iter().skip(1) {
            let new_comm = state.n_communities;
            state.n_communities += 1;
            state.comm_total_weight.push(0.0);
            for &node in component {
                let old_comm = state.assignment[node];
                state.move_node(node, old_comm, new_comm, wg.degrees[node]);
            }
        }
    }
}

/// Connected components of the subgraph induced by `nodes`, in order of
/// their smallest member.
///
/// Only entries of `visited` that belong to `nodes` are set; the caller
/// clears them before the next subset.
fn components_in_subset(
    wg: &WeightedGraph,
    nodes: &[usize],
    in_subset: &[bool],
    visited: &mut [bool],
) -> Vec<Vec<usize>> {
    let mut components = Vec::new();

    for &start in nodes {
        if visited[start] {
            continue;
        }

        let mut component = Vec::new();
        let mut queue = VecDeque::new();
        visited[start] = true;
        queue.push_back(start);

        while let Some(node) = queue.pop_front() {
            component.push(node);
            for &(neighbor, _) in &wg.adj[node] {
                if in_subset[neighbor] && !visited[neighbor] {
                    visited[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }

        components.push(component);
    }

    components
}

/// Renumber communities to consecutive integers in order of first appearance.
pub(crate) fn renumber_communities(assignment: &[usize]) -> Vec<usize> {
    let mut mapping = vec![usize::MAX; assignment.iter().copied().max().map_or(0, |c| c + 1)];
    let mut next = 0;
    assignment
        .iter()
        .map(|&c| {
            if mapping[c] == usize::MAX {
                mapping[c] = next;
                next += 1;
            }
            mapping[c]
        })
        .collect()
}
