//! Community structure across a range of resolutions.
//!
//! A single resolution says little about a backbone: the interesting signal
//! is where the community count stays put as γ grows. [`ResolutionSweep`]
//! runs Leiden once per grid point (in parallel) and collapses the results
//! into maximal runs of constant count.
//!
//! ```text
//! γ:      1e-4  2e-4  3e-4  4e-4  5e-4
//! count:     3     3     5     5     5
//!          [1e-4, 2e-4] → 3   [3e-4, 5e-4] → 5
//! ```

use super::leiden::{Leiden, WeightedGraph};
use crate::error::{Error, Result};
use crate::parallel::WorkerPool;
use log::{debug, info};
use petgraph::graph::UnGraph;

/// Leiden result at one resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionPoint {
    /// Resolution γ.
    pub resolution: f64,
    /// Number of communities found.
    pub n_communities: usize,
    /// Modularity of the partition at this γ.
    pub modularity: f64,
    /// Dense community label per node.
    pub labels: Vec<usize>,
}

/// A maximal run of grid resolutions with the same community count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionInterval {
    /// First resolution of the run.
    pub start: f64,
    /// Last resolution of the run (inclusive).
    pub end: f64,
    /// Community count over the run.
    pub n_communities: usize,
}

/// All grid points and their intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub points: Vec<ResolutionPoint>,
    pub intervals: Vec<ResolutionInterval>,
}

impl SweepResult {
    /// The widest interval (by number of grid points), earliest on ties.
    pub fn most_stable(&self) -> Option<&ResolutionInterval> {
        let width = |iv: &ResolutionInterval| {
            self.points
                .iter()
                .filter(|p| p.resolution >= iv.start && p.resolution <= iv.end)
                .count()
        };
        let mut best: Option<(&ResolutionInterval, usize)> = None;
        for iv in &self.intervals {
            let w = width(iv);
            if best.map_or(true, |(_, bw)| w > bw) {
                best = Some((iv, w));
            }
        }
        best.map(|(iv, _)| iv)
    }
}

/// Leiden over an ascending grid of resolutions.
#[derive(Debug, Clone)]
pub struct ResolutionSweep {
    resolutions: Vec<f64>,
    max_iter: usize,
}

impl ResolutionSweep {
    /// Default grid: `1e-4, 2e-4, …, 99e-4`.
    pub fn new() -> Self {
        Self {
            resolutions: (1..100).map(|i| i as f64 / 10_000.0).collect(),
            max_iter: 100,
        }
    }

    /// Use an explicit grid.
    pub fn with_resolutions(mut self, resolutions: Vec<f64>) -> Self {
        self.resolutions = resolutions;
        self
    }

    /// `count` evenly spaced resolutions starting at `start`.
    pub fn with_grid(mut self, start: f64, step: f64, count: usize) -> Self {
        self.resolutions = (0..count).map(|i| start + step * i as f64).collect();
        self
    }

    /// Maximum Leiden levels per run.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// The resolution grid.
    pub fn resolutions(&self) -> &[f64] {
        &self.resolutions
    }

    fn validate(&self) -> Result<()> {
        if self.resolutions.is_empty() {
            return Err(Error::InvalidParameter {
                name: "resolutions",
                message: "grid must not be empty",
            });
        }
        if self.resolutions.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(Error::InvalidParameter {
                name: "resolutions",
                message: "resolutions must be finite and non-negative",
            });
        }
        if self.resolutions.windows(2).any(|w| w[1] <= w[0]) {
            return Err(Error::InvalidParameter {
                name: "resolutions",
                message: "grid must be strictly ascending",
            });
        }
        Ok(())
    }

    /// Run Leiden at every grid resolution and derive constant-count intervals.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParameter`] for an empty, unsorted or negative grid.
    /// - [`Error::EmptyInput`] if `graph` has no nodes.
    pub fn run<N>(&self, pool: &WorkerPool, graph: &UnGraph<N, f64>) -> Result<SweepResult> {
        self.validate()?;
        if graph.node_count() == 0 {
            return Err(Error::EmptyInput);
        }

        info!(
            "Sweeping {} resolutions over {} nodes and {} edges",
            self.resolutions.len(),
            graph.node_count(),
            graph.edge_count()
        );

        let wg = WeightedGraph::from_graph(graph);
        let runs: Vec<Result<Vec<usize>>> = pool.map_indexed(self.resolutions.len(), |k| {
            Leiden::new()
                .with_resolution(self.resolutions[k])
                .with_max_iter(self.max_iter)
                .detect_weighted(&wg)
        });

        let mut points = Vec::with_capacity(runs.len());
        for (&resolution, labels) in self.resolutions.iter().zip(runs) {
            let labels = labels?;
            let n_communities = labels.iter().copied().max().map_or(0, |c| c + 1);
            let modularity = wg.modularity(&labels, resolution);
            debug!(
                "gamma={} communities={} modularity={:.6}",
                resolution, n_communities, modularity
            );
            points.push(ResolutionPoint {
                resolution,
                n_communities,
                modularity,
                labels,
            });
        }

        let intervals = constant_intervals(&points);
        for iv in &intervals {
            info!(
                "Resolution interval: [{}, {}], Communities: {}",
                iv.start, iv.end, iv.n_communities
            );
        }

        Ok(SweepResult { points, intervals })
    }
}

impl Default for ResolutionSweep {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse consecutive points with equal community counts.
fn constant_intervals(points: &[ResolutionPoint]) -> Vec<ResolutionInterval> {
    let mut intervals: Vec<ResolutionInterval> = Vec::new();
    for p in points {
        if let Some(last) = intervals.last_mut() {
            if last.n_communities == p.n_communities {
                last.end = p.resolution;
                continue;
            }
        }
        intervals.push(ResolutionInterval {
            start: p.resolution,
            end: p.resolution,
            n_communities: p.n_communities,
        });
    }
    intervals
}
