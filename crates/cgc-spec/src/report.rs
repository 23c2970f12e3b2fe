//! Hashed run reports, console rendering and plot rows.

use std::fmt::Write as _;

use cgc_core::errors::CgcError;
use cgc_core::stable_hash_string;
use cgc_graph::DirectedGraph;
use cgc_prop::PropagatorSpec;
use serde::{Deserialize, Serialize};

use crate::coarse::CoarseComparison;
use crate::fit::{ExponentFit, FitWindow};
use crate::pipeline::DivergenceOpts;
use crate::spectral::SpectralSummary;

fn version_string() -> String {
    option_env!("GIT_COMMIT_HASH")
        .map(|value| value.to_string())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string())
}

/// Node and edge counts of the loop graph behind a propagator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    /// Number of nodes.
    pub nodes: usize,
    /// Number of directed edges.
    pub edges: usize,
    /// Sum of edge increments around the graph.
    pub circulation: f64,
}

impl GraphSummary {
    /// Summarises a graph.
    pub fn from_graph(graph: &DirectedGraph) -> Self {
        Self {
            nodes: graph.num_nodes(),
            edges: graph.num_edges(),
            circulation: graph.circulation(),
        }
    }
}

/// Fine-grained exponent and its theoretical reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExponentSummary {
    /// Fitted slope `λ_CG`.
    pub estimate: f64,
    /// Fitted intercept.
    pub intercept: f64,
    /// Residual sum of squares of the fit.
    pub residual_sum_squares: f64,
    /// Window used.
    pub window: FitWindow,
    /// `ln(1 + eta)` when the variant defines it.
    pub theoretical: Option<f64>,
    /// `|estimate - theoretical| / |theoretical|`.
    pub relative_error: Option<f64>,
}

impl ExponentSummary {
    pub(crate) fn new(fit: &ExponentFit, theoretical: Option<f64>) -> Self {
        let relative_error = theoretical
            .filter(|value| *value != 0.0)
            .map(|value| ((fit.slope - value) / value).abs());
        Self {
            estimate: fit.slope,
            intercept: fit.intercept,
            residual_sum_squares: fit.residual_sum_squares,
            window: fit.window,
            theoretical,
            relative_error,
        }
    }
}

/// Parameters and seeds needed to reproduce a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunProvenance {
    /// Package version or commit.
    pub version: String,
    /// Variant and parameters, absent for raw matrices.
    pub spec: Option<PropagatorSpec>,
    /// Evolution steps.
    pub n_steps: usize,
    /// Initial separation.
    pub epsilon: f64,
    /// Master seed.
    pub seed: u64,
    /// Derived seed of the perturbation direction.
    pub perturbation_seed: u64,
}

impl RunProvenance {
    pub(crate) fn new(
        spec: Option<PropagatorSpec>,
        opts: &DivergenceOpts,
        perturbation_seed: u64,
    ) -> Self {
        Self {
            version: version_string(),
            spec,
            n_steps: opts.n_steps,
            epsilon: opts.epsilon,
            seed: opts.seed,
            perturbation_seed,
        }
    }
}

/// Summary of one divergence run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Run label (`three-node`, `pentagon`, ...).
    pub label: String,
    /// State dimension.
    pub dim: usize,
    /// Loop graph counts when the propagator comes from a graph.
    pub graph: Option<GraphSummary>,
    /// Spectral diagnostics.
    pub spectral: SpectralSummary,
    /// Fine-grained exponent.
    pub exponent: ExponentSummary,
    /// Coarse-grained comparison when requested.
    pub coarse: Option<CoarseComparison>,
    /// Reproduction metadata.
    pub provenance: RunProvenance,
    /// SHA-256 over the canonical JSON of every other field.
    pub report_hash: String,
}

impl RunReport {
    /// Fills in `report_hash`.
    pub fn seal(mut self) -> Result<Self, CgcError> {
        self.report_hash = String::new();
        self.report_hash = stable_hash_string(&self)?;
        Ok(self)
    }

    /// Recomputes the hash and compares it with the stored one.
    pub fn verify_hash(&self) -> Result<bool, CgcError> {
        let resealed = self.clone().seal()?;
        Ok(resealed.report_hash == self.report_hash)
    }
}

/// Renders the console report.
pub fn render_text(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} diagnostics:", report.label);
    if let Some(graph) = &report.graph {
        let _ = writeln!(out, "  number of nodes = {}", graph.nodes);
        let _ = writeln!(out, "  number of edges = {}", graph.edges);
    }
    let _ = writeln!(
        out,
        "  spectral radius rho(T_infty) = {}",
        report.spectral.spectral_radius
    );
    let _ = writeln!(
        out,
        "  operator norm ||T_infty||_op = {}",
        report.spectral.operator_norm
    );
    for entry in &report.spectral.power_norms {
        let _ = writeln!(out, "  ||T_infty^{}||_op = {}", entry.power, entry.norm);
    }
    match report.spectral.log_spectral_radius {
        Some(log_radius) => {
            let _ = writeln!(out, "  log spectral radius = {log_radius}");
        }
        None => {
            let _ = writeln!(out, "  log spectral radius = undefined (rho = 0)");
        }
    }
    if let Some(theoretical) = report.exponent.theoretical {
        let _ = writeln!(out, "  theoretical log(1 + eta) = {theoretical}");
    }
    let _ = writeln!(
        out,
        "  estimated lambda_CG ~ {} (window {}..{})",
        report.exponent.estimate, report.exponent.window.start, report.exponent.window.end
    );
    if let Some(coarse) = &report.coarse {
        let _ = writeln!(
            out,
            "  coarse-grained lambda ({}) ~ {}",
            coarse.projection, coarse.coarse
        );
        let verdict = if coarse.matches { "yes" } else { "no" };
        let _ = writeln!(
            out,
            "  same order of magnitude (within {} decade(s)): {verdict}",
            coarse.tolerance.max_decades
        );
    }
    out
}

/// One row of the log-distance plot data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotRow {
    /// Step index.
    pub n: usize,
    /// `D_n`.
    pub distance: f64,
    /// `ln D_n` when `D_n > 0`.
    pub log_distance: Option<f64>,
    /// Fitted line value inside the fit window.
    pub fitted: Option<f64>,
}

/// Builds plot rows for `ln D_n` and the fitted line.
pub fn plot_rows(distances: &[f64], fit: &ExponentFit) -> Vec<PlotRow> {
    distances
        .iter()
        .enumerate()
        .map(|(n, &distance)| PlotRow {
            n,
            distance,
            log_distance: (distance > 0.0 && distance.is_finite()).then(|| distance.ln()),
            fitted: (n >= fit.window.start && n < fit.window.end).then(|| fit.predict(n)),
        })
        .collect()
}
