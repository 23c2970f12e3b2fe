//! End-to-end divergence run with stage-tagged failures.

use std::fmt;

use cgc_core::errors::CgcError;
use cgc_core::rng::derive_substream_seed;
use cgc_core::StateVector;
use cgc_graph::DirectedGraph;
use cgc_prop::{evolve_pair, perturb, Propagator, PropagatorSpec};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coarse::{coarse_distance_sequence, compare_estimates, MatchTolerance, Projection};
use crate::distance::distance_sequence;
use crate::fit::{fit_exponent, ExponentFit, FitWindow};
use crate::report::{ExponentSummary, GraphSummary, RunProvenance, RunReport};
use crate::spectral::{spectral_summary, theoretical_exponent};

const PERTURBATION_SUBSTREAM: u64 = 0;

/// Pipeline stage reported alongside a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Propagator construction.
    Build,
    /// Initial-condition perturbation.
    Perturb,
    /// Trajectory evolution.
    Evolve,
    /// Distance sequence.
    Distance,
    /// Exponent regression.
    Fit,
    /// Spectral diagnostics.
    Spectral,
    /// Coarse-grained comparison.
    Coarse,
    /// Report assembly and hashing.
    Report,
}

impl Stage {
    /// Stable lower-case name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Build => "build",
            Stage::Perturb => "perturb",
            Stage::Evolve => "evolve",
            Stage::Distance => "distance",
            Stage::Fit => "fit",
            Stage::Spectral => "spectral",
            Stage::Coarse => "coarse",
            Stage::Report => "report",
        }
    }

    /// Tags an error with this stage.
    pub fn fail(self, source: CgcError) -> StageError {
        StageError {
            stage: self,
            source,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error raised by [`analyze_run`] naming the stage that failed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{stage} stage failed: {source}")]
pub struct StageError {
    /// Stage that produced the error.
    pub stage: Stage,
    /// Underlying error.
    #[source]
    pub source: CgcError,
}

fn default_powers() -> Vec<u32> {
    vec![1, 10, 50]
}

/// Run parameters shared by every divergence report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivergenceOpts {
    /// Number of evolution steps.
    pub n_steps: usize,
    /// Norm of the initial separation.
    pub epsilon: f64,
    /// Master seed for the perturbation direction.
    pub seed: u64,
    /// Regression window.
    pub window: FitWindow,
    /// Powers at which `‖T^n‖₂` is reported.
    #[serde(default = "default_powers")]
    pub powers: Vec<u32>,
    /// Initial state; all ones when absent.
    #[serde(default)]
    pub psi0: Option<Vec<f64>>,
    /// Projection for the coarse-grained estimate, if requested.
    #[serde(default)]
    pub projection: Option<Projection>,
    /// Agreement criterion for the coarse-grained estimate.
    #[serde(default)]
    pub tolerance: MatchTolerance,
}

impl Default for DivergenceOpts {
    fn default() -> Self {
        Self {
            n_steps: 200,
            epsilon: 1e-6,
            seed: 42,
            window: FitWindow::default(),
            powers: default_powers(),
            psi0: None,
            projection: None,
            tolerance: MatchTolerance::default(),
        }
    }
}

impl DivergenceOpts {
    /// Seed actually used to draw the perturbation direction.
    pub fn perturbation_seed(&self) -> u64 {
        derive_substream_seed(self.seed, PERTURBATION_SUBSTREAM)
    }
}

/// Everything produced by one divergence run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunArtifacts {
    /// Sealed summary report.
    pub report: RunReport,
    /// Fine-grained distance sequence `D_n`.
    pub distances: Vec<f64>,
    /// Fine-grained fit.
    pub fit: ExponentFit,
    /// Projected distance sequence when a projection was requested.
    pub coarse_distances: Option<Vec<f64>>,
}

/// Runs perturbation, evolution, fitting and spectral diagnostics for one
/// propagator and assembles the report.
pub fn analyze_run(
    label: &str,
    propagator: &Propagator,
    graph: Option<&DirectedGraph>,
    opts: &DivergenceOpts,
) -> Result<RunArtifacts, StageError> {
    let dim = propagator.dim();
    let psi0 = match &opts.psi0 {
        Some(values) => StateVector::from_vec(values.clone()),
        None => StateVector::from_element(dim, 1.0),
    };
    let perturbation_seed = opts.perturbation_seed();
    let psi0_prime =
        perturb(&psi0, opts.epsilon, perturbation_seed).map_err(|err| Stage::Perturb.fail(err))?;

    let (first, second) = evolve_pair(propagator, &psi0, &psi0_prime, opts.n_steps)
        .map_err(|err| Stage::Evolve.fail(err))?;
    let distances = distance_sequence(&first, &second).map_err(|err| Stage::Distance.fail(err))?;
    let fit = fit_exponent(&distances, opts.window).map_err(|err| Stage::Fit.fail(err))?;
    tracing::debug!(label, slope = fit.slope, "fitted fine-grained exponent");

    let spectral = spectral_summary(propagator.matrix(), &opts.powers)
        .map_err(|err| Stage::Spectral.fail(err))?;
    let theoretical = match propagator.spec() {
        Some(PropagatorSpec::ThreeNode { eta, .. }) => {
            Some(theoretical_exponent(*eta).map_err(|err| Stage::Spectral.fail(err))?)
        }
        _ => None,
    };

    let (coarse, coarse_distances) = match opts.projection {
        Some(projection) => {
            let coarse_distances =
                coarse_distance_sequence(&first, &second, |psi| projection.apply(psi))
                    .map_err(|err| Stage::Coarse.fail(err))?;
            let coarse_fit =
                fit_exponent(&coarse_distances, opts.window).map_err(|err| Stage::Coarse.fail(err))?;
            let comparison =
                compare_estimates(projection, fit.slope, coarse_fit.slope, opts.tolerance)
                    .map_err(|err| Stage::Coarse.fail(err))?;
            tracing::debug!(
                label,
                %projection,
                coarse = coarse_fit.slope,
                matches = comparison.matches,
                "compared coarse-grained exponent"
            );
            (Some(comparison), Some(coarse_distances))
        }
        None => (None, None),
    };

    let report = RunReport {
        label: label.to_string(),
        dim,
        graph: graph.map(GraphSummary::from_graph),
        spectral,
        exponent: ExponentSummary::new(&fit, theoretical),
        coarse,
        provenance: RunProvenance::new(
            propagator.spec().copied(),
            opts,
            perturbation_seed,
        ),
        report_hash: String::new(),
    }
    .seal()
    .map_err(|err| Stage::Report.fail(err))?;

    tracing::info!(
        label,
        spectral_radius = report.spectral.spectral_radius,
        exponent = report.exponent.estimate,
        "divergence run complete"
    );

    Ok(RunArtifacts {
        report,
        distances,
        fit,
        coarse_distances,
    })
}
