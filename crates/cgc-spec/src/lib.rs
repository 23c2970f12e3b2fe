#![deny(missing_docs)]

//! Divergence and spectral analysis for coherence propagators.
//!
//! The estimator takes two trajectories from nearby initial states, forms the
//! Euclidean distance sequence `D_n`, and fits `ln D_n` against `n` over a
//! window. The slope is the coherence-gradient Lyapunov exponent `λ_CG`.
//! Spectral diagnostics (spectral radius, `‖T^n‖₂`) are computed separately
//! so the fitted rate can be compared against theory.

pub mod coarse;
pub mod distance;
pub mod fit;
pub mod pipeline;
pub mod report;
pub mod spectral;

pub use coarse::{
    coarse_distance_sequence, compare_estimates, project_trajectory, CoarseComparison,
    MatchTolerance, Projection,
};
pub use distance::distance_sequence;
pub use fit::{estimate_exponent, fit_exponent, ExponentEstimate, ExponentFit, FitWindow};
pub use pipeline::{analyze_run, DivergenceOpts, RunArtifacts, Stage, StageError};
pub use report::{
    plot_rows, render_text, ExponentSummary, GraphSummary, PlotRow, RunProvenance, RunReport,
};
pub use spectral::{
    matrix_power, norm_growth, operator_norm, power_norm, spectral_radius, spectral_summary,
    theoretical_exponent, PowerNorm, SpectralSummary,
};
