use std::path::{Path, PathBuf};

use cgc_core::to_canonical_json_bytes;
use cgc_graph::DirectedGraph;
use cgc_prop::{build, Propagator, PropagatorSpec};
use cgc_spec::{
    plot_rows, render_text, DivergenceOpts, ExponentFit, FitWindow, RunArtifacts, Stage,
    StageError,
};
use clap::Args;
use thiserror::Error;

use crate::config::RunConfig;

/// Failure of a console run, always naming the stage that failed.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error("config stage failed: {0}")]
    Config(String),
    #[error("io stage failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("io stage failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Options shared by every analysis subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Number of evolution steps [default: 200].
    #[arg(long)]
    pub n_steps: Option<usize>,
    /// Norm of the initial separation [default: 1e-6].
    #[arg(long)]
    pub epsilon: Option<f64>,
    /// First index of the fit window [default: 10].
    #[arg(long)]
    pub fit_start: Option<usize>,
    /// One past the last index of the fit window [default: 150].
    #[arg(long)]
    pub fit_end: Option<usize>,
    /// Master seed for the perturbation [default: 42].
    #[arg(long)]
    pub seed: Option<u64>,
    /// YAML file supplying any of the run parameters.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Emit the canonical JSON report instead of text.
    #[arg(long)]
    pub json: bool,
    /// Write `n, D_n, ln D_n, fitted` rows to this CSV file.
    #[arg(long, value_name = "CSV")]
    pub plot_data: Option<PathBuf>,
    /// Comma separated powers reported for `‖T^n‖₂` [default: 1,10,50].
    #[arg(long, value_delimiter = ',')]
    pub powers: Vec<u32>,
}

/// Flag value, then file value, then the built-in default.
pub fn pick<T>(flag: Option<T>, file: Option<T>, default: T) -> T {
    flag.or(file).unwrap_or(default)
}

impl RunArgs {
    pub fn load_config(&self) -> Result<RunConfig, CliError> {
        match &self.config {
            Some(path) => RunConfig::load(path),
            None => Ok(RunConfig::default()),
        }
    }

    pub fn divergence_opts(&self, config: &RunConfig) -> DivergenceOpts {
        let defaults = DivergenceOpts::default();
        let powers = if self.powers.is_empty() {
            config.powers.clone().unwrap_or(defaults.powers)
        } else {
            self.powers.clone()
        };
        DivergenceOpts {
            n_steps: pick(self.n_steps, config.n_steps, defaults.n_steps),
            epsilon: pick(self.epsilon, config.epsilon, defaults.epsilon),
            seed: pick(self.seed, config.seed, defaults.seed),
            window: FitWindow::new(
                pick(self.fit_start, config.fit_start, defaults.window.start),
                pick(self.fit_end, config.fit_end, defaults.window.end),
            ),
            powers,
            psi0: None,
            projection: None,
            tolerance: defaults.tolerance,
        }
    }
}

/// Propagator and optional loop graph for one run.
pub struct Target {
    pub label: &'static str,
    pub propagator: Propagator,
    pub graph: Option<DirectedGraph>,
}

pub fn build_propagator(spec: &PropagatorSpec) -> Result<Propagator, CliError> {
    build(spec).map_err(|err| Stage::Build.fail(err).into())
}

/// Writes plot data if requested, then prints the report.
pub fn emit(args: &RunArgs, artifacts: &RunArtifacts) -> Result<(), CliError> {
    if let Some(path) = &args.plot_data {
        write_plot_data(path, &artifacts.distances, &artifacts.fit)?;
    }
    if args.json {
        let bytes =
            to_canonical_json_bytes(&artifacts.report).map_err(|err| Stage::Report.fail(err))?;
        println!("{}", String::from_utf8_lossy(&bytes));
    } else {
        print!("{}", render_text(&artifacts.report));
    }
    Ok(())
}

fn write_plot_data(path: &Path, distances: &[f64], fit: &ExponentFit) -> Result<(), CliError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in plot_rows(distances, fit) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), rows = distances.len(), "wrote plot data");
    Ok(())
}
