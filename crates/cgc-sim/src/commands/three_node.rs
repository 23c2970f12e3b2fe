use cgc_prop::PropagatorSpec;
use cgc_spec::analyze_run;
use clap::Args;

use super::common::{build_propagator, emit, pick, CliError, RunArgs, Target};
use crate::config::RunConfig;

pub const DEFAULT_ETA: f64 = 0.05;
pub const DEFAULT_ALPHA: f64 = 0.01;
pub const DEFAULT_BETA: f64 = 0.02;

#[derive(Args, Debug)]
pub struct ThreeNodeArgs {
    /// Self-amplification rate [default: 0.05].
    #[arg(long, allow_hyphen_values = true)]
    pub eta: Option<f64>,
    /// Forward coupling [default: 0.01].
    #[arg(long, allow_hyphen_values = true)]
    pub alpha: Option<f64>,
    /// Backward coupling [default: 0.02].
    #[arg(long, allow_hyphen_values = true)]
    pub beta: Option<f64>,
    #[command(flatten)]
    pub run: RunArgs,
}

pub fn target(
    eta: Option<f64>,
    alpha: Option<f64>,
    beta: Option<f64>,
    config: &RunConfig,
) -> Result<Target, CliError> {
    let spec = PropagatorSpec::ThreeNode {
        eta: pick(eta, config.eta, DEFAULT_ETA),
        alpha: pick(alpha, config.alpha, DEFAULT_ALPHA),
        beta: pick(beta, config.beta, DEFAULT_BETA),
    };
    Ok(Target {
        label: "three-node",
        propagator: build_propagator(&spec)?,
        graph: None,
    })
}

pub fn run(args: &ThreeNodeArgs) -> Result<(), CliError> {
    let config = args.run.load_config()?;
    let target = target(args.eta, args.alpha, args.beta, &config)?;
    let opts = args.run.divergence_opts(&config);
    let artifacts = analyze_run(target.label, &target.propagator, None, &opts)?;
    emit(&args.run, &artifacts)
}
