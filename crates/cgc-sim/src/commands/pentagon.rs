use cgc_graph::{directed_cycle, pentagon, PENTAGON_NODES};
use cgc_prop::PropagatorSpec;
use cgc_spec::{analyze_run, Stage};
use clap::Args;

use super::common::{build_propagator, emit, pick, CliError, RunArgs, Target};
use crate::config::RunConfig;

pub const DEFAULT_ETA: f64 = 0.08;
pub const DEFAULT_DAMPING: f64 = 0.02;

#[derive(Args, Debug)]
pub struct PentagonArgs {
    /// Neighbour transfer rate [default: 0.08].
    #[arg(long, allow_hyphen_values = true)]
    pub eta: Option<f64>,
    /// Damping rate [default: 0.02].
    #[arg(long, allow_hyphen_values = true)]
    pub damping: Option<f64>,
    /// Ring size; anything other than 5 builds a general ring.
    #[arg(long)]
    pub nodes: Option<usize>,
    #[command(flatten)]
    pub run: RunArgs,
}

pub fn target(
    eta: Option<f64>,
    damping: Option<f64>,
    nodes: Option<usize>,
    config: &RunConfig,
) -> Result<Target, CliError> {
    let eta = pick(eta, config.eta, DEFAULT_ETA);
    let damping = pick(damping, config.damping, DEFAULT_DAMPING);
    let nodes = pick(nodes, config.nodes, PENTAGON_NODES);
    if nodes == PENTAGON_NODES {
        let graph = pentagon().map_err(|err| Stage::Build.fail(err))?;
        return Ok(Target {
            label: "pentagon",
            propagator: build_propagator(&PropagatorSpec::Pentagon { eta, damping })?,
            graph: Some(graph),
        });
    }
    let propagator = build_propagator(&PropagatorSpec::Ring {
        nodes,
        eta,
        damping,
    })?;
    let graph = directed_cycle(nodes, 1.0).map_err(|err| Stage::Build.fail(err))?;
    Ok(Target {
        label: "ring",
        propagator,
        graph: Some(graph),
    })
}

pub fn run(args: &PentagonArgs) -> Result<(), CliError> {
    let config = args.run.load_config()?;
    let target = target(args.eta, args.damping, args.nodes, &config)?;
    let opts = args.run.divergence_opts(&config);
    let artifacts = analyze_run(
        target.label,
        &target.propagator,
        target.graph.as_ref(),
        &opts,
    )?;
    emit(&args.run, &artifacts)
}
