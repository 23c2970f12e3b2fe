use cgc_spec::{analyze_run, MatchTolerance, Projection};
use clap::{Args, ValueEnum};

use super::common::{emit, pick, CliError, RunArgs};
use super::{pentagon, three_node};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Pentagon,
    ThreeNode,
}

impl Variant {
    fn label(self) -> &'static str {
        match self {
            Variant::Pentagon => "pentagon",
            Variant::ThreeNode => "three-node",
        }
    }
}

#[derive(Args, Debug)]
pub struct CoarseArgs {
    /// Loop whose trajectories are coarse-grained.
    #[arg(long, value_enum, default_value_t = Variant::Pentagon)]
    pub variant: Variant,
    /// Projection: `norm`, `mean` or `component:<i>` [default: norm].
    #[arg(long)]
    pub projection: Option<String>,
    /// Allowed separation between the two exponents in decades [default: 1].
    #[arg(long)]
    pub max_decades: Option<f64>,
    /// Amplification rate for either variant.
    #[arg(long, allow_hyphen_values = true)]
    pub eta: Option<f64>,
    /// Three-node forward coupling.
    #[arg(long, allow_hyphen_values = true)]
    pub alpha: Option<f64>,
    /// Three-node backward coupling.
    #[arg(long, allow_hyphen_values = true)]
    pub beta: Option<f64>,
    /// Pentagon damping.
    #[arg(long, allow_hyphen_values = true)]
    pub damping: Option<f64>,
    /// Ring size for the pentagon variant.
    #[arg(long)]
    pub nodes: Option<usize>,
    #[command(flatten)]
    pub run: RunArgs,
}

/// Loop parameters given on the command line that the chosen variant has no use for.
fn stray_flags(args: &CoarseArgs) -> Vec<&'static str> {
    let flags = match args.variant {
        Variant::Pentagon => vec![
            ("--alpha", args.alpha.is_some()),
            ("--beta", args.beta.is_some()),
        ],
        Variant::ThreeNode => vec![
            ("--damping", args.damping.is_some()),
            ("--nodes", args.nodes.is_some()),
        ],
    };
    flags
        .into_iter()
        .filter_map(|(flag, given)| given.then_some(flag))
        .collect()
}

pub fn run(args: &CoarseArgs) -> Result<(), CliError> {
    let stray = stray_flags(args);
    if !stray.is_empty() {
        return Err(CliError::Config(format!(
            "{} not valid with --variant {}",
            stray.join(", "),
            args.variant.label()
        )));
    }
    let config = args.run.load_config()?;
    let projection = match args.projection.as_deref().or(config.projection.as_deref()) {
        Some(raw) => raw
            .parse::<Projection>()
            .map_err(|err| CliError::Config(err.to_string()))?,
        None => Projection::Norm,
    };
    let target = match args.variant {
        Variant::Pentagon => pentagon::target(args.eta, args.damping, args.nodes, &config)?,
        Variant::ThreeNode => three_node::target(args.eta, args.alpha, args.beta, &config)?,
    };

    let mut opts = args.run.divergence_opts(&config);
    opts.projection = Some(projection);
    opts.tolerance = MatchTolerance {
        max_decades: pick(
            args.max_decades,
            config.max_decades,
            MatchTolerance::default().max_decades,
        ),
    };
    let artifacts = analyze_run(
        "coarse-grained",
        &target.propagator,
        target.graph.as_ref(),
        &opts,
    )?;
    emit(&args.run, &artifacts)
}
