use std::process::Command;

use cgc_core::to_canonical_json_bytes;
use cgc_spec::Stage;
use clap::Args;
use serde::Serialize;

use super::common::CliError;

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Emit JSON metadata including git and toolchain information.
    #[arg(long)]
    pub long: bool,
}

#[derive(Debug, Serialize)]
struct VersionInfo {
    version: String,
    git_commit: String,
    rustc: String,
}

pub fn run(args: &VersionArgs) -> Result<(), CliError> {
    if !args.long {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    let info = VersionInfo {
        version: env!("CARGO_PKG_VERSION").into(),
        git_commit: probe("git", &["rev-parse", "HEAD"]).unwrap_or_else(|| "unknown".into()),
        rustc: probe("rustc", &["--version"]).unwrap_or_else(|| "rustc unavailable".into()),
    };
    let json = to_canonical_json_bytes(&info).map_err(|err| Stage::Report.fail(err))?;
    println!("{}", String::from_utf8_lossy(&json));
    Ok(())
}

fn probe(program: &str, args: &[&str]) -> Option<String> {
    let out = Command::new(program).args(args).output().ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
}
