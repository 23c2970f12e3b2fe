use std::fs;
use std::process::{Command, Output};

use serde_json::Value;

fn cgc_sim(args: &[&str]) -> Output {
    Command::new("cargo")
        .args(["run", "--quiet", "--bin", "cgc-sim", "--"])
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run cgc-sim")
}

fn json_report(args: &[&str]) -> Value {
    let output = cgc_sim(args);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let body = String::from_utf8(output.stdout).expect("utf8");
    serde_json::from_str(&body).expect("json")
}

// Cargo may replay build warnings ahead of the program's own output.
fn stderr_line(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let diagnostics: Vec<&str> = stderr
        .lines()
        .filter(|line| line.starts_with("error: "))
        .collect();
    assert_eq!(diagnostics.len(), 1, "expected one diagnostic line, got: {stderr}");
    assert_eq!(stderr.lines().last(), Some(diagnostics[0]));
    diagnostics[0].to_string()
}

#[test]
fn three_node_estimate_tracks_theory() {
    let report = json_report(&["three-node", "--json"]);
    assert_eq!(report["label"], "three-node");
    let estimate = report["exponent"]["estimate"].as_f64().expect("estimate");
    let theory = 1.05f64.ln();
    assert!((estimate - theory).abs() / theory < 0.3, "estimate {estimate}");
    assert_eq!(report["report_hash"].as_str().map(str::len), Some(64));
}

#[test]
fn three_node_text_report() {
    let output = cgc_sim(&["three-node", "--eta", "0.05", "--alpha", "0.01", "--beta", "0.02"]);
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).expect("utf8");
    assert!(text.starts_with("three-node diagnostics:"));
    assert!(text.contains("theoretical log(1 + eta) = "));
}

#[test]
fn pentagon_reports_graph_counts() {
    let output = cgc_sim(&["pentagon"]);
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).expect("utf8");
    assert!(text.contains("number of nodes = 5"));
    assert!(text.contains("number of edges = 5"));

    let ring = json_report(&["pentagon", "--nodes", "7", "--json"]);
    assert_eq!(ring["label"], "ring");
    assert_eq!(ring["graph"]["nodes"], 7);
}

#[test]
fn coarse_grained_estimates_agree() {
    let report = json_report(&["coarse-grained", "--projection", "mean", "--json"]);
    assert_eq!(report["coarse"]["matches"], true);
    assert!(report["coarse"]["coarse"].as_f64().expect("coarse") > 0.0);
}

#[test]
fn version_prints_package_version() {
    let output = cgc_sim(&["version"]);
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(text.trim(), env!("CARGO_PKG_VERSION"));
}

#[test]
fn failures_name_the_stage() {
    let fit = cgc_sim(&["three-node", "--fit-end", "500"]);
    assert_eq!(fit.status.code(), Some(1));
    assert!(stderr_line(&fit).starts_with("error: fit stage failed"));

    let build = cgc_sim(&["three-node", "--eta", "-2"]);
    assert_eq!(build.status.code(), Some(1));
    assert!(stderr_line(&build).starts_with("error: build stage failed"));

    let stray = cgc_sim(&["coarse-grained", "--variant", "three-node", "--damping", "0.1"]);
    assert_eq!(stray.status.code(), Some(1));
    let line = stderr_line(&stray);
    assert!(line.starts_with("error: config stage failed"));
    assert!(line.contains("--damping"));

    let stray = cgc_sim(&["coarse-grained", "--alpha", "0.3"]);
    assert_eq!(stray.status.code(), Some(1));
    assert!(stderr_line(&stray).contains("--alpha"));

    let projection = cgc_sim(&["coarse-grained", "--projection", "median"]);
    assert_eq!(projection.status.code(), Some(1));
    assert!(stderr_line(&projection).starts_with("error: config stage failed"));
}

#[test]
fn config_file_and_flag_precedence() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("run.yaml");
    fs::write(&path, "n_steps: 120\nfit_end: 100\nseed: 9\n").expect("write config");
    let config = path.to_str().expect("path");

    let report = json_report(&["three-node", "--config", config, "--seed", "3", "--json"]);
    assert_eq!(report["provenance"]["n_steps"], 120);
    assert_eq!(report["provenance"]["seed"], 3);
    assert_eq!(report["exponent"]["window"]["end"], 100);

    let bad = dir.path().join("bad.yaml");
    fs::write(&bad, "n_stepz: 120\n").expect("write config");
    let output = cgc_sim(&["three-node", "--config", bad.to_str().expect("path")]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_line(&output).starts_with("error: config stage failed"));
}

#[test]
fn plot_data_written_as_csv() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("plot.csv");
    let output = cgc_sim(&["pentagon", "--plot-data", path.to_str().expect("path")]);
    assert!(output.status.success());
    let body = fs::read_to_string(&path).expect("plot data");
    let mut lines = body.lines();
    assert_eq!(lines.next(), Some("n,distance,log_distance,fitted"));
    assert_eq!(lines.count(), 201);
}
