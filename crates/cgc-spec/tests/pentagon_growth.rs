use cgc_graph::pentagon;
use cgc_prop::{build, PropagatorSpec};
use cgc_spec::{analyze_run, spectral_radius, spectral_summary, DivergenceOpts, Projection};

fn pentagon_prop() -> cgc_prop::Propagator {
    build(&PropagatorSpec::Pentagon {
        eta: 0.08,
        damping: 0.02,
    })
    .unwrap()
}

#[test]
fn pentagon_is_unstable_with_positive_exponent() {
    let prop = pentagon_prop();
    let radius = spectral_radius(prop.matrix()).unwrap();
    assert!(radius > 1.0);
    assert!((radius - 1.06).abs() < 1e-9, "radius {radius}");

    let graph = pentagon().unwrap();
    let artifacts = analyze_run("pentagon", &prop, Some(&graph), &DivergenceOpts::default()).unwrap();
    let report = &artifacts.report;
    assert!(report.exponent.estimate > 0.0);
    assert!(report.exponent.theoretical.is_none());
    let graph_summary = report.graph.as_ref().unwrap();
    assert_eq!(graph_summary.nodes, 5);
    assert_eq!(graph_summary.edges, 5);
    assert_eq!(artifacts.distances.len(), 201);
}

#[test]
fn fine_and_coarse_estimates_agree() {
    let prop = pentagon_prop();
    for projection in [Projection::Norm, Projection::Mean] {
        let opts = DivergenceOpts {
            projection: Some(projection),
            ..DivergenceOpts::default()
        };
        let artifacts = analyze_run("coarse-grained", &prop, None, &opts).unwrap();
        let coarse = artifacts.report.coarse.as_ref().unwrap();
        assert_eq!(coarse.projection, projection);
        assert!(coarse.coarse > 0.0);
        assert!(coarse.matches, "{projection}: {coarse:?}");
        // The uniform mode carries the spectral radius exactly.
        assert!((coarse.coarse - 1.06f64.ln()).abs() < 1e-3, "{projection}: {}", coarse.coarse);
        assert_eq!(artifacts.coarse_distances.as_ref().unwrap().len(), 201);
    }
}

#[test]
fn fully_damped_pentagon_has_zero_radius() {
    let prop = build(&PropagatorSpec::Pentagon {
        eta: 0.0,
        damping: 1.0,
    })
    .unwrap();
    assert_eq!(spectral_radius(prop.matrix()).unwrap(), 0.0);
    let summary = spectral_summary(prop.matrix(), &[1, 10]).unwrap();
    assert_eq!(summary.log_spectral_radius, None);
    assert!(summary.power_norms.iter().all(|entry| entry.norm == 0.0));
}
