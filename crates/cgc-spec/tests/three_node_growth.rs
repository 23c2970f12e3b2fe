use cgc_core::StateVector;
use cgc_prop::{build, perturb, PropagatorSpec};
use cgc_spec::{
    estimate_exponent, norm_growth, operator_norm, power_norm, spectral_radius,
    theoretical_exponent, FitWindow,
};

fn manuscript_spec() -> PropagatorSpec {
    PropagatorSpec::ThreeNode {
        eta: 0.05,
        alpha: 0.01,
        beta: 0.02,
    }
}

#[test]
fn weak_coupling_is_unstable_and_norms_grow() {
    let prop = build(&PropagatorSpec::ThreeNode {
        eta: 0.05,
        alpha: 1e-4,
        beta: 1e-4,
    })
    .unwrap();
    let radius = spectral_radius(prop.matrix()).unwrap();
    assert!(radius > 1.0, "spectral radius {radius}");
    let norms = norm_growth(prop.matrix(), 50).unwrap();
    assert_eq!(norms.len(), 50);
    for pair in norms.windows(2) {
        assert!(pair[1] >= pair[0], "norm decreased: {} -> {}", pair[0], pair[1]);
    }
    assert!((norms[0] - operator_norm(prop.matrix()).unwrap()).abs() < 1e-12);
    assert!((norms[9] - power_norm(prop.matrix(), 10).unwrap()).abs() < 1e-9);
}

#[test]
fn manuscript_parameters_match_theory() {
    let prop = build(&manuscript_spec()).unwrap();
    assert!(spectral_radius(prop.matrix()).unwrap() > 1.0);

    let psi0 = StateVector::from_element(3, 1.0);
    let psi0_prime = perturb(&psi0, 1e-6, 42).unwrap();
    let estimate =
        estimate_exponent(&prop, &psi0, &psi0_prime, 200, FitWindow::new(10, 150)).unwrap();
    let theory = theoretical_exponent(0.05).unwrap();
    assert!((theory - 1.05f64.ln()).abs() < 1e-15);
    let relative = (estimate.exponent() - theory).abs() / theory;
    assert!(
        relative < 0.3,
        "estimate {} vs theory {theory} (relative error {relative})",
        estimate.exponent()
    );
    assert_eq!(estimate.distances.len(), 201);
}

#[test]
fn estimate_is_stable_across_seeds() {
    let prop = build(&manuscript_spec()).unwrap();
    let psi0 = StateVector::from_element(3, 1.0);
    let theory = theoretical_exponent(0.05).unwrap();
    for seed in [1u64, 7, 123, 2024] {
        let psi0_prime = perturb(&psi0, 1e-6, seed).unwrap();
        let estimate =
            estimate_exponent(&prop, &psi0, &psi0_prime, 200, FitWindow::default()).unwrap();
        assert!((estimate.exponent() - theory).abs() / theory < 0.3, "seed {seed}");
    }
}

#[test]
fn theoretical_exponent_validates_eta() {
    assert!(theoretical_exponent(-1.0).is_err());
    assert!(theoretical_exponent(f64::INFINITY).is_err());
    assert_eq!(theoretical_exponent(0.0).unwrap(), 0.0);
}
