use cgc_core::{CgcError, StateVector};
use cgc_prop::{build, evolve, evolve_pair, perturb, PropagatorSpec};

fn pentagon() -> cgc_prop::Propagator {
    build(&PropagatorSpec::Pentagon {
        eta: 0.08,
        damping: 0.02,
    })
    .unwrap()
}

#[test]
fn zero_steps_returns_initial_state() {
    let psi0 = StateVector::from_vec(vec![1.0, -2.0, 0.5, 3.0, 0.0]);
    let trajectory = evolve(&pentagon(), &psi0, 0).unwrap();
    assert_eq!(trajectory.len(), 1);
    assert_eq!(trajectory.initial(), &psi0);
    assert_eq!(trajectory.last(), &psi0);
}

#[test]
fn trajectory_has_n_plus_one_states() {
    let prop = pentagon();
    let psi0 = StateVector::from_element(5, 1.0);
    let trajectory = evolve(&prop, &psi0, 200).unwrap();
    assert_eq!(trajectory.len(), 201);
    // The uniform vector is an eigenvector with eigenvalue 1 - damping + eta.
    let expected = 1.06f64.powi(200);
    let got = trajectory.last()[0];
    assert!((got / expected - 1.0).abs() < 1e-9, "got {got}, expected {expected}");
    for (n, state) in trajectory.iter().enumerate().skip(1) {
        let step = prop.matrix() * trajectory.get(n - 1).unwrap();
        assert_eq!(state, &step);
    }
}

#[test]
fn dimension_mismatch_is_reported() {
    let psi0 = StateVector::from_element(3, 1.0);
    match evolve(&pentagon(), &psi0, 10).unwrap_err() {
        CgcError::DimensionMismatch(info) => {
            assert_eq!(info.context.get("expected"), Some(&"5".to_string()));
            assert_eq!(info.context.get("actual"), Some(&"3".to_string()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn non_finite_initial_state_rejected() {
    let psi0 = StateVector::from_vec(vec![1.0, f64::NAN, 1.0, 1.0, 1.0]);
    assert_eq!(
        evolve(&pentagon(), &psi0, 3).unwrap_err().code(),
        "non-finite-state"
    );
}

#[test]
fn perturbation_is_seeded_and_exact_norm() {
    let psi0 = StateVector::from_element(5, 1.0);
    let first = perturb(&psi0, 1e-6, 7).unwrap();
    let second = perturb(&psi0, 1e-6, 7).unwrap();
    let other = perturb(&psi0, 1e-6, 8).unwrap();
    assert_eq!(first, second);
    assert_ne!(first, other);
    let separation = (&first - &psi0).norm();
    assert!((separation - 1e-6).abs() < 1e-15);
}

#[test]
fn perturbation_rejects_bad_epsilon() {
    let psi0 = StateVector::from_element(3, 1.0);
    assert_eq!(
        perturb(&psi0, 0.0, 1).unwrap_err().code(),
        "non-positive-separation"
    );
    assert_eq!(
        perturb(&psi0, f64::NAN, 1).unwrap_err().code(),
        "non-finite-parameter"
    );
}

#[test]
fn pair_evolution_shares_propagator() {
    let prop = pentagon();
    let psi0 = StateVector::from_element(5, 1.0);
    let psi1 = perturb(&psi0, 1e-6, 3).unwrap();
    let (a, b) = evolve_pair(&prop, &psi0, &psi1, 20).unwrap();
    assert_eq!(a.len(), b.len());
    assert_eq!(a.initial(), &psi0);
    assert_eq!(b.initial(), &psi1);
}
