//! Trajectory evolution and seeded initial-condition perturbation.

use cgc_core::errors::{CgcError, ErrorInfo};
use cgc_core::rng::RngHandle;
use cgc_core::{all_finite, StateVector};
use serde::Serialize;

use crate::builder::Propagator;

/// Ordered sequence of states; index `n` holds `T^n psi_0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    states: Vec<StateVector>,
}

impl Trajectory {
    /// Number of recorded states (`n_steps + 1`).
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// A trajectory always holds its initial condition.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns every recorded state.
    pub fn states(&self) -> &[StateVector] {
        &self.states
    }

    /// State at step `n`.
    pub fn get(&self, n: usize) -> Option<&StateVector> {
        self.states.get(n)
    }

    /// Initial condition.
    pub fn initial(&self) -> &StateVector {
        &self.states[0]
    }

    /// Final recorded state.
    pub fn last(&self) -> &StateVector {
        &self.states[self.states.len() - 1]
    }

    /// Iterates over recorded states in order.
    pub fn iter(&self) -> std::slice::Iter<'_, StateVector> {
        self.states.iter()
    }
}

fn check_state(propagator: &Propagator, psi0: &StateVector) -> Result<(), CgcError> {
    if psi0.len() != propagator.dim() {
        return Err(CgcError::dimension_mismatch(
            propagator.dim(),
            psi0.len(),
            "initial state",
        ));
    }
    if !all_finite(psi0.as_slice()) {
        return Err(CgcError::invalid_parameter(
            "non-finite-state",
            "initial state entries must be finite",
        ));
    }
    Ok(())
}

/// Evolves `psi0` for `n_steps` applications of the propagator.
///
/// No normalisation is applied between steps; growth is intentional.
pub fn evolve(
    propagator: &Propagator,
    psi0: &StateVector,
    n_steps: usize,
) -> Result<Trajectory, CgcError> {
    check_state(propagator, psi0)?;
    let mut states = Vec::with_capacity(n_steps + 1);
    states.push(psi0.clone());
    for step in 0..n_steps {
        let next = propagator.apply(&states[step])?;
        states.push(next);
    }
    tracing::debug!(dim = propagator.dim(), n_steps, "evolved trajectory");
    Ok(Trajectory { states })
}

/// Evolves two initial conditions under the same propagator.
pub fn evolve_pair(
    propagator: &Propagator,
    psi0: &StateVector,
    psi0_prime: &StateVector,
    n_steps: usize,
) -> Result<(Trajectory, Trajectory), CgcError> {
    let first = evolve(propagator, psi0, n_steps)?;
    let second = evolve(propagator, psi0_prime, n_steps)?;
    Ok((first, second))
}

/// Returns `psi0 + delta` where `delta` points in a seeded standard-normal
/// direction and has Euclidean norm `epsilon`.
pub fn perturb(psi0: &StateVector, epsilon: f64, seed: u64) -> Result<StateVector, CgcError> {
    CgcError::check_finite("epsilon", epsilon)?;
    if epsilon <= 0.0 {
        return Err(CgcError::InvalidParameter(
            ErrorInfo::new("non-positive-separation", "epsilon must be positive")
                .with_context("epsilon", epsilon),
        ));
    }
    if psi0.is_empty() {
        return Err(CgcError::invalid_parameter(
            "empty-state",
            "cannot perturb an empty state vector",
        ));
    }
    let mut rng = RngHandle::from_seed(seed);
    let mut direction = StateVector::from_vec(rng.standard_normal_vec(psi0.len()));
    let mut norm = direction.norm();
    // A zero draw has probability zero but would leave the direction undefined.
    while norm == 0.0 {
        direction = StateVector::from_vec(rng.standard_normal_vec(psi0.len()));
        norm = direction.norm();
    }
    Ok(psi0 + direction * (epsilon / norm))
}
