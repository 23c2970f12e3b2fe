//! Fine-grained distance sequence between paired trajectories.

use cgc_core::errors::{CgcError, ErrorInfo};
use cgc_prop::Trajectory;

/// Euclidean distance `‖ψ_n - ψ'_n‖` for every trajectory index.
pub fn distance_sequence(first: &Trajectory, second: &Trajectory) -> Result<Vec<f64>, CgcError> {
    if first.len() != second.len() {
        return Err(CgcError::LengthMismatch(
            ErrorInfo::new(
                "trajectory-length-mismatch",
                "trajectories must have the same number of states",
            )
            .with_context("left", first.len())
            .with_context("right", second.len()),
        ));
    }
    first
        .iter()
        .zip(second.iter())
        .map(|(a, b)| {
            if a.len() != b.len() {
                return Err(CgcError::dimension_mismatch(a.len(), b.len(), "paired state"));
            }
            Ok((a - b).norm())
        })
        .collect()
}
