//! Coarse-grained exponent estimates through a scalar projection.
//!
//! A trajectory of coherence vectors is mapped to a scalar observable by a
//! caller-supplied projection `f`, and the coarse distance
//! `|f(ψ_n) - f(ψ'_n)|` is fitted exactly like the fine-grained one. The
//! projection is always explicit so both estimates can be tested on their
//! own.

use std::fmt;
use std::str::FromStr;

use cgc_core::errors::{CgcError, ErrorInfo};
use cgc_core::StateVector;
use cgc_prop::Trajectory;
use serde::{Deserialize, Serialize};

/// Named scalar projections of a coherence vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "kebab-case")]
pub enum Projection {
    /// Euclidean norm `‖ψ‖`.
    Norm,
    /// Arithmetic mean of the entries.
    Mean,
    /// A single fixed component `ψ[i]`.
    Component(usize),
}

impl Projection {
    /// Projects one state onto its scalar observable.
    pub fn apply(&self, psi: &StateVector) -> Result<f64, CgcError> {
        match *self {
            Projection::Norm => Ok(psi.norm()),
            Projection::Mean => {
                if psi.is_empty() {
                    return Err(CgcError::invalid_parameter(
                        "empty-state",
                        "cannot average an empty state vector",
                    ));
                }
                Ok(psi.mean())
            }
            Projection::Component(index) => psi.get(index).copied().ok_or_else(|| {
                CgcError::DimensionMismatch(
                    ErrorInfo::new("component-out-of-range", "projection index exceeds state")
                        .with_context("index", index)
                        .with_context("dim", psi.len()),
                )
            }),
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Norm => write!(f, "norm"),
            Projection::Mean => write!(f, "mean"),
            Projection::Component(index) => write!(f, "component:{index}"),
        }
    }
}

impl FromStr for Projection {
    type Err = CgcError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "norm" => Ok(Projection::Norm),
            "mean" => Ok(Projection::Mean),
            other => other
                .strip_prefix("component:")
                .and_then(|index| index.parse::<usize>().ok())
                .map(Projection::Component)
                .ok_or_else(|| {
                    CgcError::InvalidParameter(
                        ErrorInfo::new("unknown-projection", format!("unknown projection '{other}'"))
                            .with_hint("use norm, mean or component:<index>"),
                    )
                }),
        }
    }
}

/// Maps every state of a trajectory through `projection`.
pub fn project_trajectory<F>(trajectory: &Trajectory, projection: F) -> Result<Vec<f64>, CgcError>
where
    F: Fn(&StateVector) -> Result<f64, CgcError>,
{
    trajectory
        .iter()
        .enumerate()
        .map(|(n, psi)| {
            let value = projection(psi)?;
            if value.is_finite() {
                Ok(value)
            } else {
                Err(CgcError::InvalidParameter(
                    ErrorInfo::new("non-finite-projection", "projection returned a non-finite value")
                        .with_context("index", n),
                ))
            }
        })
        .collect()
}

/// `|f(ψ_n) - f(ψ'_n)|` for every index.
pub fn coarse_distance_sequence<F>(
    first: &Trajectory,
    second: &Trajectory,
    projection: F,
) -> Result<Vec<f64>, CgcError>
where
    F: Fn(&StateVector) -> Result<f64, CgcError>,
{
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
    let left = project_trajectory(first, &projection)?;
    let right = project_trajectory(second, &projection)?;
    Ok(left
        .iter()
        .zip(&right)
        .map(|(a, b)| (a - b).abs())
        .collect())
}

fn default_max_decades() -> f64 {
    1.0
}

/// Agreement criterion between fine and coarse exponents.
///
/// Two estimates match when both are strictly positive and
/// `|log10(fine / coarse)| <= max_decades`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchTolerance {
    /// Allowed separation in orders of magnitude.
    #[serde(default = "default_max_decades")]
    pub max_decades: f64,
}

impl Default for MatchTolerance {
    fn default() -> Self {
        Self {
            max_decades: default_max_decades(),
        }
    }
}

/// Outcome of comparing the fine and coarse exponent estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoarseComparison {
    /// Projection used for the coarse estimate.
    pub projection: Projection,
    /// Fine-grained exponent from the full state distance.
    pub fine: f64,
    /// Coarse-grained exponent from the projected distance.
    pub coarse: f64,
    /// `|log10(fine / coarse)|` when both estimates are positive.
    pub decades: Option<f64>,
    /// Tolerance applied.
    pub tolerance: MatchTolerance,
    /// Whether the estimates agree within the tolerance.
    pub matches: bool,
}

/// Compares two exponent estimates on an order-of-magnitude scale.
pub fn compare_estimates(
    projection: Projection,
    fine: f64,
    coarse: f64,
    tolerance: MatchTolerance,
) -> Result<CoarseComparison, CgcError> {
    CgcError::check_finite("fine", fine)?;
    CgcError::check_finite("coarse", coarse)?;
    CgcError::check_finite("max_decades", tolerance.max_decades)?;
    if tolerance.max_decades < 0.0 {
        return Err(CgcError::InvalidParameter(
            ErrorInfo::new("negative-tolerance", "max_decades must be non-negative")
                .with_context("max_decades", tolerance.max_decades),
        ));
    }
    let decades = if fine > 0.0 && coarse > 0.0 {
        Some((fine / coarse).log10().abs())
    } else {
        None
    };
    let matches = decades.map_or(false, |d| d <= tolerance.max_decades);
    Ok(CoarseComparison {
        projection,
        fine,
        coarse,
        decades,
        tolerance,
        matches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_roundtrip() {
        for projection in [Projection::Norm, Projection::Mean, Projection::Component(3)] {
            let parsed: Projection = projection.to_string().parse().unwrap();
            assert_eq!(parsed, projection);
        }
        assert_eq!(
            "component:x".parse::<Projection>().unwrap_err().code(),
            "unknown-projection"
        );
    }

    #[test]
    fn decade_boundary() {
        let tol = MatchTolerance::default();
        assert!(compare_estimates(Projection::Norm, 0.05, 0.06, tol).unwrap().matches);
        assert!(compare_estimates(Projection::Norm, 0.05, 0.45, tol).unwrap().matches);
        assert!(!compare_estimates(Projection::Norm, 0.05, 0.6, tol).unwrap().matches);
        let negative = compare_estimates(Projection::Norm, 0.05, -0.01, tol).unwrap();
        assert!(!negative.matches);
        assert_eq!(negative.decades, None);
    }
}
