//! Spectral radius and operator-norm diagnostics.

use cgc_core::errors::{CgcError, ErrorInfo};
use cgc_core::{all_finite, Matrix};
use nalgebra::{Schur, SVD};
use serde::{Deserialize, Serialize};

const DECOMPOSITION_EPS: f64 = 1e-14;
const DECOMPOSITION_MAX_ITERS: usize = 10_000;

fn convergence_error(code: &str, message: impl Into<String>) -> CgcError {
    CgcError::NonConvergence(ErrorInfo::new(code, message))
}

fn check_square(matrix: &Matrix) -> Result<(), CgcError> {
    if !matrix.is_square() {
        return Err(CgcError::DimensionMismatch(
            ErrorInfo::new("non-square-matrix", "spectral diagnostics need a square matrix")
                .with_context("rows", matrix.nrows())
                .with_context("cols", matrix.ncols()),
        ));
    }
    if matrix.nrows() == 0 {
        return Err(CgcError::invalid_parameter(
            "empty-matrix",
            "spectral diagnostics need a non-empty matrix",
        ));
    }
    if !all_finite(matrix.as_slice()) {
        return Err(CgcError::invalid_parameter(
            "non-finite-entry",
            "matrix entries must be finite",
        ));
    }
    Ok(())
}

/// Largest modulus among the (complex) eigenvalues.
pub fn spectral_radius(matrix: &Matrix) -> Result<f64, CgcError> {
    check_square(matrix)?;
    // Schur rejects the zero matrix outright.
    if matrix.amax() == 0.0 {
        return Ok(0.0);
    }
    let schur = Schur::try_new(matrix.clone(), DECOMPOSITION_EPS, DECOMPOSITION_MAX_ITERS)
        .ok_or_else(|| convergence_error("schur-failed", "Schur decomposition did not converge"))?;
    let radius = schur
        .complex_eigenvalues()
        .iter()
        .map(|lambda| lambda.norm_sqr().sqrt())
        .fold(0.0_f64, f64::max);
    Ok(radius)
}

/// Largest singular value `‖m‖₂`.
pub fn operator_norm(matrix: &Matrix) -> Result<f64, CgcError> {
    check_square(matrix)?;
    let svd = SVD::try_new(
        matrix.clone(),
        false,
        false,
        DECOMPOSITION_EPS,
        DECOMPOSITION_MAX_ITERS,
    )
    .ok_or_else(|| convergence_error("svd-failed", "singular value decomposition did not converge"))?;
    let norm = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    if !norm.is_finite() {
        return Err(convergence_error("non-finite-norm", "operator norm overflowed"));
    }
    Ok(norm)
}

/// `m^n` by repeated multiplication; `n = 0` yields the identity.
pub fn matrix_power(matrix: &Matrix, n: u32) -> Matrix {
    let mut result = Matrix::identity(matrix.nrows(), matrix.ncols());
    for _ in 0..n {
        result = &result * matrix;
    }
    result
}

/// Operator norm of `m^n` for `n >= 1`.
pub fn power_norm(matrix: &Matrix, n: u32) -> Result<f64, CgcError> {
    if n < 1 {
        return Err(CgcError::InvalidParameter(
            ErrorInfo::new("power-below-one", "matrix power must be at least 1")
                .with_context("n", n),
        ));
    }
    check_square(matrix)?;
    operator_norm(&matrix_power(matrix, n))
}

/// `‖m^n‖₂` for `n = 1..=n_max`.
pub fn norm_growth(matrix: &Matrix, n_max: u32) -> Result<Vec<f64>, CgcError> {
    check_square(matrix)?;
    let mut power = matrix.clone();
    let mut norms = Vec::with_capacity(n_max as usize);
    for n in 1..=n_max {
        if n > 1 {
            power = &power * matrix;
        }
        norms.push(operator_norm(&power)?);
    }
    Ok(norms)
}

/// Theoretical per-step growth rate `ln(1 + eta)` of the diagonal part.
pub fn theoretical_exponent(eta: f64) -> Result<f64, CgcError> {
    CgcError::check_finite("eta", eta)?;
    if eta <= -1.0 {
        return Err(CgcError::InvalidParameter(
            ErrorInfo::new("amplification-out-of-range", "eta must be greater than -1")
                .with_context("eta", eta),
        ));
    }
    Ok(eta.ln_1p())
}

/// `‖T^n‖₂` at one requested power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerNorm {
    /// Exponent `n`.
    pub power: u32,
    /// Largest singular value of `T^n`.
    pub norm: f64,
}

/// Spectral radius and operator norms of a propagator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralSummary {
    /// `ρ(T)`.
    pub spectral_radius: f64,
    /// `ln ρ(T)`, the asymptotic growth rate of `‖T^n‖₂^{1/n}`; absent
    /// when `ρ(T) = 0`.
    pub log_spectral_radius: Option<f64>,
    /// `‖T‖₂`.
    pub operator_norm: f64,
    /// `‖T^n‖₂` at the requested powers.
    pub power_norms: Vec<PowerNorm>,
}

/// Computes the spectral radius, operator norm and `‖T^n‖₂` at `powers`.
pub fn spectral_summary(matrix: &Matrix, powers: &[u32]) -> Result<SpectralSummary, CgcError> {
    let spectral_radius = spectral_radius(matrix)?;
    let operator_norm = operator_norm(matrix)?;
    let power_norms = powers
        .iter()
        .map(|&power| power_norm(matrix, power).map(|norm| PowerNorm { power, norm }))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SpectralSummary {
        spectral_radius,
        log_spectral_radius: (spectral_radius > 0.0).then(|| spectral_radius.ln()),
        operator_norm,
        power_norms,
    })
}
