//! Structured error types shared across the coherence-gradient crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`CgcError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (indices, dimensions, parameter values).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for propagator construction, evolution and fitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum CgcError {
    /// Non-finite or structurally inconsistent scalar inputs.
    #[error("invalid parameter: {0}")]
    InvalidParameter(ErrorInfo),
    /// Vector and matrix sizes disagree.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(ErrorInfo),
    /// Two trajectories of different length were compared.
    #[error("length mismatch: {0}")]
    LengthMismatch(ErrorInfo),
    /// A regression window contains a non-positive or non-finite value.
    #[error("fit domain error: {0}")]
    FitDomain(ErrorInfo),
    /// Degenerate fits or numerical decompositions that failed to converge.
    #[error("numerical non-convergence: {0}")]
    NonConvergence(ErrorInfo),
    /// Serialization and configuration decoding errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl CgcError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            CgcError::InvalidParameter(info)
            | CgcError::DimensionMismatch(info)
            | CgcError::LengthMismatch(info)
            | CgcError::FitDomain(info)
            | CgcError::NonConvergence(info)
            | CgcError::Serde(info) => info,
        }
    }

    /// Returns the stable machine readable code of the error.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Shorthand for an [`CgcError::InvalidParameter`] without context.
    pub fn invalid_parameter(code: &str, message: impl Into<String>) -> Self {
        CgcError::InvalidParameter(ErrorInfo::new(code, message))
    }

    /// Rejects a named scalar parameter that is NaN or infinite.
    pub fn check_finite(name: &str, value: f64) -> Result<f64, CgcError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(CgcError::InvalidParameter(
                ErrorInfo::new(
                    "non-finite-parameter",
                    format!("parameter `{name}` must be finite"),
                )
                .with_context("parameter", name)
                .with_context("value", value),
            ))
        }
    }

    /// Builds a [`CgcError::DimensionMismatch`] describing expected and actual sizes.
    pub fn dimension_mismatch(expected: usize, actual: usize, what: &str) -> Self {
        CgcError::DimensionMismatch(
            ErrorInfo::new(
                "dimension-mismatch",
                format!("{what} has dimension {actual}, expected {expected}"),
            )
            .with_context("expected", expected)
            .with_context("actual", actual),
        )
    }
}
