//! Error types.
//!
//! - [`AgeError`] is returned by the numeric core (registry, solvers, fits,
//!   concordia sampling). Every variant is a deterministic function of the
//!   input, so callers never need to retry.
//! - [`AppError`] is the shell-level error: a message plus the process exit
//!   code `main` should use.

use thiserror::Error;

/// Failure kinds of the dating core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgeError {
    #[error("unknown isotopic system '{0}'")]
    UnknownSystem(String),

    #[error("invalid measurement: {0}")]
    InvalidMeasurement(String),

    #[error("insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("degenerate fit: {0}")]
    DegenerateFit(String),

    #[error("undefined fit: {0}")]
    UndefinedFit(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AgeError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        AgeError::InvalidMeasurement(message.into())
    }

    /// Exit code used when this error reaches `main`.
    pub fn exit_code(&self) -> u8 {
        match self {
            AgeError::UnknownSystem(_) | AgeError::InvalidConfig(_) => 2,
            AgeError::InvalidMeasurement(_) | AgeError::InsufficientData { .. } => 3,
            AgeError::DegenerateFit(_) | AgeError::UndefinedFit(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<AgeError> for AppError {
    fn from(err: AgeError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_errors_map_to_exit_codes() {
        let err: AppError = AgeError::UnknownSystem("99X-99Y".to_string()).into();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.message(), "unknown isotopic system '99X-99Y'");

        let err: AppError = AgeError::InsufficientData { required: 2, actual: 1 }.into();
        assert_eq!(err.exit_code(), 3);

        let err: AppError = AgeError::UndefinedFit("zero degrees of freedom".to_string()).into();
        assert_eq!(err.exit_code(), 4);
    }
}
