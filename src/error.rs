//! Error types for the beam model and the coupling solver

use thiserror::Error;

/// Main error type for model generation and coupled runs
#[derive(Error, Debug)]
pub enum AeroelasticError {
    /// A structural assumption of the input does not hold (e.g. the elements
    /// of one body are not contiguous)
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    /// Caller-supplied configuration cannot be applied to this model
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Stiffness matrix {0} is singular")]
    SingularStiffness(usize),

    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// Failure reported by the structural integration kernel
    #[error("Structural kernel failed: {0}")]
    Kernel(String),

    /// Failure reported by the aerodynamic solver
    #[error("Aerodynamic solver failed: {0}")]
    Aero(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for model and coupling operations
pub type AeroelasticResult<T> = Result<T, AeroelasticError>;
