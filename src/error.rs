//! Error type shared by the solver core and the host loop.

use std::collections::TryReserveError;
use thiserror::Error;

pub type SolverResult<T> = Result<T, SolverError>;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("invalid grid size {nx}x{ny}: both dimensions must be positive")]
    InvalidGrid { nx: usize, ny: usize },

    #[error("grid size {nx}x{ny} overflows the padded cell count")]
    GridTooLarge { nx: usize, ny: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A field buffer could not be reserved. The numerical state is undefined
    /// without it, so the run stops here.
    #[error("failed to allocate {field} buffer of {cells} cells")]
    Allocation {
        field: &'static str,
        cells: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("failed to start parallel backend")]
    Backend(#[from] rayon::ThreadPoolBuildError),

    /// The maximum wave speed over the interior is zero, negative or not
    /// finite, so the CFL condition gives no usable time step.
    #[error("degenerate state at step {step}: maximum wave speed {max_eigenvalue} gives no finite time step")]
    DegenerateState { step: u64, max_eigenvalue: f64 },

    /// Steps that raise this or [`SolverError::Inadmissible`] are rolled
    /// back: the accepted state, time and step count stay as they were.
    #[error("non-finite conserved value at cell ({x}, {y}) in step {step}")]
    NonFinite { step: u64, x: usize, y: usize },

    #[error("inadmissible state (negative depth, density or pressure) at cell ({x}, {y}) in step {step}")]
    Inadmissible { step: u64, x: usize, y: usize },

    #[error("unknown setup '{name}' (known setups: {known})")]
    UnknownSetup { name: String, known: String },

    #[error("setup '{setup}' is defined for {expected}, not {found}")]
    PhysicsMismatch {
        setup: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl SolverError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
