//! Two-dimensional finite-volume solver for hyperbolic conservation laws.
//!
//! A run advances shallow water or Euler gas dynamics on a uniform padded
//! grid with a MUSCL-type reconstruction, a central-upwind (or Rusanov)
//! numerical flux and a strong-stability-preserving Runge-Kutta integrator.
//! [`Simulator`] drives single steps; [`run::run`] is the full host loop.

pub mod backend;
pub mod config;
pub mod error;
pub mod fv_core;
pub mod output;
pub mod run;
pub mod setups;
pub mod simulator;
pub mod time_integrator;

pub use backend::{Backend, BackendKind};
pub use config::{PhysicsKind, SolverConfig};
pub use error::{SolverError, SolverResult};
pub use fv_core::physics::{ConservationLaw, Euler, ShallowWater, State};
pub use simulator::{Phase, Scheme, Simulator, StepResult};
