//! Run configuration, loaded from YAML and overridden from the command line.

use crate::backend::BackendKind;
use crate::error::{SolverError, SolverResult};
use crate::fv_core::condition::BoundaryCondition;
use crate::fv_core::flux::FluxScheme;
use crate::fv_core::physics::{ConservationLaw, Euler, ShallowWater};
use crate::fv_core::reconstruction::SlopeLimiter;
use crate::setups::{setup_defaults, SetupDefaults};
use crate::simulator::Scheme;
use crate::time_integrator::fvm_ssp_rk::RkOrder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysicsKind {
    #[default]
    ShallowWater,
    Euler,
}

impl PhysicsKind {
    pub fn name(&self) -> &'static str {
        match self {
            PhysicsKind::ShallowWater => <ShallowWater as ConservationLaw<3>>::NAME,
            PhysicsKind::Euler => <Euler as ConservationLaw<4>>::NAME,
        }
    }

    /// Solver tag used in summary file names.
    pub fn label(&self) -> &'static str {
        match self {
            PhysicsKind::ShallowWater => "SW",
            PhysicsKind::Euler => "EULER",
        }
    }

    pub fn default_cfl(&self) -> f64 {
        match self {
            PhysicsKind::ShallowWater => 0.8,
            PhysicsKind::Euler => 0.5,
        }
    }

    pub fn default_boundary(&self) -> BoundaryCondition {
        match self {
            PhysicsKind::ShallowWater => BoundaryCondition::Reflective,
            PhysicsKind::Euler => BoundaryCondition::Outflow,
        }
    }

    pub fn default_setup(&self) -> &'static str {
        match self {
            PhysicsKind::ShallowWater => "circular_dam",
            PhysicsKind::Euler => "riemann",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    pub physics: PhysicsKind,
    pub gravity: f64,
    pub gamma: f64,
    pub nx: usize,
    pub ny: usize,
    /// `None` picks the physics default.
    pub cfl: Option<f64>,
    pub rk_order: usize,
    /// `None` picks the physics default.
    pub boundary: Option<BoundaryCondition>,
    pub flux: FluxScheme,
    /// `None` picks the setup's limiter, or no limiting.
    pub limiter: Option<SlopeLimiter>,
    pub backend: BackendKind,
    pub threads: Option<usize>,
    /// `None` picks the physics default.
    pub setup: Option<String>,
    pub max_steps: u64,
    pub end_time: f64,
    /// Write a cell dump every this many steps; 0 disables dumps.
    pub dump_every: u64,
    pub output_dir: PathBuf,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            physics: PhysicsKind::ShallowWater,
            gravity: 9.81,
            gamma: 1.4,
            nx: 128,
            ny: 128,
            cfl: None,
            rk_order: 3,
            boundary: None,
            flux: FluxScheme::CentralUpwind,
            limiter: None,
            backend: BackendKind::Parallel,
            threads: None,
            setup: None,
            max_steps: 150,
            end_time: 0.2,
            dump_every: 0,
            output_dir: PathBuf::from("output"),
        }
    }
}

impl SolverConfig {
    pub fn from_yaml_str(yaml: &str) -> SolverResult<Self> {
        let config: SolverConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> SolverResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml(&self) -> SolverResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> SolverResult<()> {
        if self.nx == 0 || self.ny == 0 {
            return Err(SolverError::InvalidGrid {
                nx: self.nx,
                ny: self.ny,
            });
        }
        let cfl = self.cfl();
        if cfl.is_nan() || cfl <= 0.0 || cfl > 1.0 {
            return Err(SolverError::config(format!("cfl must lie in (0, 1], got {cfl}")));
        }
        if self.gamma.is_nan() || self.gamma <= 1.0 {
            return Err(SolverError::config(format!(
                "gamma must be greater than 1, got {}",
                self.gamma
            )));
        }
        if self.gravity.is_nan() || self.gravity <= 0.0 {
            return Err(SolverError::config(format!(
                "gravity must be positive, got {}",
                self.gravity
            )));
        }
        if self.end_time.is_nan() || self.end_time <= 0.0 {
            return Err(SolverError::config(format!(
                "end_time must be positive, got {}",
                self.end_time
            )));
        }
        if self.threads == Some(0) {
            return Err(SolverError::config("threads must be at least 1"));
        }
        RkOrder::new(self.rk_order)?;
        Ok(())
    }

    /// Defaults registered for the selected setup. An unknown name yields
    /// none here and is reported when the run looks the setup up.
    fn setup_defaults(&self) -> SetupDefaults {
        setup_defaults(self.setup_name()).unwrap_or_default()
    }

    pub fn cfl(&self) -> f64 {
        self.cfl
            .or(self.setup_defaults().cfl)
            .unwrap_or_else(|| self.physics.default_cfl())
    }

    pub fn boundary(&self) -> BoundaryCondition {
        self.boundary
            .or(self.setup_defaults().boundary)
            .unwrap_or_else(|| self.physics.default_boundary())
    }

    pub fn limiter(&self) -> SlopeLimiter {
        self.limiter
            .or(self.setup_defaults().limiter)
            .unwrap_or_default()
    }

    pub fn setup_name(&self) -> &str {
        self.setup
            .as_deref()
            .unwrap_or_else(|| self.physics.default_setup())
    }

    pub fn scheme(&self) -> SolverResult<Scheme> {
        Ok(Scheme {
            rk_order: RkOrder::new(self.rk_order)?,
            cfl: self.cfl(),
            boundary: self.boundary(),
            flux: self.flux,
            limiter: self.limiter(),
        })
    }
}
