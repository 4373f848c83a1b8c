//! Simulation driver.
//!
//! Owns every field of the run and advances the accepted state one SSP-RK
//! step at a time. Slot 0 holds the state at the start of the step, slot
//! `N` the accepted state after it; slots in between are stage results.

use crate::backend::Backend;
use crate::error::{SolverError, SolverResult};
use crate::fv_core::condition::{initialize_mesh, BCEnforcer, BoundaryCondition, InitialCondition};
use crate::fv_core::field::Field;
use crate::fv_core::flux::{evaluate_fluxes, FluxScheme};
use crate::fv_core::mesh::{Grid2d, Mesh};
use crate::fv_core::physics::{ConservationLaw, State};
use crate::fv_core::reconstruction::{reconstruct, SlopeLimiter};
use crate::time_integrator::fvm_ssp_rk::{rk_combine, RkOrder};
use crate::time_integrator::timestep::estimate_time_step;
use tracing::{info, trace};

/// Numerical choices fixed for the whole run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scheme {
    pub rk_order: RkOrder,
    pub cfl: f64,
    pub boundary: BoundaryCondition,
    pub flux: FluxScheme,
    pub limiter: SlopeLimiter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    BoundaryApplied,
    StageLoop(usize),
    StepComplete,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepResult {
    pub dt: f64,
    pub time: f64,
    pub step: u64,
    pub max_eigenvalue: f64,
}

pub struct Simulator<L, const D: usize> {
    law: L,
    mesh: Grid2d,
    scheme: Scheme,
    backend: Backend,
    stages: Vec<Field<State<D>>>,
    sx: Field<State<D>>,
    sy: Field<State<D>>,
    f: Field<State<D>>,
    g: Field<State<D>>,
    eig: Field<f64>,
    time: f64,
    step: u64,
    phase: Phase,
}

impl<L, const D: usize> Simulator<L, D>
where
    L: ConservationLaw<D>,
{
    /// Allocates every buffer and writes `init` into the accepted slot.
    pub fn initialize(
        law: L,
        nx: usize,
        ny: usize,
        scheme: Scheme,
        backend: Backend,
        init: &dyn InitialCondition<D>,
    ) -> SolverResult<Self> {
        if scheme.cfl.is_nan() || scheme.cfl <= 0.0 || scheme.cfl > 1.0 {
            return Err(SolverError::config(format!(
                "cfl must lie in (0, 1], got {}",
                scheme.cfl
            )));
        }
        let mesh = Grid2d::new(nx, ny)?;
        let zero = State::<D>::zeros();

        let mut stages = Vec::with_capacity(scheme.rk_order.stages() + 1);
        for _ in 0..=scheme.rk_order.stages() {
            stages.push(Field::new("stage", &mesh, zero)?);
        }
        let mut sim = Simulator {
            sx: Field::new("sx", &mesh, zero)?,
            sy: Field::new("sy", &mesh, zero)?,
            f: Field::new("f", &mesh, zero)?,
            g: Field::new("g", &mesh, zero)?,
            eig: Field::new("eig", &mesh, 0.0)?,
            law,
            mesh,
            scheme,
            backend,
            stages,
            time: 0.0,
            step: 0,
            phase: Phase::Idle,
        };

        let accepted = sim.scheme.rk_order.stages();
        initialize_mesh(
            &sim.law,
            &sim.mesh,
            &sim.backend,
            init,
            &sim.scheme.boundary,
            &mut sim.stages[accepted],
        );
        info!(
            physics = L::NAME,
            nx,
            ny,
            stages = accepted,
            backend = ?sim.backend,
            "simulator initialized"
        );
        Ok(sim)
    }

    pub fn advance_step(&mut self) -> SolverResult<StepResult> {
        self.advance(f64::INFINITY)
    }

    /// Like [`advance_step`](Self::advance_step) but never steps further
    /// than `dt_max`, so a host loop can land exactly on an end time.
    pub fn advance_step_capped(&mut self, dt_max: f64) -> SolverResult<StepResult> {
        if dt_max.is_nan() || dt_max <= 0.0 {
            return Err(SolverError::config(format!(
                "time step cap must be positive, got {dt_max}"
            )));
        }
        self.advance(dt_max)
    }

    /// Runs one step. On failure the accepted slot is restored from slot 0,
    /// which still holds the state the step started from, and the phase,
    /// time and step count are left as they were.
    fn advance(&mut self, dt_max: f64) -> SolverResult<StepResult> {
        let resume = self.phase;
        let result = self.try_advance(dt_max);
        if result.is_err() {
            let n_rk = self.scheme.rk_order.stages();
            let (head, tail) = self.stages.split_at_mut(n_rk);
            tail[0].copy_from(&head[0]);
            self.set_phase(resume);
        }
        result
    }

    fn try_advance(&mut self, dt_max: f64) -> SolverResult<StepResult> {
        let n_rk = self.scheme.rk_order.stages();
        let bc = self.scheme.boundary;

        bc.enforce(&self.law, &self.mesh, &self.backend, &mut self.stages[n_rk]);
        let (head, tail) = self.stages.split_at_mut(n_rk);
        head[0].copy_from(&tail[0]);
        self.set_phase(Phase::BoundaryApplied);

        let cfl_step = estimate_time_step(
            &self.backend,
            &self.mesh,
            &self.law,
            self.scheme.cfl,
            &self.stages[0],
            &mut self.eig,
            self.step,
        )?;
        let dt = cfl_step.dt.min(dt_max);

        for n in 1..=n_rk {
            self.set_phase(Phase::StageLoop(n));
            bc.enforce(&self.law, &self.mesh, &self.backend, &mut self.stages[n - 1]);

            let (head, tail) = self.stages.split_at_mut(n);
            let q0 = &head[0];
            let qprev = &head[n - 1];
            let qn = &mut tail[0];

            reconstruct(
                &self.backend,
                &self.mesh,
                self.scheme.limiter,
                qprev,
                &mut self.sx,
                &mut self.sy,
            );
            evaluate_fluxes(
                &self.backend,
                &self.mesh,
                &self.law,
                &self.scheme.flux,
                qprev,
                &self.sx,
                &self.sy,
                &mut self.f,
                &mut self.g,
            );
            rk_combine(
                &self.backend,
                &self.mesh,
                self.scheme.rk_order.coefficients(n),
                dt,
                q0,
                qprev,
                &self.f,
                &self.g,
                qn,
            );
        }

        self.check_accepted()?;
        self.time += dt;
        self.step += 1;
        self.set_phase(Phase::StepComplete);

        Ok(StepResult {
            dt,
            time: self.time,
            step: self.step,
            max_eigenvalue: cfl_step.max_eigenvalue,
        })
    }

    fn set_phase(&mut self, phase: Phase) {
        trace!(step = self.step, from = ?self.phase, to = ?phase, "driver phase");
        self.phase = phase;
    }

    /// Scans the freshly computed accepted slot before the step is committed.
    fn check_accepted(&self) -> SolverResult<()> {
        let q = self.field();
        let step = self.step + 1;
        for (x, y) in self.mesh.interior().cells() {
            let cell = &q[(x, y)];
            if cell.iter().any(|v| !v.is_finite()) {
                return Err(SolverError::NonFinite { step, x, y });
            }
            if !self.law.is_admissible(cell) {
                return Err(SolverError::Inadmissible { step, x, y });
            }
        }
        Ok(())
    }

    /// The accepted state. Ghost cells are refreshed at the start of the
    /// next step, not after this one.
    pub fn field(&self) -> &Field<State<D>> {
        &self.stages[self.scheme.rk_order.stages()]
    }

    /// Stage slot `slot` in `0..=N`.
    pub fn stage(&self, slot: usize) -> Option<&Field<State<D>>> {
        self.stages.get(slot)
    }

    /// Slopes of the last stage evaluated.
    pub fn slopes(&self) -> (&Field<State<D>>, &Field<State<D>>) {
        (&self.sx, &self.sy)
    }

    /// East-face and north-face fluxes of the last stage evaluated.
    pub fn fluxes(&self) -> (&Field<State<D>>, &Field<State<D>>) {
        (&self.f, &self.g)
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mesh(&self) -> &Grid2d {
        &self.mesh
    }

    pub fn law(&self) -> &L {
        &self.law
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Sum of each conserved component over the interior, scaled by the cell area.
    pub fn totals(&self) -> State<D> {
        let q = self.field();
        let area = self.mesh.get_dx() * self.mesh.get_dy();
        self.mesh
            .interior()
            .cells()
            .fold(State::<D>::zeros(), |acc, (x, y)| acc + q[(x, y)])
            * area
    }

    /// Interior cells of the accepted state that violate the law's admissibility.
    pub fn count_inadmissible(&self) -> usize {
        let q = self.field();
        self.mesh
            .interior()
            .cells()
            .filter(|&(x, y)| !self.law.is_admissible(&q[(x, y)]))
            .count()
    }
}
