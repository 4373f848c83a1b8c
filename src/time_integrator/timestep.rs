use crate::backend::Backend;
use crate::error::{SolverError, SolverResult};
use crate::fv_core::field::Field;
use crate::fv_core::mesh::{Grid2d, Mesh};
use crate::fv_core::physics::{ConservationLaw, State};

/// Signal speeds at or below this are treated as a state at rest with no
/// usable CFL bound.
pub const MIN_WAVE_SPEED: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeStep {
    pub dt: f64,
    pub max_eigenvalue: f64,
}

pub fn calc_time_step(dx: f64, dy: f64, cfl: f64, s_max: f64) -> f64 {
    cfl * (dx / s_max).min(dy / s_max)
}

/// Writes the local maximum signal speed of every interior cell into `eig`.
pub fn compute_eigenvalues<L, const D: usize>(
    backend: &Backend,
    mesh: &Grid2d,
    law: &L,
    q: &Field<State<D>>,
    eig: &mut Field<f64>,
) where
    L: ConservationLaw<D>,
{
    let stride = mesh.stride();
    backend.map_cells(eig.as_mut_slice(), stride, &mesh.interior(), |x, y| {
        law.max_speed(&q[(x, y)])
    });
}

/// Maximum over interior cells only; ghost values are never trusted here.
/// Any NaN in the interior makes the result NaN.
pub fn max_eigenvalue(mesh: &Grid2d, eig: &Field<f64>) -> f64 {
    mesh.interior()
        .cells()
        .map(|(x, y)| eig[(x, y)])
        .fold(f64::NEG_INFINITY, |max, v| {
            if max.is_nan() || v.is_nan() {
                f64::NAN
            } else {
                max.max(v)
            }
        })
}

/// CFL time step for `q`. `step` only labels the error.
pub fn estimate_time_step<L, const D: usize>(
    backend: &Backend,
    mesh: &Grid2d,
    law: &L,
    cfl: f64,
    q: &Field<State<D>>,
    eig: &mut Field<f64>,
    step: u64,
) -> SolverResult<TimeStep>
where
    L: ConservationLaw<D>,
{
    compute_eigenvalues(backend, mesh, law, q, eig);
    let max_eigenvalue = max_eigenvalue(mesh, eig);
    if !max_eigenvalue.is_finite() || max_eigenvalue <= MIN_WAVE_SPEED {
        return Err(SolverError::DegenerateState {
            step,
            max_eigenvalue,
        });
    }
    let dt = calc_time_step(mesh.get_dx(), mesh.get_dy(), cfl, max_eigenvalue);
    Ok(TimeStep { dt, max_eigenvalue })
}
