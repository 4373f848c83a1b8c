use crate::backend::Backend;
use crate::error::{SolverError, SolverResult};
use crate::fv_core::field::Field;
use crate::fv_core::mesh::{Grid2d, Mesh};
use crate::fv_core::physics::State;

/// Shu-Osher coefficients `(c0, c1)` per order and stage. Stage `n` of order
/// `k` is `c0 * Q_0 + c1 * (Q_{n-1} + dt * L(Q_{n-1}))`.
pub const SSP_RK_COEFFICIENTS: [&[(f64, f64)]; 3] = [
    &[(0.0, 1.0)],
    &[(0.0, 1.0), (0.5, 0.5)],
    &[(0.0, 1.0), (0.75, 0.25), (1.0 / 3.0, 2.0 / 3.0)],
];

//STRUCTS
/// Number of stages of the strong-stability-preserving Runge-Kutta scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RkOrder(usize);

//IMPLEMENTATIONS
impl RkOrder {
    pub const FORWARD_EULER: RkOrder = RkOrder(1);
    pub const SSP_RK2: RkOrder = RkOrder(2);
    pub const SSP_RK3: RkOrder = RkOrder(3);

    pub fn new(order: usize) -> SolverResult<Self> {
        if (1..=SSP_RK_COEFFICIENTS.len()).contains(&order) {
            Ok(RkOrder(order))
        } else {
            Err(SolverError::config(format!(
                "rk_order must be 1, 2 or 3, got {order}"
            )))
        }
    }

    pub fn stages(&self) -> usize {
        self.0
    }

    /// Coefficients of `stage`, counted from 1.
    pub fn coefficients(&self, stage: usize) -> (f64, f64) {
        SSP_RK_COEFFICIENTS[self.0 - 1][stage - 1]
    }
}

impl Default for RkOrder {
    fn default() -> Self {
        RkOrder::SSP_RK3
    }
}

/// Writes stage `n` into the interior of `qn`:
/// `c0 * q0 + c1 * (qprev - dt/dx * (F[x] - F[x-1]) - dt/dy * (G[y] - G[y-1]))`.
/// Ghost cells of `qn` are left alone.
#[allow(clippy::too_many_arguments)]
pub fn rk_combine<const D: usize>(
    backend: &Backend,
    mesh: &Grid2d,
    (c0, c1): (f64, f64),
    dt: f64,
    q0: &Field<State<D>>,
    qprev: &Field<State<D>>,
    f: &Field<State<D>>,
    g: &Field<State<D>>,
    qn: &mut Field<State<D>>,
) {
    let rx = dt / mesh.get_dx();
    let ry = dt / mesh.get_dy();
    let stride = mesh.stride();
    backend.map_cells(qn.as_mut_slice(), stride, &mesh.interior(), |x, y| {
        let div_x = f[(x, y)] - f[(x - 1, y)];
        let div_y = g[(x, y)] - g[(x, y - 1)];
        q0[(x, y)] * c0 + (qprev[(x, y)] - div_x * rx - div_y * ry) * c1
    });
}
