use crate::backend::Backend;
use crate::fv_core::field::Field;
use crate::fv_core::mesh::Grid2d;
use crate::fv_core::physics::State;
use serde::{Deserialize, Serialize};

//TRAITS
pub trait Limiter {
    fn limit(&self, a: f64, b: f64) -> f64;
}

//STRUCTS
// Limiters
pub struct McLimiter;
pub struct MinmodLimiter;
pub struct VanLeerLimiter;

/// Slope used for the piecewise-linear reconstruction. `None` is the plain
/// central difference `0.5 * (q[i+1] - q[i-1])`, which oscillates at shocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlopeLimiter {
    #[default]
    None,
    Minmod,
    Mc,
    VanLeer,
}

//IMPLEMENTATION
impl Limiter for McLimiter {
    fn limit(&self, a: f64, b: f64) -> f64 {
        if a * b <= 0.0 {
            return 0.0;
        }
        let centred = 0.5 * (a + b).abs();
        a.signum() * centred.min(2.0 * a.abs()).min(2.0 * b.abs())
    }
}

impl Limiter for MinmodLimiter {
    fn limit(&self, a: f64, b: f64) -> f64 {
        if a * b <= 0.0 {
            return 0.0;
        }
        a.signum() * a.abs().min(b.abs())
    }
}

impl Limiter for VanLeerLimiter {
    fn limit(&self, a: f64, b: f64) -> f64 {
        let denom = a.abs() + b.abs();
        if denom == 0.0 {
            return 0.0;
        }
        (a.signum() + b.signum()) * (a * b) / denom
    }
}

impl SlopeLimiter {
    /// Slope across the centre cell from its two neighbours.
    pub fn slope<const D: usize>(
        &self,
        left: &State<D>,
        centre: &State<D>,
        right: &State<D>,
    ) -> State<D> {
        match self {
            SlopeLimiter::None => (right - left) * 0.5,
            SlopeLimiter::Minmod => limited(&MinmodLimiter, left, centre, right),
            SlopeLimiter::Mc => limited(&McLimiter, left, centre, right),
            SlopeLimiter::VanLeer => limited(&VanLeerLimiter, left, centre, right),
        }
    }
}

//HELPER FUNCTIONS
fn limited<L: Limiter, const D: usize>(
    limiter: &L,
    left: &State<D>,
    centre: &State<D>,
    right: &State<D>,
) -> State<D> {
    State::<D>::from_fn(|i, _| limiter.limit(right[i] - centre[i], centre[i] - left[i]))
}

/// Values of the reconstructed linear profile on the low and high faces.
pub fn face_values<const D: usize>(q: &State<D>, slope: &State<D>) -> (State<D>, State<D>) {
    let half = slope * 0.5;
    (q - half, q + half)
}

/// Computes `sx` and `sy` from `q` over the interior plus one ghost layer.
pub fn reconstruct<const D: usize>(
    backend: &Backend,
    mesh: &Grid2d,
    limiter: SlopeLimiter,
    q: &Field<State<D>>,
    sx: &mut Field<State<D>>,
    sy: &mut Field<State<D>>,
) {
    let region = mesh.reconstruction_region();
    let stride = mesh.stride();
    backend.map_cells(sx.as_mut_slice(), stride, &region, |x, y| {
        limiter.slope(&q[(x - 1, y)], &q[(x, y)], &q[(x + 1, y)])
    });
    backend.map_cells(sy.as_mut_slice(), stride, &region, |x, y| {
        limiter.slope(&q[(x, y - 1)], &q[(x, y)], &q[(x, y + 1)])
    });
}
