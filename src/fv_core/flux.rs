use crate::backend::Backend;
use crate::fv_core::field::Field;
use crate::fv_core::mesh::Grid2d;
use crate::fv_core::physics::{ConservationLaw, Direction, State};
use crate::fv_core::reconstruction::face_values;
use serde::{Deserialize, Serialize};

pub trait FluxFunction {
    /// Numerical flux through a face with `ql` on its low side and `qr` on its high side.
    fn num_flux<L, const D: usize>(
        &self,
        law: &L,
        ql: &State<D>,
        qr: &State<D>,
        dir: Direction,
    ) -> State<D>
    where
        L: ConservationLaw<D>;
}

/// Kurganov-Tadmor central-upwind flux built from one-sided local speeds.
pub struct CentralUpwindFlux;

/// Local Lax-Friedrichs flux with the largest speed on either side.
pub struct RusanovFlux;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluxScheme {
    #[default]
    CentralUpwind,
    Rusanov,
}

impl FluxFunction for CentralUpwindFlux {
    fn num_flux<L, const D: usize>(
        &self,
        law: &L,
        ql: &State<D>,
        qr: &State<D>,
        dir: Direction,
    ) -> State<D>
    where
        L: ConservationLaw<D>,
    {
        let (l_min, l_max) = law.wave_speeds(ql, dir);
        let (r_min, r_max) = law.wave_speeds(qr, dir);
        let a_plus = l_max.max(r_max).max(0.0);
        let a_minus = l_min.min(r_min).min(0.0);
        let f_l = law.flux(ql, dir);
        let f_r = law.flux(qr, dir);

        let spread = a_plus - a_minus;
        if spread <= f64::EPSILON {
            return (f_l + f_r) * 0.5;
        }
        (f_l * a_plus - f_r * a_minus + (qr - ql) * (a_plus * a_minus)) / spread
    }
}

impl FluxFunction for RusanovFlux {
    fn num_flux<L, const D: usize>(
        &self,
        law: &L,
        ql: &State<D>,
        qr: &State<D>,
        dir: Direction,
    ) -> State<D>
    where
        L: ConservationLaw<D>,
    {
        let (l_min, l_max) = law.wave_speeds(ql, dir);
        let (r_min, r_max) = law.wave_speeds(qr, dir);
        let a = l_min.abs().max(l_max.abs()).max(r_min.abs()).max(r_max.abs());
        (law.flux(ql, dir) + law.flux(qr, dir)) * 0.5 - (qr - ql) * (0.5 * a)
    }
}

impl FluxFunction for FluxScheme {
    fn num_flux<L, const D: usize>(
        &self,
        law: &L,
        ql: &State<D>,
        qr: &State<D>,
        dir: Direction,
    ) -> State<D>
    where
        L: ConservationLaw<D>,
    {
        match self {
            FluxScheme::CentralUpwind => CentralUpwindFlux.num_flux(law, ql, qr, dir),
            FluxScheme::Rusanov => RusanovFlux.num_flux(law, ql, qr, dir),
        }
    }
}

/// Fills `f` with the flux through the east face and `g` with the flux
/// through the north face of every cell in the flux region.
#[allow(clippy::too_many_arguments)]
pub fn evaluate_fluxes<L, F, const D: usize>(
    backend: &Backend,
    mesh: &Grid2d,
    law: &L,
    scheme: &F,
    q: &Field<State<D>>,
    sx: &Field<State<D>>,
    sy: &Field<State<D>>,
    f: &mut Field<State<D>>,
    g: &mut Field<State<D>>,
) where
    L: ConservationLaw<D>,
    F: FluxFunction + Sync,
{
    let region = mesh.flux_region();
    let stride = mesh.stride();
    backend.map_cells(f.as_mut_slice(), stride, &region, |x, y| {
        let (_, ql) = face_values(&q[(x, y)], &sx[(x, y)]);
        let (qr, _) = face_values(&q[(x + 1, y)], &sx[(x + 1, y)]);
        scheme.num_flux(law, &ql, &qr, Direction::X)
    });
    backend.map_cells(g.as_mut_slice(), stride, &region, |x, y| {
        let (_, ql) = face_values(&q[(x, y)], &sy[(x, y)]);
        let (qr, _) = face_values(&q[(x, y + 1)], &sy[(x, y + 1)]);
        scheme.num_flux(law, &ql, &qr, Direction::Y)
    });
}
