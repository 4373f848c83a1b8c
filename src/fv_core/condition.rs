use crate::backend::Backend;
use crate::fv_core::field::Field;
use crate::fv_core::mesh::{Grid2d, Mesh, GHOST};
use crate::fv_core::physics::{ConservationLaw, Direction, State};
use crate::fv_core::quadrature::cell_average;
use serde::{Deserialize, Serialize};

//TRAITS
pub trait InitialCondition<const D: usize>: Sync {
    /// Conserved state of the padded cell `(x, y)`.
    fn compute(&self, mesh: &dyn Mesh, x: usize, y: usize) -> State<D>;
}

/// Fills the ghost halo from interior cells. Implementations must be a pure
/// function of the interior: prior ghost values never leak into the result.
pub trait BCEnforcer {
    fn enforce<L, const D: usize>(
        &self,
        law: &L,
        mesh: &Grid2d,
        backend: &Backend,
        q: &mut Field<State<D>>,
    ) where
        L: ConservationLaw<D>;
}

//STRUCTS for initial
/// Samples `f` at cell centres.
pub struct PointwiseInit<F> {
    pub f: F,
}

/// Averages `f` over each cell with a `points` x `points` Gauss-Legendre rule.
pub struct CellAverageInit<F> {
    pub f: F,
    pub points: usize,
}

//STRUCTS for boundary
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryCondition {
    /// Ghost cell `d` mirrors interior cell `d` with the normal momentum negated.
    Reflective,
    /// Both ghost layers copy the first interior layer.
    Outflow,
}

//IMPLEMENTATIONS for initial
impl<F, const D: usize> InitialCondition<D> for PointwiseInit<F>
where
    F: Fn(f64, f64) -> State<D> + Sync,
{
    fn compute(&self, mesh: &dyn Mesh, x: usize, y: usize) -> State<D> {
        let (cx, cy) = mesh.get_cell(x, y);
        (self.f)(cx, cy)
    }
}

impl<F, const D: usize> InitialCondition<D> for CellAverageInit<F>
where
    F: Fn(f64, f64) -> State<D> + Sync,
{
    fn compute(&self, mesh: &dyn Mesh, x: usize, y: usize) -> State<D> {
        let (cx, cy) = mesh.get_cell(x, y);
        let hx = 0.5 * mesh.get_dx();
        let hy = 0.5 * mesh.get_dy();
        cell_average((cx - hx, cx + hx), (cy - hy, cy + hy), self.points, &self.f)
    }
}

//IMPLEMENTATION for boundary
impl BoundaryCondition {
    /// Depth of the interior cell feeding ghost layer `depth` (1 = next to the edge).
    fn source_depth(&self, depth: usize) -> usize {
        match self {
            BoundaryCondition::Reflective => depth,
            BoundaryCondition::Outflow => 1,
        }
    }

    fn ghost<L, const D: usize>(&self, law: &L, q: &State<D>, dir: Direction) -> State<D>
    where
        L: ConservationLaw<D>,
    {
        match self {
            BoundaryCondition::Reflective => law.mirror(q, dir),
            BoundaryCondition::Outflow => *q,
        }
    }

    fn copy_row<L, const D: usize>(
        &self,
        law: &L,
        data: &mut [State<D>],
        stride: usize,
        src: usize,
        dst: usize,
    ) where
        L: ConservationLaw<D>,
    {
        let (src_row, dst_row) = if src < dst {
            let (head, tail) = data.split_at_mut(dst * stride);
            (&head[src * stride..(src + 1) * stride], &mut tail[..stride])
        } else {
            let (head, tail) = data.split_at_mut(src * stride);
            (&tail[..stride], &mut head[dst * stride..(dst + 1) * stride])
        };
        for (d, s) in dst_row.iter_mut().zip(src_row) {
            *d = self.ghost(law, s, Direction::Y);
        }
    }
}

impl BCEnforcer for BoundaryCondition {
    fn enforce<L, const D: usize>(
        &self,
        law: &L,
        mesh: &Grid2d,
        backend: &Backend,
        q: &mut Field<State<D>>,
    ) where
        L: ConservationLaw<D>,
    {
        let nx = mesh.nx();
        let ny = mesh.ny();
        let stride = mesh.stride();

        // x first over every row, then y over every column: corners end up
        // holding the y-boundary values.
        backend.for_each_row(q.as_mut_slice(), stride, 0..mesh.rows(), |_, row| {
            for depth in 1..=GHOST {
                let s = self.source_depth(depth);
                let west = self.ghost(law, &row[GHOST - 1 + s], Direction::X);
                row[GHOST - depth] = west;
                let east = self.ghost(law, &row[nx + GHOST - s], Direction::X);
                row[nx + GHOST - 1 + depth] = east;
            }
        });

        let data = q.as_mut_slice();
        for depth in 1..=GHOST {
            let s = self.source_depth(depth);
            self.copy_row(law, data, stride, GHOST - 1 + s, GHOST - depth);
            self.copy_row(law, data, stride, ny + GHOST - s, ny + GHOST - 1 + depth);
        }
    }
}

/// Writes the initial condition into the interior and fills the halo.
pub fn initialize_mesh<L, B, const D: usize>(
    law: &L,
    mesh: &Grid2d,
    backend: &Backend,
    init: &dyn InitialCondition<D>,
    bc: &B,
    q: &mut Field<State<D>>,
) where
    L: ConservationLaw<D>,
    B: BCEnforcer,
{
    let stride = q.stride();
    backend.map_cells(q.as_mut_slice(), stride, &mesh.interior(), |x, y| {
        init.compute(mesh, x, y)
    });
    bc.enforce(law, mesh, backend, q);
}
