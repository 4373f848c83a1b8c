use crate::fv_core::condition::{CellAverageInit, PointwiseInit};
use crate::fv_core::physics::{Euler, ShallowWater, State};

pub type InitFn<const D: usize> = Box<dyn Fn(f64, f64) -> State<D> + Send + Sync>;

/// Quadrature points per axis for discontinuous data.
const AVERAGE_POINTS: usize = 2;

fn inside_circle(x: f64, y: f64, (cx, cy): (f64, f64), radius: f64) -> bool {
    let dx = x - cx;
    let dy = y - cy;
    (dx * dx + dy * dy).sqrt() <= radius
}

/// Gas at rest with unit density and pressure.
pub fn uniform_gas(law: Euler) -> PointwiseInit<InitFn<4>> {
    PointwiseInit {
        f: Box::new(move |_, _| law.state(1.0, 0.0, 0.0, 1.0)),
    }
}

/// Four constant states meeting at the centre of the domain.
pub fn riemann_four_quadrant(law: Euler) -> CellAverageInit<InitFn<4>> {
    let ne = law.state(1.0, 0.0, 0.0, 1.0);
    let nw = law.state(0.5197, -0.7259, 0.0, 0.4);
    let sw = law.state(1.0, -0.7259, -0.7259, 1.0);
    let se = law.state(0.5197, 0.0, -0.7259, 0.4);
    CellAverageInit {
        f: Box::new(move |x, y| match (x >= 0.5, y >= 0.5) {
            (true, true) => ne,
            (false, true) => nw,
            (false, false) => sw,
            (true, false) => se,
        }),
        points: AVERAGE_POINTS,
    }
}

/// A dense bubble in thin gas, hit by a strong shock driven in from the west
/// edge. `shock_width` is the width of the driven column, normally one cell.
pub fn shock_bubble(law: Euler, shock_width: f64) -> CellAverageInit<InitFn<4>> {
    let background = law.state(0.1, 0.0, 0.0, 0.1);
    let bubble = law.state(1.0, 0.0, 0.0, 1.0);
    let shock = law.state(1.0, 10.0, 0.0, 1000.0);
    CellAverageInit {
        f: Box::new(move |x, y| {
            if x < shock_width {
                shock
            } else if inside_circle(x, y, (0.3, 0.5), 0.2) {
                bubble
            } else {
                background
            }
        }),
        points: AVERAGE_POINTS,
    }
}

/// Still water of unit depth.
pub fn flat_surface() -> PointwiseInit<InitFn<3>> {
    PointwiseInit {
        f: Box::new(|_, _| ShallowWater::state(1.0, 0.0, 0.0)),
    }
}

/// A raised column of water released at the centre of the basin.
pub fn circular_dam() -> CellAverageInit<InitFn<3>> {
    CellAverageInit {
        f: Box::new(|x, y| {
            let h = if inside_circle(x, y, (0.5, 0.5), 0.2) {
                2.0
            } else {
                1.0
            };
            ShallowWater::state(h, 0.0, 0.0)
        }),
        points: AVERAGE_POINTS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fv_core::condition::InitialCondition;
    use crate::fv_core::mesh::Grid2d;

    #[test]
    fn quadrants_land_on_cells() {
        let law = Euler { gamma: 1.4 };
        let mesh = Grid2d::new(8, 8).unwrap();
        let init = riemann_four_quadrant(law);
        // padded (9, 9) is interior (7, 7): north-east
        assert!((init.compute(&mesh, 9, 9)[0] - 1.0).abs() < 1e-12);
        assert!((law.pressure(&init.compute(&mesh, 2, 9)) - 0.4).abs() < 1e-12);
        let sw = init.compute(&mesh, 2, 2);
        assert!((sw[1] + 0.7259).abs() < 1e-12);
        assert!((sw[2] + 0.7259).abs() < 1e-12);
        let se = init.compute(&mesh, 9, 2);
        assert!((se[0] - 0.5197).abs() < 1e-12);
        assert!(se[1].abs() < 1e-12);
    }

    #[test]
    fn flat_surface_is_exact() {
        let mesh = Grid2d::new(4, 4).unwrap();
        let q = flat_surface().compute(&mesh, 3, 4);
        assert_eq!(q, State::<3>::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn dam_edge_cells_are_averaged() {
        let mesh = Grid2d::new(10, 10).unwrap();
        let init = circular_dam();
        let centre = init.compute(&mesh, 6, 6);
        assert!((centre[0] - 2.0).abs() < 1e-12);
        let corner = init.compute(&mesh, 2, 2);
        assert!((corner[0] - 1.0).abs() < 1e-12);
    }
}
