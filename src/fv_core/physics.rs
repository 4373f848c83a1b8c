extern crate nalgebra as na;

/// Conserved variables of one cell.
pub type State<const D: usize> = na::SVector<f64, D>;

/// Depths below this are treated as dry: velocities vanish instead of dividing by ~0.
pub const DRY_DEPTH: f64 = 1e-10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    X,
    Y,
}

//TRAITS
/// The physical system being solved. This is the only place the solver core
/// knows the difference between shallow water and gas dynamics.
pub trait ConservationLaw<const D: usize>: Sync {
    const NAME: &'static str;

    fn component_names(&self) -> [&'static str; D];

    fn flux(&self, q: &State<D>, dir: Direction) -> State<D>;

    /// Slowest and fastest signal speed normal to `dir`.
    fn wave_speeds(&self, q: &State<D>, dir: Direction) -> (f64, f64);

    /// Largest local signal speed over both directions.
    fn max_speed(&self, q: &State<D>) -> f64;

    /// State seen through a wall normal to `dir`.
    fn mirror(&self, q: &State<D>, dir: Direction) -> State<D>;

    fn is_admissible(&self, q: &State<D>) -> bool;
}

//STRUCTS
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShallowWater {
    pub g: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Euler {
    pub gamma: f64,
}

//HELPER FUNCTIONS
/// Total energy of an ideal gas: `0.5 * rho * (u^2 + v^2) + p / (gamma - 1)`.
pub fn total_energy(rho: f64, u: f64, v: f64, gamma: f64, p: f64) -> f64 {
    0.5 * rho * (u * u + v * v) + p / (gamma - 1.0)
}

//IMPLEMENTATIONS
impl ShallowWater {
    pub fn state(h: f64, u: f64, v: f64) -> State<3> {
        State::<3>::new(h, h * u, h * v)
    }

    fn velocity(&self, q: &State<3>) -> (f64, f64) {
        if q[0] > DRY_DEPTH {
            (q[1] / q[0], q[2] / q[0])
        } else {
            (0.0, 0.0)
        }
    }

    fn celerity(&self, h: f64) -> f64 {
        (self.g * h.max(0.0)).sqrt()
    }
}

impl ConservationLaw<3> for ShallowWater {
    const NAME: &'static str = "shallow water";

    fn component_names(&self) -> [&'static str; 3] {
        ["h", "hu", "hv"]
    }

    fn flux(&self, q: &State<3>, dir: Direction) -> State<3> {
        let h = q[0];
        let (u, v) = self.velocity(q);
        let p = 0.5 * self.g * h * h;
        match dir {
            Direction::X => State::<3>::new(q[1], q[1] * u + p, q[2] * u),
            Direction::Y => State::<3>::new(q[2], q[1] * v, q[2] * v + p),
        }
    }

    fn wave_speeds(&self, q: &State<3>, dir: Direction) -> (f64, f64) {
        let (u, v) = self.velocity(q);
        let c = self.celerity(q[0]);
        let un = match dir {
            Direction::X => u,
            Direction::Y => v,
        };
        (un - c, un + c)
    }

    fn max_speed(&self, q: &State<3>) -> f64 {
        let (u, v) = self.velocity(q);
        u.abs().max(v.abs()) + self.celerity(q[0])
    }

    fn mirror(&self, q: &State<3>, dir: Direction) -> State<3> {
        match dir {
            Direction::X => State::<3>::new(q[0], -q[1], q[2]),
            Direction::Y => State::<3>::new(q[0], q[1], -q[2]),
        }
    }

    fn is_admissible(&self, q: &State<3>) -> bool {
        q.iter().all(|v| v.is_finite()) && q[0] >= 0.0
    }
}

impl Euler {
    pub fn state(&self, rho: f64, u: f64, v: f64, p: f64) -> State<4> {
        State::<4>::new(rho, rho * u, rho * v, total_energy(rho, u, v, self.gamma, p))
    }

    pub fn pressure(&self, q: &State<4>) -> f64 {
        (self.gamma - 1.0) * (q[3] - 0.5 * (q[1] * q[1] + q[2] * q[2]) / q[0])
    }

    pub fn sound_speed(&self, q: &State<4>) -> f64 {
        (self.gamma * self.pressure(q) / q[0]).sqrt()
    }
}

impl ConservationLaw<4> for Euler {
    const NAME: &'static str = "euler";

    fn component_names(&self) -> [&'static str; 4] {
        ["rho", "rho_u", "rho_v", "E"]
    }

    fn flux(&self, q: &State<4>, dir: Direction) -> State<4> {
        let u = q[1] / q[0];
        let v = q[2] / q[0];
        let p = self.pressure(q);
        match dir {
            Direction::X => State::<4>::new(q[1], q[1] * u + p, q[2] * u, u * (q[3] + p)),
            Direction::Y => State::<4>::new(q[2], q[1] * v, q[2] * v + p, v * (q[3] + p)),
        }
    }

    fn wave_speeds(&self, q: &State<4>, dir: Direction) -> (f64, f64) {
        let c = self.sound_speed(q);
        let un = match dir {
            Direction::X => q[1] / q[0],
            Direction::Y => q[2] / q[0],
        };
        (un - c, un + c)
    }

    fn max_speed(&self, q: &State<4>) -> f64 {
        let u = q[1] / q[0];
        let v = q[2] / q[0];
        u.abs().max(v.abs()) + self.sound_speed(q)
    }

    fn mirror(&self, q: &State<4>, dir: Direction) -> State<4> {
        match dir {
            Direction::X => State::<4>::new(q[0], -q[1], q[2], q[3]),
            Direction::Y => State::<4>::new(q[0], q[1], -q[2], q[3]),
        }
    }

    fn is_admissible(&self, q: &State<4>) -> bool {
        q.iter().all(|v| v.is_finite()) && q[0] > 0.0 && q[3] > 0.0 && self.pressure(q) > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_and_pressure_agree() {
        let law = Euler { gamma: 1.4 };
        let q = law.state(0.5197, -0.7259, 0.3, 0.4);
        assert!((law.pressure(&q) - 0.4).abs() < 1e-12);
        let e = 0.5 * 0.5197 * (0.7259f64.powi(2) + 0.09) + 0.4 / 0.4;
        assert!((q[3] - e).abs() < 1e-12);
    }

    #[test]
    fn shallow_water_flux_at_rest_is_hydrostatic() {
        let law = ShallowWater { g: 9.81 };
        let q = ShallowWater::state(2.0, 0.0, 0.0);
        let f = law.flux(&q, Direction::X);
        assert_eq!(f, State::<3>::new(0.0, 0.5 * 9.81 * 4.0, 0.0));
        let g = law.flux(&q, Direction::Y);
        assert_eq!(g, State::<3>::new(0.0, 0.0, 0.5 * 9.81 * 4.0));
    }

    #[test]
    fn max_speed_takes_faster_direction() {
        let law = ShallowWater { g: 9.81 };
        let q = ShallowWater::state(1.0, 0.5, -2.0);
        assert!((law.max_speed(&q) - (2.0 + 9.81f64.sqrt())).abs() < 1e-12);

        let gas = Euler { gamma: 1.4 };
        let q = gas.state(1.0, 3.0, 1.0, 1.0);
        assert!((gas.max_speed(&q) - (3.0 + 1.4f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn dry_cells_have_no_velocity() {
        let law = ShallowWater { g: 9.81 };
        let q = State::<3>::new(0.0, 1e-3, 1e-3);
        assert_eq!(law.max_speed(&q), 0.0);
        assert!(law.flux(&q, Direction::X).iter().all(|v| v.is_finite()));
    }

    #[test]
    fn mirror_negates_normal_momentum() {
        let gas = Euler { gamma: 1.4 };
        let q = gas.state(1.0, 2.0, 3.0, 1.0);
        let m = gas.mirror(&q, Direction::Y);
        assert_eq!(m[1], q[1]);
        assert_eq!(m[2], -q[2]);
        assert_eq!(gas.pressure(&m), gas.pressure(&q));
    }

    #[test]
    fn admissibility() {
        let gas = Euler { gamma: 1.4 };
        assert!(gas.is_admissible(&gas.state(1.0, 0.0, 0.0, 1.0)));
        assert!(!gas.is_admissible(&State::<4>::new(-1.0, 0.0, 0.0, 1.0)));
        assert!(!gas.is_admissible(&State::<4>::new(1.0, 10.0, 0.0, 1.0)));
        let sw = ShallowWater { g: 9.81 };
        assert!(!sw.is_admissible(&State::<3>::new(f64::NAN, 0.0, 0.0)));
    }
}
