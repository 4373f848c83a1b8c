//! Master list of the initial conditions that can be selected by name.

use crate::config::PhysicsKind;
use crate::error::{SolverError, SolverResult};
use crate::fv_core::condition::{BoundaryCondition, InitialCondition};
use crate::fv_core::initial;
use crate::fv_core::mesh::{Grid2d, Mesh};
use crate::fv_core::physics::Euler;
use crate::fv_core::reconstruction::SlopeLimiter;

type EulerSetup = fn(Euler, &Grid2d) -> Box<dyn InitialCondition<4>>;
type ShallowWaterSetup = fn() -> Box<dyn InitialCondition<3>>;

enum SetupFunction {
    Euler(EulerSetup),
    ShallowWater(ShallowWaterSetup),
}

/// Scheme choices a setup needs to run. Unset fields fall back to the
/// physics defaults, and anything set in the configuration wins over both.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SetupDefaults {
    pub cfl: Option<f64>,
    pub boundary: Option<BoundaryCondition>,
    pub limiter: Option<SlopeLimiter>,
}

struct Setup {
    name: &'static str,
    function: SetupFunction,
    defaults: SetupDefaults,
}

impl SetupFunction {
    fn physics(&self) -> PhysicsKind {
        match self {
            SetupFunction::Euler(_) => PhysicsKind::Euler,
            SetupFunction::ShallowWater(_) => PhysicsKind::ShallowWater,
        }
    }
}

impl Setup {
    fn new(name: &'static str, function: SetupFunction) -> Self {
        Setup {
            name,
            function,
            defaults: SetupDefaults::default(),
        }
    }

    fn with_defaults(mut self, defaults: SetupDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

fn setups() -> Vec<Setup> {
    vec![
        Setup::new("circular_dam", SetupFunction::ShallowWater(circular_dam)),
        Setup::new("flat", SetupFunction::ShallowWater(flat)),
        Setup::new("riemann", SetupFunction::Euler(riemann)),
        // the driven column is a 10^4 pressure jump; central slopes overshoot
        // to negative pressure on the first step
        Setup::new("shock_bubble", SetupFunction::Euler(shock_bubble)).with_defaults(
            SetupDefaults {
                limiter: Some(SlopeLimiter::Minmod),
                ..SetupDefaults::default()
            },
        ),
        Setup::new("uniform_gas", SetupFunction::Euler(uniform_gas)),
    ]
}

fn riemann(law: Euler, _mesh: &Grid2d) -> Box<dyn InitialCondition<4>> {
    Box::new(initial::riemann_four_quadrant(law))
}

fn shock_bubble(law: Euler, mesh: &Grid2d) -> Box<dyn InitialCondition<4>> {
    Box::new(initial::shock_bubble(law, mesh.get_dx()))
}

fn uniform_gas(law: Euler, _mesh: &Grid2d) -> Box<dyn InitialCondition<4>> {
    Box::new(initial::uniform_gas(law))
}

fn flat() -> Box<dyn InitialCondition<3>> {
    Box::new(initial::flat_surface())
}

fn circular_dam() -> Box<dyn InitialCondition<3>> {
    Box::new(initial::circular_dam())
}

/// Comma-separated list of every setup name.
pub fn known_setups() -> String {
    setups()
        .into_iter()
        .map(|setup| setup.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn find(name: &str) -> SolverResult<Setup> {
    setups()
        .into_iter()
        .find(|setup| setup.name == name)
        .ok_or_else(|| SolverError::UnknownSetup {
            name: name.to_string(),
            known: known_setups(),
        })
}

/// Physics the named setup is defined for.
pub fn setup_physics(name: &str) -> SolverResult<PhysicsKind> {
    Ok(find(name)?.function.physics())
}

pub fn setup_defaults(name: &str) -> SolverResult<SetupDefaults> {
    Ok(find(name)?.defaults)
}

fn mismatch(name: &str, expected: PhysicsKind, found: PhysicsKind) -> SolverError {
    SolverError::PhysicsMismatch {
        setup: name.to_string(),
        expected: expected.name(),
        found: found.name(),
    }
}

pub fn make_euler_setup(
    name: &str,
    law: Euler,
    mesh: &Grid2d,
) -> SolverResult<Box<dyn InitialCondition<4>>> {
    match find(name)?.function {
        SetupFunction::Euler(f) => Ok(f(law, mesh)),
        other => Err(mismatch(name, other.physics(), PhysicsKind::Euler)),
    }
}

pub fn make_shallow_water_setup(name: &str) -> SolverResult<Box<dyn InitialCondition<3>>> {
    match find(name)?.function {
        SetupFunction::ShallowWater(f) => Ok(f()),
        other => Err(mismatch(name, other.physics(), PhysicsKind::ShallowWater)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_setup_lists_known_names() {
        match make_shallow_water_setup("tsunami") {
            Err(SolverError::UnknownSetup { name, known }) => {
                assert_eq!(name, "tsunami");
                assert!(known.contains("circular_dam"));
                assert!(known.contains("riemann"));
            }
            _ => panic!("expected UnknownSetup"),
        }
    }

    #[test]
    fn physics_must_match() {
        let mesh = Grid2d::new(4, 4).unwrap();
        assert!(matches!(
            make_euler_setup("flat", Euler { gamma: 1.4 }, &mesh),
            Err(SolverError::PhysicsMismatch { expected: "shallow water", .. })
        ));
        assert!(make_shallow_water_setup("riemann").is_err());
        assert_eq!(setup_physics("shock_bubble").unwrap(), PhysicsKind::Euler);
    }

    #[test]
    fn every_setup_builds() {
        let mesh = Grid2d::new(8, 8).unwrap();
        let law = Euler { gamma: 1.4 };
        for setup in setups() {
            let name = setup.name;
            match setup.function {
                SetupFunction::Euler(_) => {
                    let init = make_euler_setup(name, law, &mesh).unwrap();
                    assert!(init.compute(&mesh, 5, 5)[0] > 0.0);
                }
                SetupFunction::ShallowWater(_) => {
                    let init = make_shallow_water_setup(name).unwrap();
                    assert!(init.compute(&mesh, 5, 5)[0] > 0.0);
                }
            }
        }
    }

    #[test]
    fn shock_bubble_asks_for_a_limiter() {
        let defaults = setup_defaults("shock_bubble").unwrap();
        assert_eq!(defaults.limiter, Some(SlopeLimiter::Minmod));
        assert_eq!(defaults.cfl, None);
        assert_eq!(setup_defaults("riemann").unwrap(), SetupDefaults::default());
        assert!(setup_defaults("tsunami").is_err());
    }

    #[test]
    fn shock_column_is_one_cell_wide() {
        let mesh = Grid2d::new(16, 16).unwrap();
        let law = Euler { gamma: 1.4 };
        let init = make_euler_setup("shock_bubble", law, &mesh).unwrap();
        assert!((law.pressure(&init.compute(&mesh, 2, 3)) - 1000.0).abs() < 1e-9);
        assert!((law.pressure(&init.compute(&mesh, 3, 3)) - 0.1).abs() < 1e-9);
    }
}
