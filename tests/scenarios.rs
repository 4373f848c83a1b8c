use conserv_solver::fv_core::condition::{BoundaryCondition, PointwiseInit};
use conserv_solver::fv_core::flux::FluxScheme;
use conserv_solver::config::{PhysicsKind, SolverConfig};
use conserv_solver::fv_core::initial::{
    circular_dam, riemann_four_quadrant, shock_bubble, uniform_gas,
};
use conserv_solver::fv_core::mesh::Mesh;
use conserv_solver::fv_core::reconstruction::SlopeLimiter;
use conserv_solver::time_integrator::fvm_ssp_rk::RkOrder;
use conserv_solver::{
    run, Backend, BackendKind, Euler, Phase, Scheme, ShallowWater, Simulator, SolverError, State,
};

fn scheme(order: RkOrder, cfl: f64, boundary: BoundaryCondition) -> Scheme {
    Scheme {
        rk_order: order,
        cfl,
        boundary,
        flux: FluxScheme::CentralUpwind,
        limiter: SlopeLimiter::None,
    }
}

#[test]
fn uniform_shallow_water_is_a_fixed_point() {
    let init = PointwiseInit {
        f: |_: f64, _: f64| ShallowWater::state(1.0, 0.0, 0.0),
    };
    let mut sim = Simulator::<_, 3>::initialize(
        ShallowWater { g: 9.81 },
        4,
        4,
        scheme(RkOrder::FORWARD_EULER, 0.8, BoundaryCondition::Reflective),
        Backend::Serial,
        &init,
    )
    .unwrap();
    let before = sim.field().clone();

    let step = sim.advance_step().unwrap();
    assert!(step.dt.is_finite() && step.dt > 0.0);
    assert_eq!(step.step, 1);
    assert_eq!(sim.phase(), Phase::StepComplete);
    let after = sim.field();
    for (x, y) in sim.mesh().interior().cells() {
        for c in 0..3 {
            assert_eq!(after[(x, y)][c].to_bits(), before[(x, y)][c].to_bits());
        }
    }
}

#[test]
fn uniform_gas_stays_at_rest() {
    let law = Euler { gamma: 1.4 };
    for boundary in [BoundaryCondition::Outflow, BoundaryCondition::Reflective] {
        let init = uniform_gas(law);
        let mut sim = Simulator::<_, 4>::initialize(
            law,
            12,
            10,
            scheme(RkOrder::SSP_RK3, 0.5, boundary),
            Backend::Serial,
            &init,
        )
        .unwrap();
        let expected = law.state(1.0, 0.0, 0.0, 1.0);
        for _ in 0..20 {
            sim.advance_step().unwrap();
        }
        for (x, y) in sim.mesh().interior().cells() {
            let diff = sim.field()[(x, y)] - expected;
            assert!(diff.amax() < 1e-12);
        }
    }
}

#[test]
fn dam_break_conserves_mass() {
    let init = circular_dam();
    let mut sim = Simulator::<_, 3>::initialize(
        ShallowWater { g: 9.81 },
        32,
        32,
        scheme(RkOrder::SSP_RK3, 0.8, BoundaryCondition::Reflective),
        Backend::Serial,
        &init,
    )
    .unwrap();
    let mass = sim.totals()[0];
    for _ in 0..10 {
        let before = sim.totals()[0];
        sim.advance_step().unwrap();
        assert!((sim.totals()[0] - before).abs() < 1e-12);
    }
    assert!((sim.totals()[0] - mass).abs() < 1e-11);
    assert_eq!(sim.count_inadmissible(), 0);
}

#[test]
fn closed_box_conserves_gas_mass_and_energy() {
    let law = Euler { gamma: 1.4 };
    let init = PointwiseInit {
        f: move |x: f64, y: f64| {
            let r2 = (x - 0.4).powi(2) + (y - 0.6).powi(2);
            law.state(1.0 + 0.2 * (-30.0 * r2).exp(), 0.0, 0.0, 1.0 + 0.5 * (-30.0 * r2).exp())
        },
    };
    let mut sim = Simulator::<_, 4>::initialize(
        law,
        24,
        24,
        scheme(RkOrder::SSP_RK3, 0.5, BoundaryCondition::Reflective),
        Backend::Serial,
        &init,
    )
    .unwrap();
    let start = sim.totals();
    for _ in 0..15 {
        sim.advance_step().unwrap();
    }
    let end = sim.totals();
    assert!((end[0] - start[0]).abs() < 1e-12);
    assert!((end[3] - start[3]).abs() < 1e-12);
}

#[test]
fn riemann_problem_stays_admissible() {
    let law = Euler { gamma: 1.4 };
    let init = riemann_four_quadrant(law);
    let mut sim = Simulator::<_, 4>::initialize(
        law,
        128,
        128,
        scheme(RkOrder::SSP_RK3, 0.5, BoundaryCondition::Outflow),
        Backend::new(BackendKind::Parallel, None).unwrap(),
        &init,
    )
    .unwrap();
    for _ in 0..50 {
        sim.advance_step().unwrap();
    }
    assert_eq!(sim.step_count(), 50);
    assert!(sim.time() > 0.0);
    let q = sim.field();
    for (x, y) in sim.mesh().interior().cells() {
        let cell = q[(x, y)];
        assert!(cell.iter().all(|v| v.is_finite()));
        assert!(cell[0] > 0.0);
        assert!(cell[3] > 0.0);
    }
}

#[test]
fn serial_and_parallel_agree_bitwise() {
    let law = Euler { gamma: 1.4 };
    let run = |backend: Backend| {
        let init = riemann_four_quadrant(law);
        let mut sim = Simulator::<_, 4>::initialize(
            law,
            24,
            20,
            Scheme {
                limiter: SlopeLimiter::Minmod,
                ..scheme(RkOrder::SSP_RK2, 0.5, BoundaryCondition::Outflow)
            },
            backend,
            &init,
        )
        .unwrap();
        for _ in 0..3 {
            sim.advance_step().unwrap();
        }
        (sim.time(), sim.field().clone())
    };
    let (t_serial, serial) = run(Backend::Serial);
    let (t_parallel, parallel) = run(Backend::new(BackendKind::Parallel, Some(3)).unwrap());
    assert_eq!(t_serial.to_bits(), t_parallel.to_bits());
    assert_eq!(serial, parallel);
}

#[test]
fn dry_domain_is_reported_as_degenerate() {
    let init = PointwiseInit {
        f: |_: f64, _: f64| State::<3>::zeros(),
    };
    let mut sim = Simulator::<_, 3>::initialize(
        ShallowWater { g: 9.81 },
        4,
        4,
        scheme(RkOrder::SSP_RK2, 0.8, BoundaryCondition::Reflective),
        Backend::Serial,
        &init,
    )
    .unwrap();
    assert!(matches!(
        sim.advance_step(),
        Err(SolverError::DegenerateState { step: 0, .. })
    ));
    assert_eq!(sim.step_count(), 0);
    assert_eq!(sim.time(), 0.0);
}

#[test]
fn rk_orders_agree_on_short_times() {
    let law = ShallowWater { g: 9.81 };
    let mut finals = Vec::new();
    for order in [RkOrder::SSP_RK2, RkOrder::SSP_RK3] {
        let init = circular_dam();
        let mut sim = Simulator::<_, 3>::initialize(
            law,
            16,
            16,
            scheme(order, 0.4, BoundaryCondition::Reflective),
            Backend::Serial,
            &init,
        )
        .unwrap();
        sim.advance_step_capped(1e-3).unwrap();
        finals.push(sim.field().clone());
    }
    let mesh_cells = 16 + 4;
    let centre = (mesh_cells / 2, mesh_cells / 2);
    assert!((finals[0][centre][0] - finals[1][centre][0]).abs() < 1e-4);
}

#[test]
fn shock_bubble_runs_with_its_registered_scheme() {
    let dir = tempfile::tempdir().unwrap();
    let config = SolverConfig {
        physics: PhysicsKind::Euler,
        setup: Some("shock_bubble".into()),
        nx: 64,
        ny: 64,
        max_steps: 50,
        backend: BackendKind::Serial,
        output_dir: dir.path().to_path_buf(),
        ..SolverConfig::default()
    };
    let outcome = run::run(&config).unwrap();
    assert_eq!(outcome.summary.n, 50);
    assert!(outcome.summary.time > 0.0);
    assert_eq!(outcome.inadmissible_cells, 0);
}

#[test]
fn rejected_step_leaves_state_untouched() {
    let law = Euler { gamma: 1.4 };
    let init = shock_bubble(law, 1.0 / 64.0);
    let mut sim = Simulator::<_, 4>::initialize(
        law,
        64,
        64,
        scheme(RkOrder::SSP_RK3, 0.5, BoundaryCondition::Outflow),
        Backend::Serial,
        &init,
    )
    .unwrap();
    let before = sim.field().clone();

    let err = sim.advance_step().unwrap_err();
    assert!(matches!(
        err,
        SolverError::Inadmissible { step: 1, .. } | SolverError::NonFinite { step: 1, .. }
    ));
    assert_eq!(sim.step_count(), 0);
    assert_eq!(sim.time(), 0.0);
    assert_eq!(sim.phase(), Phase::Idle);
    for (x, y) in sim.mesh().interior().cells() {
        assert_eq!(sim.field()[(x, y)], before[(x, y)]);
    }
}
