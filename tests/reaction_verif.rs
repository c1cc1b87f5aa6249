use approx::assert_relative_eq;

use thc_rs::numerics::solver::SolverError;
use thc_rs::numerics::transient::TransientSolver;
use thc_rs::physics::parameters::GAS_CONSTANT;
use thc_rs::physics::problem::{
    MaterialType, PropertyLaw, PyrolysisKinetics, ThermalProperties, pmma_demo_problem,
};
use thc_rs::processing::summary::SimulationSummary;

fn mild_kinetics(heat_reaction: f64) -> PyrolysisKinetics {
    PyrolysisKinetics {
        pre_exp_factor: 1e5,
        activation_energy: 1e5,
        heat_reaction,
        reaction_order: 1.0,
    }
}

#[test]
fn inert_material_never_reacts() {
    let solution = TransientSolver::default()
        .solve(&pmma_demo_problem())
        .unwrap();
    assert!(solution.sample.omega_dots.iter().all(|&w| w == 0.0));
    assert!(solution.sample.g_dots.iter().all(|&g| g == 0.0));
}

#[test]
fn reaction_rate_follows_arrhenius() {
    let mut problem = pmma_demo_problem();
    problem.material_type = MaterialType::Reactive(mild_kinetics(1e5));
    let solution = TransientSolver::default().solve(&problem).unwrap();
    let sample = &solution.sample;

    let t = sample.num_steps() / 2;
    let temperature = sample.temperatures[(0, t)];
    let expected = 1196.0 * 1e5 * (-1e5 / (GAS_CONSTANT * temperature)).exp();
    assert_relative_eq!(sample.omega_dots[(0, t)], expected, max_relative = 1e-12);
    assert_relative_eq!(sample.g_dots[(0, t)], expected * 1e5, max_relative = 1e-12);

    // hotter surface reacts faster than the cold interior
    assert!(sample.omega_dots[(0, t)] > sample.omega_dots[(50, t)]);

    let summary = SimulationSummary::from_solution(&solution);
    assert!(summary.peak_reaction_rate.unwrap() >= sample.omega_dots[(0, t)]);
}

#[test]
fn heat_of_reaction_sign_sets_the_direction() {
    let solver = TransientSolver::default();
    let inert = solver.solve(&pmma_demo_problem()).unwrap();

    let mut problem = pmma_demo_problem();
    problem.material_type = MaterialType::Reactive(mild_kinetics(1e6));
    let endothermic = solver.solve(&problem).unwrap();

    problem.material_type = MaterialType::Reactive(mild_kinetics(-1e6));
    let exothermic = solver.solve(&problem).unwrap();

    let surface = |s: &thc_rs::models::solution::Solution| s.final_temperatures()[0];
    assert!(surface(&endothermic) < surface(&inert));
    assert!(surface(&exothermic) > surface(&inert));
}

#[test]
fn runaway_rate_aborts_with_the_step() {
    let mut problem = pmma_demo_problem();
    problem.material_type = MaterialType::Reactive(PyrolysisKinetics {
        pre_exp_factor: 1e300,
        activation_energy: 0.0,
        heat_reaction: 1e10,
        reaction_order: 1.0,
    });

    let err = TransientSolver::default().solve(&problem).unwrap_err();
    assert!(matches!(err, SolverError::NonFinite { step: 0, .. }));
    assert_eq!(err.step(), Some(0));
    assert!(err.to_string().contains("time step 0"));
}

#[test]
fn temperature_dependent_properties_evolve() {
    let mut problem = pmma_demo_problem();
    problem.properties = ThermalProperties::TemperatureDependent {
        conductivity: PropertyLaw {
            base: 0.2,
            exponent: 0.5,
        },
        density: PropertyLaw::constant(1196.0),
        heat_capacity: PropertyLaw {
            base: 1549.0,
            exponent: 0.7,
        },
    };
    let solution = TransientSolver::default().solve(&problem).unwrap();
    let sample = &solution.sample;
    let last = sample.num_steps() - 1;

    let t_surface = sample.temperatures[(0, last - 1)];
    assert_relative_eq!(
        sample.conductivity[(0, last)],
        0.2 * (t_surface / 300.0).powf(0.5),
        max_relative = 1e-12
    );
    assert!(sample.heat_capacity[(0, last)] > 1549.0);
    // the hot surface has a conductivity gradient, so the correction is active
    assert!(sample.upsilon[(1, last - 1)] > 0.0);
    assert!(solution.final_temperatures().iter().all(|t| t.is_finite()));

    let constant = TransientSolver::default()
        .solve(&pmma_demo_problem())
        .unwrap();
    assert!(
        (solution.final_temperatures()[0] - constant.final_temperatures()[0]).abs() > 1.0
    );
}
