use approx::assert_relative_eq;

use thc_rs::numerics::transient::TransientSolver;
use thc_rs::physics::bc::{BackCondition, IncidentHeatFlux, SurfaceCondition, SurfaceLosses};
use thc_rs::physics::problem::{InitialTemperature, ProblemDescription, pmma_demo_problem};
use thc_rs::processing::analytical::{dirichlet_profile, neumann_profile};

const ALPHA: f64 = 0.2 / (1196.0 * 1549.0);

fn with_surface(surface: SurfaceCondition, time_total: f64) -> ProblemDescription {
    let mut problem = pmma_demo_problem();
    problem.geometry.time_total = time_total;
    problem.boundcond_surface = surface;
    problem
}

#[test]
fn dirichlet_surface_is_held_exactly() {
    let problem = with_surface(
        SurfaceCondition::Dirichlet {
            temperature_surface: 800.0,
        },
        20.0,
    );
    let solution = TransientSolver::default().solve(&problem).unwrap();
    let surface = solution.surface_temperatures();

    assert_eq!(surface[0], 288.0);
    assert!(surface.iter().skip(1).all(|&t| t == 800.0));
}

#[test]
fn dirichlet_step_matches_erf_solution() {
    let problem = with_surface(
        SurfaceCondition::Dirichlet {
            temperature_surface: 800.0,
        },
        600.0,
    );
    let solution = TransientSolver::default().solve(&problem).unwrap();
    let sample = &solution.sample;

    for time in [150.0, 300.0, 590.0] {
        let index = solution.time_index(time);
        let exact = dirichlet_profile(
            &sample.space_mesh,
            sample.temporal_mesh[index],
            ALPHA,
            288.0,
            800.0,
        );
        let numeric = solution.temperatures_at(index).unwrap();
        // stay clear of the insulated back face
        for i in 0..=50 {
            assert_relative_eq!(numeric[i], exact[i], max_relative = 0.01);
        }
    }
}

#[test]
fn constant_flux_matches_semi_infinite_solution() {
    let nhf = 10_000.0;
    let problem = with_surface(SurfaceCondition::Neumann { nhf }, 300.0);
    let solution = TransientSolver::default().solve(&problem).unwrap();
    let sample = &solution.sample;

    let index = sample.num_steps() - 1;
    let exact = neumann_profile(
        &sample.space_mesh,
        sample.temporal_mesh[index],
        0.2,
        ALPHA,
        288.0,
        nhf,
    );
    let numeric = solution.final_temperatures();
    for i in 0..=40 {
        assert_relative_eq!(numeric[i], exact[i], max_relative = 0.01);
    }
}

#[test]
fn incident_flux_heats_the_surface_monotonically() {
    let solution = TransientSolver::default()
        .solve(&pmma_demo_problem())
        .unwrap();
    let surface = solution.surface_temperatures();

    assert!(surface.iter().zip(surface.iter().skip(1)).all(|(a, b)| *b >= a - 1e-9));
    assert!(surface[surface.len() - 1] > 450.0);

    // heat flows inwards: the final profile falls off with depth
    let profile = solution.final_temperatures();
    assert!(profile.iter().zip(profile.iter().skip(1)).all(|(a, b)| *b <= a + 1e-9));
}

#[test]
fn surface_losses_limit_heating() {
    let lossless = with_surface(
        SurfaceCondition::Robin {
            ihf: IncidentHeatFlux::Constant { value: 40_000.0 },
            losses: SurfaceLosses::Linear { h_total: 0.0 },
        },
        60.0,
    );
    let linear = with_surface(
        SurfaceCondition::Robin {
            ihf: IncidentHeatFlux::Constant { value: 40_000.0 },
            losses: SurfaceLosses::Linear { h_total: 30.0 },
        },
        60.0,
    );
    let solver = TransientSolver::default();
    let hot = solver.solve(&lossless).unwrap().final_temperatures()[0];
    let cooled = solver.solve(&linear).unwrap().final_temperatures()[0];
    let demo = solver.solve(&pmma_demo_problem()).unwrap().final_temperatures()[0];

    assert!(cooled < hot);
    // 10 % reflected plus radiation
    assert!(demo < hot);
}

#[test]
fn robin_without_losses_is_a_fixed_flux() {
    let robin = with_surface(
        SurfaceCondition::Robin {
            ihf: IncidentHeatFlux::Constant { value: 12_000.0 },
            losses: SurfaceLosses::Linear { h_total: 0.0 },
        },
        30.0,
    );
    let neumann = with_surface(SurfaceCondition::Neumann { nhf: 12_000.0 }, 30.0);

    let solver = TransientSolver::default();
    let a = solver.solve(&robin).unwrap().final_temperatures();
    let b = solver.solve(&neumann).unwrap().final_temperatures();
    assert!((a - b).amax() < 1e-9);
}

#[test]
fn conductive_back_face_loses_heat() {
    let mut problem = with_surface(SurfaceCondition::Neumann { nhf: 0.0 }, 60.0);
    problem.geometry.depth = 0.005;
    problem.geometry.x_divisions = 21;
    problem.temperature_initial = InitialTemperature::Uniform(400.0);
    problem.boundcond_back = BackCondition::ConductiveLosses {
        conductivity_subs: 1.0,
    };

    let solution = TransientSolver::default().solve(&problem).unwrap();
    let sample = &solution.sample;
    let last = sample.num_steps() - 1;

    assert!(sample.thermal_energy(last) < sample.thermal_energy(0));
    let profile = solution.final_temperatures();
    assert!(profile[profile.len() - 1] < profile[0]);
    assert!(profile.iter().all(|&t| t > 288.0 && t <= 400.0 + 1e-9));

    // insulated sample keeps its heat
    problem.boundcond_back = BackCondition::Insulated;
    let closed = TransientSolver::default().solve(&problem).unwrap();
    assert_relative_eq!(
        closed.sample.thermal_energy(last),
        closed.sample.thermal_energy(0),
        max_relative = 1e-10
    );
}

#[test]
fn indepth_absorption_keeps_the_surface_cooler() {
    let surface_absorbed = pmma_demo_problem();
    let mut indepth = pmma_demo_problem();
    indepth.indepth_absorptivity = 400.0;

    let solver = TransientSolver::default();
    let at_surface = solver.solve(&surface_absorbed).unwrap();
    let in_depth = solver.solve(&indepth).unwrap();

    assert!(in_depth.final_temperatures()[0] < at_surface.final_temperatures()[0]);
    // the deposited heat shows up below the surface
    let mid = 20;
    assert!(in_depth.final_temperatures()[mid] > at_surface.final_temperatures()[mid]);
}

#[test]
fn sinusoidal_flux_drives_a_bounded_response() {
    let problem = with_surface(
        SurfaceCondition::Robin {
            ihf: IncidentHeatFlux::Sinusoidal {
                amplitude: 5_000.0,
                angular_frequency: 0.5,
                phase: 0.0,
            },
            losses: SurfaceLosses::Linear { h_total: 10.0 },
        },
        60.0,
    );
    let solution = TransientSolver::default().solve(&problem).unwrap();
    let surface = solution.surface_temperatures();
    assert!(surface.max() > 288.0);
    assert!(surface.min() < 288.0);
    assert!(surface.iter().all(|t| (t - 288.0).abs() < 100.0));
}
