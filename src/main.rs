use std::error::Error;
use std::fs;
use std::path::Path;

use thc_rs::models::solution::Solution;
use thc_rs::numerics::solver::LinearSolver;
use thc_rs::numerics::transient::TransientSolver;
use thc_rs::physics::problem::{ProblemDescription, pmma_demo_problem};
use thc_rs::processing::csv_writer;
use thc_rs::processing::summary::SimulationSummary;

const OUTPUT_DIR: &str = "output/main";

/// Runs the problem given as a JSON file, or the built-in PMMA case.
fn main() -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(OUTPUT_DIR)?;

    let problem = match std::env::args().nth(1) {
        Some(path) => {
            println!("Reading problem from {path}");
            ProblemDescription::from_json_file(&path)?
        }
        None => {
            println!("No problem file given, running the PMMA demo");
            let problem = pmma_demo_problem();
            fs::write(
                Path::new(OUTPUT_DIR).join("problem.json"),
                problem.to_json_string()?,
            )?;
            problem
        }
    };

    let solver = TransientSolver::default();
    println!("Running Crank-Nicolson solver...");
    let solution = solver.solve_with(&problem, |progress| {
        println!(
            "  {:>3.0}% | step {:>7} | t = {:.2} s",
            progress.threshold * 100.0,
            progress.step,
            progress.time
        );
    })?;
    println!("Solver finished successfully.\n");

    save_solution(&solution)?;

    let mut summary = SimulationSummary::from_solution(&solution);
    if let Some(reference) = solve_dense(&problem) {
        summary.add_comparison(&solution.final_temperatures(), &reference.final_temperatures());
    }

    let summary_path = Path::new(OUTPUT_DIR).join("simulation_summary.txt");
    summary.write_to_file(&summary_path)?;
    summary.print_to_console();
    println!("Summary saved to {}", summary_path.display());
    Ok(())
}

/// Same run with the dense LU solve, as a cross-check of the Thomas solve.
fn solve_dense(problem: &ProblemDescription) -> Option<Solution> {
    let solver = TransientSolver {
        linear_solver: LinearSolver::DenseLu,
        ..TransientSolver::default()
    };

    println!("Running dense LU cross-check...");
    match solver.solve(problem) {
        Ok(solution) => {
            println!("Dense solver finished successfully.\n");
            Some(solution)
        }
        Err(e) => {
            eprintln!("Dense solver failed: {}", e);
            None
        }
    }
}

fn save_solution(solution: &Solution) -> Result<(), Box<dyn Error>> {
    let label = solution.problem.material.as_deref().unwrap_or("sample");
    let time_total = solution.sample.time_total;

    // profiles at every quarter of the run
    let indices: Vec<usize> = [0.0, 0.25, 0.5, 0.75, 1.0]
        .iter()
        .map(|f| solution.time_index(f * time_total))
        .collect();
    let table = Path::new(OUTPUT_DIR).join(format!("{label}_profiles.csv"));
    csv_writer::write_temperature_table(&table, solution, &indices)?;
    println!("Temperature profiles saved to {}", table.display());

    let history = Path::new(OUTPUT_DIR).join(format!("{label}_boundaries.csv"));
    csv_writer::write_boundary_history(&history, solution)?;
    println!("Boundary temperatures saved to {}", history.display());

    let x: Vec<f64> = solution.sample.space_mesh.iter().copied().collect();
    let t: Vec<f64> = solution.final_temperatures().iter().copied().collect();
    let profile = Path::new(OUTPUT_DIR).join(format!("{label}_final.csv"));
    csv_writer::write_xy(&profile, "x_m", "T_K", &x, &t)?;
    println!("Final profile saved to {}", profile.display());
    Ok(())
}
