use crate::models::solution::Solution;
use crate::physics::bc::{BackCondition, SurfaceCondition};
use nalgebra::DVector;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

pub struct SimulationSummary {
    // Mesh info
    pub material: String,
    pub num_nodes: usize,
    pub depth: f64,
    pub dx: f64,
    pub diffusivity: f64,
    pub thermal_inertia: f64,

    // Time grid
    pub num_steps: usize,
    pub dt: f64,
    pub time_total: f64,

    // Problem
    pub surface: &'static str,
    pub back: &'static str,
    pub reactive: bool,
    pub temperature_dependent: bool,

    // Results
    pub final_surface_temperature: f64,
    pub final_back_temperature: f64,
    pub peak_surface_temperature: f64,
    pub peak_reaction_rate: Option<f64>,
    pub stored_energy_change: f64,
    pub computing_time: Duration,

    // Solver comparison
    pub max_solution_diff: Option<f64>,
    pub mean_solution_diff: Option<f64>,
}

impl SimulationSummary {
    pub fn from_solution(solution: &Solution) -> Self {
        let sample = &solution.sample;
        let problem = &solution.problem;
        let last = sample.num_steps() - 1;
        let final_profile = solution.final_temperatures();

        let surface = match problem.boundcond_surface {
            SurfaceCondition::Dirichlet { .. } => "dirichlet",
            SurfaceCondition::Neumann { .. } => "neumann",
            SurfaceCondition::Robin { .. } => "robin",
        };
        let back = match problem.boundcond_back {
            BackCondition::Insulated => "insulated",
            BackCondition::ConductiveLosses { .. } => "conductive_losses",
        };

        Self {
            material: problem.material.clone().unwrap_or_else(|| "unnamed".into()),
            num_nodes: sample.num_nodes(),
            depth: sample.depth,
            dx: sample.dx,
            diffusivity: sample.diffusivity,
            thermal_inertia: sample.thermal_inertia,
            num_steps: sample.num_steps(),
            dt: sample.dt,
            time_total: sample.time_total,
            surface,
            back,
            reactive: sample.kinetics.is_some(),
            temperature_dependent: problem.properties.is_temperature_dependent(),
            final_surface_temperature: final_profile[0],
            final_back_temperature: final_profile[final_profile.len() - 1],
            peak_surface_temperature: solution.surface_temperatures().max(),
            // the last column is never fed to the reaction model
            peak_reaction_rate: sample
                .kinetics
                .map(|_| sample.omega_dots.columns(0, last.max(1)).max()),
            stored_energy_change: sample.thermal_energy(last) - sample.thermal_energy(0),
            computing_time: solution.computing_time,
            max_solution_diff: None,
            mean_solution_diff: None,
        }
    }

    /// Records how far two final profiles (e.g. Thomas and dense LU) differ.
    pub fn add_comparison(&mut self, reference: &DVector<f64>, other: &DVector<f64>) {
        let diffs: Vec<f64> = reference
            .iter()
            .zip(other.iter())
            .map(|(a, b)| (a - b).abs())
            .collect();

        self.max_solution_diff = Some(diffs.iter().cloned().fold(0.0, f64::max));
        self.mean_solution_diff = Some(diffs.iter().sum::<f64>() / diffs.len().max(1) as f64);
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;

        writeln!(file, "{}", "=".repeat(60))?;
        writeln!(file, "HEAT CONDUCTION SIMULATION SUMMARY")?;
        writeln!(file, "{}", "=".repeat(60))?;
        writeln!(file)?;

        writeln!(file, "SAMPLE")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Material:            {}", self.material)?;
        writeln!(file, "Depth:               {:.6e} m", self.depth)?;
        writeln!(file, "Number of nodes:     {}", self.num_nodes)?;
        writeln!(file, "Node spacing:        {:.6e} m", self.dx)?;
        writeln!(file, "Diffusivity:         {:.6e} m2/s", self.diffusivity)?;
        writeln!(
            file,
            "Thermal inertia:     {:.6e} J2/(m4 K2 s)",
            self.thermal_inertia
        )?;
        writeln!(
            file,
            "Properties:          {}",
            if self.temperature_dependent {
                "temperature dependent"
            } else {
                "constant"
            }
        )?;
        writeln!(
            file,
            "Material type:       {}",
            if self.reactive { "reactive" } else { "inert" }
        )?;
        writeln!(file)?;

        writeln!(file, "TIME GRID")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Simulated time:      {:.6e} s", self.time_total)?;
        writeln!(file, "Time step:           {:.6e} s", self.dt)?;
        writeln!(file, "Time points:         {}", self.num_steps)?;
        writeln!(file)?;

        writeln!(file, "BOUNDARY CONDITIONS")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Surface:             {}", self.surface)?;
        writeln!(file, "Back face:           {}", self.back)?;
        writeln!(file)?;

        writeln!(file, "RESULTS")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(
            file,
            "Final surface T:     {:.3} K",
            self.final_surface_temperature
        )?;
        writeln!(file, "Final back T:        {:.3} K", self.final_back_temperature)?;
        writeln!(
            file,
            "Peak surface T:      {:.3} K",
            self.peak_surface_temperature
        )?;
        if let Some(rate) = self.peak_reaction_rate {
            writeln!(file, "Peak reaction rate:  {:.6e} kg/(m3 s)", rate)?;
        }
        writeln!(
            file,
            "Stored energy:       {:+.6e} J/m2",
            self.stored_energy_change
        )?;
        writeln!(
            file,
            "Computing time:      {:.3} s",
            self.computing_time.as_secs_f64()
        )?;
        writeln!(file)?;

        if let (Some(max_diff), Some(mean_diff)) = (self.max_solution_diff, self.mean_solution_diff)
        {
            writeln!(file, "SOLVER COMPARISON")?;
            writeln!(file, "{}", "-".repeat(60))?;
            writeln!(file, "Max difference:      {:.6e} K", max_diff)?;
            writeln!(file, "Mean difference:     {:.6e} K", mean_diff)?;
            writeln!(file)?;
        }

        writeln!(file, "{}", "=".repeat(60))?;

        Ok(())
    }

    pub fn print_to_console(&self) {
        println!("\n{}", "=".repeat(60));
        println!("SIMULATION SUMMARY ({})", self.material);
        println!("{}", "=".repeat(60));
        println!(
            "Grid:          {} nodes, {} time points (dt = {:.3e} s)",
            self.num_nodes, self.num_steps, self.dt
        );
        println!("Boundaries:    {} / {}", self.surface, self.back);
        println!(
            "Surface T:     {:.2} K (peak {:.2} K)",
            self.final_surface_temperature, self.peak_surface_temperature
        );
        println!("Back T:        {:.2} K", self.final_back_temperature);
        if let Some(rate) = self.peak_reaction_rate {
            println!("Peak rate:     {:.3e} kg/(m3 s)", rate);
        }
        if let Some(max_diff) = self.max_solution_diff {
            println!("Max diff:      {:.3e} K", max_diff);
        }
        println!(
            "Run time:      {:.3} s",
            self.computing_time.as_secs_f64()
        );
        println!("{}\n", "=".repeat(60));
    }
}
