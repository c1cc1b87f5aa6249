use crate::models::sample::Sample;
use crate::models::solution::Solution;
use crate::numerics::assembly::{assemble_rhs_vector, assemble_system_matrix};
use crate::numerics::solver::{LinearSolver, SolverError};
use crate::numerics::timing::{Phase, finish_run, start_run, timed};
use crate::physics::bc::SurfaceCondition;
use crate::physics::parameters::{calc_fourier_number, calc_upsilon, update_thermal_properties};
use crate::physics::problem::{ProblemDescription, ProblemType};
use log::{debug, info, warn};
use std::time::Instant;

/// Field storage above which a run is logged as memory hungry.
const LARGE_RUN_BYTES: usize = 1 << 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    NotStarted,
    Stepping,
    Complete,
}

/// Reported once per threshold when the simulated time passes a fraction of
/// `time_total`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub threshold: f64,
    pub time: f64,
    pub step: usize,
}

#[derive(Debug, Clone)]
struct ProgressTracker {
    thresholds: Vec<f64>,
    next: usize,
}

impl ProgressTracker {
    fn new(thresholds: &[f64]) -> Self {
        let mut thresholds: Vec<f64> = thresholds
            .iter()
            .copied()
            .filter(|f| f.is_finite() && *f > 0.0)
            .collect();
        thresholds.sort_by(f64::total_cmp);
        thresholds.dedup();
        Self {
            thresholds,
            next: 0,
        }
    }

    /// Thresholds passed since the last call, ascending.
    fn crossed(&mut self, fraction: f64) -> &[f64] {
        let start = self.next;
        while self.next < self.thresholds.len() && fraction >= self.thresholds[self.next] {
            self.next += 1;
        }
        &self.thresholds[start..self.next]
    }
}

/// Settings that are valid but likely to surprise, one message each.
///
/// Only reads the problem, so it is safe to call before the sample is
/// allocated.
fn configuration_warnings(problem: &ProblemDescription) -> Vec<String> {
    let mut messages = Vec::new();

    let bytes = Sample::storage_bytes(problem);
    if bytes > LARGE_RUN_BYTES {
        messages.push(format!(
            "{} nodes over {:.3e} s need {:.1} GiB of field storage",
            problem.geometry.x_divisions,
            problem.geometry.time_total,
            bytes as f64 / (1u64 << 30) as f64
        ));
    }
    if problem.indepth_absorptivity > 0.0
        && !matches!(problem.boundcond_surface, SurfaceCondition::Robin { .. })
    {
        messages.push("indepth_absorptivity is ignored without an incident heat flux".into());
    }
    if matches!(problem.boundcond_surface, SurfaceCondition::Neumann { .. })
        && problem.properties.is_temperature_dependent()
    {
        messages.push(
            "Neumann surface with temperature-dependent properties: the flux balance \
             uses rho c of the previous step"
                .into(),
        );
    }
    messages
}

/// One run of the Crank-Nicolson scheme over a [`Sample`].
///
/// Step `t` reads column `t` and writes the temperatures and properties of
/// column `t + 1`.
pub struct Simulation {
    problem: ProblemDescription,
    sample: Sample,
    linear_solver: LinearSolver,
    progress: ProgressTracker,
    state: SimulationState,
    next_step: usize,
}

impl Simulation {
    pub fn new(
        problem: ProblemDescription,
        linear_solver: LinearSolver,
        progress_thresholds: &[f64],
    ) -> Result<Self, SolverError> {
        if problem.problem_type != ProblemType::Direct {
            return Err(SolverError::UnsupportedProblem(problem.problem_type));
        }
        problem.validate()?;
        for message in configuration_warnings(&problem) {
            warn!("{message}");
        }
        let sample = Sample::new(&problem)?;

        Ok(Self {
            problem,
            sample,
            linear_solver,
            progress: ProgressTracker::new(progress_thresholds),
            state: SimulationState::NotStarted,
            next_step: 0,
        })
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn sample(&self) -> &Sample {
        &self.sample
    }

    /// Index of the most recent temperature column.
    pub fn current_index(&self) -> usize {
        self.next_step
    }

    /// Advances one time step. Does nothing once the run is complete.
    pub fn step(&mut self, on_progress: &mut impl FnMut(&Progress)) -> Result<SimulationState, SolverError> {
        let t = self.next_step;
        if self.state == SimulationState::Complete || t + 1 >= self.sample.num_steps() {
            self.state = SimulationState::Complete;
            return Ok(self.state);
        }
        self.state = SimulationState::Stepping;

        timed(Phase::StepParameters, || {
            calc_fourier_number(&mut self.sample, t);
            calc_upsilon(&self.problem, &mut self.sample, t);
        });
        let matrix = timed(Phase::Assembly, || assemble_system_matrix(&self.sample, t));
        let rhs = assemble_rhs_vector(&mut self.sample, t)?;
        let next = self.linear_solver.solve(&matrix, &rhs, t)?;
        self.sample.temperatures.set_column(t + 1, &next);
        timed(Phase::PropertyUpdate, || {
            update_thermal_properties(&self.problem, &mut self.sample, t)
        })?;

        let time = self.sample.temporal_mesh[t + 1];
        debug!(
            "step {:>6} | t = {:.4e} s | T_surface = {:.2} K | T_back = {:.2} K",
            t + 1,
            time,
            next[0],
            next[next.len() - 1]
        );

        let fraction = time / self.sample.time_total;
        for &threshold in self.progress.crossed(fraction) {
            info!(
                "{:.0}% of the simulated time reached (t = {:.2} s)",
                threshold * 100.0,
                time
            );
            on_progress(&Progress {
                threshold,
                time,
                step: t + 1,
            });
        }

        self.next_step = t + 1;
        if self.next_step + 1 >= self.sample.num_steps() {
            self.state = SimulationState::Complete;
        }
        Ok(self.state)
    }

    /// Steps until the last column of the time grid is filled.
    pub fn run(&mut self, mut on_progress: impl FnMut(&Progress)) -> Result<(), SolverError> {
        while self.step(&mut on_progress)? != SimulationState::Complete {}
        Ok(())
    }

    pub fn into_parts(self) -> (ProblemDescription, Sample) {
        (self.problem, self.sample)
    }
}

/// Run options and entry point of the solver.
#[derive(Debug, Clone)]
pub struct TransientSolver {
    pub linear_solver: LinearSolver,
    /// Fractions of `time_total` at which progress is reported.
    pub progress_thresholds: Vec<f64>,
}

impl Default for TransientSolver {
    fn default() -> Self {
        Self {
            linear_solver: LinearSolver::Thomas,
            progress_thresholds: vec![0.25, 0.5, 0.75],
        }
    }
}

impl TransientSolver {
    pub fn solve(&self, problem: &ProblemDescription) -> Result<Solution, SolverError> {
        self.solve_with(problem, |_| {})
    }

    /// Like [`TransientSolver::solve`], calling `on_progress` at every
    /// threshold.
    pub fn solve_with(
        &self,
        problem: &ProblemDescription,
        on_progress: impl FnMut(&Progress),
    ) -> Result<Solution, SolverError> {
        let start = Instant::now();
        start_run();

        let mut simulation =
            Simulation::new(problem.clone(), self.linear_solver, &self.progress_thresholds)?;
        info!(
            "Starting transient simulation: {} nodes, dt = {:.4e} s, {} time points, {:?} solver",
            simulation.sample.num_nodes(),
            simulation.sample.dt,
            simulation.sample.num_steps(),
            self.linear_solver
        );

        simulation.run(on_progress)?;

        let computing_time = start.elapsed();
        let steps = simulation.current_index();
        let simulated = simulation.sample.temporal_mesh.get(steps).copied().unwrap_or(0.0);
        if let Some(stats) = finish_run(computing_time, simulated, steps) {
            info!("step timing\n{stats}");
        }
        info!(
            "Simulation finished in {:.3} s",
            computing_time.as_secs_f64()
        );

        let (problem, sample) = simulation.into_parts();
        Ok(Solution::new(sample, problem, computing_time))
    }
}
