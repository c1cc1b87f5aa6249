use crate::models::sample::Sample;
use crate::physics::problem::{ProblemDescription, ProblemType};
use nalgebra::DVector;
use std::time::Duration;

/// Result of a completed run: the filled sample and the problem it came from.
#[derive(Debug, Clone)]
pub struct Solution {
    pub sample: Sample,
    pub problem: ProblemDescription,
    pub computing_time: Duration,
    pub problem_type: ProblemType,
}

impl Solution {
    pub fn new(sample: Sample, problem: ProblemDescription, computing_time: Duration) -> Self {
        let problem_type = problem.problem_type;
        Self {
            sample,
            problem,
            computing_time,
            problem_type,
        }
    }

    /// Temperature profile at time index `index`, `None` past the end of the run.
    pub fn temperatures_at(&self, index: usize) -> Option<DVector<f64>> {
        (index < self.sample.num_steps())
            .then(|| self.sample.temperatures.column(index).clone_owned())
    }

    /// Index of the time point closest to `time`, clamped to the time grid.
    pub fn time_index(&self, time: f64) -> usize {
        let last = self.sample.num_steps().saturating_sub(1);
        if time <= 0.0 {
            return 0;
        }
        ((time / self.sample.dt).round() as usize).min(last)
    }

    /// Temperature history of node `node`, `None` if there is no such node.
    pub fn node_history(&self, node: usize) -> Option<DVector<f64>> {
        (node < self.sample.num_nodes())
            .then(|| self.sample.temperatures.row(node).transpose())
    }

    pub fn surface_temperatures(&self) -> DVector<f64> {
        self.sample.temperatures.row(0).transpose()
    }

    /// Last computed profile.
    pub fn final_temperatures(&self) -> DVector<f64> {
        let last = self.sample.num_steps().saturating_sub(1);
        self.sample.temperatures.column(last).clone_owned()
    }
}
