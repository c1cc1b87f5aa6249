use crate::numerics::timing::{Phase, timed};
use crate::numerics::tridiag::Tridiagonal;
use crate::physics::problem::{ConfigError, ProblemType};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("singular system matrix at time step {step} (zero pivot in row {row})")]
    SingularMatrix { step: usize, row: usize },
    #[error("linear solve failed at time step {step}")]
    LinearSolveFailed { step: usize },
    #[error("non-finite {quantity} at node {node}, time step {step}")]
    NonFinite {
        quantity: &'static str,
        node: usize,
        step: usize,
    },
    #[error("{0:?} problems are not supported")]
    UnsupportedProblem(ProblemType),
    #[error("invalid problem description: {0}")]
    Config(#[from] ConfigError),
}

impl SolverError {
    /// Time step at which a numerical failure happened.
    pub fn step(&self) -> Option<usize> {
        match self {
            SolverError::SingularMatrix { step, .. }
            | SolverError::LinearSolveFailed { step }
            | SolverError::NonFinite { step, .. } => Some(*step),
            SolverError::UnsupportedProblem(_) | SolverError::Config(_) => None,
        }
    }
}

/// Method used for `A x = b` at every step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearSolver {
    /// O(N) Thomas algorithm on the three diagonals.
    #[default]
    Thomas,
    /// LU with partial pivoting on the dense matrix.
    DenseLu,
}

impl LinearSolver {
    pub fn solve(
        &self,
        matrix: &Tridiagonal,
        rhs: &DVector<f64>,
        step: usize,
    ) -> Result<DVector<f64>, SolverError> {
        let solution = timed(Phase::LinearSolve, || match self {
            LinearSolver::Thomas => matrix
                .solve(rhs)
                .map_err(|row| SolverError::SingularMatrix { step, row }),
            LinearSolver::DenseLu => matrix
                .to_dense()
                .lu()
                .solve(rhs)
                .ok_or(SolverError::LinearSolveFailed { step }),
        })?;

        check_finite("temperature", &solution, step)?;
        Ok(solution)
    }
}

/// Fails on the first NaN or infinite entry of `values`.
pub fn check_finite(
    quantity: &'static str,
    values: &DVector<f64>,
    step: usize,
) -> Result<(), SolverError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(node) => Err(SolverError::NonFinite {
            quantity,
            node,
            step,
        }),
        None => Ok(()),
    }
}
