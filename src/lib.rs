//! One-dimensional transient heat conduction in a homogeneous solid, solved
//! with a Crank-Nicolson finite-difference scheme.
//!
//! A [`physics::problem::ProblemDescription`] is turned into a
//! [`models::sample::Sample`], stepped by [`numerics::transient::TransientSolver`]
//! and returned as a [`models::solution::Solution`].

pub mod discretization;
pub mod models;
pub mod numerics;
pub mod physics;
pub mod processing;
