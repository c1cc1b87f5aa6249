//! Problem description, boundary conditions and the per-step physical
//! parameters of the conduction model.

pub mod bc;
pub mod parameters;
pub mod problem;
