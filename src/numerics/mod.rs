pub mod assembly;
pub mod solver;
pub mod timing;
pub mod transient;
pub mod tridiag;
