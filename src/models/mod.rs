pub mod sample;
pub mod solution;
