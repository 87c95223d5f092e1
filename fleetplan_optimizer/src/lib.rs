pub mod alns;
pub mod constraints;
pub mod construction;
mod error;
pub mod planner;
pub mod problem;
pub mod solution;
pub mod solver;

pub use error::SolverError;

#[cfg(test)]
pub(crate) mod test_utils;
