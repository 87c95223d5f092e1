use thiserror::Error;

use crate::constraints::validator::Violation;

#[derive(Error, Debug)]
pub enum SolverError {
    /// The exhaustive audit of the final best solution disagreed with the
    /// search's own feasibility bookkeeping. This indicates a bug in the
    /// incremental checks, not an infeasible instance, so the run fails
    /// instead of returning a corrupt plan.
    #[error("final validation found {} violation(s) in the best solution", violations.len())]
    ValidationMismatch { violations: Vec<Violation> },
}
