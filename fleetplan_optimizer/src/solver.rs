use crate::SolverError;
use crate::alns::{AlnsEngine, AlnsParams};
use crate::constraints::validator;
use crate::construction::build_initial_solution;
use crate::problem::RoutingProblem;
use crate::solution::Solution;

/// A single-day solving strategy. The planner depends only on this
/// contract, so swapping the metaheuristic for something else is a matter
/// of providing another implementor. `Sync` because the planner runs one
/// day per thread against a shared solver.
pub trait DaySolver: Sync {
    fn solve(&self, problem: &RoutingProblem) -> Result<Solution, SolverError>;
}

/// Clarke-Wright construction plus 2-opt, no metaheuristic. Fast and
/// deterministic; useful as a baseline and for tests.
#[derive(Debug, Default)]
pub struct SavingsSolver;

impl DaySolver for SavingsSolver {
    fn solve(&self, problem: &RoutingProblem) -> Result<Solution, SolverError> {
        let mut solution = build_initial_solution(problem);
        let violations = validator::validate_solution(problem, &solution);
        if !violations.is_empty() {
            return Err(SolverError::ValidationMismatch { violations });
        }
        solution.certify(Vec::new());
        Ok(solution)
    }
}

/// The full pipeline: savings construction refined by adaptive large
/// neighborhood search.
#[derive(Debug, Default)]
pub struct AlnsSolver {
    params: AlnsParams,
}

impl AlnsSolver {
    pub fn new(params: AlnsParams) -> Self {
        Self { params }
    }
}

impl DaySolver for AlnsSolver {
    fn solve(&self, problem: &RoutingProblem) -> Result<Solution, SolverError> {
        let initial = build_initial_solution(problem);
        AlnsEngine::new(self.params.clone()).optimize(problem, initial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn savings_solver_returns_a_certified_solution() {
        let problem = test_utils::simple_problem();
        let solution = SavingsSolver.solve(&problem).unwrap();
        assert!(solution.is_feasible());
        assert_eq!(solution.visited_count(), 3);
    }

    #[test]
    fn alns_solver_matches_or_beats_savings() {
        let problem = test_utils::simple_problem();
        let baseline = SavingsSolver.solve(&problem).unwrap();
        let solver = AlnsSolver::new(AlnsParams {
            max_iterations: 100,
            ..AlnsParams::default()
        });
        let refined = solver.solve(&problem).unwrap();
        assert!(refined.total_cost(&problem) <= baseline.total_cost(&problem) + 1e-9);
    }
}
