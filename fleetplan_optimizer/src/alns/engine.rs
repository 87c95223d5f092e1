//! The adaptive large neighborhood search loop: destroy, repair, accept,
//! adapt. Acceptance is simulated annealing with geometric cooling; the
//! best solution only ever improves and must pass the exhaustive audit
//! before it is returned.

use std::time::Instant;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info};

use crate::SolverError;
use crate::constraints::{checker, validator};
use crate::problem::RoutingProblem;
use crate::solution::Solution;

use super::destroy::DESTROY_OPERATORS;
use super::params::AlnsParams;
use super::repair::REPAIR_OPERATORS;
use super::weights::OperatorWeights;

const COST_EPSILON: f64 = 1e-9;

pub struct AlnsEngine {
    params: AlnsParams,
}

impl AlnsEngine {
    pub fn new(params: AlnsParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AlnsParams {
        &self.params
    }

    /// Improve `initial` until a termination criterion fires, then return
    /// the certified best solution found.
    pub fn optimize(
        &self,
        problem: &RoutingProblem,
        initial: Solution,
    ) -> Result<Solution, SolverError> {
        let params = &self.params;
        let mut rng = SmallRng::seed_from_u64(params.seed);

        let mut current = initial;
        let mut current_cost = solution_cost(problem, &current, params);
        let mut best = current.clone();
        let mut best_cost = current_cost;

        let mut destroy_weights = OperatorWeights::new(DESTROY_OPERATORS);
        let mut repair_weights = OperatorWeights::new(REPAIR_OPERATORS);

        let mut temperature = params.initial_temperature;
        let mut stagnation = 0usize;
        let started = Instant::now();
        let mut completed = 0usize;

        for iteration in 0..params.max_iterations {
            if let Some(budget) = params.time_budget
                && started.elapsed() >= budget
            {
                info!(iteration, "time budget exhausted, stopping");
                break;
            }
            if stagnation >= params.max_no_improvement {
                info!(iteration, stagnation, "stagnated, stopping");
                break;
            }

            let destroy = destroy_weights.select(&mut rng);
            let repair = repair_weights.select(&mut rng);

            let mut candidate = current.clone();
            let removed = destroy.remove(problem, &mut candidate, &mut rng, params);
            repair.reinsert(problem, &mut candidate, removed);

            let cost = solution_cost(problem, &candidate, params);
            let mut score = params.score_rejected;
            let mut accepted = false;

            if cost + COST_EPSILON < best_cost && routes_feasible(problem, &candidate) {
                best = candidate.clone();
                best_cost = cost;
                accepted = true;
                score = params.score_new_best;
                stagnation = 0;
                debug!(iteration, cost, "new best");
            } else {
                stagnation += 1;
                if cost + COST_EPSILON < current_cost {
                    accepted = true;
                    score = params.score_improving;
                } else {
                    let delta = cost - current_cost;
                    if rng.random::<f64>() < (-delta / temperature).exp() {
                        accepted = true;
                        score = params.score_accepted;
                    }
                }
            }

            if accepted {
                current = candidate;
                current_cost = cost;
            }

            destroy_weights.record(destroy, score);
            repair_weights.record(repair, score);
            if (iteration + 1).is_multiple_of(params.segment_iterations) {
                destroy_weights.refresh(params.reaction_factor);
                repair_weights.refresh(params.reaction_factor);
            }

            temperature = params.final_temperature.max(temperature * params.cooling_rate);
            completed = iteration + 1;
        }

        info!(
            iterations = completed,
            best_cost,
            unassigned = best.unassigned().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search finished"
        );

        let violations = validator::validate_solution(problem, &best);
        if !violations.is_empty() {
            return Err(SolverError::ValidationMismatch { violations });
        }
        best.certify(Vec::new());
        Ok(best)
    }
}

/// Route costs plus a flat penalty per unserved store.
pub(crate) fn solution_cost(
    problem: &RoutingProblem,
    solution: &Solution,
    params: &AlnsParams,
) -> f64 {
    solution.total_cost(problem) + params.unassigned_penalty * solution.unassigned().len() as f64
}

fn routes_feasible(problem: &RoutingProblem, solution: &Solution) -> bool {
    solution
        .used_routes()
        .all(|route| checker::route_is_feasible(problem, route))
}
