//! Repair operators. Each tries to reinsert the removed stores; whatever
//! cannot be placed anywhere is marked unassigned and picked up by the
//! cost penalty. Ties are broken by route index, then position, then
//! store id, so repair is fully deterministic.

use crate::constraints::checker;
use crate::problem::{RoutingProblem, StoreId, VehicleId};
use crate::solution::{Solution, UnassignedReason};

/// Stand-in cost for a missing k-th insertion option; stores with few
/// remaining options get the highest regret and are placed first.
const NO_INSERTION_COST: f64 = 1e9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOperator {
    /// Cheapest feasible insertion, largest demands first.
    Greedy,
    /// Regret-2: place the store that loses most if denied its best spot.
    Regret2,
    /// Regret-3: same with the two next-best alternatives.
    Regret3,
}

pub const REPAIR_OPERATORS: [RepairOperator; 3] = [
    RepairOperator::Greedy,
    RepairOperator::Regret2,
    RepairOperator::Regret3,
];

impl RepairOperator {
    pub fn reinsert(
        &self,
        problem: &RoutingProblem,
        solution: &mut Solution,
        removed: Vec<StoreId>,
    ) {
        match self {
            RepairOperator::Greedy => greedy_insertion(problem, solution, removed),
            RepairOperator::Regret2 => regret_insertion(problem, solution, removed, 2),
            RepairOperator::Regret3 => regret_insertion(problem, solution, removed, 3),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct InsertionPlan {
    cost: f64,
    vehicle: VehicleId,
    position: usize,
}

/// Up to `limit` cheapest feasible insertions for `store_id`, cheapest
/// first. Empty route slots count: opening a fresh route is always one of
/// the candidate moves.
fn best_insertions(
    problem: &RoutingProblem,
    solution: &Solution,
    store_id: StoreId,
    limit: usize,
) -> Vec<InsertionPlan> {
    let mut plans: Vec<InsertionPlan> = Vec::new();
    for route in solution.routes() {
        for position in 0..=route.len() {
            if !checker::can_insert(problem, route, store_id, position) {
                continue;
            }
            plans.push(InsertionPlan {
                cost: checker::insertion_cost(problem, route, store_id, position),
                vehicle: route.vehicle_id(),
                position,
            });
        }
    }
    plans.sort_by(|a, b| {
        a.cost
            .total_cmp(&b.cost)
            .then_with(|| a.vehicle.cmp(&b.vehicle))
            .then_with(|| a.position.cmp(&b.position))
    });
    plans.truncate(limit);
    plans
}

fn apply(problem: &RoutingProblem, solution: &mut Solution, store_id: StoreId, plan: InsertionPlan) {
    solution
        .route_mut(plan.vehicle)
        .insert(problem, plan.position, store_id);
}

fn greedy_insertion(problem: &RoutingProblem, solution: &mut Solution, mut removed: Vec<StoreId>) {
    removed.sort_by(|&a, &b| {
        problem
            .store(b)
            .demand()
            .total_cmp(&problem.store(a).demand())
            .then_with(|| a.cmp(&b))
    });

    for store_id in removed {
        match best_insertions(problem, solution, store_id, 1).first() {
            Some(&plan) => apply(problem, solution, store_id, plan),
            None => solution.mark_unassigned(store_id, UnassignedReason::NoFeasibleInsertion),
        }
    }
}

fn regret_insertion(
    problem: &RoutingProblem,
    solution: &mut Solution,
    mut pending: Vec<StoreId>,
    k: usize,
) {
    pending.sort_unstable();

    while !pending.is_empty() {
        let mut choice: Option<(f64, StoreId, Option<InsertionPlan>)> = None;

        for &store_id in &pending {
            let plans = best_insertions(problem, solution, store_id, k);
            let (regret, best_plan) = match plans.first() {
                None => (f64::INFINITY, None),
                Some(&best) => {
                    let kth = plans.get(k - 1).map_or(NO_INSERTION_COST, |p| p.cost);
                    (kth - best.cost, Some(best))
                }
            };
            // strict > keeps the lowest store id on equal regrets
            if choice.is_none_or(|(best_regret, _, _)| regret > best_regret) {
                choice = Some((regret, store_id, best_plan));
            }
        }

        let Some((_, store_id, plan)) = choice else {
            break;
        };
        match plan {
            Some(plan) => apply(problem, solution, store_id, plan),
            None => solution.mark_unassigned(store_id, UnassignedReason::NoFeasibleInsertion),
        }
        pending.retain(|&s| s != store_id);
    }
}
