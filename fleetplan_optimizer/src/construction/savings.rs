//! Clarke-Wright savings construction. Seeds every servable store into its
//! own route where possible, then repeatedly merges route endpoints in
//! descending savings order, and finishes with a bounded 2-opt pass.

use tracing::debug;

use crate::constraints::{CAPACITY_EPSILON, checker};
use crate::problem::{RoutingProblem, StoreId, VehicleId};
use crate::solution::{Route, Solution, UnassignedReason};

use super::two_opt;

struct Saving {
    value: f64,
    i: StoreId,
    j: StoreId,
}

/// Build a feasible starting solution. Every store ends up either on a
/// route or in the unassigned set with a reason.
pub fn build_initial_solution(problem: &RoutingProblem) -> Solution {
    let mut solution = Solution::empty(problem);

    // Partition stores into today's candidates and the provably unservable.
    let mut pending: Vec<StoreId> = Vec::new();
    for store in problem.stores() {
        if !store.servable_on(problem.day()) {
            solution.mark_unassigned(store.id(), UnassignedReason::NoServiceWindow);
            continue;
        }
        let fits_somewhere = problem.vehicles().iter().any(|vehicle| {
            vehicle.can_serve(store) && store.demand() <= vehicle.capacity() + CAPACITY_EPSILON
        });
        if !fits_somewhere {
            solution.mark_unassigned(store.id(), UnassignedReason::DemandExceedsCapacity);
            continue;
        }
        pending.push(store.id());
    }

    // Large and high-priority orders claim vehicles first.
    pending.sort_by(|&a, &b| {
        let sa = problem.store(a);
        let sb = problem.store(b);
        sb.priority()
            .cmp(&sa.priority())
            .then_with(|| sb.demand().total_cmp(&sa.demand()))
            .then_with(|| a.cmp(&b))
    });

    let savings = compute_savings(problem, &pending);
    seed_pending(problem, &mut solution, &mut pending);

    // Merges free vehicle slots, freed slots take leftover stores, and
    // those may enable further merges.
    loop {
        let merged = merge_pass(problem, &mut solution, &savings);
        let seeded = seed_pending(problem, &mut solution, &mut pending);
        if !merged && !seeded {
            break;
        }
    }

    // Last resort: squeeze leftovers into existing routes.
    for store_id in std::mem::take(&mut pending) {
        match best_insertion(problem, &solution, store_id) {
            Some((vehicle_id, position)) => {
                solution.route_mut(vehicle_id).insert(problem, position, store_id);
            }
            None => solution.mark_unassigned(store_id, UnassignedReason::FleetExhausted),
        }
    }

    two_opt::improve_solution(problem, &mut solution);

    debug!(
        day = %problem.day(),
        routes = solution.vehicles_used(),
        unassigned = solution.unassigned().len(),
        distance_km = solution.total_distance(),
        "constructed initial solution"
    );
    solution
}

/// `S(i, j) = d(0, i) + d(0, j) - d(i, j)`, positive entries only, sorted
/// descending with id-order tie-breaks so construction is deterministic.
fn compute_savings(problem: &RoutingProblem, candidates: &[StoreId]) -> Vec<Saving> {
    let mut savings = Vec::new();
    for (index, &i) in candidates.iter().enumerate() {
        for &j in &candidates[index + 1..] {
            let value =
                problem.depot_distance(i) + problem.depot_distance(j) - problem.store_distance(i, j);
            if value > 0.0 {
                savings.push(Saving { value, i, j });
            }
        }
    }
    savings.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then_with(|| a.i.cmp(&b.i))
            .then_with(|| a.j.cmp(&b.j))
    });
    savings
}

/// Place still-unrouted candidates into empty compatible route slots.
/// Returns whether anything was placed.
fn seed_pending(
    problem: &RoutingProblem,
    solution: &mut Solution,
    pending: &mut Vec<StoreId>,
) -> bool {
    let mut placed_any = false;
    pending.retain(|&store_id| {
        let slot = (0..solution.routes().len()).find(|&vehicle_id| {
            solution.route(vehicle_id).is_empty()
                && checker::can_insert(problem, solution.route(vehicle_id), store_id, 0)
        });
        match slot {
            Some(vehicle_id) => {
                solution.route_mut(vehicle_id).insert(problem, 0, store_id);
                placed_any = true;
                false
            }
            None => true,
        }
    });
    placed_any
}

/// One sweep over the savings list. A saving between the tail of one route
/// and the head of another joins them end-to-end on the first vehicle,
/// provided the spliced route stays feasible.
fn merge_pass(problem: &RoutingProblem, solution: &mut Solution, savings: &[Saving]) -> bool {
    let mut merged_any = false;
    for saving in savings {
        let (Some(route_i), Some(route_j)) = (
            solution.route_of_store(saving.i),
            solution.route_of_store(saving.j),
        ) else {
            continue;
        };
        if route_i == route_j {
            continue;
        }

        let attempt = if solution.route(route_i).last_store() == Some(saving.i)
            && solution.route(route_j).first_store() == Some(saving.j)
        {
            Some((route_i, route_j))
        } else if solution.route(route_j).last_store() == Some(saving.j)
            && solution.route(route_i).first_store() == Some(saving.i)
        {
            Some((route_j, route_i))
        } else {
            None
        };

        if let Some((head, tail)) = attempt
            && try_merge(problem, solution, head, tail)
        {
            merged_any = true;
        }
    }
    merged_any
}

fn try_merge(
    problem: &RoutingProblem,
    solution: &mut Solution,
    head: VehicleId,
    tail: VehicleId,
) -> bool {
    let vehicle = problem.vehicle(head);
    let combined_load = solution.route(head).total_load() + solution.route(tail).total_load();
    if combined_load > vehicle.capacity() + CAPACITY_EPSILON {
        return false;
    }
    if !solution
        .route(tail)
        .store_ids()
        .all(|store_id| vehicle.can_serve(problem.store(store_id)))
    {
        return false;
    }

    let merged_ids: Vec<StoreId> = solution
        .route(head)
        .store_ids()
        .chain(solution.route(tail).store_ids())
        .collect();

    let mut candidate = Route::empty(problem, head);
    candidate.set_store_ids(problem, &merged_ids);
    if !checker::route_is_feasible(problem, &candidate) {
        return false;
    }

    *solution.route_mut(head) = candidate;
    solution.route_mut(tail).clear(problem);
    true
}

/// Cheapest feasible insertion across all non-empty routes; ties go to the
/// lowest route index, then the lowest position.
fn best_insertion(
    problem: &RoutingProblem,
    solution: &Solution,
    store_id: StoreId,
) -> Option<(VehicleId, usize)> {
    let mut best: Option<(f64, VehicleId, usize)> = None;
    for route in solution.used_routes() {
        for position in 0..=route.len() {
            if !checker::can_insert(problem, route, store_id, position) {
                continue;
            }
            let cost = checker::insertion_cost(problem, route, store_id, position);
            if best.is_none_or(|(best_cost, _, _)| cost < best_cost - CAPACITY_EPSILON) {
                best = Some((cost, route.vehicle_id(), position));
            }
        }
    }
    best.map(|(_, vehicle_id, position)| (vehicle_id, position))
}
