//! Destroy operators. Each removes a batch of served stores from the
//! solution and returns their ids for the repair step. Routes are never
//! drained below `min_keep_per_route`, and candidate enumeration is in
//! route-then-position order so equal random draws give equal results.

use rand::Rng;
use rand::rngs::SmallRng;

use crate::problem::{RoutingProblem, StoreId};
use crate::solution::{Route, Solution};

use super::params::AlnsParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOperator {
    /// Uniformly random removals; pure diversification.
    Random,
    /// Removes the stops whose removal saves the most distance.
    Worst,
    /// Shaw removal: a random seed, then the stores most related to the
    /// already-removed set by distance, demand and window similarity.
    Shaw,
    /// Removes the most time-critical stops (least window slack) first.
    TimeBased,
}

pub const DESTROY_OPERATORS: [DestroyOperator; 4] = [
    DestroyOperator::Random,
    DestroyOperator::Worst,
    DestroyOperator::Shaw,
    DestroyOperator::TimeBased,
];

impl DestroyOperator {
    pub fn remove(
        &self,
        problem: &RoutingProblem,
        solution: &mut Solution,
        rng: &mut SmallRng,
        params: &AlnsParams,
    ) -> Vec<StoreId> {
        let target = removal_target(solution, params);
        match self {
            DestroyOperator::Random => remove_random(problem, solution, rng, params, target),
            DestroyOperator::Worst => remove_worst(problem, solution, params, target),
            DestroyOperator::Shaw => remove_shaw(problem, solution, rng, params, target),
            DestroyOperator::TimeBased => remove_time_based(problem, solution, params, target),
        }
    }
}

fn removal_target(solution: &Solution, params: &AlnsParams) -> usize {
    let visited = solution.visited_count();
    if visited == 0 {
        return 0;
    }
    ((visited as f64 * params.removal_fraction) as usize).max(1)
}

/// Stops eligible for removal, in (route, position) order.
fn removable(solution: &Solution, min_keep: usize) -> Vec<StoreId> {
    solution
        .routes()
        .iter()
        .filter(|route| route.len() > min_keep)
        .flat_map(Route::store_ids)
        .collect()
}

fn remove_random(
    problem: &RoutingProblem,
    solution: &mut Solution,
    rng: &mut SmallRng,
    params: &AlnsParams,
    target: usize,
) -> Vec<StoreId> {
    let mut removed = Vec::with_capacity(target);
    while removed.len() < target {
        let candidates = removable(solution, params.min_keep_per_route);
        if candidates.is_empty() {
            break;
        }
        let store_id = candidates[rng.random_range(0..candidates.len())];
        solution.remove_store(problem, store_id);
        removed.push(store_id);
    }
    removed
}

fn remove_worst(
    problem: &RoutingProblem,
    solution: &mut Solution,
    params: &AlnsParams,
    target: usize,
) -> Vec<StoreId> {
    let mut removed = Vec::with_capacity(target);
    while removed.len() < target {
        let best = removable(solution, params.min_keep_per_route)
            .into_iter()
            .map(|store_id| (removal_saving(problem, solution, store_id), store_id))
            .max_by(|a, b| a.0.total_cmp(&b.0).then_with(|| b.1.cmp(&a.1)));
        let Some((_, store_id)) = best else {
            break;
        };
        solution.remove_store(problem, store_id);
        removed.push(store_id);
    }
    removed
}

fn remove_shaw(
    problem: &RoutingProblem,
    solution: &mut Solution,
    rng: &mut SmallRng,
    params: &AlnsParams,
    target: usize,
) -> Vec<StoreId> {
    let candidates = removable(solution, params.min_keep_per_route);
    if candidates.is_empty() || target == 0 {
        return Vec::new();
    }

    let seed = candidates[rng.random_range(0..candidates.len())];
    solution.remove_store(problem, seed);
    let mut removed = vec![seed];

    while removed.len() < target {
        let mut candidates: Vec<(f64, StoreId)> = removable(solution, params.min_keep_per_route)
            .into_iter()
            .map(|store_id| {
                let relatedness = removed
                    .iter()
                    .map(|&other| relatedness(problem, store_id, other))
                    .fold(f64::INFINITY, f64::min);
                (relatedness, store_id)
            })
            .collect();
        if candidates.is_empty() {
            break;
        }
        // most related first; the biased index keeps some randomness
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        let pick = (rng.random::<f64>().powf(params.shaw_randomization)
            * candidates.len() as f64) as usize;
        let (_, store_id) = candidates[pick.min(candidates.len() - 1)];
        solution.remove_store(problem, store_id);
        removed.push(store_id);
    }
    removed
}

fn remove_time_based(
    problem: &RoutingProblem,
    solution: &mut Solution,
    params: &AlnsParams,
    target: usize,
) -> Vec<StoreId> {
    let mut removed = Vec::with_capacity(target);
    while removed.len() < target {
        let tightest = solution
            .routes()
            .iter()
            .filter(|route| route.len() > params.min_keep_per_route)
            .flat_map(|route| route.stops())
            .map(|stop| (window_slack_seconds(problem, stop), stop.store_id))
            .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        let Some((_, store_id)) = tightest else {
            break;
        };
        solution.remove_store(problem, store_id);
        removed.push(store_id);
    }
    removed
}

/// Distance no longer driven if `store_id` were removed from its route.
fn removal_saving(problem: &RoutingProblem, solution: &Solution, store_id: StoreId) -> f64 {
    let Some(vehicle_id) = solution.route_of_store(store_id) else {
        return 0.0;
    };
    let route = solution.route(vehicle_id);
    let position = route
        .position_of(store_id)
        .unwrap_or_default();

    let depot = problem.depot_location_id();
    let location = problem.store(store_id).location_id();
    let before = match position.checked_sub(1).and_then(|p| route.stops().get(p)) {
        Some(stop) => problem.store(stop.store_id).location_id(),
        None => depot,
    };
    let after = match route.stops().get(position + 1) {
        Some(stop) => problem.store(stop.store_id).location_id(),
        None => depot,
    };

    problem.distance(before, location) + problem.distance(location, after)
        - problem.distance(before, after)
}

/// Lower is more related. Distance, demand difference and window-midpoint
/// distance, each normalized to comparable scales.
fn relatedness(problem: &RoutingProblem, a: StoreId, b: StoreId) -> f64 {
    let max_distance = problem.matrix().max_distance().max(1.0);
    let max_demand = problem.max_store_demand().max(1.0);

    let store_a = problem.store(a);
    let store_b = problem.store(b);

    let distance_term = problem.store_distance(a, b) / max_distance;
    let demand_term = (store_a.demand() - store_b.demand()).abs() / max_demand;

    let window_term = match (
        store_a.window_for_day(problem.day()),
        store_b.window_for_day(problem.day()),
    ) {
        (Some(wa), Some(wb)) => {
            (wa.midpoint_seconds() - wb.midpoint_seconds()).abs() as f64 / (12.0 * 3600.0)
        }
        _ => 1.0,
    };

    distance_term + demand_term + window_term
}

/// Seconds between the scheduled service start and the window close.
fn window_slack_seconds(problem: &RoutingProblem, stop: &crate::solution::Stop) -> i64 {
    let store = problem.store(stop.store_id);
    match store.window_for_day(problem.day()) {
        Some(window) => {
            let close = problem.date().to_datetime(window.latest());
            close.duration_since(stop.arrival).as_secs()
        }
        None => 0,
    }
}
