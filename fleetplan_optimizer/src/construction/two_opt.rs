//! Bounded intra-route 2-opt. Reverses a stop span when that shortens the
//! route and the reversed schedule stays feasible. The pass count is
//! capped so construction time stays predictable on large routes.

use crate::constraints::checker;
use crate::problem::RoutingProblem;
use crate::solution::{Route, Solution};

const MAX_PASSES: usize = 30;
const MIN_GAIN: f64 = 1e-9;

pub fn improve_solution(problem: &RoutingProblem, solution: &mut Solution) {
    for vehicle_id in 0..solution.routes().len() {
        if !solution.route(vehicle_id).is_empty() {
            improve_route(problem, solution.route_mut(vehicle_id));
        }
    }
}

pub fn improve_route(problem: &RoutingProblem, route: &mut Route) {
    if route.len() < 2 {
        return;
    }

    let mut passes = 0;
    let mut improved = true;
    while improved && passes < MAX_PASSES {
        improved = false;
        passes += 1;

        'scan: for from in 0..route.len() - 1 {
            for to in from + 1..route.len() {
                if reversal_gain(problem, route, from, to) < MIN_GAIN {
                    continue;
                }
                let mut candidate = route.clone();
                candidate.reverse_segment(problem, from, to);
                if checker::route_is_feasible(problem, &candidate) {
                    *route = candidate;
                    improved = true;
                    break 'scan;
                }
            }
        }
    }
}

/// Distance saved by reversing the inclusive span `[from, to]`. The travel
/// matrix is symmetric, so only the two boundary edges change.
fn reversal_gain(problem: &RoutingProblem, route: &Route, from: usize, to: usize) -> f64 {
    let depot = problem.depot_location_id();
    let location = |index: usize| problem.store(route.stops()[index].store_id).location_id();

    let before = if from == 0 { depot } else { location(from - 1) };
    let after = if to == route.len() - 1 {
        depot
    } else {
        location(to + 1)
    };

    let removed = problem.distance(before, location(from)) + problem.distance(location(to), after);
    let added = problem.distance(before, location(to)) + problem.distance(location(from), after);
    removed - added
}
