//! Hot-loop feasibility checks. These run on every candidate insertion
//! inside the search, so they only recompute the schedule suffix affected
//! by the change and bail out at the first failed constraint. The
//! exhaustive audit lives in [`super::validator`].

use crate::problem::{RoutingProblem, StoreId};
use crate::solution::Route;
use crate::solution::route::simulate_schedule;

use super::CAPACITY_EPSILON;

/// Can `store_id` be spliced into `route` at `position` without breaking
/// any hard constraint? Stops before `position` keep their schedule, so
/// only the inserted store and the downstream suffix are re-simulated.
pub fn can_insert(
    problem: &RoutingProblem,
    route: &Route,
    store_id: StoreId,
    position: usize,
) -> bool {
    let vehicle = problem.vehicle(route.vehicle_id());
    let store = problem.store(store_id);

    if route.total_load() + store.demand() > vehicle.capacity() + CAPACITY_EPSILON {
        return false;
    }
    if !vehicle.can_serve(store) {
        return false;
    }
    if !store.servable_on(problem.day()) {
        return false;
    }

    let (mut time, mut location) = if position == 0 {
        (route.depot_departure(), problem.depot_location_id())
    } else {
        let previous = &route.stops()[position - 1];
        (
            previous.departure,
            problem.store(previous.store_id).location_id(),
        )
    };

    let suffix = route.stops()[position..].iter().map(|stop| stop.store_id);
    for current in std::iter::once(store_id).chain(suffix) {
        let current_store = problem.store(current);
        time = time + problem.travel_time(location, current_store.location_id());

        let Some(window) = current_store.window_for_day(problem.day()) else {
            return false;
        };
        if time.time() < window.earliest() {
            time = time.date().to_datetime(window.earliest());
        }
        if time.time() > window.latest() {
            return false;
        }
        if current_store.has_forbidden_conflict(time.time()) {
            return false;
        }

        time = time + current_store.service_duration();
        location = current_store.location_id();
    }

    let depot_return = time + problem.travel_time(location, problem.depot_location_id());
    depot_return.duration_since(route.depot_departure()) <= vehicle.max_route_duration()
}

/// Distance delta of splicing `store_id` into `route` at `position`.
pub fn insertion_cost(
    problem: &RoutingProblem,
    route: &Route,
    store_id: StoreId,
    position: usize,
) -> f64 {
    let depot = problem.depot_location_id();
    let location = problem.store(store_id).location_id();

    let before = match position.checked_sub(1).and_then(|p| route.stops().get(p)) {
        Some(stop) => problem.store(stop.store_id).location_id(),
        None => depot,
    };
    let after = match route.stops().get(position) {
        Some(stop) => problem.store(stop.store_id).location_id(),
        None => depot,
    };

    problem.distance(before, location) + problem.distance(location, after)
        - problem.distance(before, after)
}

/// Whole-route feasibility via a fresh forward simulation. Used where an
/// edit is not a single insertion: 2-opt reversals, savings merges, and
/// the best-solution gate inside the search.
pub fn route_is_feasible(problem: &RoutingProblem, route: &Route) -> bool {
    if route.is_empty() {
        return true;
    }
    let vehicle = problem.vehicle(route.vehicle_id());

    if route.total_load() > vehicle.capacity() + CAPACITY_EPSILON {
        return false;
    }

    let ids: Vec<StoreId> = route.store_ids().collect();
    let schedule = simulate_schedule(problem, route.vehicle_id(), &ids);

    for stop in &schedule.stops {
        let store = problem.store(stop.store_id);
        if !vehicle.can_serve(store) {
            return false;
        }
        let Some(window) = store.window_for_day(problem.day()) else {
            return false;
        };
        if !store.is_day_allowed(problem.day())
            || stop.arrival.time() > window.latest()
            || store.has_forbidden_conflict(stop.arrival.time())
        {
            return false;
        }
    }

    schedule.depot_return.duration_since(route.depot_departure()) <= vehicle.max_route_duration()
}
