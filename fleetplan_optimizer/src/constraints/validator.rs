//! Exhaustive solution audit. Unlike the hot-loop checker this recomputes
//! every schedule from scratch, never mutates its inputs, and collects the
//! complete violation list instead of stopping at the first failure.
//! Running it twice on the same solution yields the same result.

use fxhash::FxHashSet;
use jiff::civil::Time;
use thiserror::Error;

use crate::problem::{RoutingProblem, StoreId, VehicleId, Weekday};
use crate::solution::route::simulate_schedule;
use crate::solution::{Route, Solution};

use super::CAPACITY_EPSILON;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Violation {
    #[error("vehicle {vehicle}: load {load:.2} exceeds capacity {capacity:.2}")]
    CapacityExceeded {
        vehicle: VehicleId,
        load: f64,
        capacity: f64,
    },
    #[error("store {store}: arrival {arrival} after window close {latest}")]
    OutsideTimeWindow {
        store: StoreId,
        arrival: Time,
        latest: Time,
    },
    #[error("store {store}: service at {arrival} falls in a forbidden interval")]
    ForbiddenIntervalHit { store: StoreId, arrival: Time },
    #[error("store {store}: no service window applies on {day}")]
    NoServiceWindow { store: StoreId, day: Weekday },
    #[error("store {store}: deliveries excluded on {day}")]
    ExcludedDay { store: StoreId, day: Weekday },
    #[error("vehicle {vehicle} is not allowed to serve store {store}")]
    FleetRestriction { vehicle: VehicleId, store: StoreId },
    #[error("vehicle {vehicle}: route duration {minutes} min exceeds maximum {max_minutes} min")]
    MaxDurationExceeded {
        vehicle: VehicleId,
        minutes: i64,
        max_minutes: i64,
    },
    #[error("store {store} appears on more than one route")]
    DuplicateStore { store: StoreId },
    #[error("store {store} is neither routed nor reported unassigned")]
    UnaccountedStore { store: StoreId },
}

/// All hard-constraint violations on a single route.
pub fn validate_route(problem: &RoutingProblem, route: &Route) -> Vec<Violation> {
    let mut violations = Vec::new();
    if route.is_empty() {
        return violations;
    }

    let vehicle = problem.vehicle(route.vehicle_id());
    let day = problem.day();
    let ids: Vec<StoreId> = route.store_ids().collect();
    let schedule = simulate_schedule(problem, route.vehicle_id(), &ids);

    if schedule.total_load > vehicle.capacity() + CAPACITY_EPSILON {
        violations.push(Violation::CapacityExceeded {
            vehicle: vehicle.id(),
            load: schedule.total_load,
            capacity: vehicle.capacity(),
        });
    }

    for stop in &schedule.stops {
        let store = problem.store(stop.store_id);

        if !vehicle.can_serve(store) {
            violations.push(Violation::FleetRestriction {
                vehicle: vehicle.id(),
                store: store.id(),
            });
        }
        if !store.is_day_allowed(day) {
            violations.push(Violation::ExcludedDay {
                store: store.id(),
                day,
            });
        }

        match store.window_for_day(day) {
            None => violations.push(Violation::NoServiceWindow {
                store: store.id(),
                day,
            }),
            Some(window) => {
                if stop.arrival.time() > window.latest() {
                    violations.push(Violation::OutsideTimeWindow {
                        store: store.id(),
                        arrival: stop.arrival.time(),
                        latest: window.latest(),
                    });
                }
            }
        }

        if store.has_forbidden_conflict(stop.arrival.time()) {
            violations.push(Violation::ForbiddenIntervalHit {
                store: store.id(),
                arrival: stop.arrival.time(),
            });
        }
    }

    let duration = schedule.depot_return.duration_since(route.depot_departure());
    if duration > vehicle.max_route_duration() {
        violations.push(Violation::MaxDurationExceeded {
            vehicle: vehicle.id(),
            minutes: duration.as_mins(),
            max_minutes: vehicle.max_route_duration().as_mins(),
        });
    }

    violations
}

/// Route-level checks plus solution-level coverage: every input store is
/// either routed exactly once or reported unassigned.
pub fn validate_solution(problem: &RoutingProblem, solution: &Solution) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut seen: FxHashSet<StoreId> = FxHashSet::default();
    for route in solution.routes() {
        violations.extend(validate_route(problem, route));
        for store_id in route.store_ids() {
            if !seen.insert(store_id) {
                violations.push(Violation::DuplicateStore { store: store_id });
            }
        }
    }

    for store in problem.stores() {
        let routed = seen.contains(&store.id());
        let reported = solution
            .unassigned()
            .iter()
            .any(|u| u.store_id == store.id());
        if routed && reported {
            violations.push(Violation::DuplicateStore { store: store.id() });
        }
        if !routed && !reported {
            violations.push(Violation::UnaccountedStore { store: store.id() });
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::UnassignedReason;
    use crate::test_utils;

    #[test]
    fn feasible_solution_has_no_violations() {
        let problem = test_utils::simple_problem();
        let mut solution = Solution::empty(&problem);
        solution.route_mut(0).push(&problem, 0);
        solution.route_mut(0).push(&problem, 1);
        solution.route_mut(0).push(&problem, 2);
        assert!(validate_solution(&problem, &solution).is_empty());
    }

    #[test]
    fn overloaded_route_is_reported() {
        let problem = test_utils::problem_with(
            vec![
                test_utils::basic_store("S1", 1, 20.0),
                test_utils::basic_store("S2", 2, 20.0),
            ],
            vec![test_utils::basic_vehicle("V1", 30.0)],
        );
        let mut solution = Solution::empty(&problem);
        solution.route_mut(0).push(&problem, 0);
        solution.route_mut(0).push(&problem, 1);

        let violations = validate_solution(&problem, &solution);
        assert!(matches!(
            violations[0],
            Violation::CapacityExceeded { vehicle: 0, .. }
        ));
    }

    #[test]
    fn missing_store_is_unaccounted() {
        let problem = test_utils::simple_problem();
        let mut solution = Solution::empty(&problem);
        solution.route_mut(0).push(&problem, 0);
        solution.mark_unassigned(1, UnassignedReason::FleetExhausted);
        // store 2 is neither routed nor unassigned

        let violations = validate_solution(&problem, &solution);
        assert_eq!(violations, vec![Violation::UnaccountedStore { store: 2 }]);
    }

    #[test]
    fn validation_is_idempotent_and_pure() {
        let problem = test_utils::simple_problem();
        let mut solution = Solution::empty(&problem);
        solution.route_mut(0).push(&problem, 0);
        solution.route_mut(0).push(&problem, 1);
        solution.route_mut(0).push(&problem, 2);

        let before = solution.clone();
        let first = validate_solution(&problem, &solution);
        let second = validate_solution(&problem, &solution);
        assert_eq!(first, second);
        assert_eq!(solution, before);
    }
}
