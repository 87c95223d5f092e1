use std::fmt;

use jiff::civil::Date;
use serde::Serialize;

use crate::constraints::validator::Violation;
use crate::problem::{RoutingProblem, StoreId, VehicleId, Weekday};

use super::route::Route;

/// Why a store could not be served. Infeasibility is surfaced, never
/// silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnassignedReason {
    /// Demand exceeds every compatible vehicle's capacity.
    DemandExceedsCapacity,
    /// No admissible service window on this day.
    NoServiceWindow,
    /// Every working day is excluded for this store.
    ExcludedEveryDay,
    /// Compatible vehicles exist but all routes are full.
    FleetExhausted,
    /// No feasible insertion point was found during repair.
    NoFeasibleInsertion,
}

impl fmt::Display for UnassignedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UnassignedReason::DemandExceedsCapacity => "demand exceeds vehicle capacity",
            UnassignedReason::NoServiceWindow => "no admissible service window",
            UnassignedReason::ExcludedEveryDay => "every working day is excluded",
            UnassignedReason::FleetExhausted => "fleet capacity exhausted",
            UnassignedReason::NoFeasibleInsertion => "no feasible insertion point",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unassigned {
    pub store_id: StoreId,
    pub reason: UnassignedReason,
}

/// A complete plan for one day: exactly one route slot per fleet vehicle
/// (empty routes allowed) plus the unassigned stores. `is_feasible` and
/// `violations` are set by certification after solving.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    day: Weekday,
    date: Date,
    routes: Vec<Route>,
    unassigned: Vec<Unassigned>,
    is_feasible: bool,
    violations: Vec<Violation>,
}

impl Solution {
    pub fn empty(problem: &RoutingProblem) -> Self {
        Self {
            day: problem.day(),
            date: problem.date(),
            routes: (0..problem.vehicles().len())
                .map(|vehicle_id| Route::empty(problem, vehicle_id))
                .collect(),
            unassigned: Vec::new(),
            is_feasible: false,
            violations: Vec::new(),
        }
    }

    /// Fallback when a day's solve fails entirely: every store unserved,
    /// marked infeasible.
    pub fn failed(problem: &RoutingProblem) -> Self {
        let mut solution = Self::empty(problem);
        for store in problem.stores() {
            solution.mark_unassigned(store.id(), UnassignedReason::NoFeasibleInsertion);
        }
        solution
    }

    pub fn day(&self) -> Weekday {
        self.day
    }

    pub fn date(&self) -> Date {
        self.date
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route(&self, vehicle_id: VehicleId) -> &Route {
        &self.routes[vehicle_id]
    }

    pub fn route_mut(&mut self, vehicle_id: VehicleId) -> &mut Route {
        &mut self.routes[vehicle_id]
    }

    pub fn used_routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().filter(|route| !route.is_empty())
    }

    pub fn vehicles_used(&self) -> usize {
        self.used_routes().count()
    }

    pub fn visited_count(&self) -> usize {
        self.routes.iter().map(Route::len).sum()
    }

    pub fn unassigned(&self) -> &[Unassigned] {
        &self.unassigned
    }

    /// Kept sorted by store id so downstream iteration is deterministic.
    pub fn mark_unassigned(&mut self, store_id: StoreId, reason: UnassignedReason) {
        match self.unassigned.binary_search_by_key(&store_id, |u| u.store_id) {
            Ok(existing) => self.unassigned[existing].reason = reason,
            Err(position) => self.unassigned.insert(position, Unassigned { store_id, reason }),
        }
    }

    pub fn route_of_store(&self, store_id: StoreId) -> Option<VehicleId> {
        self.routes
            .iter()
            .find(|route| route.contains_store(store_id))
            .map(Route::vehicle_id)
    }

    /// Remove a served store from whichever route holds it.
    pub fn remove_store(&mut self, problem: &RoutingProblem, store_id: StoreId) -> bool {
        for route in &mut self.routes {
            if route.remove_store(problem, store_id) {
                return true;
            }
        }
        false
    }

    pub fn total_distance(&self) -> f64 {
        self.routes.iter().map(Route::total_distance).sum()
    }

    pub fn total_cost(&self, problem: &RoutingProblem) -> f64 {
        self.routes.iter().map(|route| route.cost(problem)).sum()
    }

    /// Mean utilization over used routes, as a percentage.
    pub fn average_utilization(&self, problem: &RoutingProblem) -> f64 {
        let used = self.vehicles_used();
        if used == 0 {
            return 0.0;
        }
        self.used_routes()
            .map(|route| route.utilization(problem))
            .sum::<f64>()
            / used as f64
    }

    pub fn is_feasible(&self) -> bool {
        self.is_feasible
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Record the outcome of the exhaustive validation pass.
    pub fn certify(&mut self, violations: Vec<Violation>) {
        self.is_feasible = violations.is_empty();
        self.violations = violations;
    }
}
