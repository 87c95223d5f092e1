//! Serializable snapshots of solutions. Internal ids are dense per-day
//! indexes, so the exports resolve them back to external identifiers
//! before anything leaves the process.

use std::collections::BTreeMap;

use jiff::civil::{Date, DateTime};
use serde::Serialize;

use crate::problem::{RoutingProblem, Weekday};

use super::solution::Solution;
use super::weekly::{ConsolidationStats, WeeklySolution};

#[derive(Debug, Clone, Serialize)]
pub struct StopExport {
    pub store_id: String,
    pub store_name: String,
    pub arrival: DateTime,
    pub departure: DateTime,
    pub load_cbm: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteExport {
    pub vehicle_id: String,
    pub stops: Vec<StopExport>,
    pub load_cbm: f64,
    pub capacity_cbm: f64,
    pub utilization_percent: f64,
    pub distance_km: f64,
    pub duration_minutes: i64,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnassignedExport {
    pub store_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolutionExport {
    pub day: Weekday,
    pub date: Date,
    pub is_feasible: bool,
    pub violations: Vec<String>,
    pub routes: Vec<RouteExport>,
    pub unassigned: Vec<UnassignedExport>,
    pub stores_served: usize,
    pub vehicles_used: usize,
    pub total_distance_km: f64,
    pub total_cost: f64,
    pub average_utilization_percent: f64,
}

impl SolutionExport {
    pub fn from_solution(problem: &RoutingProblem, solution: &Solution) -> Self {
        let routes = solution
            .used_routes()
            .map(|route| {
                let vehicle = problem.vehicle(route.vehicle_id());
                RouteExport {
                    vehicle_id: vehicle.external_id().to_string(),
                    stops: route
                        .stops()
                        .iter()
                        .map(|stop| {
                            let store = problem.store(stop.store_id);
                            StopExport {
                                store_id: store.external_id().to_string(),
                                store_name: store.name().to_string(),
                                arrival: stop.arrival,
                                departure: stop.departure,
                                load_cbm: store.demand(),
                            }
                        })
                        .collect(),
                    load_cbm: route.total_load(),
                    capacity_cbm: vehicle.capacity(),
                    utilization_percent: route.utilization(problem),
                    distance_km: route.total_distance(),
                    duration_minutes: route.duration().as_mins(),
                    cost: route.cost(problem),
                }
            })
            .collect();

        Self {
            day: solution.day(),
            date: solution.date(),
            is_feasible: solution.is_feasible(),
            violations: solution
                .violations()
                .iter()
                .map(ToString::to_string)
                .collect(),
            routes,
            unassigned: solution
                .unassigned()
                .iter()
                .map(|u| UnassignedExport {
                    store_id: problem.store(u.store_id).external_id().to_string(),
                    reason: u.reason.to_string(),
                })
                .collect(),
            stores_served: solution.visited_count(),
            vehicles_used: solution.vehicles_used(),
            total_distance_km: solution.total_distance(),
            total_cost: solution.total_cost(problem),
            average_utilization_percent: solution.average_utilization(problem),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyExport {
    pub days: BTreeMap<Weekday, SolutionExport>,
    pub unplanned: Vec<UnassignedExport>,
    pub stats: ConsolidationStats,
    pub total_distance_km: f64,
    pub total_cost: f64,
    pub total_vehicles_used: usize,
}

impl WeeklyExport {
    pub fn from_weekly(weekly: &WeeklySolution) -> Self {
        let days = weekly
            .days()
            .filter_map(|(day, solution)| {
                weekly
                    .problem(day)
                    .map(|problem| (day, SolutionExport::from_solution(problem, solution)))
            })
            .collect();

        Self {
            days,
            unplanned: weekly
                .unplanned()
                .iter()
                .map(|u| UnassignedExport {
                    store_id: u.external_id.clone(),
                    reason: u.reason.to_string(),
                })
                .collect(),
            stats: weekly.stats().clone(),
            total_distance_km: weekly.total_distance(),
            total_cost: weekly.total_cost(),
            total_vehicles_used: weekly.vehicles_used(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::UnassignedReason;
    use crate::test_utils;

    #[test]
    fn export_resolves_external_ids() {
        let problem = test_utils::simple_problem();
        let mut solution = Solution::empty(&problem);
        solution.route_mut(0).push(&problem, 0);
        solution.route_mut(0).push(&problem, 1);
        solution.mark_unassigned(2, UnassignedReason::FleetExhausted);

        let export = SolutionExport::from_solution(&problem, &solution);
        assert_eq!(export.routes.len(), 1);
        assert_eq!(export.routes[0].vehicle_id, "V1");
        assert_eq!(export.routes[0].stops[0].store_id, "S1");
        assert_eq!(export.unassigned[0].store_id, "S3");
        assert_eq!(export.stores_served, 2);

        let json = serde_json::to_string(&export).unwrap();
        assert!(json.contains("\"S1\""));
        assert!(json.contains("fleet capacity exhausted"));
    }
}
