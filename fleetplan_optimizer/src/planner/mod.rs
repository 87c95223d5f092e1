//! Multi-day consolidation planner. Assigns each store's weekly delivery
//! to one working day (large orders get a dedicated day, the rest are
//! clustered to minimize dispatches), then solves the five days
//! independently, one scoped thread per day.

use std::collections::BTreeMap;
use std::sync::Arc;

use jiff::ToSpan;
use jiff::civil::Date;
use tracing::{info, warn};

use crate::problem::{
    LocationId, RoutingProblem, Store, TravelMatrix, Vehicle, WORKING_WEEK, Weekday,
};
use crate::solution::{
    ConsolidationStats, Solution, UnassignedReason, UnplannedStore, WeeklySolution,
};
use crate::solver::DaySolver;

const PREFERRED_DAY_BONUS: f64 = 500.0;
const EXISTING_LOAD_BONUS: f64 = 200.0;
const HEADROOM_BONUS: f64 = 300.0;
const PROXIMITY_BONUS: f64 = 400.0;
const FORBIDDEN_OVERLAP_PENALTY: f64 = 250.0;

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// A store whose demand reaches this share of the largest compatible
    /// vehicle gets a day of its own.
    pub consolidation_threshold: f64,
    /// Stores within this distance of a day's existing assignments earn
    /// the clustering bonus.
    pub clustering_radius_km: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            consolidation_threshold: 0.7,
            clustering_radius_km: 10.0,
        }
    }
}

pub struct WeeklyPlanner<S> {
    stores: Vec<Store>,
    vehicles: Vec<Vehicle>,
    matrix: Arc<TravelMatrix>,
    depot_location_id: LocationId,
    config: PlannerConfig,
    solver: S,
}

impl<S: DaySolver> WeeklyPlanner<S> {
    pub fn new(
        stores: Vec<Store>,
        vehicles: Vec<Vehicle>,
        matrix: Arc<TravelMatrix>,
        depot_location_id: LocationId,
        config: PlannerConfig,
        solver: S,
    ) -> Self {
        Self {
            stores,
            vehicles,
            matrix,
            depot_location_id,
            config,
            solver,
        }
    }

    /// Plan the working week starting at `monday`. Day failures degrade
    /// to infeasible day solutions; the week itself always completes.
    pub fn plan_week(&self, monday: Date) -> WeeklySolution {
        let (assignments, unplanned, baseline_trips, consolidation_candidates) =
            self.assign_days();

        let mut days: BTreeMap<Weekday, Solution> = BTreeMap::new();
        let mut problems: BTreeMap<Weekday, Arc<RoutingProblem>> = BTreeMap::new();

        std::thread::scope(|scope| {
            let handles: Vec<_> = WORKING_WEEK
                .iter()
                .map(|&day| {
                    let store_indexes = assignments[&day].clone();
                    let handle = scope.spawn(move || {
                        let problem = Arc::new(self.day_problem(day, monday, &store_indexes));
                        let solution = match self.solver.solve(&problem) {
                            Ok(solution) => solution,
                            Err(error) => {
                                warn!(day = %day, error = %error, "day solve failed");
                                Solution::failed(&problem)
                            }
                        };
                        (problem, solution)
                    });
                    (day, handle)
                })
                .collect();

            for (day, handle) in handles {
                match handle.join() {
                    Ok((problem, solution)) => {
                        days.insert(day, solution);
                        problems.insert(day, problem);
                    }
                    Err(_) => {
                        warn!(day = %day, "day solver thread panicked");
                        let problem =
                            Arc::new(self.day_problem(day, monday, &assignments[&day]));
                        days.insert(day, Solution::failed(&problem));
                        problems.insert(day, problem);
                    }
                }
            }
        });

        let optimized_trips: usize = days.values().map(Solution::vehicles_used).sum();
        let stores_per_day = days
            .iter()
            .map(|(&day, solution)| (day, solution.visited_count()))
            .collect();

        let trip_reduction_percent = if baseline_trips > 0 {
            (baseline_trips.saturating_sub(optimized_trips)) as f64 / baseline_trips as f64 * 100.0
        } else {
            0.0
        };
        let consolidation_rate_percent = if self.stores.is_empty() {
            0.0
        } else {
            consolidation_candidates as f64 / self.stores.len() as f64 * 100.0
        };

        let stats = ConsolidationStats {
            total_stores: self.stores.len(),
            baseline_trips,
            optimized_trips,
            trip_reduction_percent,
            consolidation_rate_percent,
            stores_per_day,
        };

        info!(
            baseline_trips,
            optimized_trips,
            trip_reduction_percent,
            unplanned = unplanned.len(),
            "weekly plan complete"
        );
        WeeklySolution::new(days, problems, unplanned, stats)
    }

    /// Pick one day per store. Large orders first so they claim capacity
    /// before the consolidation candidates cluster around what remains.
    #[allow(clippy::type_complexity)]
    fn assign_days(
        &self,
    ) -> (
        BTreeMap<Weekday, Vec<usize>>,
        Vec<UnplannedStore>,
        usize,
        usize,
    ) {
        let mut assignments: BTreeMap<Weekday, Vec<usize>> =
            WORKING_WEEK.iter().map(|&day| (day, Vec::new())).collect();
        let mut day_loads = [0.0_f64; WORKING_WEEK.len()];
        let mut unplanned = Vec::new();
        let mut baseline_trips = 0;
        let mut consolidation_candidates = 0;

        let mut order: Vec<usize> = (0..self.stores.len()).collect();
        order.sort_by(|&a, &b| {
            self.stores[b]
                .demand()
                .total_cmp(&self.stores[a].demand())
                .then_with(|| a.cmp(&b))
        });

        for index in order {
            let store = &self.stores[index];

            let feasible: Vec<Weekday> = WORKING_WEEK
                .iter()
                .copied()
                .filter(|&day| store.servable_on(day))
                .collect();
            if feasible.is_empty() {
                let reason = if WORKING_WEEK.iter().all(|&day| !store.is_day_allowed(day)) {
                    UnassignedReason::ExcludedEveryDay
                } else {
                    UnassignedReason::NoServiceWindow
                };
                unplanned.push(UnplannedStore {
                    external_id: store.external_id().to_string(),
                    reason,
                });
                continue;
            }

            let largest_capacity = self
                .vehicles
                .iter()
                .filter(|vehicle| vehicle.can_serve(store))
                .map(Vehicle::capacity)
                .fold(0.0_f64, f64::max);
            if store.demand() > largest_capacity {
                unplanned.push(UnplannedStore {
                    external_id: store.external_id().to_string(),
                    reason: UnassignedReason::DemandExceedsCapacity,
                });
                continue;
            }

            baseline_trips += feasible.len();

            let dedicated =
                store.demand() >= self.config.consolidation_threshold * largest_capacity;
            let day = if dedicated {
                self.best_dedicated_day(store, &feasible, &day_loads)
            } else {
                consolidation_candidates += 1;
                self.best_consolidation_day(store, &feasible, &day_loads, &assignments)
            };

            day_loads[day.index()] += store.demand();
            assignments.entry(day).or_default().push(index);
        }

        (
            assignments,
            unplanned,
            baseline_trips,
            consolidation_candidates,
        )
    }

    /// A day for an order big enough to monopolize a vehicle: favor wide
    /// windows, preferred days and light days; ties go to the earliest day.
    fn best_dedicated_day(&self, store: &Store, feasible: &[Weekday], day_loads: &[f64]) -> Weekday {
        let mut best = feasible[0];
        let mut best_score = f64::NEG_INFINITY;
        for &day in feasible {
            let mut score = 1000.0 - day_loads[day.index()];
            if let Some(window) = store.window_for_day(day) {
                score += window.duration().as_mins() as f64;
                if store
                    .forbidden_intervals()
                    .iter()
                    .any(|interval| interval.overlaps(window))
                {
                    score -= FORBIDDEN_OVERLAP_PENALTY;
                }
            }
            if store.is_day_preferred(day) {
                score += PREFERRED_DAY_BONUS;
            }
            if score > best_score {
                best_score = score;
                best = day;
            }
        }
        best
    }

    /// A day for a consolidation candidate: join days that already have
    /// deliveries nearby, as long as the fleet can still absorb the load.
    fn best_consolidation_day(
        &self,
        store: &Store,
        feasible: &[Weekday],
        day_loads: &[f64],
        assignments: &BTreeMap<Weekday, Vec<usize>>,
    ) -> Weekday {
        let fleet_capacity: f64 = self.vehicles.iter().map(Vehicle::capacity).sum();

        let mut best = feasible[0];
        let mut best_score = f64::NEG_INFINITY;
        for &day in feasible {
            let load = day_loads[day.index()];
            if load + store.demand() > fleet_capacity {
                continue;
            }

            let mut score = 0.0;
            if load > 0.0 {
                score += EXISTING_LOAD_BONUS;
            }
            if fleet_capacity > 0.0 && load / fleet_capacity < self.config.consolidation_threshold {
                score += HEADROOM_BONUS;
            }
            if store.is_day_preferred(day) {
                score += PREFERRED_DAY_BONUS;
            }
            let nearby = assignments[&day].iter().any(|&other| {
                self.matrix.distance(
                    store.location_id(),
                    self.stores[other].location_id(),
                ) < self.config.clustering_radius_km
            });
            if nearby {
                score += PROXIMITY_BONUS;
            }

            if score > best_score {
                best_score = score;
                best = day;
            }
        }
        best
    }

    fn day_problem(&self, day: Weekday, monday: Date, store_indexes: &[usize]) -> RoutingProblem {
        let mut builder = RoutingProblem::builder();
        builder
            .set_stores(
                store_indexes
                    .iter()
                    .map(|&index| self.stores[index].clone())
                    .collect(),
            )
            .set_vehicles(self.vehicles.clone())
            .set_matrix(Arc::clone(&self.matrix))
            .set_depot_location_id(self.depot_location_id)
            .set_date(monday + (day.index() as i32).days());
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SavingsSolver;
    use crate::test_utils;

    fn planner(stores: Vec<Store>) -> WeeklyPlanner<SavingsSolver> {
        WeeklyPlanner::new(
            stores,
            vec![test_utils::basic_vehicle("V1", 30.0)],
            test_utils::small_matrix(),
            0,
            PlannerConfig::default(),
            SavingsSolver,
        )
    }

    #[test]
    fn big_orders_get_a_dedicated_day() {
        let weekly = planner(vec![
            test_utils::basic_store("BIG", 1, 25.0),
            test_utils::basic_store("SMALL", 2, 10.0),
        ])
        .plan_week(test_utils::MONDAY);

        // 25 >= 0.7 * 30, so BIG monopolizes its day
        let big_days: Vec<Weekday> = weekly
            .days()
            .filter(|(day, _)| {
                weekly
                    .problem(*day)
                    .is_some_and(|p| p.stores().iter().any(|s| s.external_id() == "BIG"))
            })
            .map(|(day, _)| day)
            .collect();
        assert_eq!(big_days.len(), 1);

        let big_day_problem = weekly.problem(big_days[0]).unwrap();
        assert_eq!(big_day_problem.num_stores(), 1);

        assert_eq!(weekly.stats().consolidation_rate_percent, 50.0);
        assert!(weekly.unplanned().is_empty());
    }

    #[test]
    fn small_orders_cluster_onto_one_day() {
        let weekly = planner(vec![
            test_utils::basic_store("A", 1, 5.0),
            test_utils::basic_store("B", 2, 5.0),
            test_utils::basic_store("C", 3, 5.0),
        ])
        .plan_week(test_utils::MONDAY);

        // all three are consolidation candidates within 10 km of each other
        let loaded_days: Vec<usize> = weekly
            .days()
            .map(|(_, solution)| solution.visited_count())
            .filter(|&count| count > 0)
            .collect();
        assert_eq!(loaded_days, vec![3]);
        assert_eq!(weekly.stats().optimized_trips, 1);
        // baseline: 3 stores x 5 feasible days
        assert_eq!(weekly.stats().baseline_trips, 15);
    }

    #[test]
    fn unservable_store_is_reported_at_week_level() {
        let mut builder = Store::builder();
        builder.set_external_id("NOWIN").set_location_id(1).set_demand(5.0);
        // no time window at all
        let weekly = planner(vec![builder.build()]).plan_week(test_utils::MONDAY);

        assert_eq!(weekly.unplanned().len(), 1);
        assert_eq!(
            weekly.unplanned()[0].reason,
            UnassignedReason::NoServiceWindow
        );
    }

    #[test]
    fn oversized_store_is_reported_at_week_level() {
        let weekly =
            planner(vec![test_utils::basic_store("HUGE", 1, 31.0)]).plan_week(test_utils::MONDAY);
        assert_eq!(
            weekly.unplanned()[0].reason,
            UnassignedReason::DemandExceedsCapacity
        );
    }

    #[test]
    fn every_day_gets_a_solution() {
        let weekly = planner(vec![test_utils::basic_store("A", 1, 5.0)])
            .plan_week(test_utils::MONDAY);
        for day in WORKING_WEEK {
            assert!(weekly.day(day).is_some());
            assert_eq!(weekly.day(day).unwrap().day(), day);
        }
    }
}
