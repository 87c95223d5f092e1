use std::sync::Arc;

use jiff::SignedDuration;
use jiff::civil::{date, time};

use fleetplan_optimizer::alns::AlnsParams;
use fleetplan_optimizer::constraints::validator;
use fleetplan_optimizer::planner::{PlannerConfig, WeeklyPlanner};
use fleetplan_optimizer::problem::{
    RoutingProblem, Store, StoreBuilder, TimeWindow, TravelMatrix, Vehicle, Weekday,
};
use fleetplan_optimizer::solution::UnassignedReason;
use fleetplan_optimizer::solution::export::WeeklyExport;
use fleetplan_optimizer::solver::{AlnsSolver, DaySolver, SavingsSolver};

const MONDAY: jiff::civil::Date = date(2025, 6, 2);

/// Depot plus three stores; one minute of travel per kilometer.
fn small_matrix() -> Arc<TravelMatrix> {
    let distances = vec![
        vec![0.0, 10.0, 12.0, 8.0],
        vec![10.0, 0.0, 4.0, 6.0],
        vec![12.0, 4.0, 0.0, 5.0],
        vec![8.0, 6.0, 5.0, 0.0],
    ];
    let travel_seconds = distances
        .iter()
        .map(|row| row.iter().map(|km| (km * 60.0) as i64).collect())
        .collect();
    Arc::new(TravelMatrix::new(distances, travel_seconds))
}

fn store(external_id: &str, location_id: usize, demand: f64) -> StoreBuilder {
    let mut builder = Store::builder();
    builder
        .set_external_id(external_id)
        .set_location_id(location_id)
        .set_demand(demand)
        .set_service_duration(SignedDuration::from_mins(30));
    builder
}

fn vehicle(external_id: &str, capacity: f64) -> Vehicle {
    let mut builder = Vehicle::builder();
    builder.set_external_id(external_id).set_capacity(capacity);
    builder.build()
}

fn problem(stores: Vec<Store>, vehicles: Vec<Vehicle>) -> RoutingProblem {
    let mut builder = RoutingProblem::builder();
    builder
        .set_stores(stores)
        .set_vehicles(vehicles)
        .set_matrix(small_matrix())
        .set_depot_location_id(0)
        .set_date(MONDAY);
    builder.build()
}

fn alns_solver(max_iterations: usize) -> AlnsSolver {
    AlnsSolver::new(AlnsParams {
        max_iterations,
        segment_iterations: 25,
        ..AlnsParams::default()
    })
}

#[test]
fn morning_and_afternoon_windows_are_sequenced_correctly() {
    let mut all_day = store("A", 1, 10.0);
    all_day.add_time_window(TimeWindow::new(time(8, 0, 0, 0), time(18, 0, 0, 0)));
    let mut morning = store("B", 2, 10.0);
    morning.add_time_window(TimeWindow::new(time(8, 0, 0, 0), time(12, 0, 0, 0)));
    let mut afternoon = store("C", 3, 10.0);
    afternoon.add_time_window(TimeWindow::new(time(14, 0, 0, 0), time(18, 0, 0, 0)));

    let problem = problem(
        vec![all_day.build(), morning.build(), afternoon.build()],
        vec![vehicle("V1", 30.0)],
    );
    let solution = alns_solver(300).solve(&problem).unwrap();

    assert!(solution.unassigned().is_empty());
    assert_eq!(solution.vehicles_used(), 1);

    let route = solution.used_routes().next().unwrap();
    let order: Vec<usize> = route.store_ids().collect();
    let pos_b = order.iter().position(|&s| s == 1).unwrap();
    let pos_c = order.iter().position(|&s| s == 2).unwrap();
    assert!(pos_b < pos_c, "morning window must precede afternoon");

    let stop_b = &route.stops()[pos_b];
    assert!(stop_b.arrival.time() <= time(12, 0, 0, 0));
    let stop_c = &route.stops()[pos_c];
    assert!(stop_c.arrival.time() >= time(14, 0, 0, 0));

    assert!(validator::validate_solution(&problem, &solution).is_empty());
}

#[test]
fn reported_distance_matches_the_matrix() {
    let mut stores = Vec::new();
    for (id, loc) in [("A", 1), ("B", 2), ("C", 3)] {
        let mut builder = store(id, loc, 10.0);
        builder.add_time_window(TimeWindow::new(time(8, 0, 0, 0), time(18, 0, 0, 0)));
        stores.push(builder.build());
    }
    let problem = problem(stores, vec![vehicle("V1", 30.0)]);
    let solution = SavingsSolver.solve(&problem).unwrap();

    let mut recomputed = 0.0;
    for route in solution.used_routes() {
        let mut location = problem.depot_location_id();
        for stop in route.stops() {
            let next = problem.store(stop.store_id).location_id();
            recomputed += problem.distance(location, next);
            location = next;
        }
        recomputed += problem.distance(location, problem.depot_location_id());
    }
    assert!((solution.total_distance() - recomputed).abs() < 1e-9);
}

#[test]
fn oversized_demand_is_reported_with_a_reason() {
    let mut big = store("BIG", 1, 31.0);
    big.add_time_window(TimeWindow::new(time(8, 0, 0, 0), time(18, 0, 0, 0)));
    let problem = problem(vec![big.build()], vec![vehicle("V1", 30.0)]);

    let solution = alns_solver(100).solve(&problem).unwrap();
    assert_eq!(solution.visited_count(), 0);
    assert_eq!(solution.unassigned().len(), 1);
    assert_eq!(
        solution.unassigned()[0].reason,
        UnassignedReason::DemandExceedsCapacity
    );
}

#[test]
fn fixed_seed_reproduces_the_same_plan() {
    let build = || {
        let mut stores = Vec::new();
        for (id, loc, demand) in [("A", 1, 8.0), ("B", 2, 12.0), ("C", 3, 7.0)] {
            let mut builder = store(id, loc, demand);
            builder.add_time_window(TimeWindow::new(time(8, 0, 0, 0), time(18, 0, 0, 0)));
            stores.push(builder.build());
        }
        problem(stores, vec![vehicle("V1", 30.0), vehicle("V2", 30.0)])
    };

    let first = alns_solver(500).solve(&build()).unwrap();
    let second = alns_solver(500).solve(&build()).unwrap();

    let routes = |s: &fleetplan_optimizer::solution::Solution| -> Vec<Vec<usize>> {
        s.routes().iter().map(|r| r.store_ids().collect()).collect()
    };
    assert_eq!(routes(&first), routes(&second));
    assert_eq!(first.total_distance(), second.total_distance());
}

#[test]
fn every_store_is_routed_or_reported() {
    // eight stores but only two 15 CBM vehicles: 10 CBM must be left over
    let coordinates: Vec<(f64, f64)> = (0..9)
        .map(|k| (48.0 + 0.02 * k as f64, 11.0 + 0.01 * (k % 3) as f64))
        .collect();
    let matrix = Arc::new(TravelMatrix::from_coordinates(&coordinates, 40.0));

    let stores: Vec<Store> = (1..9)
        .map(|loc| {
            let mut builder = store(&format!("S{loc}"), loc, 5.0);
            builder.add_time_window(TimeWindow::new(time(8, 0, 0, 0), time(18, 0, 0, 0)));
            builder.build()
        })
        .collect();

    let mut builder = RoutingProblem::builder();
    builder
        .set_stores(stores)
        .set_vehicles(vec![vehicle("V1", 15.0), vehicle("V2", 15.0)])
        .set_matrix(matrix)
        .set_depot_location_id(0)
        .set_date(MONDAY);
    let problem = builder.build();

    let solution = alns_solver(400).solve(&problem).unwrap();
    assert_eq!(
        solution.visited_count() + solution.unassigned().len(),
        problem.num_stores()
    );
    assert!(solution.visited_count() <= 6);
    assert!(validator::validate_solution(&problem, &solution).is_empty());
}

#[test]
fn weekly_consolidation_respects_the_dedicated_day_threshold() {
    let mut big = store("BIG", 1, 25.0);
    big.add_time_window(TimeWindow::new(time(8, 0, 0, 0), time(18, 0, 0, 0)));
    let mut small = store("SMALL", 2, 10.0);
    small.add_time_window(TimeWindow::new(time(8, 0, 0, 0), time(18, 0, 0, 0)));

    let planner = WeeklyPlanner::new(
        vec![big.build(), small.build()],
        vec![vehicle("V1", 30.0)],
        small_matrix(),
        0,
        PlannerConfig::default(),
        SavingsSolver,
    );
    let weekly = planner.plan_week(MONDAY);

    // 25 >= 0.7 * 30: the big order owns its day; 10 does not
    let days_with_big: Vec<Weekday> = weekly
        .days()
        .filter(|(day, _)| {
            weekly
                .problem(*day)
                .is_some_and(|p| p.stores().iter().any(|s| s.external_id() == "BIG"))
        })
        .map(|(day, _)| day)
        .collect();
    assert_eq!(days_with_big.len(), 1);
    assert_eq!(weekly.problem(days_with_big[0]).unwrap().num_stores(), 1);

    assert_eq!(weekly.stats().total_stores, 2);
    assert_eq!(weekly.stats().consolidation_rate_percent, 50.0);
    assert_eq!(weekly.stats().optimized_trips, 2);
    assert!(weekly.unplanned().is_empty());
}

#[test]
fn weekly_export_serializes_to_json() {
    let mut a = store("A", 1, 5.0);
    a.add_time_window(TimeWindow::new(time(8, 0, 0, 0), time(18, 0, 0, 0)));
    let mut b = store("B", 2, 5.0);
    b.add_time_window(TimeWindow::new(time(8, 0, 0, 0), time(18, 0, 0, 0)));
    b.prefer_day(Weekday::Thursday);

    let planner = WeeklyPlanner::new(
        vec![a.build(), b.build()],
        vec![vehicle("V1", 30.0)],
        small_matrix(),
        0,
        PlannerConfig::default(),
        SavingsSolver,
    );
    let weekly = planner.plan_week(MONDAY);

    let export = WeeklyExport::from_weekly(&weekly);
    let json = serde_json::to_value(&export).unwrap();
    assert!(json["days"].is_object());
    assert_eq!(json["stats"]["total_stores"], 2);
    assert_eq!(json["total_vehicles_used"], export.total_vehicles_used);
}

#[test]
fn excluded_days_are_honored_by_the_planner() {
    let mut picky = store("PICKY", 1, 5.0);
    picky
        .add_time_window(TimeWindow::new(time(8, 0, 0, 0), time(18, 0, 0, 0)))
        .exclude_day(Weekday::Monday)
        .exclude_day(Weekday::Tuesday)
        .exclude_day(Weekday::Wednesday)
        .exclude_day(Weekday::Thursday);

    let planner = WeeklyPlanner::new(
        vec![picky.build()],
        vec![vehicle("V1", 30.0)],
        small_matrix(),
        0,
        PlannerConfig::default(),
        SavingsSolver,
    );
    let weekly = planner.plan_week(MONDAY);

    let friday = weekly.day(Weekday::Friday).unwrap();
    assert_eq!(friday.visited_count(), 1);
    for day in [Weekday::Monday, Weekday::Tuesday, Weekday::Wednesday, Weekday::Thursday] {
        assert_eq!(weekly.day(day).unwrap().visited_count(), 0);
    }
}
