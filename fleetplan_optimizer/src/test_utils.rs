use std::sync::Arc;

use jiff::civil::{Date, date, time};

use crate::problem::{
    RoutingProblem, Store, TimeWindow, TravelMatrix, Vehicle,
};

pub(crate) const MONDAY: Date = date(2025, 6, 2);

/// Four locations: depot (0) and three stores on a small asymmetric-free
/// layout. Travel time is one minute per kilometer.
pub(crate) fn small_matrix() -> Arc<TravelMatrix> {
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

pub(crate) fn basic_store(external_id: &str, location_id: usize, demand: f64) -> Store {
    let mut builder = Store::builder();
    builder
        .set_external_id(external_id)
        .set_location_id(location_id)
        .set_demand(demand)
        .set_service_duration(jiff::SignedDuration::from_mins(30))
        .add_time_window(TimeWindow::new(time(8, 0, 0, 0), time(18, 0, 0, 0)));
    builder.build()
}

pub(crate) fn basic_vehicle(external_id: &str, capacity: f64) -> Vehicle {
    let mut builder = Vehicle::builder();
    builder.set_external_id(external_id).set_capacity(capacity);
    builder.build()
}

pub(crate) fn problem_with(stores: Vec<Store>, vehicles: Vec<Vehicle>) -> RoutingProblem {
    let mut builder = RoutingProblem::builder();
    builder
        .set_stores(stores)
        .set_vehicles(vehicles)
        .set_matrix(small_matrix())
        .set_depot_location_id(0)
        .set_date(MONDAY);
    builder.build()
}

/// Three stores, one 30 CBM vehicle.
pub(crate) fn simple_problem() -> RoutingProblem {
    problem_with(
        vec![
            basic_store("S1", 1, 10.0),
            basic_store("S2", 2, 10.0),
            basic_store("S3", 3, 10.0),
        ],
        vec![basic_vehicle("V1", 30.0)],
    )
}
