use std::sync::Arc;

use jiff::SignedDuration;
use jiff::civil::Date;

use super::store::{Store, StoreId};
use super::travel_matrix::{LocationId, TravelMatrix};
use super::vehicle::{Vehicle, VehicleId};
use super::weekday::Weekday;

/// Immutable single-day routing instance: the stores to serve on one
/// calendar day, the fleet, and the shared travel matrix. Solvers only
/// read from it, so it is shared by reference across threads.
#[derive(Debug, Clone)]
pub struct RoutingProblem {
    stores: Vec<Store>,
    vehicles: Vec<Vehicle>,
    matrix: Arc<TravelMatrix>,
    depot_location_id: LocationId,
    date: Date,
    day: Weekday,
    max_store_demand: f64,
}

impl RoutingProblem {
    pub fn builder() -> RoutingProblemBuilder {
        RoutingProblemBuilder::default()
    }

    pub fn store(&self, id: StoreId) -> &Store {
        &self.stores[id]
    }

    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    pub fn num_stores(&self) -> usize {
        self.stores.len()
    }

    pub fn vehicle(&self, id: VehicleId) -> &Vehicle {
        &self.vehicles[id]
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn matrix(&self) -> &TravelMatrix {
        &self.matrix
    }

    pub fn depot_location_id(&self) -> LocationId {
        self.depot_location_id
    }

    pub fn date(&self) -> Date {
        self.date
    }

    pub fn day(&self) -> Weekday {
        self.day
    }

    #[inline(always)]
    pub fn distance(&self, from: LocationId, to: LocationId) -> f64 {
        self.matrix.distance(from, to)
    }

    #[inline(always)]
    pub fn travel_time(&self, from: LocationId, to: LocationId) -> SignedDuration {
        self.matrix.travel_time(from, to)
    }

    pub fn store_distance(&self, a: StoreId, b: StoreId) -> f64 {
        self.matrix
            .distance(self.stores[a].location_id(), self.stores[b].location_id())
    }

    pub fn depot_distance(&self, store: StoreId) -> f64 {
        self.matrix
            .distance(self.depot_location_id, self.stores[store].location_id())
    }

    pub fn max_store_demand(&self) -> f64 {
        self.max_store_demand
    }
}

#[derive(Debug, Default)]
pub struct RoutingProblemBuilder {
    stores: Vec<Store>,
    vehicles: Vec<Vehicle>,
    matrix: Option<Arc<TravelMatrix>>,
    depot_location_id: LocationId,
    date: Option<Date>,
}

impl RoutingProblemBuilder {
    pub fn set_stores(&mut self, stores: Vec<Store>) -> &mut Self {
        self.stores = stores;
        self
    }

    pub fn add_store(&mut self, store: Store) -> &mut Self {
        self.stores.push(store);
        self
    }

    pub fn set_vehicles(&mut self, vehicles: Vec<Vehicle>) -> &mut Self {
        self.vehicles = vehicles;
        self
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> &mut Self {
        self.vehicles.push(vehicle);
        self
    }

    pub fn set_matrix(&mut self, matrix: Arc<TravelMatrix>) -> &mut Self {
        self.matrix = Some(matrix);
        self
    }

    pub fn set_depot_location_id(&mut self, location_id: LocationId) -> &mut Self {
        self.depot_location_id = location_id;
        self
    }

    pub fn set_date(&mut self, date: Date) -> &mut Self {
        self.date = Some(date);
        self
    }

    /// Ids are (re)assigned densely by position, so stores and vehicles
    /// can be looked up by index in the hot loop.
    pub fn build(mut self) -> RoutingProblem {
        let date = self.date.expect("missing mandatory field: date");
        let day = Weekday::from_date(date).expect("date must fall on a working day (Mon-Fri)");
        let matrix = self.matrix.expect("missing mandatory field: matrix");

        for (id, store) in self.stores.iter_mut().enumerate() {
            store.id = id;
        }
        for (id, vehicle) in self.vehicles.iter_mut().enumerate() {
            vehicle.id = id;
        }

        let max_store_demand = self
            .stores
            .iter()
            .map(Store::demand)
            .fold(0.0_f64, f64::max);

        RoutingProblem {
            stores: self.stores,
            vehicles: self.vehicles,
            matrix,
            depot_location_id: self.depot_location_id,
            date,
            day,
            max_store_demand,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn build_assigns_dense_ids() {
        let problem = test_utils::simple_problem();
        for (idx, store) in problem.stores().iter().enumerate() {
            assert_eq!(store.id(), idx);
        }
        for (idx, vehicle) in problem.vehicles().iter().enumerate() {
            assert_eq!(vehicle.id(), idx);
        }
        assert_eq!(problem.day(), Weekday::Monday);
    }

    #[test]
    fn distances_go_through_the_shared_matrix() {
        let problem = test_utils::simple_problem();
        assert_eq!(problem.depot_distance(0), problem.distance(0, problem.store(0).location_id()));
    }
}
