use jiff::SignedDuration;
use jiff::civil::DateTime;

use crate::problem::{RoutingProblem, StoreId, VehicleId};

use super::stop::Stop;

/// One vehicle's scheduled day. The stop sequence is the source of truth;
/// arrival/departure instants, cumulative loads, the depot return and the
/// total distance are derived and refreshed after every mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    vehicle_id: VehicleId,
    stops: Vec<Stop>,
    depot_departure: DateTime,
    depot_return: DateTime,
    total_distance: f64,
    total_load: f64,
}

impl Route {
    pub fn empty(problem: &RoutingProblem, vehicle_id: VehicleId) -> Self {
        let departure = problem
            .date()
            .to_datetime(problem.vehicle(vehicle_id).shift_start());
        Self {
            vehicle_id,
            stops: Vec::new(),
            depot_departure: departure,
            depot_return: departure,
            total_distance: 0.0,
            total_load: 0.0,
        }
    }

    pub fn vehicle_id(&self) -> VehicleId {
        self.vehicle_id
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn store_ids(&self) -> impl Iterator<Item = StoreId> + '_ {
        self.stops.iter().map(|stop| stop.store_id)
    }

    pub fn contains_store(&self, store_id: StoreId) -> bool {
        self.stops.iter().any(|stop| stop.store_id == store_id)
    }

    pub fn position_of(&self, store_id: StoreId) -> Option<usize> {
        self.stops.iter().position(|stop| stop.store_id == store_id)
    }

    pub fn first_store(&self) -> Option<StoreId> {
        self.stops.first().map(|stop| stop.store_id)
    }

    pub fn last_store(&self) -> Option<StoreId> {
        self.stops.last().map(|stop| stop.store_id)
    }

    pub fn depot_departure(&self) -> DateTime {
        self.depot_departure
    }

    pub fn depot_return(&self) -> DateTime {
        self.depot_return
    }

    pub fn duration(&self) -> SignedDuration {
        self.depot_return.duration_since(self.depot_departure)
    }

    /// Total distance in kilometers, depot legs included.
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn total_load(&self) -> f64 {
        self.total_load
    }

    /// Fixed dispatch cost plus distance cost. Empty routes cost nothing.
    pub fn cost(&self, problem: &RoutingProblem) -> f64 {
        if self.stops.is_empty() {
            return 0.0;
        }
        let vehicle = problem.vehicle(self.vehicle_id);
        vehicle.fixed_cost() + self.total_distance * vehicle.cost_per_km()
    }

    /// Load as a percentage of the vehicle's capacity.
    pub fn utilization(&self, problem: &RoutingProblem) -> f64 {
        let capacity = problem.vehicle(self.vehicle_id).capacity();
        if capacity <= 0.0 {
            return 0.0;
        }
        self.total_load / capacity * 100.0
    }

    pub fn insert(&mut self, problem: &RoutingProblem, position: usize, store_id: StoreId) {
        self.stops.insert(
            position,
            Stop {
                store_id,
                arrival: self.depot_departure,
                departure: self.depot_departure,
                cumulative_load: 0.0,
            },
        );
        self.recompute(problem);
    }

    pub fn push(&mut self, problem: &RoutingProblem, store_id: StoreId) {
        let position = self.stops.len();
        self.insert(problem, position, store_id);
    }

    pub fn remove_store(&mut self, problem: &RoutingProblem, store_id: StoreId) -> bool {
        match self.position_of(store_id) {
            Some(position) => {
                self.stops.remove(position);
                self.recompute(problem);
                true
            }
            None => false,
        }
    }

    /// Reverse the inclusive stop span `[from, to]` (2-opt move).
    pub fn reverse_segment(&mut self, problem: &RoutingProblem, from: usize, to: usize) {
        self.stops[from..=to].reverse();
        self.recompute(problem);
    }

    /// Replace the whole stop sequence, e.g. when splicing two routes
    /// during a savings merge.
    pub(crate) fn set_store_ids(&mut self, problem: &RoutingProblem, store_ids: &[StoreId]) {
        self.stops = store_ids
            .iter()
            .map(|&store_id| Stop {
                store_id,
                arrival: self.depot_departure,
                departure: self.depot_departure,
                cumulative_load: 0.0,
            })
            .collect();
        self.recompute(problem);
    }

    pub(crate) fn clear(&mut self, problem: &RoutingProblem) {
        self.stops.clear();
        self.recompute(problem);
    }

    fn recompute(&mut self, problem: &RoutingProblem) {
        let ids: Vec<StoreId> = self.store_ids().collect();
        let schedule = simulate_schedule(problem, self.vehicle_id, &ids);
        self.stops = schedule.stops;
        self.depot_return = schedule.depot_return;
        self.total_distance = schedule.total_distance;
        self.total_load = schedule.total_load;
    }
}

pub(crate) struct Schedule {
    pub stops: Vec<Stop>,
    pub depot_return: DateTime,
    pub total_distance: f64,
    pub total_load: f64,
}

/// Forward schedule pass shared by route recomputation, the quick checker
/// and the validator. Arriving before a window opens means waiting until
/// it does; lateness is NOT corrected here, it is the callers' job to
/// detect it against the window.
pub(crate) fn simulate_schedule(
    problem: &RoutingProblem,
    vehicle_id: VehicleId,
    store_ids: &[StoreId],
) -> Schedule {
    let vehicle = problem.vehicle(vehicle_id);
    let depot = problem.depot_location_id();
    let depot_departure = problem.date().to_datetime(vehicle.shift_start());

    let mut stops = Vec::with_capacity(store_ids.len());
    let mut time = depot_departure;
    let mut location = depot;
    let mut distance = 0.0;
    let mut load = 0.0;

    for &store_id in store_ids {
        let store = problem.store(store_id);
        distance += problem.distance(location, store.location_id());
        time = time + problem.travel_time(location, store.location_id());

        if let Some(window) = store.window_for_day(problem.day())
            && time.time() < window.earliest()
        {
            time = time.date().to_datetime(window.earliest());
        }

        load += store.demand();
        let departure = time + store.service_duration();
        stops.push(Stop {
            store_id,
            arrival: time,
            departure,
            cumulative_load: load,
        });

        time = departure;
        location = store.location_id();
    }

    distance += problem.distance(location, depot);
    let depot_return = if store_ids.is_empty() {
        depot_departure
    } else {
        time + problem.travel_time(location, depot)
    };

    Schedule {
        stops,
        depot_return,
        total_distance: if store_ids.is_empty() { 0.0 } else { distance },
        total_load: load,
    }
}
