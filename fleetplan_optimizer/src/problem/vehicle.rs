use fxhash::FxHashSet;
use jiff::SignedDuration;
use jiff::civil::{Time, time};

use super::store::Store;

pub type VehicleId = usize;

/// A truck in the fleet. Compatibility sets are keyed by store external id
/// so they survive the per-day re-indexing done by the planner.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub(crate) id: VehicleId,
    external_id: String,
    name: String,
    capacity: f64,
    max_route_duration: SignedDuration,
    shift_start: Time,
    fixed_cost: f64,
    cost_per_km: f64,
    vehicle_type: String,
    allowed_store_ids: FxHashSet<String>,
    forbidden_store_ids: FxHashSet<String>,
}

impl Vehicle {
    pub fn builder() -> VehicleBuilder {
        VehicleBuilder::default()
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capacity in cubic meters.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn max_route_duration(&self) -> SignedDuration {
        self.max_route_duration
    }

    pub fn shift_start(&self) -> Time {
        self.shift_start
    }

    pub fn fixed_cost(&self) -> f64 {
        self.fixed_cost
    }

    pub fn cost_per_km(&self) -> f64 {
        self.cost_per_km
    }

    pub fn vehicle_type(&self) -> &str {
        &self.vehicle_type
    }

    /// Forbidden wins over allowed; a non-empty allowed set is exclusive.
    pub fn can_serve(&self, store: &Store) -> bool {
        if self.forbidden_store_ids.contains(store.external_id()) {
            return false;
        }
        self.allowed_store_ids.is_empty() || self.allowed_store_ids.contains(store.external_id())
    }
}

#[derive(Debug)]
pub struct VehicleBuilder {
    external_id: Option<String>,
    name: Option<String>,
    capacity: Option<f64>,
    max_route_duration: SignedDuration,
    shift_start: Time,
    fixed_cost: f64,
    cost_per_km: f64,
    vehicle_type: String,
    allowed_store_ids: FxHashSet<String>,
    forbidden_store_ids: FxHashSet<String>,
}

impl Default for VehicleBuilder {
    fn default() -> Self {
        Self {
            external_id: None,
            name: None,
            capacity: None,
            max_route_duration: SignedDuration::from_hours(12),
            shift_start: time(8, 0, 0, 0),
            fixed_cost: 1000.0,
            cost_per_km: 2.0,
            vehicle_type: "standard".to_string(),
            allowed_store_ids: FxHashSet::default(),
            forbidden_store_ids: FxHashSet::default(),
        }
    }
}

impl VehicleBuilder {
    pub fn set_external_id(&mut self, external_id: impl Into<String>) -> &mut Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_capacity(&mut self, capacity: f64) -> &mut Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn set_max_route_duration(&mut self, duration: SignedDuration) -> &mut Self {
        self.max_route_duration = duration;
        self
    }

    pub fn set_shift_start(&mut self, start: Time) -> &mut Self {
        self.shift_start = start;
        self
    }

    pub fn set_fixed_cost(&mut self, cost: f64) -> &mut Self {
        self.fixed_cost = cost;
        self
    }

    pub fn set_cost_per_km(&mut self, cost: f64) -> &mut Self {
        self.cost_per_km = cost;
        self
    }

    pub fn set_vehicle_type(&mut self, vehicle_type: impl Into<String>) -> &mut Self {
        self.vehicle_type = vehicle_type.into();
        self
    }

    pub fn allow_store(&mut self, store_external_id: impl Into<String>) -> &mut Self {
        self.allowed_store_ids.insert(store_external_id.into());
        self
    }

    pub fn forbid_store(&mut self, store_external_id: impl Into<String>) -> &mut Self {
        self.forbidden_store_ids.insert(store_external_id.into());
        self
    }

    pub fn build(self) -> Vehicle {
        let external_id = self.external_id.expect("missing mandatory field: external_id");
        Vehicle {
            id: 0,
            name: self.name.unwrap_or_else(|| external_id.clone()),
            external_id,
            capacity: self.capacity.expect("missing mandatory field: capacity"),
            max_route_duration: self.max_route_duration,
            shift_start: self.shift_start,
            fixed_cost: self.fixed_cost,
            cost_per_km: self.cost_per_km,
            vehicle_type: self.vehicle_type,
            allowed_store_ids: self.allowed_store_ids,
            forbidden_store_ids: self.forbidden_store_ids,
        }
    }
}
