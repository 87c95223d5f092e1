use jiff::civil::DateTime;

use crate::problem::StoreId;

/// One scheduled visit on a route. Times and loads are recomputed by
/// [`super::Route`] whenever the stop sequence changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub store_id: StoreId,
    /// Instant the vehicle starts service, after any waiting for the
    /// window to open.
    pub arrival: DateTime,
    pub departure: DateTime,
    /// Load delivered so far, this stop included.
    pub cumulative_load: f64,
}
