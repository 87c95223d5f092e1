pub mod routing_problem;
pub mod store;
pub mod time_window;
pub mod travel_matrix;
pub mod vehicle;
pub mod weekday;

pub use routing_problem::{RoutingProblem, RoutingProblemBuilder};
pub use store::{Store, StoreBuilder, StoreId};
pub use time_window::{ForbiddenInterval, TimeWindow};
pub use travel_matrix::{LocationId, TravelMatrix};
pub use vehicle::{Vehicle, VehicleBuilder, VehicleId};
pub use weekday::{WORKING_WEEK, Weekday};
