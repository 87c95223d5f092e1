pub mod export;
pub mod route;
pub mod solution;
pub mod stop;
pub mod weekly;

pub use route::Route;
pub use solution::{Solution, Unassigned, UnassignedReason};
pub use stop::Stop;
pub use weekly::{ConsolidationStats, UnplannedStore, WeeklySolution};
