pub mod destroy;
pub mod engine;
pub mod params;
pub mod repair;
pub mod weights;

pub use engine::AlnsEngine;
pub use params::AlnsParams;
