pub mod savings;
pub mod two_opt;

pub use savings::build_initial_solution;
