pub mod checker;
pub mod validator;

/// Tolerance for load comparisons; demands are sums of floats.
pub(crate) const CAPACITY_EPSILON: f64 = 1e-9;
