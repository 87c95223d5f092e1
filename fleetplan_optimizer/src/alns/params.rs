use std::time::Duration;

/// Every tunable of the adaptive search, with defaults that work on
/// instances of a few hundred stores.
#[derive(Debug, Clone)]
pub struct AlnsParams {
    /// Share of currently served stores removed per iteration.
    pub removal_fraction: f64,
    /// Destroy never shrinks a route below this many stops.
    pub min_keep_per_route: usize,
    pub initial_temperature: f64,
    pub final_temperature: f64,
    pub cooling_rate: f64,
    pub max_iterations: usize,
    /// Stop after this many iterations without a new best.
    pub max_no_improvement: usize,
    /// Optional wall-clock cap, checked at iteration boundaries.
    pub time_budget: Option<Duration>,
    /// Operator weights are refreshed every this many iterations.
    pub segment_iterations: usize,
    /// Blend factor for the weight refresh; higher reacts faster.
    pub reaction_factor: f64,
    pub score_new_best: f64,
    pub score_improving: f64,
    pub score_accepted: f64,
    pub score_rejected: f64,
    /// Cost charged per store left unserved.
    pub unassigned_penalty: f64,
    /// Exponent biasing Shaw removal towards the most related candidates.
    pub shaw_randomization: f64,
    pub seed: u64,
}

impl Default for AlnsParams {
    fn default() -> Self {
        Self {
            removal_fraction: 0.3,
            min_keep_per_route: 1,
            initial_temperature: 100.0,
            final_temperature: 1.0,
            cooling_rate: 0.99,
            max_iterations: 5000,
            max_no_improvement: 500,
            time_budget: None,
            segment_iterations: 100,
            reaction_factor: 0.8,
            score_new_best: 10.0,
            score_improving: 5.0,
            score_accepted: 1.0,
            score_rejected: 0.0,
            unassigned_penalty: 10_000.0,
            shaw_randomization: 3.0,
            seed: 2427121,
        }
    }
}
