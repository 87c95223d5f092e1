//! Adaptive operator weights. Selection is a roulette wheel over the
//! current weights; every `segment_iterations` the weights are blended
//! towards each operator's mean score in the segment and the score
//! accumulators reset.

use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;

/// Floor below which no weight may decay, so every operator keeps a
/// nonzero chance of being drawn.
const MIN_WEIGHT: f64 = 0.1;

#[derive(Debug)]
struct OperatorEntry<S> {
    operator: S,
    weight: f64,
    score: f64,
    attempts: usize,
}

#[derive(Debug)]
pub struct OperatorWeights<S> {
    entries: Vec<OperatorEntry<S>>,
}

impl<S: Copy + PartialEq> OperatorWeights<S> {
    pub fn new(operators: impl IntoIterator<Item = S>) -> Self {
        Self {
            entries: operators
                .into_iter()
                .map(|operator| OperatorEntry {
                    operator,
                    weight: 1.0,
                    score: 0.0,
                    attempts: 0,
                })
                .collect(),
        }
    }

    pub fn select(&self, rng: &mut SmallRng) -> S {
        self.entries
            .choose_weighted(rng, |entry| entry.weight)
            .map(|entry| entry.operator)
            .unwrap_or_else(|_| self.entries[0].operator)
    }

    pub fn record(&mut self, operator: S, score: f64) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.operator == operator) {
            entry.score += score;
            entry.attempts += 1;
        }
    }

    /// `w <- (1 - r) * w + r * (score / attempts)`; untried operators keep
    /// their weight.
    pub fn refresh(&mut self, reaction_factor: f64) {
        for entry in &mut self.entries {
            if entry.attempts > 0 {
                let mean_score = entry.score / entry.attempts as f64;
                entry.weight = ((1.0 - reaction_factor) * entry.weight
                    + reaction_factor * mean_score)
                    .max(MIN_WEIGHT);
            }
            entry.score = 0.0;
            entry.attempts = 0;
        }
    }

    #[cfg(test)]
    fn weight_of(&self, operator: S) -> f64 {
        self.entries
            .iter()
            .find(|e| e.operator == operator)
            .map(|e| e.weight)
            .unwrap_or(0.0)
    }
}
