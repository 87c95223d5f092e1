use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::problem::{RoutingProblem, Weekday};

use super::solution::{Solution, UnassignedReason};

/// How much the weekly consolidation saved compared to visiting every
/// store on every one of its feasible days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidationStats {
    pub total_stores: usize,
    /// One hypothetical trip per (store, feasible day) pair.
    pub baseline_trips: usize,
    /// Vehicles actually dispatched over the week.
    pub optimized_trips: usize,
    pub trip_reduction_percent: f64,
    /// Share of stores that were free to consolidate (not forced onto a
    /// dedicated day by their size).
    pub consolidation_rate_percent: f64,
    pub stores_per_day: BTreeMap<Weekday, usize>,
}

/// A store the planner could not place on any working day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnplannedStore {
    pub external_id: String,
    pub reason: UnassignedReason,
}

/// The week's plan: one Solution per working day plus week-level
/// leftovers and consolidation statistics. Day problems are kept so
/// exports can resolve store and vehicle ids.
#[derive(Debug)]
pub struct WeeklySolution {
    days: BTreeMap<Weekday, Solution>,
    problems: BTreeMap<Weekday, Arc<RoutingProblem>>,
    unplanned: Vec<UnplannedStore>,
    stats: ConsolidationStats,
}

impl WeeklySolution {
    pub(crate) fn new(
        days: BTreeMap<Weekday, Solution>,
        problems: BTreeMap<Weekday, Arc<RoutingProblem>>,
        unplanned: Vec<UnplannedStore>,
        stats: ConsolidationStats,
    ) -> Self {
        Self {
            days,
            problems,
            unplanned,
            stats,
        }
    }

    pub fn day(&self, day: Weekday) -> Option<&Solution> {
        self.days.get(&day)
    }

    pub fn days(&self) -> impl Iterator<Item = (Weekday, &Solution)> {
        self.days.iter().map(|(&day, solution)| (day, solution))
    }

    pub fn problem(&self, day: Weekday) -> Option<&Arc<RoutingProblem>> {
        self.problems.get(&day)
    }

    pub fn unplanned(&self) -> &[UnplannedStore] {
        &self.unplanned
    }

    pub fn stats(&self) -> &ConsolidationStats {
        &self.stats
    }

    pub fn total_distance(&self) -> f64 {
        self.days.values().map(Solution::total_distance).sum()
    }

    pub fn vehicles_used(&self) -> usize {
        self.days.values().map(Solution::vehicles_used).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.days
            .iter()
            .filter_map(|(day, solution)| {
                self.problems
                    .get(day)
                    .map(|problem| solution.total_cost(problem))
            })
            .sum()
    }
}
