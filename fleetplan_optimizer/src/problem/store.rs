use jiff::SignedDuration;
use jiff::civil::Time;
use smallvec::SmallVec;

use super::time_window::{ForbiddenInterval, TimeWindow, seconds_of};
use super::travel_matrix::LocationId;
use super::weekday::Weekday;

pub type StoreId = usize;

/// A delivery point with demand, service windows and day preferences.
/// Immutable once the problem is built; `id` is the dense index assigned
/// by [`super::RoutingProblemBuilder`].
#[derive(Debug, Clone)]
pub struct Store {
    pub(crate) id: StoreId,
    external_id: String,
    name: String,
    location_id: LocationId,
    demand: f64,
    time_windows: SmallVec<[TimeWindow; 2]>,
    forbidden_intervals: SmallVec<[ForbiddenInterval; 1]>,
    excluded_days: SmallVec<[Weekday; 2]>,
    preferred_days: SmallVec<[Weekday; 2]>,
    service_duration: SignedDuration,
    priority: u32,
    notes: String,
}

impl Store {
    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }

    pub fn id(&self) -> StoreId {
        self.id
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location_id(&self) -> LocationId {
        self.location_id
    }

    /// Demand in cubic meters.
    pub fn demand(&self) -> f64 {
        self.demand
    }

    pub fn service_duration(&self) -> SignedDuration {
        self.service_duration
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn preferred_days(&self) -> &[Weekday] {
        &self.preferred_days
    }

    pub fn is_day_allowed(&self, day: Weekday) -> bool {
        !self.excluded_days.contains(&day)
    }

    pub fn is_day_preferred(&self, day: Weekday) -> bool {
        self.preferred_days.contains(&day)
    }

    /// The window governing service on `day`. A day-scoped window takes
    /// precedence over a day-agnostic one.
    pub fn window_for_day(&self, day: Weekday) -> Option<&TimeWindow> {
        self.time_windows
            .iter()
            .find(|w| w.day() == Some(day))
            .or_else(|| self.time_windows.iter().find(|w| w.day().is_none()))
    }

    pub fn forbidden_intervals(&self) -> &[ForbiddenInterval] {
        &self.forbidden_intervals
    }

    pub fn has_forbidden_conflict(&self, time: Time) -> bool {
        self.forbidden_intervals
            .iter()
            .any(|interval| interval.conflicts_with(time))
    }

    /// Whether any admissible service instant exists on `day`: the day is
    /// not excluded, a window applies, and the forbidden intervals do not
    /// blanket that window completely.
    pub fn servable_on(&self, day: Weekday) -> bool {
        if !self.is_day_allowed(day) {
            return false;
        }
        let Some(window) = self.window_for_day(day) else {
            return false;
        };

        let open = seconds_of(window.earliest());
        let close = seconds_of(window.latest());

        // Sweep the blocked spans in order; if they chain across the whole
        // window no admissible instant remains.
        let mut blocked: Vec<(i64, i64)> = self
            .forbidden_intervals
            .iter()
            .map(|i| (seconds_of(i.start()), seconds_of(i.end())))
            .filter(|&(start, end)| start <= close && open <= end)
            .collect();
        blocked.sort_unstable();

        let mut cursor = open;
        for (start, end) in blocked {
            if start > cursor {
                return true;
            }
            cursor = cursor.max(end + 1);
        }
        cursor <= close
    }
}

#[derive(Debug, Default)]
pub struct StoreBuilder {
    external_id: Option<String>,
    name: Option<String>,
    location_id: Option<LocationId>,
    demand: f64,
    time_windows: SmallVec<[TimeWindow; 2]>,
    forbidden_intervals: SmallVec<[ForbiddenInterval; 1]>,
    excluded_days: SmallVec<[Weekday; 2]>,
    preferred_days: SmallVec<[Weekday; 2]>,
    service_duration: Option<SignedDuration>,
    priority: u32,
    notes: String,
}

impl StoreBuilder {
    pub fn set_external_id(&mut self, external_id: impl Into<String>) -> &mut Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_location_id(&mut self, location_id: LocationId) -> &mut Self {
        self.location_id = Some(location_id);
        self
    }

    pub fn set_demand(&mut self, demand: f64) -> &mut Self {
        self.demand = demand;
        self
    }

    pub fn add_time_window(&mut self, window: TimeWindow) -> &mut Self {
        self.time_windows.push(window);
        self
    }

    pub fn add_forbidden_interval(&mut self, interval: ForbiddenInterval) -> &mut Self {
        self.forbidden_intervals.push(interval);
        self
    }

    pub fn exclude_day(&mut self, day: Weekday) -> &mut Self {
        if !self.excluded_days.contains(&day) {
            self.excluded_days.push(day);
        }
        self
    }

    pub fn prefer_day(&mut self, day: Weekday) -> &mut Self {
        if !self.preferred_days.contains(&day) {
            self.preferred_days.push(day);
        }
        self
    }

    pub fn set_service_duration(&mut self, duration: SignedDuration) -> &mut Self {
        self.service_duration = Some(duration);
        self
    }

    pub fn set_priority(&mut self, priority: u32) -> &mut Self {
        self.priority = priority;
        self
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) -> &mut Self {
        self.notes = notes.into();
        self
    }

    pub fn build(self) -> Store {
        let external_id = self.external_id.expect("missing mandatory field: external_id");
        Store {
            id: 0,
            name: self.name.unwrap_or_else(|| external_id.clone()),
            external_id,
            location_id: self.location_id.expect("missing mandatory field: location_id"),
            demand: self.demand,
            time_windows: self.time_windows,
            forbidden_intervals: self.forbidden_intervals,
            excluded_days: self.excluded_days,
            preferred_days: self.preferred_days,
            service_duration: self
                .service_duration
                .unwrap_or_else(|| SignedDuration::from_mins(60)),
            priority: self.priority.max(1),
            notes: self.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::time;

    fn store_with(windows: &[TimeWindow], forbidden: &[ForbiddenInterval]) -> Store {
        let mut builder = Store::builder();
        builder.set_external_id("S1").set_location_id(1).set_demand(5.0);
        for w in windows {
            builder.add_time_window(*w);
        }
        for f in forbidden {
            builder.add_forbidden_interval(f.clone());
        }
        builder.build()
    }

    #[test]
    fn day_scoped_window_wins_over_default() {
        let store = store_with(
            &[
                TimeWindow::new(time(8, 0, 0, 0), time(18, 0, 0, 0)),
                TimeWindow::for_day(time(14, 0, 0, 0), time(16, 0, 0, 0), Weekday::Tuesday),
            ],
            &[],
        );
        let tuesday = store.window_for_day(Weekday::Tuesday).unwrap();
        assert_eq!(tuesday.earliest(), time(14, 0, 0, 0));
        let monday = store.window_for_day(Weekday::Monday).unwrap();
        assert_eq!(monday.earliest(), time(8, 0, 0, 0));
    }

    #[test]
    fn excluded_day_is_not_servable() {
        let mut builder = Store::builder();
        builder
            .set_external_id("S1")
            .set_location_id(1)
            .add_time_window(TimeWindow::new(time(8, 0, 0, 0), time(18, 0, 0, 0)))
            .exclude_day(Weekday::Wednesday);
        let store = builder.build();
        assert!(store.servable_on(Weekday::Monday));
        assert!(!store.servable_on(Weekday::Wednesday));
    }

    #[test]
    fn blanket_forbidden_interval_makes_day_unservable() {
        let store = store_with(
            &[TimeWindow::new(time(9, 0, 0, 0), time(12, 0, 0, 0))],
            &[ForbiddenInterval::new(
                time(8, 0, 0, 0),
                time(13, 0, 0, 0),
                "closed",
            )],
        );
        assert!(!store.servable_on(Weekday::Monday));

        let partial = store_with(
            &[TimeWindow::new(time(9, 0, 0, 0), time(12, 0, 0, 0))],
            &[ForbiddenInterval::new(
                time(9, 0, 0, 0),
                time(10, 0, 0, 0),
                "inventory",
            )],
        );
        assert!(partial.servable_on(Weekday::Monday));
    }
}
