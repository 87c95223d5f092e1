use jiff::SignedDuration;
use jiff::civil::Time;
use serde::{Deserialize, Serialize};

use super::weekday::Weekday;

/// Seconds since midnight. Used for interval arithmetic where comparing
/// `civil::Time` values directly would be clumsy.
pub(crate) fn seconds_of(time: Time) -> i64 {
    time.hour() as i64 * 3600 + time.minute() as i64 * 60 + time.second() as i64
}

/// A delivery window within a single day. A window may apply to every
/// working day (`day: None`) or to one specific day; day-scoped windows
/// take precedence when both exist for a store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    earliest: Time,
    latest: Time,
    day: Option<Weekday>,
}

impl TimeWindow {
    pub fn new(earliest: Time, latest: Time) -> Self {
        debug_assert!(earliest <= latest);
        Self {
            earliest,
            latest,
            day: None,
        }
    }

    pub fn for_day(earliest: Time, latest: Time, day: Weekday) -> Self {
        debug_assert!(earliest <= latest);
        Self {
            earliest,
            latest,
            day: Some(day),
        }
    }

    pub fn earliest(&self) -> Time {
        self.earliest
    }

    pub fn latest(&self) -> Time {
        self.latest
    }

    pub fn day(&self) -> Option<Weekday> {
        self.day
    }

    pub fn applies_to(&self, day: Weekday) -> bool {
        self.day.is_none() || self.day == Some(day)
    }

    pub fn contains(&self, time: Time) -> bool {
        self.earliest <= time && time <= self.latest
    }

    pub fn duration(&self) -> SignedDuration {
        SignedDuration::from_secs(seconds_of(self.latest) - seconds_of(self.earliest))
    }

    /// Midpoint of the window, as seconds since midnight.
    pub(crate) fn midpoint_seconds(&self) -> i64 {
        (seconds_of(self.earliest) + seconds_of(self.latest)) / 2
    }
}

/// A recurring daily interval during which service must not start
/// (lunch closures, inventory counts, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForbiddenInterval {
    start: Time,
    end: Time,
    reason: String,
}

impl ForbiddenInterval {
    pub fn new(start: Time, end: Time, reason: impl Into<String>) -> Self {
        debug_assert!(start <= end);
        Self {
            start,
            end,
            reason: reason.into(),
        }
    }

    pub fn start(&self) -> Time {
        self.start
    }

    pub fn end(&self) -> Time {
        self.end
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn conflicts_with(&self, time: Time) -> bool {
        self.start <= time && time <= self.end
    }

    pub fn overlaps(&self, window: &TimeWindow) -> bool {
        self.start <= window.latest() && window.earliest() <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::time;

    #[test]
    fn window_contains_bounds() {
        let window = TimeWindow::new(time(8, 0, 0, 0), time(12, 0, 0, 0));
        assert!(window.contains(time(8, 0, 0, 0)));
        assert!(window.contains(time(12, 0, 0, 0)));
        assert!(!window.contains(time(12, 0, 1, 0)));
        assert_eq!(window.duration(), SignedDuration::from_hours(4));
    }

    #[test]
    fn day_scoped_window_applies_only_to_its_day() {
        let window = TimeWindow::for_day(time(8, 0, 0, 0), time(12, 0, 0, 0), Weekday::Tuesday);
        assert!(window.applies_to(Weekday::Tuesday));
        assert!(!window.applies_to(Weekday::Monday));

        let any_day = TimeWindow::new(time(8, 0, 0, 0), time(12, 0, 0, 0));
        assert!(any_day.applies_to(Weekday::Friday));
    }

    #[test]
    fn forbidden_interval_overlap() {
        let lunch = ForbiddenInterval::new(time(12, 0, 0, 0), time(13, 0, 0, 0), "lunch");
        assert!(lunch.conflicts_with(time(12, 30, 0, 0)));
        assert!(!lunch.conflicts_with(time(13, 0, 1, 0)));

        let morning = TimeWindow::new(time(8, 0, 0, 0), time(11, 0, 0, 0));
        let full_day = TimeWindow::new(time(8, 0, 0, 0), time(18, 0, 0, 0));
        assert!(!lunch.overlaps(&morning));
        assert!(lunch.overlaps(&full_day));
    }
}
