use std::fmt;

use serde::{Deserialize, Serialize};

/// Working week used for delivery planning. Weekend deliveries are out of
/// scope, so Saturday and Sunday have no representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

pub const WORKING_WEEK: [Weekday; 5] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
];

impl Weekday {
    /// Zero-based offset from Monday.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_date(date: jiff::civil::Date) -> Option<Weekday> {
        match date.weekday() {
            jiff::civil::Weekday::Monday => Some(Weekday::Monday),
            jiff::civil::Weekday::Tuesday => Some(Weekday::Tuesday),
            jiff::civil::Weekday::Wednesday => Some(Weekday::Wednesday),
            jiff::civil::Weekday::Thursday => Some(Weekday::Thursday),
            jiff::civil::Weekday::Friday => Some(Weekday::Friday),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
