//! The fixed catalog of weekend lesson periods.
//!
//! Middle-school lessons last an hour and a half, high-school lessons two hours. Both catalogs
//! cover Saturday and Sunday from 8:00 to 19:00 with a lunch break between 12:00 and 13:00.
//! A slot travels over the wire as its label, e.g. `"Saturday 9:30-11:00"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::grade::SchoolLevel;

const fn at(hour: u16, minute: u16) -> u16 {
    hour * 60 + minute
}

const MIDDLE_SCHOOL_PERIODS: [(u16, u16); 7] = [
    (at(8, 0), at(9, 30)),
    (at(9, 30), at(11, 0)),
    (at(11, 0), at(12, 30)),
    (at(13, 0), at(14, 30)),
    (at(14, 30), at(16, 0)),
    (at(16, 0), at(17, 30)),
    (at(17, 30), at(19, 0)),
];

const HIGH_SCHOOL_PERIODS: [(u16, u16); 5] = [
    (at(8, 0), at(10, 0)),
    (at(10, 0), at(12, 0)),
    (at(13, 0), at(15, 0)),
    (at(15, 0), at(17, 0)),
    (at(17, 0), at(19, 0)),
];

const HIGH_SCHOOL_LENGTH: u16 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 2] = [Day::Saturday, Day::Sunday];

    pub fn name(self) -> &'static str {
        match self {
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Day::Saturday => "Sat",
            Day::Sunday => "Sun",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Day::ALL
            .into_iter()
            .find(|day| s.eq_ignore_ascii_case(day.name()) || s.eq_ignore_ascii_case(day.short_name()))
    }
}

/// One period of the catalog. Times are minutes after midnight.
///
/// Ordering is by day, then start time, so sorting a list of slots gives the weekly timetable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    day: Day,
    start: u16,
    end: u16,
}

impl TimeSlot {
    /// Every slot of the catalog: the middle-school periods followed by the high-school periods.
    pub fn catalog() -> Vec<TimeSlot> {
        let mut slots = TimeSlot::for_level(SchoolLevel::Middle);
        slots.extend(TimeSlot::for_level(SchoolLevel::High));
        slots
    }

    /// The slots a lesson of the given level may use, Saturday first.
    pub fn for_level(level: SchoolLevel) -> Vec<TimeSlot> {
        let periods: &[(u16, u16)] = match level {
            SchoolLevel::Middle => &MIDDLE_SCHOOL_PERIODS,
            SchoolLevel::High => &HIGH_SCHOOL_PERIODS,
        };

        Day::ALL
            .into_iter()
            .flat_map(|day| {
                periods
                    .iter()
                    .map(move |&(start, end)| TimeSlot { day, start, end })
            })
            .collect()
    }

    pub fn day(&self) -> Day {
        self.day
    }

    /// Start time as `(hour, minute)`.
    pub fn start(&self) -> (u16, u16) {
        (self.start / 60, self.start % 60)
    }

    pub fn level(&self) -> SchoolLevel {
        if self.end - self.start == HIGH_SCHOOL_LENGTH {
            SchoolLevel::High
        } else {
            SchoolLevel::Middle
        }
    }

    /// Whether both slots share part of the same day.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.day == other.day && self.start < other.end && other.start < self.end
    }

    /// The label without the day, e.g. `9:30-11:00`.
    pub fn time_range(&self) -> String {
        format!("{}-{}", clock(self.start), clock(self.end))
    }

    pub fn short_label(&self) -> String {
        format!("{} {}", self.day.short_name(), self.time_range())
    }
}

fn clock(minutes: u16) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

fn parse_clock(s: &str) -> Option<u16> {
    let (hour, minute) = s.trim().split_once(':')?;
    if minute.len() != 2 {
        return None;
    }
    let hour = hour.parse::<u16>().ok()?;
    let minute = minute.parse::<u16>().ok()?;
    (hour < 24 && minute < 60).then(|| at(hour, minute))
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day.name(), self.time_range())
    }
}

/// Parses a label such as `Saturday 9:30-11:00` (or the short `Sat 9:30-11:00`).
/// Well-formed labels that are not part of the catalog are rejected.
impl FromStr for TimeSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || format!("Unknown time slot: {s}");

        let (day, range) = s.trim().split_once(' ').ok_or_else(unknown)?;
        let day = Day::parse(day).ok_or_else(unknown)?;
        let (start, end) = range.split_once('-').ok_or_else(unknown)?;
        let start = parse_clock(start).ok_or_else(unknown)?;
        let end = parse_clock(end).ok_or_else(unknown)?;

        let slot = TimeSlot { day, start, end };
        if TimeSlot::catalog().contains(&slot) {
            Ok(slot)
        } else {
            Err(unknown())
        }
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = String;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        label.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}
