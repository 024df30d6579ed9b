use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which half of secondary school a grade belongs to. Decides the slot catalog a lesson uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchoolLevel {
    Middle,
    High,
}

/// A school grade between 7 and 12.
///
/// Grades 7 to 9 are middle school, 10 to 12 high school. On the wire a grade is a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Grade(u8);

impl Grade {
    pub const LOWEST: u8 = 7;
    pub const HIGHEST: u8 = 12;

    pub fn new(number: u8) -> Option<Self> {
        (Self::LOWEST..=Self::HIGHEST)
            .contains(&number)
            .then_some(Self(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn level(self) -> SchoolLevel {
        if self.0 >= 10 {
            SchoolLevel::High
        } else {
            SchoolLevel::Middle
        }
    }
}

impl TryFrom<u8> for Grade {
    type Error = String;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Grade::new(number).ok_or_else(|| {
            format!(
                "grade must be between {} and {}, got {number}",
                Grade::LOWEST,
                Grade::HIGHEST
            )
        })
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grade {}", self.0)
    }
}

/// Accepts `9` as well as the display form `Grade 9`.
impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("grade"))
            .map(|_| trimmed[5..].trim_start())
            .unwrap_or(trimmed);

        digits
            .parse::<u8>()
            .ok()
            .and_then(Grade::new)
            .ok_or_else(|| format!("Unknown grade: {s}"))
    }
}
