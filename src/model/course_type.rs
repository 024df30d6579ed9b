use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CourseType {
    /// A private lesson with a single student
    OneToOne,
    /// A group lesson
    OneToMany,
}

impl CourseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseType::OneToOne => "one-to-one",
            CourseType::OneToMany => "one-to-many",
        }
    }
}

impl fmt::Display for CourseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "one-to-one" | "1:1" | "private" => Ok(CourseType::OneToOne),
            "one-to-many" | "1:n" | "group" => Ok(CourseType::OneToMany),
            _ => Err(format!("Unknown course type: {s}")),
        }
    }
}
