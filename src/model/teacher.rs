use serde::{Deserialize, Serialize};

use crate::model::grade::Grade;
use crate::model::time_slot::TimeSlot;

/// A teacher as submitted by a client, before the store has assigned an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeacher {
    pub name: String,
    pub grades: Vec<Grade>,
    pub subjects: Vec<String>,
    pub availability: Vec<TimeSlot>,
}

impl NewTeacher {
    pub fn with_id(self, id: i64) -> Teacher {
        Teacher {
            id,
            name: self.name,
            grades: self.grades,
            subjects: self.subjects,
            availability: self.availability,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: i64,
    pub name: String,
    pub grades: Vec<Grade>,
    pub subjects: Vec<String>,
    pub availability: Vec<TimeSlot>,
}

impl Teacher {
    pub fn teaches_grade(&self, grade: Grade) -> bool {
        self.grades.contains(&grade)
    }

    pub fn teaches_subject(&self, subject: &str) -> bool {
        self.subjects.iter().any(|s| s == subject)
    }

    pub fn is_available(&self, slot: TimeSlot) -> bool {
        self.availability.contains(&slot)
    }
}

impl From<Teacher> for NewTeacher {
    fn from(teacher: Teacher) -> Self {
        Self {
            name: teacher.name,
            grades: teacher.grades,
            subjects: teacher.subjects,
            availability: teacher.availability,
        }
    }
}
