use serde::{Deserialize, Serialize};

use crate::model::course_type::CourseType;
use crate::model::grade::Grade;
use crate::model::time_slot::TimeSlot;

/// A student record as submitted by a client.
///
/// The same person may hold several records, one per grade, subject and course type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub name: String,
    pub grade: Grade,
    pub subject: String,
    pub course_type: CourseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_teacher: Option<String>,
    pub availability: Vec<TimeSlot>,
}

impl NewStudent {
    pub fn with_id(self, id: i64) -> Student {
        Student {
            id,
            name: self.name,
            grade: self.grade,
            subject: self.subject,
            course_type: self.course_type,
            preferred_teacher: self.preferred_teacher,
            availability: self.availability,
        }
    }

    /// Two records clash when they share name, grade, subject and course type.
    pub fn same_record(&self, other: &Student) -> bool {
        self.name == other.name
            && self.grade == other.grade
            && self.subject == other.subject
            && self.course_type == other.course_type
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub grade: Grade,
    pub subject: String,
    pub course_type: CourseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_teacher: Option<String>,
    pub availability: Vec<TimeSlot>,
}

impl Student {
    pub fn is_available(&self, slot: TimeSlot) -> bool {
        self.availability.contains(&slot)
    }
}

impl From<Student> for NewStudent {
    fn from(student: Student) -> Self {
        Self {
            name: student.name,
            grade: student.grade,
            subject: student.subject,
            course_type: student.course_type,
            preferred_teacher: student.preferred_teacher,
            availability: student.availability,
        }
    }
}
