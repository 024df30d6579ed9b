use serde::{Deserialize, Serialize};

use crate::model::course_type::CourseType;
use crate::model::grade::Grade;
use crate::model::time_slot::TimeSlot;

/// One session of a generated weekly schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub time_slot: TimeSlot,
    pub teacher: String,
    pub students: Vec<String>,
    pub course_type: CourseType,
    pub grade: Grade,
    pub subject: String,
}
