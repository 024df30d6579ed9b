pub mod course_type;
pub mod grade;
pub mod schedule_slot;
pub mod simple_response;
pub mod student;
pub mod teacher;
pub mod time_slot;

pub use course_type::CourseType;
pub use grade::{Grade, SchoolLevel};
pub use schedule_slot::ScheduleSlot;
pub use student::{NewStudent, Student};
pub use teacher::{NewTeacher, Teacher};
pub use time_slot::{Day, TimeSlot};
