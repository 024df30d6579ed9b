//! Input collection for teacher and student records.
//!
//! Forms hold raw text the way a user typed or ticked it. `validate` checks required fields in
//! display order, stops at the first missing one and parses the rest into typed records. The
//! service runs the same record checks on every payload it receives.

use thiserror::Error;

use crate::client::{ApiClient, ClientError};
use crate::model::{CourseType, Grade, NewStudent, NewTeacher, Student, Teacher, TimeSlot};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please enter the teacher's name")]
    MissingTeacherName,
    #[error("Please select at least one grade to teach")]
    NoGrades,
    #[error("Please select at least one subject to teach")]
    NoSubjects,
    #[error("Please select at least one available time slot")]
    NoTimeSlots,
    #[error("Please enter the student's name")]
    MissingStudentName,
    #[error("Please select a grade")]
    MissingGrade,
    #[error("Please select a subject")]
    MissingSubject,
    #[error("Please select a course type")]
    MissingCourseType,
    #[error("Please select a teacher")]
    MissingTeacher,
    /// A value that is present but not understood, e.g. an unknown time slot
    #[error("{0}")]
    Invalid(String),
}

/// Which record, if any, a form is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Create,
    Edit(i64),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeacherForm {
    pub name: String,
    pub grades: Vec<String>,
    pub subjects: Vec<String>,
    pub availability: Vec<String>,
}

impl TeacherForm {
    pub fn validate(&self) -> Result<NewTeacher, FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingTeacherName);
        }
        if self.grades.iter().all(|g| g.trim().is_empty()) {
            return Err(FormError::NoGrades);
        }
        if self.subjects.iter().all(|s| s.trim().is_empty()) {
            return Err(FormError::NoSubjects);
        }
        if self.availability.iter().all(|s| s.trim().is_empty()) {
            return Err(FormError::NoTimeSlots);
        }
        let grades = parse_all::<Grade>(&self.grades)?;
        let availability = parse_all::<TimeSlot>(&self.availability)?;

        validate_teacher(NewTeacher {
            name: self.name.clone(),
            grades,
            subjects: self.subjects.clone(),
            availability,
        })
    }

    /// Validates the form, then creates or updates the record depending on `mode`.
    /// Returns the service's confirmation message.
    pub async fn submit(&self, client: &ApiClient, mode: FormMode) -> Result<String, ClientError> {
        let teacher = self.validate()?;
        match mode {
            FormMode::Create => client.add_teacher(&teacher).await,
            FormMode::Edit(id) => client.update_teacher(id, &teacher).await,
        }
    }
}

impl From<&Teacher> for TeacherForm {
    fn from(teacher: &Teacher) -> Self {
        Self {
            name: teacher.name.clone(),
            grades: teacher.grades.iter().map(|g| g.number().to_string()).collect(),
            subjects: teacher.subjects.clone(),
            availability: teacher.availability.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub name: String,
    pub grade: Option<String>,
    pub subject: Option<String>,
    pub course_type: Option<String>,
    pub preferred_teacher: Option<String>,
    pub availability: Vec<String>,
}

impl StudentForm {
    pub fn validate(&self) -> Result<NewStudent, FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingStudentName);
        }
        let grade = present(&self.grade).ok_or(FormError::MissingGrade)?;
        let subject = present(&self.subject).ok_or(FormError::MissingSubject)?;
        let course_type = present(&self.course_type).ok_or(FormError::MissingCourseType)?;
        if self.availability.iter().all(|s| s.trim().is_empty()) {
            return Err(FormError::NoTimeSlots);
        }

        let grade = grade.parse::<Grade>().map_err(FormError::Invalid)?;
        let course_type = course_type.parse::<CourseType>().map_err(FormError::Invalid)?;
        let availability = parse_all::<TimeSlot>(&self.availability)?;

        validate_student(NewStudent {
            name: self.name.clone(),
            grade,
            subject: subject.to_owned(),
            course_type,
            preferred_teacher: self.preferred_teacher.clone(),
            availability,
        })
    }

    pub async fn submit(&self, client: &ApiClient, mode: FormMode) -> Result<String, ClientError> {
        let student = self.validate()?;
        match mode {
            FormMode::Create => client.add_student(&student).await,
            FormMode::Edit(id) => client.update_student(id, &student).await,
        }
    }
}

impl From<&Student> for StudentForm {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            grade: Some(student.grade.number().to_string()),
            subject: Some(student.subject.clone()),
            course_type: Some(student.course_type.to_string()),
            preferred_teacher: student.preferred_teacher.clone(),
            availability: student.availability.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Normalizes a teacher record and checks its required fields.
///
/// Names and subjects are trimmed; grades, subjects and slots lose duplicates.
pub fn validate_teacher(teacher: NewTeacher) -> Result<NewTeacher, FormError> {
    let name = teacher.name.trim().to_owned();
    if name.is_empty() {
        return Err(FormError::MissingTeacherName);
    }

    let mut grades = teacher.grades;
    grades.sort();
    grades.dedup();
    if grades.is_empty() {
        return Err(FormError::NoGrades);
    }

    let mut subjects: Vec<String> = Vec::new();
    for subject in teacher.subjects.iter().map(|s| s.trim()) {
        if !subject.is_empty() && !subjects.iter().any(|s| s == subject) {
            subjects.push(subject.to_owned());
        }
    }
    if subjects.is_empty() {
        return Err(FormError::NoSubjects);
    }

    let mut availability = teacher.availability;
    availability.sort();
    availability.dedup();
    if availability.is_empty() {
        return Err(FormError::NoTimeSlots);
    }

    Ok(NewTeacher {
        name,
        grades,
        subjects,
        availability,
    })
}

/// Normalizes a student record and checks its required fields.
///
/// Every slot must belong to the grade's level. A blank preferred teacher counts as none, which
/// only one-to-one courses reject.
pub fn validate_student(student: NewStudent) -> Result<NewStudent, FormError> {
    let name = student.name.trim().to_owned();
    if name.is_empty() {
        return Err(FormError::MissingStudentName);
    }

    let subject = student.subject.trim().to_owned();
    if subject.is_empty() {
        return Err(FormError::MissingSubject);
    }

    let mut availability = student.availability;
    availability.sort();
    availability.dedup();
    if availability.is_empty() {
        return Err(FormError::NoTimeSlots);
    }
    // Lessons only run in the periods of the student's school level
    if let Some(slot) = availability.iter().find(|s| s.level() != student.grade.level()) {
        return Err(FormError::Invalid(format!(
            "Time slot {slot} is not offered for {}",
            student.grade
        )));
    }

    let preferred_teacher = student
        .preferred_teacher
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty());
    if student.course_type == CourseType::OneToOne && preferred_teacher.is_none() {
        return Err(FormError::MissingTeacher);
    }

    Ok(NewStudent {
        name,
        grade: student.grade,
        subject,
        course_type: student.course_type,
        preferred_teacher,
        availability,
    })
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_all<T>(values: &[String]) -> Result<Vec<T>, FormError>
where
    T: std::str::FromStr<Err = String>,
{
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<T>().map_err(FormError::Invalid))
        .collect()
}
