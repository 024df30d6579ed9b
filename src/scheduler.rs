//! Greedy weekly schedule generation.
//!
//! # Algorithm
//!
//! 1. One-to-one students, in stored order, take the first slot of their level where they and
//!    their preferred teacher are both available and free.
//! 2. One-to-many students are grouped by grade and subject. Inside a group, students with a
//!    preferred teacher are seated with that teacher first; everybody left over is offered to
//!    every qualified teacher in stored order.
//! 3. For a group, each slot the teacher is available and otherwise free gathers every
//!    unassigned student who can attend, joining the teacher's existing session for that group
//!    when there is one.
//!
//! Busy means holding a session that overlaps in time on the same day, so a 2-hour high-school
//! lesson blocks the 1.5-hour middle-school periods it covers.

use std::collections::HashSet;

use thiserror::Error;

use crate::model::{CourseType, Grade, ScheduleSlot, Student, Teacher, TimeSlot};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Please add teachers first")]
    NoTeachers,

    #[error("Please add students first")]
    NoStudents,

    #[error("Student {student} has not chosen a teacher for a one-to-one course")]
    NoPreferredTeacher { student: String },

    #[error("Cannot find teacher {teacher} chosen by student {student}")]
    PreferredTeacherMissing { student: String, teacher: String },

    #[error("Cannot find teacher {teacher}")]
    UnknownTeacher { teacher: String },

    #[error("Teacher {teacher} cannot teach {grade}")]
    GradeMismatch { teacher: String, grade: Grade },

    #[error("Teacher {teacher} cannot teach {subject}")]
    SubjectMismatch { teacher: String, subject: String },

    #[error("Unable to schedule student {student}; check for time conflicts")]
    NoFreeSlot { student: String },

    #[error("No teacher can teach {subject} for {grade}")]
    NoQualifiedTeacher { grade: Grade, subject: String },

    #[error(
        "Unable to schedule the following students: {}; check for time conflicts or add teachers",
        .students.join(", ")
    )]
    Unassigned { students: Vec<String> },
}

/// Builds a full weekly schedule from every stored teacher and student record.
pub fn generate(teachers: &[Teacher], students: &[Student]) -> Result<Vec<ScheduleSlot>, ScheduleError> {
    if teachers.is_empty() {
        return Err(ScheduleError::NoTeachers);
    }
    if students.is_empty() {
        return Err(ScheduleError::NoStudents);
    }

    let mut plan = Plan::default();

    for student in students.iter().filter(|s| s.course_type == CourseType::OneToOne) {
        plan.place_private(teachers, student)?;
    }

    let group_students: Vec<&Student> = students
        .iter()
        .filter(|s| s.course_type == CourseType::OneToMany)
        .collect();

    for ((grade, subject), group) in group_by_course(&group_students) {
        plan.place_group(teachers, grade, subject, &group)?;
    }

    let unassigned: Vec<String> = group_students
        .iter()
        .filter(|s| !plan.assigned.contains(&s.id))
        .map(|s| s.name.clone())
        .collect();
    if !unassigned.is_empty() {
        return Err(ScheduleError::Unassigned {
            students: unassigned,
        });
    }

    tracing::debug!("Generated {} sessions", plan.sessions.len());
    Ok(plan.sessions)
}

/// Groups students by grade and subject, keeping the order in which each course first appears.
fn group_by_course<'a>(students: &[&'a Student]) -> Vec<((Grade, &'a str), Vec<&'a Student>)> {
    let mut groups: Vec<((Grade, &'a str), Vec<&'a Student>)> = Vec::new();
    for &student in students {
        let key = (student.grade, student.subject.as_str());
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(student),
            None => groups.push((key, vec![student])),
        }
    }
    groups
}

fn check_qualified(teacher: &Teacher, grade: Grade, subject: &str) -> Result<(), ScheduleError> {
    if !teacher.teaches_grade(grade) {
        return Err(ScheduleError::GradeMismatch {
            teacher: teacher.name.clone(),
            grade,
        });
    }
    if !teacher.teaches_subject(subject) {
        return Err(ScheduleError::SubjectMismatch {
            teacher: teacher.name.clone(),
            subject: subject.to_owned(),
        });
    }
    Ok(())
}

#[derive(Default)]
struct Plan {
    sessions: Vec<ScheduleSlot>,
    /// Ids of one-to-many records already seated
    assigned: HashSet<i64>,
}

impl Plan {
    fn teacher_busy(&self, teacher: &str, slot: TimeSlot, except: Option<usize>) -> bool {
        self.sessions
            .iter()
            .enumerate()
            .any(|(i, s)| Some(i) != except && s.teacher == teacher && s.time_slot.overlaps(&slot))
    }

    fn student_busy(&self, student: &str, slot: TimeSlot) -> bool {
        self.sessions
            .iter()
            .any(|s| s.time_slot.overlaps(&slot) && s.students.iter().any(|n| n == student))
    }

    fn place_private(&mut self, teachers: &[Teacher], student: &Student) -> Result<(), ScheduleError> {
        let Some(preferred) = student.preferred_teacher.as_deref() else {
            return Err(ScheduleError::NoPreferredTeacher {
                student: student.name.clone(),
            });
        };
        let Some(teacher) = teachers.iter().find(|t| t.name == preferred) else {
            return Err(ScheduleError::PreferredTeacherMissing {
                student: student.name.clone(),
                teacher: preferred.to_owned(),
            });
        };
        check_qualified(teacher, student.grade, &student.subject)?;

        let slot = TimeSlot::for_level(student.grade.level())
            .into_iter()
            .find(|&slot| {
                student.is_available(slot)
                    && teacher.is_available(slot)
                    && !self.teacher_busy(&teacher.name, slot, None)
                    && !self.student_busy(&student.name, slot)
            })
            .ok_or_else(|| ScheduleError::NoFreeSlot {
                student: student.name.clone(),
            })?;

        self.sessions.push(ScheduleSlot {
            time_slot: slot,
            teacher: teacher.name.clone(),
            students: vec![student.name.clone()],
            course_type: CourseType::OneToOne,
            grade: student.grade,
            subject: student.subject.clone(),
        });
        Ok(())
    }

    fn place_group(
        &mut self,
        teachers: &[Teacher],
        grade: Grade,
        subject: &str,
        group: &[&Student],
    ) -> Result<(), ScheduleError> {
        // Preferred teachers first, in order of first mention
        let mut by_teacher: Vec<(&str, Vec<&Student>)> = Vec::new();
        for &student in group {
            let Some(preferred) = student.preferred_teacher.as_deref() else {
                continue;
            };
            match by_teacher.iter_mut().find(|(name, _)| *name == preferred) {
                Some((_, members)) => members.push(student),
                None => by_teacher.push((preferred, vec![student])),
            }
        }

        for (name, members) in &by_teacher {
            let Some(teacher) = teachers.iter().find(|t| t.name == *name) else {
                return Err(ScheduleError::UnknownTeacher {
                    teacher: (*name).to_owned(),
                });
            };
            check_qualified(teacher, grade, subject)?;
            self.seat_with(teacher, grade, subject, members);
        }

        let remaining: Vec<&Student> = group
            .iter()
            .copied()
            .filter(|s| !self.assigned.contains(&s.id))
            .collect();
        if remaining.is_empty() {
            return Ok(());
        }

        let qualified: Vec<&Teacher> = teachers
            .iter()
            .filter(|t| t.teaches_grade(grade) && t.teaches_subject(subject))
            .collect();
        if qualified.is_empty() {
            return Err(ScheduleError::NoQualifiedTeacher {
                grade,
                subject: subject.to_owned(),
            });
        }

        for teacher in qualified {
            self.seat_with(teacher, grade, subject, &remaining);
        }
        Ok(())
    }

    /// Walks the teacher's slots, seating every candidate who can attend.
    fn seat_with(&mut self, teacher: &Teacher, grade: Grade, subject: &str, candidates: &[&Student]) {
        for slot in TimeSlot::for_level(grade.level()) {
            if candidates.iter().all(|s| self.assigned.contains(&s.id)) {
                return;
            }
            if !teacher.is_available(slot) {
                continue;
            }

            let existing = self.sessions.iter().position(|s| {
                s.time_slot == slot
                    && s.teacher == teacher.name
                    && s.course_type == CourseType::OneToMany
                    && s.grade == grade
                    && s.subject == subject
            });
            if self.teacher_busy(&teacher.name, slot, existing) {
                continue;
            }

            let joining: Vec<&Student> = candidates
                .iter()
                .copied()
                .filter(|s| {
                    !self.assigned.contains(&s.id)
                        && s.is_available(slot)
                        && !self.student_busy(&s.name, slot)
                })
                .collect();
            if joining.is_empty() {
                continue;
            }

            let names = joining.iter().map(|s| s.name.clone());
            match existing {
                Some(index) => self.sessions[index].students.extend(names),
                None => self.sessions.push(ScheduleSlot {
                    time_slot: slot,
                    teacher: teacher.name.clone(),
                    students: names.collect(),
                    course_type: CourseType::OneToMany,
                    grade,
                    subject: subject.to_owned(),
                }),
            }
            self.assigned.extend(joining.iter().map(|s| s.id));
        }
    }
}
