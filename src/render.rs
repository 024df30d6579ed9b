//! Plain-text rendering of teachers, students and schedules.

use std::fmt::Write;

use crate::model::{Day, ScheduleSlot, Student, Teacher};

const STUDENT_SLOTS_SHOWN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Formats a message for the user. Every action funnels its outcome through here.
pub fn notice(kind: NoticeKind, message: &str) -> String {
    match kind {
        NoticeKind::Success => format!("[ok] {message}"),
        NoticeKind::Error => format!("[error] {message}"),
    }
}

pub fn teachers(teachers: &[Teacher]) -> String {
    if teachers.is_empty() {
        return "No teachers yet\n".into();
    }

    let rows = teachers
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.name.clone(),
                t.grades.iter().map(|g| g.to_string()).collect::<Vec<_>>().join(", "),
                t.subjects.join(", "),
                t.availability.iter().map(|s| s.short_label()).collect::<Vec<_>>().join(", "),
            ]
        })
        .collect::<Vec<_>>();

    table(&["ID", "Name", "Grades", "Subjects", "Availability"], &rows)
}

pub fn students(students: &[Student]) -> String {
    if students.is_empty() {
        return "No students yet\n".into();
    }

    let rows = students
        .iter()
        .map(|s| {
            vec![
                s.id.to_string(),
                s.name.clone(),
                s.grade.to_string(),
                s.subject.clone(),
                s.course_type.to_string(),
                s.preferred_teacher.clone().unwrap_or_else(|| "-".into()),
                student_availability(s),
            ]
        })
        .collect::<Vec<_>>();

    table(
        &["ID", "Name", "Grade", "Subject", "Course", "Teacher", "Availability"],
        &rows,
    )
}

fn student_availability(student: &Student) -> String {
    let mut shown = student
        .availability
        .iter()
        .take(STUDENT_SLOTS_SHOWN)
        .map(|s| s.short_label())
        .collect::<Vec<_>>()
        .join(", ");
    if student.availability.len() > STUDENT_SLOTS_SHOWN {
        let _ = write!(shown, " ... ({} total)", student.availability.len());
    }
    shown
}

/// Sorts sessions by start time, then renders a Saturday and a Sunday section.
pub fn schedule(sessions: &[ScheduleSlot]) -> String {
    let mut sorted = sessions.iter().collect::<Vec<_>>();
    sorted.sort_by_key(|s| s.time_slot.start());

    let mut out = String::new();
    for day in Day::ALL {
        let _ = writeln!(out, "{}", day.name());

        let rows = sorted
            .iter()
            .filter(|s| s.time_slot.day() == day)
            .map(|s| session_row(s))
            .collect::<Vec<_>>();

        if rows.is_empty() {
            out.push_str("  No classes scheduled\n");
        } else {
            out.push_str(&table(
                &["Time", "Teacher", "Students", "Course", "Grade", "Subject"],
                &rows,
            ));
        }
        out.push('\n');
    }
    out
}

fn session_row(session: &ScheduleSlot) -> Vec<String> {
    let students = if session.students.len() > 1 {
        format!("[{}] {}", session.students.len(), session.students.join(", "))
    } else {
        session.students.join(", ")
    };
    vec![
        session.time_slot.time_range(),
        session.teacher.clone(),
        students,
        session.course_type.to_string(),
        session.grade.to_string(),
        session.subject.clone(),
    ]
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header = headers.iter().map(|h| h.to_string()).collect::<Vec<_>>();
    push_row(&mut out, &header, &widths);
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    push_row(&mut out, &rule, &widths);
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CourseType, Grade, NewStudent, TimeSlot};

    fn session(label: &str, teacher: &str, students: &[&str]) -> ScheduleSlot {
        ScheduleSlot {
            time_slot: label.parse::<TimeSlot>().unwrap(),
            teacher: teacher.into(),
            students: students.iter().map(|&s| s.into()).collect(),
            course_type: if students.len() > 1 {
                CourseType::OneToMany
            } else {
                CourseType::OneToOne
            },
            grade: Grade::new(8).unwrap(),
            subject: "Math".into(),
        }
    }

    #[test]
    fn schedule_rows_sort_by_start_time() {
        let rendered = schedule(&[
            session("Saturday 14:30-16:00", "Lin", &["Wei"]),
            session("Saturday 9:30-11:00", "Zhao", &["Ming"]),
            session("Saturday 8:00-10:00", "Qian", &["Hao"]),
        ]);

        let nine_thirty = rendered.find("9:30-11:00").unwrap();
        let eight = rendered.find("8:00-10:00").unwrap();
        let afternoon = rendered.find("14:30-16:00").unwrap();
        assert!(eight < nine_thirty && nine_thirty < afternoon);
    }

    #[test]
    fn schedule_splits_days() {
        let rendered = schedule(&[session("Saturday 8:00-9:30", "Lin", &["Wei", "Ming"])]);
        let (saturday, sunday) = rendered.split_at(rendered.find("Sunday").unwrap());

        assert!(saturday.contains("[2] Wei, Ming"));
        assert!(saturday.contains("one-to-many"));
        assert!(!saturday.contains("Saturday 8:00"));
        assert!(sunday.contains("No classes scheduled"));
    }

    #[test]
    fn long_student_availability_is_abbreviated() {
        let student = NewStudent {
            name: "Wei".into(),
            grade: Grade::new(8).unwrap(),
            subject: "Math".into(),
            course_type: CourseType::OneToMany,
            preferred_teacher: None,
            availability: TimeSlot::for_level(Grade::new(8).unwrap().level()),
        }
        .with_id(1);

        let rendered = students(&[student]);
        assert!(rendered.contains("Sat 8:00-9:30, Sat 9:30-11:00, Sat 11:00-12:30 ... (14 total)"));
        assert!(rendered.contains("  -  "));
    }

    #[test]
    fn empty_lists_say_so() {
        assert_eq!(teachers(&[]), "No teachers yet\n");
        assert_eq!(students(&[]), "No students yet\n");
        assert_eq!(notice(NoticeKind::Error, "Teacher not found"), "[error] Teacher not found");
    }
}
