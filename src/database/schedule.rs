use sqlx::FromRow;

use crate::database::{Database, decode_grade, decode_json, decode_value, encode_json};
use crate::model::ScheduleSlot;

#[derive(FromRow)]
struct ScheduleRow {
    time_slot: String,
    teacher: String,
    students: String,
    course_type: String,
    grade: i64,
    subject: String,
}

impl TryFrom<ScheduleRow> for ScheduleSlot {
    type Error = sqlx::Error;

    fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
        Ok(ScheduleSlot {
            time_slot: decode_value(&row.time_slot)?,
            teacher: row.teacher,
            students: decode_json(&row.students)?,
            course_type: decode_value(&row.course_type)?,
            grade: decode_grade(row.grade)?,
            subject: row.subject,
        })
    }
}

impl Database {
    /// The last generated schedule, in generation order.
    pub async fn list_schedule(&self) -> sqlx::Result<Vec<ScheduleSlot>> {
        sqlx::query_as::<_, ScheduleRow>(
            "SELECT time_slot, teacher, students, course_type, grade, subject
            FROM schedule_slots ORDER BY position;",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(ScheduleSlot::try_from)
        .collect()
    }

    /// Swaps the stored schedule for `sessions` in one transaction.
    pub async fn replace_schedule(&self, sessions: &[ScheduleSlot]) -> sqlx::Result<()> {
        let mut transaction = self.pool.begin().await?;

        sqlx::query("DELETE FROM schedule_slots;")
            .execute(&mut *transaction)
            .await?;

        for (position, session) in sessions.iter().enumerate() {
            sqlx::query(
                "INSERT INTO schedule_slots (position, time_slot, teacher, students, course_type, grade, subject)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            )
            .bind(position as i64)
            .bind(session.time_slot.to_string())
            .bind(&session.teacher)
            .bind(encode_json(&session.students)?)
            .bind(session.course_type.as_str())
            .bind(i64::from(session.grade.number()))
            .bind(&session.subject)
            .execute(&mut *transaction)
            .await?;
        }

        transaction.commit().await
    }
}
