use sqlx::FromRow;

use crate::database::{Database, decode_grade, decode_json, decode_value, encode_json};
use crate::model::{NewStudent, Student};

#[derive(FromRow)]
struct StudentRow {
    id: i64,
    name: String,
    grade: i64,
    subject: String,
    course_type: String,
    preferred_teacher: Option<String>,
    availability: String,
}

impl TryFrom<StudentRow> for Student {
    type Error = sqlx::Error;

    fn try_from(row: StudentRow) -> Result<Self, Self::Error> {
        Ok(Student {
            id: row.id,
            name: row.name,
            grade: decode_grade(row.grade)?,
            subject: row.subject,
            course_type: decode_value(&row.course_type)?,
            preferred_teacher: row.preferred_teacher,
            availability: decode_json(&row.availability)?,
        })
    }
}

const SELECT_STUDENTS: &str =
    "SELECT id, name, grade, subject, course_type, preferred_teacher, availability FROM students";

impl Database {
    pub async fn list_students(&self) -> sqlx::Result<Vec<Student>> {
        sqlx::query_as::<_, StudentRow>(&format!("{SELECT_STUDENTS} ORDER BY id;"))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Student::try_from)
            .collect()
    }

    pub async fn get_student(&self, id: i64) -> sqlx::Result<Option<Student>> {
        sqlx::query_as::<_, StudentRow>(&format!("{SELECT_STUDENTS} WHERE id = ?1;"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Student::try_from)
            .transpose()
    }

    /// Whether a record other than `except` has the same name, grade, subject and course type.
    pub async fn student_record_exists(&self, student: &NewStudent, except: Option<i64>) -> sqlx::Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM students
            WHERE name = ?1 AND grade = ?2 AND subject = ?3 AND course_type = ?4 AND id IS NOT ?5;",
        )
        .bind(&student.name)
        .bind(i64::from(student.grade.number()))
        .bind(&student.subject)
        .bind(student.course_type.as_str())
        .bind(except)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// Name of the first student who chose `teacher` as preferred teacher, if any.
    pub async fn student_preferring(&self, teacher: &str) -> sqlx::Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT name FROM students WHERE preferred_teacher = ?1 ORDER BY id LIMIT 1;")
                .bind(teacher)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(name,)| name))
    }

    pub async fn insert_student(&self, student: &NewStudent) -> sqlx::Result<i64> {
        let id = sqlx::query(
            "INSERT INTO students (name, grade, subject, course_type, preferred_teacher, availability)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        )
        .bind(&student.name)
        .bind(i64::from(student.grade.number()))
        .bind(&student.subject)
        .bind(student.course_type.as_str())
        .bind(&student.preferred_teacher)
        .bind(encode_json(&student.availability)?)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn update_student(&self, id: i64, student: &NewStudent) -> sqlx::Result<bool> {
        let result = sqlx::query(
            "UPDATE students
            SET name = ?1, grade = ?2, subject = ?3, course_type = ?4, preferred_teacher = ?5, availability = ?6
            WHERE id = ?7;",
        )
        .bind(&student.name)
        .bind(i64::from(student.grade.number()))
        .bind(&student.subject)
        .bind(student.course_type.as_str())
        .bind(&student.preferred_teacher)
        .bind(encode_json(&student.availability)?)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_student(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?1;")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
