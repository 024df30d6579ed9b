use sqlx::FromRow;

use crate::database::{Database, decode_json, encode_json};
use crate::model::{NewTeacher, Teacher};

#[derive(FromRow)]
struct TeacherRow {
    id: i64,
    name: String,
    grades: String,
    subjects: String,
    availability: String,
}

impl TryFrom<TeacherRow> for Teacher {
    type Error = sqlx::Error;

    fn try_from(row: TeacherRow) -> Result<Self, Self::Error> {
        Ok(Teacher {
            id: row.id,
            name: row.name,
            grades: decode_json(&row.grades)?,
            subjects: decode_json(&row.subjects)?,
            availability: decode_json(&row.availability)?,
        })
    }
}

impl Database {
    pub async fn list_teachers(&self) -> sqlx::Result<Vec<Teacher>> {
        sqlx::query_as::<_, TeacherRow>(
            "SELECT id, name, grades, subjects, availability FROM teachers ORDER BY id;",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Teacher::try_from)
        .collect()
    }

    pub async fn get_teacher(&self, id: i64) -> sqlx::Result<Option<Teacher>> {
        sqlx::query_as::<_, TeacherRow>(
            "SELECT id, name, grades, subjects, availability FROM teachers WHERE id = ?1;",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Teacher::try_from)
        .transpose()
    }

    /// Whether a teacher other than `except` already uses `name`.
    pub async fn teacher_name_taken(&self, name: &str, except: Option<i64>) -> sqlx::Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM teachers WHERE name = ?1 AND id IS NOT ?2;")
            .bind(name)
            .bind(except)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Stores a new teacher and returns the assigned id.
    pub async fn insert_teacher(&self, teacher: &NewTeacher) -> sqlx::Result<i64> {
        let id = sqlx::query(
            "INSERT INTO teachers (name, grades, subjects, availability) VALUES (?1, ?2, ?3, ?4);",
        )
        .bind(&teacher.name)
        .bind(encode_json(&teacher.grades)?)
        .bind(encode_json(&teacher.subjects)?)
        .bind(encode_json(&teacher.availability)?)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    /// Replaces a teacher's fields. Returns false when no teacher has this id.
    pub async fn update_teacher(&self, id: i64, teacher: &NewTeacher) -> sqlx::Result<bool> {
        let result = sqlx::query(
            "UPDATE teachers SET name = ?1, grades = ?2, subjects = ?3, availability = ?4 WHERE id = ?5;",
        )
        .bind(&teacher.name)
        .bind(encode_json(&teacher.grades)?)
        .bind(encode_json(&teacher.subjects)?)
        .bind(encode_json(&teacher.availability)?)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_teacher(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM teachers WHERE id = ?1;")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
