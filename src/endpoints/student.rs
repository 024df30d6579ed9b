use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::database::Database;
use crate::endpoints::{ApiError, is_unique_violation, parse_id};
use crate::form;
use crate::model::simple_response::ApiMessage;
use crate::model::{NewStudent, Student};

const NOT_FOUND: &str = "Student record not found";

fn duplicate(student: &NewStudent) -> ApiError {
    ApiError::BadRequest(format!(
        "A {} {} {} record already exists for this student",
        student.grade, student.subject, student.course_type
    ))
}

/// A concurrent write of the same record surfaces as a unique violation.
fn record_clash(error: sqlx::Error, student: &NewStudent) -> ApiError {
    if is_unique_violation(&error) {
        duplicate(student)
    } else {
        error.into()
    }
}

pub async fn list_students(State(db): State<Database>) -> Result<Json<Vec<Student>>, ApiError> {
    Ok(Json(db.list_students().await?))
}

/// Adds a student record. A student may hold several records as long as grade, subject or course
/// type differ.
pub async fn add_student(
    State(db): State<Database>,
    payload: Result<Json<NewStudent>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiMessage>), ApiError> {
    let Json(student) = payload?;
    let student = form::validate_student(student)?;

    if db.student_record_exists(&student, None).await? {
        return Err(duplicate(&student));
    }

    let id = db
        .insert_student(&student)
        .await
        .map_err(|e| record_clash(e, &student))?;
    tracing::info!("Added student {} ({id})", student.name);

    Ok((StatusCode::CREATED, Json(ApiMessage::new("Student added"))))
}

pub async fn update_student(
    State(db): State<Database>,
    Path(id): Path<String>,
    payload: Result<Json<NewStudent>, JsonRejection>,
) -> Result<Json<ApiMessage>, ApiError> {
    let Json(student) = payload?;
    let Some(id) = parse_id(&id) else {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    };
    if db.get_student(id).await?.is_none() {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    }

    let student = form::validate_student(student)?;
    if db.student_record_exists(&student, Some(id)).await? {
        return Err(duplicate(&student));
    }

    let updated = db
        .update_student(id, &student)
        .await
        .map_err(|e| record_clash(e, &student))?;
    if !updated {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    }
    tracing::info!("Updated student {id}");

    Ok(Json(ApiMessage::new("Student updated")))
}

/// Deletes a student record unless the current schedule seats the student in that course.
pub async fn delete_student(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<ApiMessage>, ApiError> {
    let Some(id) = parse_id(&id) else {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    };
    let Some(student) = db.get_student(id).await? else {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    };

    let schedule = db.list_schedule().await?;
    let scheduled = schedule.iter().any(|s| {
        s.grade == student.grade
            && s.subject == student.subject
            && s.students.iter().any(|n| *n == student.name)
    });
    if scheduled {
        return Err(ApiError::BadRequest(format!(
            "Cannot delete: the {} {} record of this student has scheduled classes",
            student.grade, student.subject
        )));
    }

    db.delete_student(id).await?;
    tracing::info!("Deleted student {} ({id})", student.name);

    Ok(Json(ApiMessage::new("Student record deleted")))
}
