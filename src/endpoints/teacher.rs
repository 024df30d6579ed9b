use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::database::Database;
use crate::endpoints::{ApiError, is_unique_violation, parse_id};
use crate::form;
use crate::model::simple_response::ApiMessage;
use crate::model::{NewTeacher, Teacher};

const NOT_FOUND: &str = "Teacher not found";
const DUPLICATE: &str = "Teacher already exists";
const NAME_TAKEN: &str = "Teacher name already exists";

/// A concurrent write with the same name surfaces as a unique violation.
fn name_clash(error: sqlx::Error, message: &str) -> ApiError {
    if is_unique_violation(&error) {
        ApiError::BadRequest(message.into())
    } else {
        error.into()
    }
}

pub async fn list_teachers(State(db): State<Database>) -> Result<Json<Vec<Teacher>>, ApiError> {
    Ok(Json(db.list_teachers().await?))
}

/// Adds a teacher. Names are unique across teachers.
pub async fn add_teacher(
    State(db): State<Database>,
    payload: Result<Json<NewTeacher>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiMessage>), ApiError> {
    let Json(teacher) = payload?;
    let teacher = form::validate_teacher(teacher)?;

    if db.teacher_name_taken(&teacher.name, None).await? {
        return Err(ApiError::BadRequest(DUPLICATE.into()));
    }

    let id = db
        .insert_teacher(&teacher)
        .await
        .map_err(|e| name_clash(e, DUPLICATE))?;
    tracing::info!("Added teacher {} ({id})", teacher.name);

    Ok((StatusCode::CREATED, Json(ApiMessage::new("Teacher added"))))
}

pub async fn update_teacher(
    State(db): State<Database>,
    Path(id): Path<String>,
    payload: Result<Json<NewTeacher>, JsonRejection>,
) -> Result<Json<ApiMessage>, ApiError> {
    let Json(teacher) = payload?;
    let Some(id) = parse_id(&id) else {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    };
    if db.get_teacher(id).await?.is_none() {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    }

    let teacher = form::validate_teacher(teacher)?;
    if db.teacher_name_taken(&teacher.name, Some(id)).await? {
        return Err(ApiError::BadRequest(NAME_TAKEN.into()));
    }

    let updated = db
        .update_teacher(id, &teacher)
        .await
        .map_err(|e| name_clash(e, NAME_TAKEN))?;
    if !updated {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    }
    tracing::info!("Updated teacher {id}");

    Ok(Json(ApiMessage::new("Teacher updated")))
}

/// Deletes a teacher unless a student prefers them or the current schedule assigns them.
pub async fn delete_teacher(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<ApiMessage>, ApiError> {
    let Some(id) = parse_id(&id) else {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    };
    let Some(teacher) = db.get_teacher(id).await? else {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    };

    if let Some(student) = db.student_preferring(&teacher.name).await? {
        return Err(ApiError::BadRequest(format!(
            "Cannot delete: student {student} has chosen this teacher as preferred teacher"
        )));
    }

    let schedule = db.list_schedule().await?;
    if schedule.iter().any(|s| s.teacher == teacher.name) {
        return Err(ApiError::BadRequest(
            "Cannot delete: this teacher has scheduled classes".into(),
        ));
    }

    db.delete_teacher(id).await?;
    tracing::info!("Deleted teacher {} ({id})", teacher.name);

    Ok(Json(ApiMessage::new("Teacher deleted")))
}
