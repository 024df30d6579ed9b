use axum::Json;
use axum::extract::State;

use crate::database::Database;
use crate::endpoints::ApiError;
use crate::model::ScheduleSlot;
use crate::model::simple_response::ApiMessage;
use crate::scheduler;

pub async fn get_schedule(State(db): State<Database>) -> Result<Json<Vec<ScheduleSlot>>, ApiError> {
    Ok(Json(db.list_schedule().await?))
}

/// Rebuilds the weekly schedule from every stored record and keeps it as the current schedule.
/// A failed generation leaves the previous schedule in place.
pub async fn generate_schedule(State(db): State<Database>) -> Result<Json<Vec<ScheduleSlot>>, ApiError> {
    let teachers = db.list_teachers().await?;
    let students = db.list_students().await?;

    let sessions = match scheduler::generate(&teachers, &students) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Schedule generation failed: {e}");
            return Err(e.into());
        }
    };

    db.replace_schedule(&sessions).await?;
    tracing::info!(
        "Generated schedule of {} sessions for {} students",
        sessions.len(),
        students.len()
    );

    Ok(Json(sessions))
}

pub async fn clear_data(State(db): State<Database>) -> Result<Json<ApiMessage>, ApiError> {
    db.clear_all().await?;
    tracing::info!("Cleared all data");
    Ok(Json(ApiMessage::new("All data cleared")))
}
