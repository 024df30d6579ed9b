//! HTTP surface of the scheduling service.
//!
//! Handlers are grouped by the record they manage: `teacher`, `student`, and `schedule` (which
//! also owns the clear-all operation). Every failure answers with `{ "error": "..." }`.

use axum::extract::DefaultBodyLimit;
use axum::extract::rejection::JsonRejection;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::database::Database;
use crate::form::FormError;
use crate::model::simple_response::ApiErrorBody;
use crate::scheduler::ScheduleError;

pub mod schedule;
pub mod student;
pub mod teacher;

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Invalid(#[from] FormError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("Internal Server Error.")]
    Database(#[from] sqlx::Error),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) | ApiError::Invalid(_) | ApiError::Schedule(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(e) => {
                tracing::error!("{e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ApiErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Whether a write lost to a concurrent one on a unique column.
fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(e) if e.is_unique_violation())
}

/// Ids arrive as path text. Anything that is not a number names no record.
fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok()
}

/// Builds the application router, with CORS open to any origin.
pub fn router(database: Database) -> Router {
    // Allow the verbs the API uses plus the preflight OPTIONS, and JSON bodies
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(AllowOrigin::any());

    Router::new()
        .route(
            "/api/teachers",
            get(teacher::list_teachers).post(teacher::add_teacher),
        )
        .route(
            "/api/teachers/{id}",
            put(teacher::update_teacher).delete(teacher::delete_teacher),
        )
        .route(
            "/api/students",
            get(student::list_students).post(student::add_student),
        )
        .route(
            "/api/students/{id}",
            put(student::update_student).delete(student::delete_student),
        )
        .route("/api/schedule", get(schedule::get_schedule))
        .route("/api/generate-schedule", post(schedule::generate_schedule))
        .route("/api/clear-data", post(schedule::clear_data))
        .with_state(database)
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
