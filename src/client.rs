//! HTTP client for the scheduling service.
//!
//! Each method issues exactly one request. A non-2xx response becomes [`ClientError::Api`]
//! carrying the service's `error` string verbatim, or a per-operation fallback when the body
//! has none. Nothing is retried.

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::form::FormError;
use crate::model::simple_response::ApiErrorBody;
use crate::model::{NewStudent, NewTeacher, ScheduleSlot, Student, Teacher};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected before anything was sent
    #[error(transparent)]
    Invalid(#[from] FormError),

    /// The service answered with a non-2xx status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The record to edit is not in the service's listing
    #[error("{0}")]
    Missing(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Success bodies may omit the message; the caller then shows its own default.
#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` points at the API root, e.g. `http://127.0.0.1:5000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn list_teachers(&self) -> Result<Vec<Teacher>, ClientError> {
        let request = self.http.get(self.url("/teachers"));
        self.send(request, "Failed to load teachers").await
    }

    pub async fn add_teacher(&self, teacher: &NewTeacher) -> Result<String, ClientError> {
        let request = self.http.post(self.url("/teachers")).json(teacher);
        self.send_message(request, "Teacher added", "Failed to add teacher")
            .await
    }

    pub async fn update_teacher(&self, id: i64, teacher: &NewTeacher) -> Result<String, ClientError> {
        let request = self
            .http
            .put(self.url(&format!("/teachers/{id}")))
            .json(teacher);
        self.send_message(request, "Teacher updated", "Failed to update teacher")
            .await
    }

    pub async fn delete_teacher(&self, id: i64) -> Result<String, ClientError> {
        let request = self.http.delete(self.url(&format!("/teachers/{id}")));
        self.send_message(request, "Teacher deleted", "Failed to delete teacher")
            .await
    }

    pub async fn list_students(&self) -> Result<Vec<Student>, ClientError> {
        let request = self.http.get(self.url("/students"));
        self.send(request, "Failed to load students").await
    }

    pub async fn add_student(&self, student: &NewStudent) -> Result<String, ClientError> {
        let request = self.http.post(self.url("/students")).json(student);
        self.send_message(request, "Student added", "Failed to add student")
            .await
    }

    pub async fn update_student(&self, id: i64, student: &NewStudent) -> Result<String, ClientError> {
        let request = self
            .http
            .put(self.url(&format!("/students/{id}")))
            .json(student);
        self.send_message(request, "Student updated", "Failed to update student")
            .await
    }

    pub async fn delete_student(&self, id: i64) -> Result<String, ClientError> {
        let request = self.http.delete(self.url(&format!("/students/{id}")));
        self.send_message(request, "Student deleted", "Failed to delete student")
            .await
    }

    /// Asks the service to rebuild the weekly schedule from every stored record.
    pub async fn generate_schedule(&self) -> Result<Vec<ScheduleSlot>, ClientError> {
        let request = self.http.post(self.url("/generate-schedule"));
        self.send(request, "Failed to generate the schedule").await
    }

    /// The most recently generated schedule.
    pub async fn schedule(&self) -> Result<Vec<ScheduleSlot>, ClientError> {
        let request = self.http.get(self.url("/schedule"));
        self.send(request, "Failed to load the schedule").await
    }

    pub async fn clear_data(&self) -> Result<String, ClientError> {
        let request = self.http.post(self.url("/clear-data"));
        self.send_message(request, "All data cleared", "Failed to clear data")
            .await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, fallback: &str) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| fallback.to_owned());
            tracing::debug!("Request failed with {status}: {message}");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }

    async fn send_message(
        &self,
        request: RequestBuilder,
        success: &str,
        fallback: &str,
    ) -> Result<String, ClientError> {
        let body: MessageBody = self.send(request, fallback).await?;
        Ok(body.message.unwrap_or_else(|| success.to_owned()))
    }
}
