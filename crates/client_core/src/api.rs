//! Authenticated HTTP client for the grading service.
//!
//! One method per endpoint. Every call attaches `Authorization: Bearer`
//! when the credential store holds tokens, performs a single request, and
//! normalizes failures into one display string: the body's `detail`
//! field, falling back to the raw body, falling back to the transport
//! error. No retries, no status-specific handling beyond classification.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{AssignmentId, CourseId, SubmissionId},
    error::{ErrorCode, ServiceError},
    protocol::{
        AssignmentListResponse, AssignmentRow, AuthExchangeRequest, AuthExchangeResponse,
        CourseListResponse, CourseSummary, DetailResponse, GradeSubmissionRequest,
        GradeSubmissionResponse, GradeSummary, LecturerSubmissionListResponse,
        LecturerSubmissionRow, SubmitAssignmentRequest, SubmitAssignmentResponse, TokenPair,
    },
};
use thiserror::Error;
use tracing::debug;

use crate::credentials::CredentialStore;

#[derive(Debug, Error)]
pub enum ApiFailure {
    /// Non-2xx response; the message is already human-readable.
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("credential storage failure: {0}")]
    Credentials(String),
}

impl ApiFailure {
    /// The single string the UI renders for this failure.
    pub fn display_message(&self) -> String {
        self.to_string()
    }

    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Service(err) => Some(err.code),
            _ => None,
        }
    }
}

/// Extract a human-readable message from a non-2xx body: the `detail`
/// field when present, otherwise the raw body, otherwise the status line.
fn service_message(status: StatusCode, body: &str) -> String {
    if let Ok(detail) = serde_json::from_str::<DetailResponse>(body) {
        if !detail.detail.trim().is_empty() {
            return detail.detail;
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    format!(
        "request failed with status {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )
    .trim_end()
    .to_string()
}

pub struct PortalApi {
    http: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl PortalApi {
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn store_tokens(&self, tokens: TokenPair) -> Result<(), ApiFailure> {
        self.credentials
            .set(tokens)
            .await
            .map_err(|err| ApiFailure::Credentials(err.to_string()))
    }

    pub async fn clear_tokens(&self) -> Result<(), ApiFailure> {
        self.credentials
            .clear()
            .await
            .map_err(|err| ApiFailure::Credentials(err.to_string()))
    }

    pub async fn has_stored_tokens(&self) -> bool {
        matches!(self.credentials.get().await, Ok(Some(_)))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder, ApiFailure> {
        let tokens = self
            .credentials
            .get()
            .await
            .map_err(|err| ApiFailure::Credentials(err.to_string()))?;
        Ok(match tokens {
            Some(tokens) => builder.bearer_auth(tokens.access),
            None => builder,
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiFailure> {
        let builder = self.authorize(builder).await?;
        let response = builder
            .send()
            .await
            .map_err(|err| ApiFailure::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ApiFailure::Transport(err.to_string()))?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "grading service reported failure");
            return Err(ApiFailure::Service(ServiceError::new(
                ErrorCode::from_status(status.as_u16()),
                service_message(status, &body),
            )));
        }

        serde_json::from_str(&body).map_err(|err| ApiFailure::Decode(err.to_string()))
    }

    /// Forward the opaque identity credential once; the service verifies
    /// it and answers with the user profile and a service token pair.
    pub async fn exchange_identity(
        &self,
        id_token: &str,
    ) -> Result<AuthExchangeResponse, ApiFailure> {
        self.execute(
            self.http
                .post(self.url("/auth/exchange"))
                .json(&AuthExchangeRequest {
                    id_token: id_token.to_string(),
                }),
        )
        .await
    }

    pub async fn list_my_courses(&self) -> Result<Vec<CourseSummary>, ApiFailure> {
        let response: CourseListResponse = self.execute(self.http.get(self.url("/me/courses"))).await?;
        Ok(response.courses)
    }

    pub async fn list_my_assignments(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<AssignmentRow>, ApiFailure> {
        let response: AssignmentListResponse = self
            .execute(
                self.http
                    .get(self.url("/me/assignments"))
                    .query(&[("course_id", course_id.0)]),
            )
            .await?;
        Ok(response.assignments)
    }

    pub async fn get_my_grades(&self, course_id: CourseId) -> Result<GradeSummary, ApiFailure> {
        self.execute(
            self.http
                .get(self.url("/me/grades"))
                .query(&[("course_id", course_id.0)]),
        )
        .await
    }

    pub async fn submit_assignment(
        &self,
        assignment_id: AssignmentId,
        file_url: &str,
    ) -> Result<SubmitAssignmentResponse, ApiFailure> {
        self.execute(
            self.http
                .post(self.url(&format!("/assignments/{}/submit", assignment_id.0)))
                .json(&SubmitAssignmentRequest {
                    file_url: file_url.to_string(),
                }),
        )
        .await
    }

    pub async fn list_lecturer_submissions(
        &self,
        course_id: CourseId,
        assignment_id: Option<AssignmentId>,
    ) -> Result<Vec<LecturerSubmissionRow>, ApiFailure> {
        let mut query = vec![("course_id", course_id.0)];
        if let Some(assignment_id) = assignment_id {
            query.push(("assignment_id", assignment_id.0));
        }
        let response: LecturerSubmissionListResponse = self
            .execute(
                self.http
                    .get(self.url("/lecturer/submissions"))
                    .query(&query),
            )
            .await?;
        Ok(response.submissions)
    }

    pub async fn grade_submission(
        &self,
        submission_id: SubmissionId,
        score: f64,
        feedback: &str,
    ) -> Result<GradeSubmissionResponse, ApiFailure> {
        self.execute(
            self.http
                .post(self.url(&format!("/lecturer/submissions/{}/grade", submission_id.0)))
                .json(&GradeSubmissionRequest {
                    score,
                    feedback: feedback.to_string(),
                }),
        )
        .await
    }

    pub async fn lock_submission(
        &self,
        submission_id: SubmissionId,
    ) -> Result<DetailResponse, ApiFailure> {
        self.execute(
            self.http
                .post(self.url(&format!("/lecturer/submissions/{}/lock", submission_id.0)))
                .json(&serde_json::json!({})),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_message_prefers_detail_field() {
        let msg = service_message(
            StatusCode::FORBIDDEN,
            r#"{"detail": "Not enrolled in this course."}"#,
        );
        assert_eq!(msg, "Not enrolled in this course.");
    }

    #[test]
    fn service_message_falls_back_to_raw_body() {
        let msg = service_message(StatusCode::BAD_GATEWAY, "upstream exploded");
        assert_eq!(msg, "upstream exploded");
    }

    #[test]
    fn service_message_falls_back_to_status_line() {
        let msg = service_message(StatusCode::INTERNAL_SERVER_ERROR, "   ");
        assert_eq!(msg, "request failed with status 500 Internal Server Error");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = PortalApi::new(
            "http://127.0.0.1:8000/api/",
            Arc::new(crate::credentials::MemoryCredentialStore::new()),
        );
        assert_eq!(api.url("/me/courses"), "http://127.0.0.1:8000/api/me/courses");
    }
}
