//! Core client for the academic portal: session control, view
//! orchestration, and the lecturer review panel.
//!
//! All UI state lives in one [`PortalState`] value behind a mutex; every
//! transition is an explicit method on [`PortalClient`], and every
//! mutation declares the read views it invalidates through
//! [`Mutation::invalidates`]. The client never merges predicted state:
//! after a successful mutation it re-fetches the declared views so the
//! display always reflects server-side truth.

use std::{collections::HashMap, sync::Arc};

use shared::{
    domain::{AssignmentId, CourseId, SubmissionId, UserProfile, ViewMode},
    protocol::{AssignmentRow, CourseSummary, GradeSummary, LecturerSubmissionRow},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info};

pub mod api;
pub mod config;
pub mod credentials;

pub use api::{ApiFailure, PortalApi};
pub use config::{load_settings, Settings};
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};

const BLANK_FILE_URL_MESSAGE: &str = "Please paste your File URL first.";
const BLANK_SCORE_MESSAGE: &str = "Enter a score first.";
const SCORE_NOT_NUMERIC_MESSAGE: &str = "score must be a number";

/// Read views a mutation can invalidate. Refreshes run in the order the
/// mutation declares them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTarget {
    Assignments,
    GradeSummary,
    LecturerSubmissions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    SubmitAssignment,
    SaveGrade,
    LockGrade,
}

impl Mutation {
    pub fn invalidates(self) -> &'static [RefreshTarget] {
        match self {
            Mutation::SubmitAssignment => {
                &[RefreshTarget::Assignments, RefreshTarget::GradeSummary]
            }
            Mutation::SaveGrade | Mutation::LockGrade => &[
                RefreshTarget::LecturerSubmissions,
                RefreshTarget::GradeSummary,
            ],
        }
    }
}

/// The complete client-side view state. One flat value so a full session
/// reset is a single assignment and snapshots are a single clone.
#[derive(Debug, Clone, Default)]
pub struct PortalState {
    pub user: Option<UserProfile>,
    pub courses: Vec<CourseSummary>,
    pub selected_course: Option<CourseSummary>,
    pub grade_summary: Option<GradeSummary>,
    pub assignments: Vec<AssignmentRow>,
    pub file_url_inputs: HashMap<AssignmentId, String>,
    pub view_mode: ViewMode,
    pub lecturer_submissions: Vec<LecturerSubmissionRow>,
    pub score_inputs: HashMap<SubmissionId, String>,
    pub feedback_inputs: HashMap<SubmissionId, String>,
    pub loading: bool,
    pub status_line: Option<String>,
}

#[derive(Debug, Clone)]
pub enum PortalEvent {
    SessionStarted { user: UserProfile },
    SessionCleared,
    CoursesLoaded(Vec<CourseSummary>),
    CourseOpened(CourseSummary),
    GradeSummaryLoaded(GradeSummary),
    AssignmentsLoaded(Vec<AssignmentRow>),
    LecturerSubmissionsLoaded(Vec<LecturerSubmissionRow>),
    StatusChanged(String),
    Error(String),
}

pub struct PortalClient {
    api: PortalApi,
    inner: Mutex<PortalState>,
    events: broadcast::Sender<PortalEvent>,
}

impl PortalClient {
    pub fn new(api: PortalApi) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            api,
            inner: Mutex::new(PortalState::default()),
            events,
        })
    }

    pub fn api(&self) -> &PortalApi {
        &self.api
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PortalEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> PortalState {
        self.inner.lock().await.clone()
    }

    fn emit(&self, event: PortalEvent) {
        let _ = self.events.send(event);
    }

    async fn report_status(&self, message: impl Into<String>) {
        let message = message.into();
        self.inner.lock().await.status_line = Some(message.clone());
        self.emit(PortalEvent::StatusChanged(message));
    }

    async fn report_failure(&self, err: &ApiFailure) {
        let message = err.display_message();
        error!("portal request failed: {message}");
        self.inner.lock().await.status_line = Some(message.clone());
        self.emit(PortalEvent::Error(message));
    }

    async fn begin_loading(&self) {
        let mut state = self.inner.lock().await;
        state.loading = true;
        state.status_line = None;
    }

    async fn end_loading(&self) {
        self.inner.lock().await.loading = false;
    }

    async fn selected_course_id(&self) -> Option<CourseId> {
        self.inner
            .lock()
            .await
            .selected_course
            .as_ref()
            .map(|course| course.course_id)
    }

    /// Exchange the opaque identity credential, persist the returned
    /// tokens, then fetch the course list (one-shot side effect of
    /// entering the authenticated state).
    pub async fn login_with_identity(
        &self,
        identity_credential: &str,
    ) -> Result<UserProfile, ApiFailure> {
        let response = match self.api.exchange_identity(identity_credential).await {
            Ok(response) => response,
            Err(err) => {
                self.report_failure(&err).await;
                return Err(err);
            }
        };
        self.api.store_tokens(response.tokens.clone()).await?;

        {
            let mut state = self.inner.lock().await;
            state.user = Some(response.user.clone());
        }
        info!(user = %response.user.email, "session started");
        self.emit(PortalEvent::SessionStarted {
            user: response.user.clone(),
        });
        self.report_status("Login successful").await;

        if let Err(err) = self.load_courses().await {
            // Stay logged in; the course panel simply shows the failure.
            error!("initial course fetch failed: {err}");
        }

        Ok(response.user)
    }

    /// Clear the credential store and every dependent view slice. A full
    /// reset, not a partial one.
    pub async fn logout(&self) -> Result<(), ApiFailure> {
        self.api.clear_tokens().await?;
        {
            let mut state = self.inner.lock().await;
            *state = PortalState {
                status_line: Some("Logged out".to_string()),
                ..PortalState::default()
            };
        }
        info!("session cleared");
        self.emit(PortalEvent::SessionCleared);
        Ok(())
    }

    pub async fn load_courses(&self) -> Result<(), ApiFailure> {
        self.begin_loading().await;
        let result = self.api.list_my_courses().await;
        self.end_loading().await;
        match result {
            Ok(courses) => {
                self.inner.lock().await.courses = courses.clone();
                self.emit(PortalEvent::CoursesLoaded(courses));
                Ok(())
            }
            Err(err) => {
                self.report_failure(&err).await;
                Err(err)
            }
        }
    }

    /// Select a course: clears lecturer mode and every dependent panel,
    /// then fetches the grade summary and the assignment list, in that
    /// order, under one loading flag. The first failure aborts the
    /// remaining fetch and surfaces its message.
    pub async fn open_course(&self, course: CourseSummary) -> Result<(), ApiFailure> {
        {
            let mut state = self.inner.lock().await;
            state.selected_course = Some(course.clone());
            state.view_mode = ViewMode::Student;
            state.lecturer_submissions.clear();
            state.score_inputs.clear();
            state.feedback_inputs.clear();
            state.grade_summary = None;
            state.assignments.clear();
            state.file_url_inputs.clear();
            state.loading = true;
            state.status_line = None;
        }
        self.emit(PortalEvent::CourseOpened(course.clone()));

        let result = async {
            self.refresh_grade_summary_for(course.course_id).await?;
            self.refresh_assignments_for(course.course_id).await
        }
        .await;

        self.end_loading().await;
        if let Err(err) = &result {
            self.report_failure(err).await;
        }
        result
    }

    /// Submit the stored file URL for an assignment. A blank URL is
    /// rejected locally without touching the network; on success the
    /// assignment list and then the grade summary are re-fetched so the
    /// UI reflects server state.
    pub async fn submit_assignment(&self, assignment_id: AssignmentId) -> Result<(), ApiFailure> {
        let file_url = {
            let state = self.inner.lock().await;
            state
                .file_url_inputs
                .get(&assignment_id)
                .cloned()
                .unwrap_or_default()
        };
        let file_url = file_url.trim().to_string();
        if file_url.is_empty() {
            self.report_status(BLANK_FILE_URL_MESSAGE).await;
            return Ok(());
        }

        self.begin_loading().await;
        let result = async {
            let response = self.api.submit_assignment(assignment_id, &file_url).await?;
            info!(assignment_id = assignment_id.0, "assignment submitted");
            self.report_status(response.detail).await;
            self.apply_refreshes(Mutation::SubmitAssignment).await
        }
        .await;
        self.end_loading().await;
        if let Err(err) = &result {
            self.report_failure(err).await;
        }
        result
    }

    /// Pure local mode switch; entering the lecturer view additionally
    /// fetches submissions for the selected course.
    pub async fn set_view_mode(&self, mode: ViewMode) -> Result<(), ApiFailure> {
        self.inner.lock().await.view_mode = mode;
        if mode == ViewMode::Lecturer {
            self.load_lecturer_submissions().await?;
        }
        Ok(())
    }

    pub async fn load_lecturer_submissions(&self) -> Result<(), ApiFailure> {
        if self.selected_course_id().await.is_none() {
            return Ok(());
        }
        self.begin_loading().await;
        let result = self.refresh_lecturer_submissions().await;
        self.end_loading().await;
        if let Err(err) = &result {
            self.report_failure(err).await;
        }
        result
    }

    /// Save score/feedback for one submission from the locally edited
    /// fields. Blank score is a local rejection; a non-numeric score is
    /// rejected with the service's own wording before any call is made.
    pub async fn grade_one(&self, submission_id: SubmissionId) -> Result<(), ApiFailure> {
        let (score_text, feedback) = {
            let state = self.inner.lock().await;
            (
                state
                    .score_inputs
                    .get(&submission_id)
                    .cloned()
                    .unwrap_or_default(),
                state
                    .feedback_inputs
                    .get(&submission_id)
                    .cloned()
                    .unwrap_or_default(),
            )
        };
        let score_text = score_text.trim().to_string();
        if score_text.is_empty() {
            self.report_status(BLANK_SCORE_MESSAGE).await;
            return Ok(());
        }
        let score: f64 = match score_text.parse() {
            Ok(score) => score,
            Err(_) => {
                self.report_status(SCORE_NOT_NUMERIC_MESSAGE).await;
                return Ok(());
            }
        };

        self.begin_loading().await;
        let result = async {
            let response = self
                .api
                .grade_submission(submission_id, score, &feedback)
                .await?;
            info!(submission_id = submission_id.0, score, "grade saved");
            self.report_status(response.detail).await;
            self.apply_refreshes(Mutation::SaveGrade).await
        }
        .await;
        self.end_loading().await;
        if let Err(err) = &result {
            self.report_failure(err).await;
        }
        result
    }

    /// Finalize a grade. There is no unlock: the UI disables the control
    /// on locked rows, and re-invoking against a locked submission leaves
    /// `locked` true (the service answers "Already locked." and the
    /// reload carries the unchanged row).
    pub async fn lock_one(&self, submission_id: SubmissionId) -> Result<(), ApiFailure> {
        self.begin_loading().await;
        let result = async {
            let response = self.api.lock_submission(submission_id).await?;
            info!(submission_id = submission_id.0, "grade locked");
            self.report_status(response.detail).await;
            self.apply_refreshes(Mutation::LockGrade).await
        }
        .await;
        self.end_loading().await;
        if let Err(err) = &result {
            self.report_failure(err).await;
        }
        result
    }

    pub async fn set_file_url_input(&self, assignment_id: AssignmentId, value: String) {
        self.inner
            .lock()
            .await
            .file_url_inputs
            .insert(assignment_id, value);
    }

    pub async fn set_score_input(&self, submission_id: SubmissionId, value: String) {
        self.inner
            .lock()
            .await
            .score_inputs
            .insert(submission_id, value);
    }

    pub async fn set_feedback_input(&self, submission_id: SubmissionId, value: String) {
        self.inner
            .lock()
            .await
            .feedback_inputs
            .insert(submission_id, value);
    }

    async fn apply_refreshes(&self, mutation: Mutation) -> Result<(), ApiFailure> {
        for target in mutation.invalidates() {
            match target {
                RefreshTarget::Assignments => self.refresh_assignments().await?,
                RefreshTarget::GradeSummary => self.refresh_grade_summary().await?,
                RefreshTarget::LecturerSubmissions => self.refresh_lecturer_submissions().await?,
            }
        }
        Ok(())
    }

    async fn refresh_assignments(&self) -> Result<(), ApiFailure> {
        let Some(course_id) = self.selected_course_id().await else {
            return Ok(());
        };
        self.refresh_assignments_for(course_id).await
    }

    async fn refresh_assignments_for(&self, course_id: CourseId) -> Result<(), ApiFailure> {
        let assignments = self.api.list_my_assignments(course_id).await?;
        self.inner.lock().await.assignments = assignments.clone();
        self.emit(PortalEvent::AssignmentsLoaded(assignments));
        Ok(())
    }

    async fn refresh_grade_summary(&self) -> Result<(), ApiFailure> {
        let Some(course_id) = self.selected_course_id().await else {
            return Ok(());
        };
        self.refresh_grade_summary_for(course_id).await
    }

    async fn refresh_grade_summary_for(&self, course_id: CourseId) -> Result<(), ApiFailure> {
        let summary = self.api.get_my_grades(course_id).await?;
        self.inner.lock().await.grade_summary = Some(summary.clone());
        self.emit(PortalEvent::GradeSummaryLoaded(summary));
        Ok(())
    }

    /// Fetch lecturer submissions and seed the editable score/feedback
    /// fields from each row's existing grade, exactly once per fetch.
    /// Seeding overwrites any in-progress unsaved edits for other rows;
    /// this is accepted, documented behavior.
    async fn refresh_lecturer_submissions(&self) -> Result<(), ApiFailure> {
        let Some(course_id) = self.selected_course_id().await else {
            return Ok(());
        };
        let submissions = self.api.list_lecturer_submissions(course_id, None).await?;
        {
            let mut state = self.inner.lock().await;
            state.score_inputs = submissions
                .iter()
                .map(|row| {
                    let seed = row
                        .grade
                        .as_ref()
                        .map(|grade| seed_score_text(grade.score))
                        .unwrap_or_default();
                    (row.submission_id, seed)
                })
                .collect();
            state.feedback_inputs = submissions
                .iter()
                .map(|row| {
                    let seed = row
                        .grade
                        .as_ref()
                        .map(|grade| grade.feedback.clone())
                        .unwrap_or_default();
                    (row.submission_id, seed)
                })
                .collect();
            state.lecturer_submissions = submissions.clone();
        }
        self.emit(PortalEvent::LecturerSubmissionsLoaded(submissions));
        Ok(())
    }
}

/// "85.00%" for a graded row, "-" while ungraded. Never renders zero for
/// a missing grade.
pub fn percent_cell(percent: Option<f64>) -> String {
    match percent {
        Some(percent) => format!("{percent:.2}%"),
        None => "-".to_string(),
    }
}

pub fn score_cell(score: Option<f64>) -> String {
    match score {
        Some(score) => seed_score_text(score),
        None => "-".to_string(),
    }
}

pub fn average_label(average_percent: Option<f64>) -> String {
    match average_percent {
        Some(percent) => format!("{percent:.2}%"),
        None => "N/A".to_string(),
    }
}

pub fn result_label(result: Option<&str>) -> String {
    result.map(str::to_string).unwrap_or_else(|| "N/A".to_string())
}

/// Text form used to seed the score editor; integral scores render
/// without a trailing ".0" so the field shows what the lecturer typed.
pub fn seed_score_text(score: f64) -> String {
    if score.fract() == 0.0 && score.abs() < 1e15 {
        format!("{}", score as i64)
    } else {
        score.to_string()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
