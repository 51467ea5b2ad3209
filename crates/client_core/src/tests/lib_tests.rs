use super::*;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::protocol::TokenPair;
use tokio::net::TcpListener;
use tokio::sync::Mutex as AsyncMutex;

struct MockGrade {
    score: f64,
    feedback: String,
    locked: bool,
}

struct MockAssignment {
    assignment_id: i64,
    module_title: String,
    assignment_title: String,
    max_score: i64,
    submission_id: Option<i64>,
}

struct MockSubmission {
    submission_id: i64,
    assignment_id: i64,
    module_title: String,
    assignment_title: String,
    max_score: i64,
    file_url: String,
    status: String,
    grade: Option<MockGrade>,
}

/// In-process stand-in for the grading service, speaking the same raw
/// JSON the real service emits. Records every request so tests can
/// assert call ordering and the absence of calls.
struct MockLms {
    requests: Vec<String>,
    last_authorization: Option<String>,
    assignments: Vec<MockAssignment>,
    submissions: Vec<MockSubmission>,
    pass_mark: f64,
    next_submission_id: i64,
    fail_grades_with: Option<(u16, String)>,
}

impl MockLms {
    fn with_one_ungraded_assignment() -> Self {
        Self {
            requests: Vec::new(),
            last_authorization: None,
            assignments: vec![MockAssignment {
                assignment_id: 101,
                module_title: "Module 1".to_string(),
                assignment_title: "Intro Lab".to_string(),
                max_score: 100,
                submission_id: None,
            }],
            submissions: Vec::new(),
            pass_mark: 70.0,
            next_submission_id: 501,
            fail_grades_with: None,
        }
    }
}

type MockState = Arc<AsyncMutex<MockLms>>;

fn assignment_json(a: &MockAssignment, submissions: &[MockSubmission]) -> Value {
    let submission = a.submission_id.and_then(|id| {
        submissions.iter().find(|s| s.submission_id == id).map(|s| {
            json!({
                "id": s.submission_id,
                "file_url": s.file_url,
                "status": s.status,
                "submitted_at": null,
            })
        })
    });
    json!({
        "assignment_id": a.assignment_id,
        "module_title": a.module_title,
        "assignment_title": a.assignment_title,
        "max_score": a.max_score,
        "due_date": null,
        "has_submission": submission.is_some(),
        "submission": submission,
    })
}

fn grade_summary_json(lms: &MockLms) -> Value {
    let mut rows = Vec::new();
    let mut percents = Vec::new();
    for s in &lms.submissions {
        let (score, percent, feedback, locked) = match &s.grade {
            Some(g) => {
                let percent = g.score / s.max_score as f64 * 100.0;
                percents.push(percent);
                (
                    json!(g.score),
                    json!(percent),
                    g.feedback.clone(),
                    g.locked,
                )
            }
            None => (Value::Null, Value::Null, String::new(), false),
        };
        rows.push(json!({
            "assignment_id": s.assignment_id,
            "module_title": s.module_title,
            "assignment_title": s.assignment_title,
            "max_score": s.max_score,
            "score": score,
            "percent": percent,
            "feedback": feedback,
            "locked": locked,
        }));
    }
    let average = if percents.is_empty() {
        None
    } else {
        Some(percents.iter().sum::<f64>() / percents.len() as f64)
    };
    let result = average.map(|a| if a >= lms.pass_mark { "PASS" } else { "F" });
    json!({
        "course_id": 7,
        "average_percent": average,
        "result": result,
        "pass_mark": lms.pass_mark,
        "grades": rows,
    })
}

fn submission_json(s: &MockSubmission) -> Value {
    json!({
        "submission_id": s.submission_id,
        "student_email": "student@example.com",
        "module_title": s.module_title,
        "assignment_id": s.assignment_id,
        "assignment_title": s.assignment_title,
        "max_score": s.max_score,
        "file_url": s.file_url,
        "status": s.status,
        "submitted_at": null,
        "graded": s.grade.is_some(),
        "grade": s.grade.as_ref().map(|g| json!({
            "score": g.score,
            "feedback": g.feedback,
            "locked": g.locked,
            "locked_at": null,
            "locked_by": null,
        })),
    })
}

async fn record(lms: &mut MockLms, headers: &HeaderMap, line: &str) {
    lms.requests.push(line.to_string());
    lms.last_authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
}

async fn handle_auth(State(state): State<MockState>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let mut lms = state.lock().await;
    record(&mut lms, &headers, "POST /auth/exchange").await;
    assert!(body.get("id_token").is_some(), "missing id_token");
    Json(json!({
        "tokens": { "access": "access-123", "refresh": "refresh-123" },
        "user": {
            "id": 1,
            "email": "student@example.com",
            "cohort": { "id": 1, "name": "Cohort Alpha" },
            "is_lecturer": true,
            "is_admin": false,
        },
    }))
}

async fn handle_courses(State(state): State<MockState>, headers: HeaderMap) -> Json<Value> {
    let mut lms = state.lock().await;
    record(&mut lms, &headers, "GET /me/courses").await;
    Json(json!({
        "courses": [{
            "course_id": 7,
            "course_title": "Rust Systems",
            "course_description": "Systems programming track",
            "cohort": { "id": 1, "name": "Cohort Alpha" },
        }],
    }))
}

async fn handle_assignments(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(_query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let mut lms = state.lock().await;
    record(&mut lms, &headers, "GET /me/assignments").await;
    let rows: Vec<Value> = lms
        .assignments
        .iter()
        .map(|a| assignment_json(a, &lms.submissions))
        .collect();
    Json(json!({ "assignments": rows }))
}

async fn handle_grades(
    State(state): State<MockState>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let mut lms = state.lock().await;
    record(&mut lms, &headers, "GET /me/grades").await;
    if let Some((status, detail)) = &lms.fail_grades_with {
        return (
            StatusCode::from_u16(*status).expect("status"),
            Json(json!({ "detail": detail })),
        );
    }
    (StatusCode::OK, Json(grade_summary_json(&lms)))
}

async fn handle_submit(
    State(state): State<MockState>,
    Path(assignment_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut lms = state.lock().await;
    record(&mut lms, &headers, &format!("POST /assignments/{assignment_id}/submit")).await;

    let file_url = body
        .get("file_url")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if file_url.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "file_url is required" })),
        );
    }

    let Some(index) = lms
        .assignments
        .iter()
        .position(|a| a.assignment_id == assignment_id)
    else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Assignment not found." })),
        );
    };
    if lms.assignments[index].submission_id.is_some() {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "detail": "You already submitted this assignment." })),
        );
    }

    let submission_id = lms.next_submission_id;
    lms.next_submission_id += 1;
    let assignment = &lms.assignments[index];
    let submission = MockSubmission {
        submission_id,
        assignment_id,
        module_title: assignment.module_title.clone(),
        assignment_title: assignment.assignment_title.clone(),
        max_score: assignment.max_score,
        file_url: file_url.clone(),
        status: "On Time".to_string(),
        grade: None,
    };
    lms.assignments[index].submission_id = Some(submission_id);
    lms.submissions.push(submission);

    (
        StatusCode::CREATED,
        Json(json!({
            "detail": "Submitted successfully",
            "submission": {
                "id": submission_id,
                "file_url": file_url,
                "status": "On Time",
                "submitted_at": null,
            },
        })),
    )
}

async fn handle_lecturer_submissions(
    State(state): State<MockState>,
    headers: HeaderMap,
) -> Json<Value> {
    let mut lms = state.lock().await;
    record(&mut lms, &headers, "GET /lecturer/submissions").await;
    let rows: Vec<Value> = lms.submissions.iter().map(submission_json).collect();
    Json(json!({ "submissions": rows }))
}

async fn handle_grade(
    State(state): State<MockState>,
    Path(submission_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut lms = state.lock().await;
    record(&mut lms, &headers, &format!("POST /lecturer/submissions/{submission_id}/grade")).await;

    let Some(score) = body.get("score").and_then(Value::as_f64) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "score is required" })),
        );
    };
    let feedback = body
        .get("feedback")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let Some(submission) = lms
        .submissions
        .iter_mut()
        .find(|s| s.submission_id == submission_id)
    else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Submission not found." })),
        );
    };
    if submission.grade.as_ref().map(|g| g.locked).unwrap_or(false) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "detail": "Grade is locked (FINAL). Cannot edit." })),
        );
    }

    submission.grade = Some(MockGrade {
        score,
        feedback: feedback.clone(),
        locked: false,
    });
    (
        StatusCode::OK,
        Json(json!({
            "detail": "Graded successfully",
            "grade": { "score": score, "feedback": feedback, "locked": false },
        })),
    )
}

async fn handle_lock(
    State(state): State<MockState>,
    Path(submission_id): Path<i64>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let mut lms = state.lock().await;
    record(&mut lms, &headers, &format!("POST /lecturer/submissions/{submission_id}/lock")).await;

    let Some(submission) = lms
        .submissions
        .iter_mut()
        .find(|s| s.submission_id == submission_id)
    else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Grade not found. Grade first, then lock." })),
        );
    };
    let Some(grade) = submission.grade.as_mut() else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Grade not found. Grade first, then lock." })),
        );
    };
    if grade.locked {
        return (StatusCode::OK, Json(json!({ "detail": "Already locked." })));
    }
    grade.locked = true;
    (
        StatusCode::OK,
        Json(json!({ "detail": "Grade locked (FINAL)" })),
    )
}

async fn spawn_mock_portal(lms: MockLms) -> (String, MockState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let state: MockState = Arc::new(AsyncMutex::new(lms));
    let app = Router::new()
        .route("/auth/exchange", post(handle_auth))
        .route("/me/courses", get(handle_courses))
        .route("/me/assignments", get(handle_assignments))
        .route("/me/grades", get(handle_grades))
        .route("/assignments/:assignment_id/submit", post(handle_submit))
        .route("/lecturer/submissions", get(handle_lecturer_submissions))
        .route("/lecturer/submissions/:submission_id/grade", post(handle_grade))
        .route("/lecturer/submissions/:submission_id/lock", post(handle_lock))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

async fn client_with_tokens(base_url: &str) -> Arc<PortalClient> {
    let store = MemoryCredentialStore::with_tokens(TokenPair {
        access: "access-123".to_string(),
        refresh: "refresh-123".to_string(),
    });
    PortalClient::new(PortalApi::new(base_url, Arc::new(store)))
}

async fn request_log(state: &MockState) -> Vec<String> {
    state.lock().await.requests.clone()
}

fn sample_course() -> CourseSummary {
    serde_json::from_value(json!({
        "course_id": 7,
        "course_title": "Rust Systems",
        "course_description": "Systems programming track",
        "cohort": { "id": 1, "name": "Cohort Alpha" },
    }))
    .expect("course fixture")
}

#[tokio::test]
async fn login_stores_tokens_and_loads_courses_once() {
    let (base_url, state) = spawn_mock_portal(MockLms::with_one_ungraded_assignment()).await;
    let client = PortalClient::new(PortalApi::new(
        &base_url,
        Arc::new(MemoryCredentialStore::new()),
    ));

    let user = client
        .login_with_identity("opaque-identity-token")
        .await
        .expect("login");
    assert_eq!(user.email, "student@example.com");
    assert!(user.is_lecturer);
    assert!(client.api().has_stored_tokens().await);

    let snapshot = client.snapshot().await;
    assert_eq!(snapshot.courses.len(), 1);
    assert_eq!(snapshot.courses[0].course_title, "Rust Systems");

    // The course fetch after login must carry the freshly stored token.
    let lms = state.lock().await;
    assert_eq!(
        lms.last_authorization.as_deref(),
        Some("Bearer access-123")
    );
    assert_eq!(
        lms.requests,
        vec!["POST /auth/exchange", "GET /me/courses"]
    );
}

#[tokio::test]
async fn logout_clears_credentials_and_all_view_state() {
    let (base_url, _state) = spawn_mock_portal(MockLms::with_one_ungraded_assignment()).await;
    let client = PortalClient::new(PortalApi::new(
        &base_url,
        Arc::new(MemoryCredentialStore::new()),
    ));

    client
        .login_with_identity("opaque-identity-token")
        .await
        .expect("login");
    client.open_course(sample_course()).await.expect("open");

    client.logout().await.expect("logout");

    assert!(!client.api().has_stored_tokens().await);
    let snapshot = client.snapshot().await;
    assert!(snapshot.user.is_none());
    assert!(snapshot.courses.is_empty());
    assert!(snapshot.selected_course.is_none());
    assert!(snapshot.grade_summary.is_none());
    assert!(snapshot.assignments.is_empty());
    assert!(snapshot.lecturer_submissions.is_empty());
    assert_eq!(snapshot.view_mode, ViewMode::Student);
    assert_eq!(snapshot.status_line.as_deref(), Some("Logged out"));
}

#[tokio::test]
async fn open_course_fetches_summary_then_assignments() {
    let (base_url, state) = spawn_mock_portal(MockLms::with_one_ungraded_assignment()).await;
    let client = client_with_tokens(&base_url).await;

    client.open_course(sample_course()).await.expect("open");

    assert_eq!(
        request_log(&state).await,
        vec!["GET /me/grades", "GET /me/assignments"]
    );
    let snapshot = client.snapshot().await;
    assert!(!snapshot.loading);
    assert!(snapshot.grade_summary.is_some());
    assert_eq!(snapshot.assignments.len(), 1);
}

#[tokio::test]
async fn open_course_resets_lecturer_panel_and_mode() {
    let (base_url, _state) = spawn_mock_portal(MockLms::with_one_ungraded_assignment()).await;
    let client = client_with_tokens(&base_url).await;

    client.open_course(sample_course()).await.expect("open");
    client
        .set_file_url_input(AssignmentId(101), "https://x/y".to_string())
        .await;
    client.submit_assignment(AssignmentId(101)).await.expect("submit");
    client
        .set_view_mode(ViewMode::Lecturer)
        .await
        .expect("lecturer view");
    assert!(!client.snapshot().await.lecturer_submissions.is_empty());

    client.open_course(sample_course()).await.expect("reopen");

    let snapshot = client.snapshot().await;
    assert_eq!(snapshot.view_mode, ViewMode::Student);
    assert!(snapshot.lecturer_submissions.is_empty());
    assert!(snapshot.score_inputs.is_empty());
    assert!(snapshot.feedback_inputs.is_empty());
}

#[tokio::test]
async fn open_course_failure_aborts_remaining_fetches() {
    let mut lms = MockLms::with_one_ungraded_assignment();
    lms.fail_grades_with = Some((403, "Not enrolled in this course.".to_string()));
    let (base_url, state) = spawn_mock_portal(lms).await;
    let client = client_with_tokens(&base_url).await;

    let err = client
        .open_course(sample_course())
        .await
        .expect_err("must fail");
    assert_eq!(err.display_message(), "Not enrolled in this course.");

    // Grade fetch failed, so the assignment fetch never happened.
    assert_eq!(request_log(&state).await, vec!["GET /me/grades"]);
    let snapshot = client.snapshot().await;
    assert!(!snapshot.loading);
    assert_eq!(
        snapshot.status_line.as_deref(),
        Some("Not enrolled in this course.")
    );
}

#[tokio::test]
async fn blank_file_url_never_touches_the_network() {
    let (base_url, state) = spawn_mock_portal(MockLms::with_one_ungraded_assignment()).await;
    let client = client_with_tokens(&base_url).await;
    client.open_course(sample_course()).await.expect("open");
    let before = request_log(&state).await;

    client
        .set_file_url_input(AssignmentId(101), "   ".to_string())
        .await;
    client.submit_assignment(AssignmentId(101)).await.expect("local reject");

    assert_eq!(request_log(&state).await, before);
    let snapshot = client.snapshot().await;
    assert_eq!(
        snapshot.status_line.as_deref(),
        Some("Please paste your File URL first.")
    );
    assert!(!snapshot.assignments[0].has_submission);
}

#[tokio::test]
async fn submit_refreshes_assignments_then_summary() {
    let (base_url, state) = spawn_mock_portal(MockLms::with_one_ungraded_assignment()).await;
    let client = client_with_tokens(&base_url).await;
    client.open_course(sample_course()).await.expect("open");

    client
        .set_file_url_input(AssignmentId(101), "https://x/y".to_string())
        .await;
    client.submit_assignment(AssignmentId(101)).await.expect("submit");

    let log = request_log(&state).await;
    assert_eq!(
        log[log.len() - 3..].to_vec(),
        vec![
            "POST /assignments/101/submit".to_string(),
            "GET /me/assignments".to_string(),
            "GET /me/grades".to_string(),
        ]
    );
    let snapshot = client.snapshot().await;
    assert!(snapshot.assignments[0].has_submission);
    assert_eq!(
        snapshot.status_line.as_deref(),
        Some("Submitted successfully")
    );
}

#[tokio::test]
async fn blank_score_is_rejected_locally() {
    let (base_url, state) = spawn_mock_portal(MockLms::with_one_ungraded_assignment()).await;
    let client = client_with_tokens(&base_url).await;
    client.open_course(sample_course()).await.expect("open");
    client
        .set_file_url_input(AssignmentId(101), "https://x/y".to_string())
        .await;
    client.submit_assignment(AssignmentId(101)).await.expect("submit");
    client
        .set_view_mode(ViewMode::Lecturer)
        .await
        .expect("lecturer view");
    let before = request_log(&state).await;

    client
        .set_score_input(SubmissionId(501), "  ".to_string())
        .await;
    client.grade_one(SubmissionId(501)).await.expect("local reject");

    assert_eq!(request_log(&state).await, before);
    assert_eq!(
        client.snapshot().await.status_line.as_deref(),
        Some("Enter a score first.")
    );
}

#[tokio::test]
async fn grade_roundtrip_seeds_saved_values() {
    let (base_url, _state) = spawn_mock_portal(MockLms::with_one_ungraded_assignment()).await;
    let client = client_with_tokens(&base_url).await;
    client.open_course(sample_course()).await.expect("open");
    client
        .set_file_url_input(AssignmentId(101), "https://x/y".to_string())
        .await;
    client.submit_assignment(AssignmentId(101)).await.expect("submit");
    client
        .set_view_mode(ViewMode::Lecturer)
        .await
        .expect("lecturer view");

    client
        .set_score_input(SubmissionId(501), "85".to_string())
        .await;
    client
        .set_feedback_input(SubmissionId(501), "Good".to_string())
        .await;
    client.grade_one(SubmissionId(501)).await.expect("grade");

    let snapshot = client.snapshot().await;
    // Reload re-seeded every field, including the row just saved.
    assert_eq!(
        snapshot.score_inputs.get(&SubmissionId(501)).map(String::as_str),
        Some("85")
    );
    assert_eq!(
        snapshot
            .feedback_inputs
            .get(&SubmissionId(501))
            .map(String::as_str),
        Some("Good")
    );
    let row = &snapshot.lecturer_submissions[0];
    let grade = row.grade.as_ref().expect("grade present");
    assert_eq!(grade.score, 85.0);
    assert_eq!(grade.feedback, "Good");

    // The student summary refreshed alongside the lecturer list.
    let summary = snapshot.grade_summary.expect("summary");
    assert_eq!(summary.grades[0].score, Some(85.0));
    assert_eq!(percent_cell(summary.grades[0].percent), "85.00%");
    assert_eq!(average_label(summary.average_percent), "85.00%");
    assert_eq!(summary.result.as_deref(), Some("PASS"));
}

#[tokio::test]
async fn lock_is_terminal_and_idempotent() {
    let (base_url, _state) = spawn_mock_portal(MockLms::with_one_ungraded_assignment()).await;
    let client = client_with_tokens(&base_url).await;
    client.open_course(sample_course()).await.expect("open");
    client
        .set_file_url_input(AssignmentId(101), "https://x/y".to_string())
        .await;
    client.submit_assignment(AssignmentId(101)).await.expect("submit");
    client
        .set_view_mode(ViewMode::Lecturer)
        .await
        .expect("lecturer view");
    client
        .set_score_input(SubmissionId(501), "85".to_string())
        .await;
    client.grade_one(SubmissionId(501)).await.expect("grade");

    client.lock_one(SubmissionId(501)).await.expect("lock");
    let snapshot = client.snapshot().await;
    assert!(snapshot.lecturer_submissions[0].is_locked());

    // Further grade edits are rejected by the service with its own text.
    client
        .set_score_input(SubmissionId(501), "90".to_string())
        .await;
    let err = client
        .grade_one(SubmissionId(501))
        .await
        .expect_err("locked grade rejects edits");
    assert_eq!(
        err.display_message(),
        "Grade is locked (FINAL). Cannot edit."
    );

    // Locking again cannot flip the flag back.
    client.lock_one(SubmissionId(501)).await.expect("relock");
    let snapshot = client.snapshot().await;
    assert!(snapshot.lecturer_submissions[0].is_locked());
    let grade = snapshot.lecturer_submissions[0]
        .grade
        .as_ref()
        .expect("grade");
    assert_eq!(grade.score, 85.0);
}

#[tokio::test]
async fn empty_summary_renders_neutral_placeholders() {
    let (base_url, _state) = spawn_mock_portal(MockLms::with_one_ungraded_assignment()).await;
    let client = client_with_tokens(&base_url).await;
    client.open_course(sample_course()).await.expect("open");

    let summary = client.snapshot().await.grade_summary.expect("summary");
    assert!(summary.average_percent.is_none());
    assert!(summary.result.is_none());
    assert_eq!(average_label(summary.average_percent), "N/A");
    assert_eq!(result_label(summary.result.as_deref()), "N/A");
    assert_eq!(percent_cell(None), "-");
    assert_eq!(score_cell(None), "-");
}

#[tokio::test]
async fn transport_failure_surfaces_generic_message() {
    // Nothing listens on this port; reqwest fails at the transport layer.
    let client = client_with_tokens("http://127.0.0.1:9/api").await;
    let err = client.load_courses().await.expect_err("unreachable");
    assert!(matches!(err, ApiFailure::Transport(_)));
    assert!(err.display_message().starts_with("request failed:"));
}

#[tokio::test]
async fn student_scenario_end_to_end() {
    let (base_url, _state) = spawn_mock_portal(MockLms::with_one_ungraded_assignment()).await;
    let client = PortalClient::new(PortalApi::new(
        &base_url,
        Arc::new(MemoryCredentialStore::new()),
    ));

    client
        .login_with_identity("opaque-identity-token")
        .await
        .expect("login");
    let course = client.snapshot().await.courses[0].clone();
    client.open_course(course).await.expect("open");

    // Ungraded course: neutral placeholders, no submission yet.
    let snapshot = client.snapshot().await;
    assert_eq!(average_label(snapshot.grade_summary.as_ref().expect("summary").average_percent), "N/A");
    assert!(!snapshot.assignments[0].has_submission);

    // Student submits a link; the list reload reflects it.
    client
        .set_file_url_input(AssignmentId(101), "https://x/y".to_string())
        .await;
    client.submit_assignment(AssignmentId(101)).await.expect("submit");
    let snapshot = client.snapshot().await;
    let submission = snapshot.assignments[0]
        .submission
        .as_ref()
        .expect("submission echo");
    assert_eq!(submission.file_url, "https://x/y");
    assert_eq!(submission.status, "On Time");

    // Lecturer grades and locks; the student summary follows.
    client
        .set_view_mode(ViewMode::Lecturer)
        .await
        .expect("lecturer view");
    client
        .set_score_input(SubmissionId(501), "85".to_string())
        .await;
    client
        .set_feedback_input(SubmissionId(501), "Good".to_string())
        .await;
    client.grade_one(SubmissionId(501)).await.expect("grade");
    client.lock_one(SubmissionId(501)).await.expect("lock");

    let snapshot = client.snapshot().await;
    let summary = snapshot.grade_summary.expect("summary");
    assert_eq!(summary.grades[0].score, Some(85.0));
    assert_eq!(percent_cell(summary.grades[0].percent), "85.00%");
    assert_eq!(summary.grades[0].feedback, "Good");
    assert!(summary.grades[0].locked);
}

#[test]
fn seed_score_text_drops_trailing_zero_fraction() {
    assert_eq!(seed_score_text(85.0), "85");
    assert_eq!(seed_score_text(85.5), "85.5");
    assert_eq!(seed_score_text(0.0), "0");
}

#[test]
fn refresh_plans_declare_ordered_targets() {
    assert_eq!(
        Mutation::SubmitAssignment.invalidates(),
        &[RefreshTarget::Assignments, RefreshTarget::GradeSummary]
    );
    assert_eq!(
        Mutation::SaveGrade.invalidates(),
        &[
            RefreshTarget::LecturerSubmissions,
            RefreshTarget::GradeSummary
        ]
    );
    assert_eq!(
        Mutation::LockGrade.invalidates(),
        &[
            RefreshTarget::LecturerSubmissions,
            RefreshTarget::GradeSummary
        ]
    );
}
