use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AssignmentId, CohortRef, CourseId, SubmissionId, UserProfile};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthExchangeRequest {
    pub id_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthExchangeResponse {
    pub user: UserProfile,
    pub tokens: TokenPair,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSummary {
    pub course_id: CourseId,
    pub course_title: String,
    #[serde(default)]
    pub course_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cohort: Option<CohortRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseListResponse {
    #[serde(default)]
    pub courses: Vec<CourseSummary>,
}

/// Submission echo attached to an assignment row. `status` is a display
/// string issued by the service ("On Time" / "Late").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionInfo {
    pub id: SubmissionId,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRow {
    pub assignment_id: AssignmentId,
    pub module_title: String,
    pub assignment_title: String,
    pub max_score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub has_submission: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission: Option<SubmissionInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentListResponse {
    #[serde(default)]
    pub assignments: Vec<AssignmentRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeInfo {
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_by: Option<String>,
}

/// Per-assignment grade row in the student summary. `score`/`percent`
/// stay `None` until a lecturer grades the submission; callers render a
/// neutral placeholder for `None`, never zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRow {
    pub assignment_id: AssignmentId,
    pub module_title: String,
    pub assignment_title: String,
    pub max_score: i64,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeSummary {
    pub course_id: CourseId,
    #[serde(default)]
    pub average_percent: Option<f64>,
    #[serde(default)]
    pub result: Option<String>,
    pub pass_mark: f64,
    #[serde(default)]
    pub grades: Vec<GradeRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAssignmentRequest {
    pub file_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAssignmentResponse {
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission: Option<SubmissionInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LecturerSubmissionRow {
    pub submission_id: SubmissionId,
    pub student_email: String,
    pub module_title: String,
    pub assignment_id: AssignmentId,
    pub assignment_title: String,
    pub max_score: i64,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub graded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<GradeInfo>,
}

impl LecturerSubmissionRow {
    pub fn is_locked(&self) -> bool {
        self.grade.as_ref().map(|g| g.locked).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LecturerSubmissionListResponse {
    #[serde(default)]
    pub submissions: Vec<LecturerSubmissionRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeSubmissionRequest {
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeSubmissionResponse {
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<GradeInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailResponse {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_summary_with_no_gradable_work_keeps_null_average() {
        let raw = r#"{
            "course_id": 3,
            "average_percent": null,
            "result": null,
            "pass_mark": 70.0,
            "grades": []
        }"#;
        let summary: GradeSummary = serde_json::from_str(raw).expect("decode");
        assert!(summary.average_percent.is_none());
        assert!(summary.result.is_none());
        assert_eq!(summary.pass_mark, 70.0);
        assert!(summary.grades.is_empty());
    }

    #[test]
    fn assignment_row_without_submission_decodes() {
        let raw = r#"{
            "assignment_id": 9,
            "module_title": "Module 1",
            "assignment_title": "Intro Lab",
            "max_score": 100,
            "due_date": null,
            "has_submission": false,
            "submission": null
        }"#;
        let row: AssignmentRow = serde_json::from_str(raw).expect("decode");
        assert!(!row.has_submission);
        assert!(row.submission.is_none());
    }

    #[test]
    fn lecturer_row_lock_flag_defaults_to_false_without_grade() {
        let raw = r#"{
            "submission_id": 5,
            "student_email": "student@example.com",
            "module_title": "Module 1",
            "assignment_id": 9,
            "assignment_title": "Intro Lab",
            "max_score": 100,
            "file_url": "https://drive.example/x",
            "status": "On Time",
            "graded": false,
            "grade": null
        }"#;
        let row: LecturerSubmissionRow = serde_json::from_str(raw).expect("decode");
        assert!(!row.is_locked());
        assert!(row.grade.is_none());
    }
}
