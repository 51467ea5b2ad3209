//! Backend commands queued from UI to backend worker.

use shared::{
    domain::{AssignmentId, SubmissionId, ViewMode},
    protocol::CourseSummary,
};

pub enum BackendCommand {
    Login {
        id_token: String,
    },
    Logout,
    LoadCourses,
    OpenCourse {
        course: CourseSummary,
    },
    SubmitAssignment {
        assignment_id: AssignmentId,
        file_url: String,
    },
    SetViewMode {
        mode: ViewMode,
    },
    GradeSubmission {
        submission_id: SubmissionId,
        score: String,
        feedback: String,
    },
    LockSubmission {
        submission_id: SubmissionId,
    },
}
