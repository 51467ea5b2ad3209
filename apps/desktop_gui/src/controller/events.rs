//! UI/backend events and error modeling for the desktop GUI controller.

use shared::{
    domain::UserProfile,
    protocol::{AssignmentRow, CourseSummary, GradeSummary, LecturerSubmissionRow},
};

pub enum UiEvent {
    SessionStarted(UserProfile),
    SessionCleared,
    CoursesLoaded(Vec<CourseSummary>),
    CourseOpened(CourseSummary),
    GradeSummaryLoaded(GradeSummary),
    AssignmentsLoaded(Vec<AssignmentRow>),
    SubmissionsLoaded(Vec<LecturerSubmissionRow>),
    Status(String),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Login,
    Submit,
    Grading,
    General,
}

pub fn context_label(context: UiErrorContext) -> &'static str {
    match context {
        UiErrorContext::BackendStartup => "startup",
        UiErrorContext::Login => "sign-in",
        UiErrorContext::Submit => "submission",
        UiErrorContext::Grading => "grading",
        UiErrorContext::General => "portal",
    }
}

pub fn classify_login_failure(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    if lower.contains("backend worker startup failure") || lower.contains("failed to build backend runtime") {
        "Backend worker startup failure; verify local app environment and retry.".to_string()
    } else if lower.contains("failed to connect")
        || lower.contains("connection refused")
        || lower.contains("dns")
        || lower.contains("timed out")
    {
        "Grading service unreachable; check URL/network and retry sign-in.".to_string()
    } else {
        format!("Login/API error: {message}")
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("401")
            || message_lower.contains("403")
            || message_lower.contains("unauthorized")
            || message_lower.contains("forbidden")
            || message_lower.contains("staff only")
            || message_lower.contains("session expired")
            || message_lower.contains("invalid token")
            || message_lower.contains("invalid credential")
        {
            UiErrorCategory::Auth
        } else if message_lower.contains("required")
            || message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("must be")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("transport")
            || message_lower.contains("unavailable")
            || message_lower.contains("request failed")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_only_rejection_classifies_as_auth() {
        let err = UiError::from_message(UiErrorContext::Grading, "Staff only.");
        assert_eq!(err.category(), UiErrorCategory::Auth);
        assert!(err.requires_reauth());
    }

    #[test]
    fn unreachable_service_classifies_as_transport() {
        let err = UiError::from_message(
            UiErrorContext::General,
            "request failed: connection refused",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
    }

    #[test]
    fn login_failure_message_mentions_network_guidance() {
        let text = classify_login_failure("request failed: connection refused");
        assert!(text.contains("unreachable"));
    }
}
