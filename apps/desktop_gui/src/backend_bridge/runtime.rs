//! Backend worker thread: owns the portal client on its own tokio runtime
//! and bridges the UI command queue to client calls.

use std::{sync::Arc, thread};

use client_core::{
    load_settings, FileCredentialStore, PortalApi, PortalClient, PortalEvent,
};
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, error};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{classify_login_failure, UiError, UiErrorContext, UiEvent};
use crate::ui::app::{AppPaths, StartupConfig};

fn forward_event(event: PortalEvent) -> UiEvent {
    match event {
        PortalEvent::SessionStarted { user } => UiEvent::SessionStarted(user),
        PortalEvent::SessionCleared => UiEvent::SessionCleared,
        PortalEvent::CoursesLoaded(courses) => UiEvent::CoursesLoaded(courses),
        PortalEvent::CourseOpened(course) => UiEvent::CourseOpened(course),
        PortalEvent::GradeSummaryLoaded(summary) => UiEvent::GradeSummaryLoaded(summary),
        PortalEvent::AssignmentsLoaded(rows) => UiEvent::AssignmentsLoaded(rows),
        PortalEvent::LecturerSubmissionsLoaded(rows) => UiEvent::SubmissionsLoaded(rows),
        PortalEvent::StatusChanged(message) => UiEvent::Status(message),
        PortalEvent::Error(message) => {
            UiEvent::Error(UiError::from_message(UiErrorContext::General, message))
        }
    }
}

pub fn launch(
    startup: StartupConfig,
    paths: AppPaths,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                error!("failed to build backend runtime: {err}");
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: {err}"),
                )));
                return;
            }
        };

        runtime.block_on(async move {
            let mut settings = load_settings();
            if let Some(api_base) = startup.api_base.clone() {
                settings.api_base = api_base;
            }
            let store = Arc::new(FileCredentialStore::in_data_dir(&paths.data_root));
            let client = PortalClient::new(PortalApi::new(settings.api_base, store));

            // Every client event is forwarded to the UI thread, failures
            // included: some failures (e.g. the course fetch after a
            // successful login) belong to no in-flight command result, and
            // this is their only path to the status line. The command loop
            // below re-reports its own failures with a sharper context;
            // the later banner simply wins.
            let mut events = client.subscribe_events();
            let event_tx = ui_tx.clone();
            tokio::spawn(async move {
                while let Ok(event) = events.recv().await {
                    if event_tx.try_send(forward_event(event)).is_err() {
                        break;
                    }
                }
            });

            let report = |context: UiErrorContext, message: String| {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(context, message)));
            };

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Login { id_token } => {
                        debug!("backend: login");
                        if let Err(err) = client.login_with_identity(&id_token).await {
                            report(
                                UiErrorContext::Login,
                                classify_login_failure(&err.display_message()),
                            );
                        }
                    }
                    BackendCommand::Logout => {
                        if let Err(err) = client.logout().await {
                            report(UiErrorContext::General, err.display_message());
                        }
                    }
                    BackendCommand::LoadCourses => {
                        if let Err(err) = client.load_courses().await {
                            report(UiErrorContext::General, err.display_message());
                        }
                    }
                    BackendCommand::OpenCourse { course } => {
                        if let Err(err) = client.open_course(course).await {
                            report(UiErrorContext::General, err.display_message());
                        }
                    }
                    BackendCommand::SubmitAssignment {
                        assignment_id,
                        file_url,
                    } => {
                        client.set_file_url_input(assignment_id, file_url).await;
                        if let Err(err) = client.submit_assignment(assignment_id).await {
                            report(UiErrorContext::Submit, err.display_message());
                        }
                    }
                    BackendCommand::SetViewMode { mode } => {
                        if let Err(err) = client.set_view_mode(mode).await {
                            report(UiErrorContext::General, err.display_message());
                        }
                    }
                    BackendCommand::GradeSubmission {
                        submission_id,
                        score,
                        feedback,
                    } => {
                        client.set_score_input(submission_id, score).await;
                        client.set_feedback_input(submission_id, feedback).await;
                        if let Err(err) = client.grade_one(submission_id).await {
                            report(UiErrorContext::Grading, err.display_message());
                        }
                    }
                    BackendCommand::LockSubmission { submission_id } => {
                        if let Err(err) = client.lock_one(submission_id).await {
                            report(UiErrorContext::Grading, err.display_message());
                        }
                    }
                }
            }
        });
    });
}
