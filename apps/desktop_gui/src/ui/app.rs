//! egui application shell for the campus portal desktop client.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{
    domain::{AssignmentId, SubmissionId, UserProfile, ViewMode},
    protocol::{AssignmentRow, CourseSummary, GradeSummary, LecturerSubmissionRow},
};

use client_core::{average_label, percent_cell, result_label, score_cell};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{context_label, UiErrorCategory, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

#[derive(Parser, Debug, Clone)]
#[command(about = "Desktop client for the campus portal")]
pub struct StartupConfig {
    /// Override the grading service base URL from settings.
    #[arg(long)]
    pub api_base: Option<String>,
    /// Directory holding the persisted session tokens.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_root: PathBuf,
}

impl AppPaths {
    pub fn from_startup(startup: &StartupConfig) -> anyhow::Result<Self> {
        let root = if let Some(dir) = &startup.data_dir {
            dir.clone()
        } else {
            let base = dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("unable to resolve local app data dir"))?;
            base.join("campus_portal")
        };
        Ok(Self { data_root: root })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBannerSeverity {
    Info,
    Error,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: StatusBannerSeverity,
    message: String,
}

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Auth => "Authentication",
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

fn text_or_dash(text: &str) -> &str {
    if text.trim().is_empty() {
        "-"
    } else {
        text
    }
}

fn final_badge(locked: bool) -> Option<&'static str> {
    locked.then_some("FINAL")
}

fn submitted_at_cell(submitted_at: Option<chrono::DateTime<chrono::Utc>>) -> String {
    submitted_at
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub struct PortalGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    // Sign-in screen.
    id_token_input: String,

    // Session and course data, mirrored from backend events.
    user: Option<UserProfile>,
    courses: Vec<CourseSummary>,
    selected_course: Option<CourseSummary>,
    grade_summary: Option<GradeSummary>,
    assignments: Vec<AssignmentRow>,
    view_mode: ViewMode,
    submissions: Vec<LecturerSubmissionRow>,

    // Draft edit buffers. Re-seeded from backend rows on every reload,
    // which intentionally discards unsaved edits for other rows.
    file_url_drafts: HashMap<AssignmentId, String>,
    score_drafts: HashMap<SubmissionId, String>,
    feedback_drafts: HashMap<SubmissionId, String>,
    pending_lock: Option<SubmissionId>,

    busy: bool,
    banner: Option<StatusBanner>,
}

impl PortalGuiApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            id_token_input: String::new(),
            user: None,
            courses: Vec::new(),
            selected_course: None,
            grade_summary: None,
            assignments: Vec::new(),
            view_mode: ViewMode::Student,
            submissions: Vec::new(),
            file_url_drafts: HashMap::new(),
            score_drafts: HashMap::new(),
            feedback_drafts: HashMap::new(),
            pending_lock: None,
            busy: false,
            banner: None,
        }
    }

    fn drain_backend_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::SessionStarted(user) => {
                self.user = Some(user);
                self.id_token_input.clear();
                self.busy = false;
            }
            UiEvent::SessionCleared => {
                self.user = None;
                self.courses.clear();
                self.selected_course = None;
                self.grade_summary = None;
                self.assignments.clear();
                self.view_mode = ViewMode::Student;
                self.submissions.clear();
                self.file_url_drafts.clear();
                self.score_drafts.clear();
                self.feedback_drafts.clear();
                self.pending_lock = None;
                self.busy = false;
            }
            UiEvent::CoursesLoaded(courses) => {
                self.courses = courses;
                self.busy = false;
            }
            UiEvent::CourseOpened(course) => {
                self.selected_course = Some(course);
                self.grade_summary = None;
                self.assignments.clear();
                self.view_mode = ViewMode::Student;
                self.submissions.clear();
                self.file_url_drafts.clear();
                self.score_drafts.clear();
                self.feedback_drafts.clear();
                self.pending_lock = None;
            }
            UiEvent::GradeSummaryLoaded(summary) => {
                self.grade_summary = Some(summary);
                self.busy = false;
            }
            UiEvent::AssignmentsLoaded(rows) => {
                self.file_url_drafts
                    .retain(|id, _| rows.iter().any(|row| row.assignment_id == *id));
                self.assignments = rows;
                self.busy = false;
            }
            UiEvent::SubmissionsLoaded(rows) => {
                self.score_drafts = rows
                    .iter()
                    .map(|row| {
                        let seed = row
                            .grade
                            .as_ref()
                            .map(|grade| client_core::seed_score_text(grade.score))
                            .unwrap_or_default();
                        (row.submission_id, seed)
                    })
                    .collect();
                self.feedback_drafts = rows
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
                self.submissions = rows;
                self.pending_lock = None;
                self.busy = false;
            }
            UiEvent::Status(message) => {
                self.banner = Some(StatusBanner {
                    severity: StatusBannerSeverity::Info,
                    message,
                });
                self.busy = false;
            }
            UiEvent::Error(err) => {
                let mut message = format!(
                    "{} error during {}: {}",
                    err_label(err.category()),
                    context_label(err.context()),
                    err.message()
                );
                if err.requires_reauth() {
                    message.push_str(" Sign in again if your session expired.");
                }
                self.banner = Some(StatusBanner {
                    severity: StatusBannerSeverity::Error,
                    message,
                });
                self.busy = false;
            }
        }
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        // Only commands that answer with a UiEvent (data, status, or
        // error) may enter the busy state; a pure local switch back to
        // the student view produces no event and would wedge it.
        let long_running = !matches!(
            cmd,
            BackendCommand::Logout
                | BackendCommand::SetViewMode {
                    mode: ViewMode::Student,
                }
        );
        let mut status = String::new();
        dispatch_backend_command(&self.cmd_tx, cmd, &mut status);
        if status.is_empty() {
            self.busy = long_running;
        } else {
            self.banner = Some(StatusBanner {
                severity: StatusBannerSeverity::Error,
                message: status,
            });
        }
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.busy {
                    ui.spinner();
                }
                match &self.banner {
                    Some(banner) => {
                        let color = match banner.severity {
                            StatusBannerSeverity::Info => ui.visuals().text_color(),
                            StatusBannerSeverity::Error => ui.visuals().error_fg_color,
                        };
                        ui.colored_label(color, &banner.message);
                    }
                    None => {
                        ui.weak("Ready");
                    }
                }
            });
        });
    }

    fn show_login(&mut self, ctx: &egui::Context) {
        let mut queued: Vec<BackendCommand> = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(80.0);
                ui.heading("Campus Portal");
                ui.label("Sign in with your campus identity provider credential.");
                ui.add_space(16.0);
                ui.add(
                    egui::TextEdit::singleline(&mut self.id_token_input)
                        .hint_text("identity token")
                        .desired_width(360.0),
                );
                ui.add_space(8.0);
                let can_sign_in = !self.busy && !self.id_token_input.trim().is_empty();
                if ui
                    .add_enabled(can_sign_in, egui::Button::new("Sign in"))
                    .clicked()
                {
                    queued.push(BackendCommand::Login {
                        id_token: self.id_token_input.trim().to_string(),
                    });
                }
            });
        });
        for cmd in queued {
            self.dispatch(cmd);
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        let mut queued: Vec<BackendCommand> = Vec::new();
        egui::TopBottomPanel::top("portal_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Campus Portal");
                if let Some(user) = &self.user {
                    ui.separator();
                    ui.label(&user.email);
                    ui.weak(format!("Cohort: {}", user.cohort.name));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Logout").clicked() {
                        queued.push(BackendCommand::Logout);
                    }
                    if self.selected_course.is_some() && ui.button("All courses").clicked() {
                        self.selected_course = None;
                        queued.push(BackendCommand::LoadCourses);
                    }
                });
            });
        });
        for cmd in queued {
            self.dispatch(cmd);
        }
    }

    fn show_courses(&mut self, ui: &mut egui::Ui, queued: &mut Vec<BackendCommand>) {
        ui.heading("My Courses");
        ui.add_space(8.0);
        if self.courses.is_empty() {
            ui.weak("No enrolled courses.");
            return;
        }
        for course in &self.courses {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        ui.strong(&course.course_title);
                        if !course.course_description.is_empty() {
                            ui.label(&course.course_description);
                        }
                        if let Some(cohort) = &course.cohort {
                            ui.weak(format!("Cohort: {}", cohort.name));
                        }
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add_enabled(!self.busy, egui::Button::new("Open course"))
                            .clicked()
                        {
                            queued.push(BackendCommand::OpenCourse {
                                course: course.clone(),
                            });
                        }
                    });
                });
            });
            ui.add_space(6.0);
        }
    }

    fn show_mode_toggle(&mut self, ui: &mut egui::Ui, queued: &mut Vec<BackendCommand>) {
        let is_lecturer = self.user.as_ref().map(|u| u.is_lecturer).unwrap_or(false);
        if !is_lecturer {
            return;
        }
        ui.horizontal(|ui| {
            if ui
                .selectable_label(self.view_mode == ViewMode::Student, "Student view")
                .clicked()
                && self.view_mode != ViewMode::Student
            {
                self.view_mode = ViewMode::Student;
                queued.push(BackendCommand::SetViewMode {
                    mode: ViewMode::Student,
                });
            }
            if ui
                .selectable_label(self.view_mode == ViewMode::Lecturer, "Lecturer view (grade)")
                .clicked()
                && self.view_mode != ViewMode::Lecturer
            {
                self.view_mode = ViewMode::Lecturer;
                queued.push(BackendCommand::SetViewMode {
                    mode: ViewMode::Lecturer,
                });
            }
        });
        ui.add_space(8.0);
    }

    fn show_grade_summary(&mut self, ui: &mut egui::Ui) {
        ui.heading("My Grades & Feedback");
        ui.add_space(4.0);
        let Some(summary) = &self.grade_summary else {
            ui.weak("Loading grade summary...");
            return;
        };
        if summary.grades.is_empty() {
            ui.weak("No gradable work yet.");
        } else {
            egui::Grid::new("grades_grid")
                .striped(true)
                .spacing([16.0, 4.0])
                .show(ui, |ui| {
                    for header in ["Module", "Assignment", "Score", "Max", "Percent", "Feedback"] {
                        ui.strong(header);
                    }
                    ui.end_row();
                    for row in &summary.grades {
                        ui.label(&row.module_title);
                        ui.horizontal(|ui| {
                            ui.label(&row.assignment_title);
                            if let Some(badge) = final_badge(row.locked) {
                                ui.strong(badge);
                            }
                        });
                        ui.label(score_cell(row.score));
                        ui.label(row.max_score.to_string());
                        ui.label(percent_cell(row.percent));
                        ui.label(text_or_dash(&row.feedback));
                        ui.end_row();
                    }
                });
        }
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.strong(format!(
                "Course average: {}",
                average_label(summary.average_percent)
            ));
            ui.separator();
            ui.strong(format!(
                "Result: {}",
                result_label(summary.result.as_deref())
            ));
            ui.weak(format!("(pass mark {:.0}%)", summary.pass_mark));
        });
    }

    fn show_assignments(&mut self, ui: &mut egui::Ui, queued: &mut Vec<BackendCommand>) {
        ui.heading("Assignments");
        ui.add_space(4.0);
        if self.assignments.is_empty() {
            ui.weak("No assignments in this course.");
            return;
        }
        egui::Grid::new("assignments_grid")
            .striped(true)
            .spacing([16.0, 6.0])
            .show(ui, |ui| {
                for header in ["Module", "Assignment", "Max", "File URL", "Status", ""] {
                    ui.strong(header);
                }
                ui.end_row();
                for row in &self.assignments {
                    ui.label(&row.module_title);
                    ui.label(&row.assignment_title);
                    ui.label(row.max_score.to_string());
                    if row.has_submission {
                        let submitted_url = row
                            .submission
                            .as_ref()
                            .map(|info| info.file_url.as_str())
                            .unwrap_or("");
                        if submitted_url.is_empty() {
                            ui.label("-");
                        } else {
                            ui.hyperlink(submitted_url);
                        }
                        ui.label(
                            row.submission
                                .as_ref()
                                .map(|info| info.status.as_str())
                                .unwrap_or("Submitted"),
                        );
                        ui.add_enabled(false, egui::Button::new("Submitted"));
                    } else {
                        let draft = self.file_url_drafts.entry(row.assignment_id).or_default();
                        ui.add(
                            egui::TextEdit::singleline(draft)
                                .hint_text("paste file URL")
                                .desired_width(240.0),
                        );
                        ui.label("Not submitted");
                        if ui
                            .add_enabled(!self.busy, egui::Button::new("Submit"))
                            .clicked()
                        {
                            queued.push(BackendCommand::SubmitAssignment {
                                assignment_id: row.assignment_id,
                                file_url: draft.clone(),
                            });
                        }
                    }
                    ui.end_row();
                }
            });
    }

    fn show_lecturer_panel(&mut self, ui: &mut egui::Ui, queued: &mut Vec<BackendCommand>) {
        ui.heading("Submissions to grade");
        ui.add_space(4.0);
        if self.submissions.is_empty() {
            ui.weak("No submissions for this course yet.");
            return;
        }
        egui::Grid::new("lecturer_grid")
            .striped(true)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                for header in [
                    "Student",
                    "Assignment",
                    "File",
                    "Submitted",
                    "Status",
                    "Score",
                    "Feedback",
                    "",
                ] {
                    ui.strong(header);
                }
                ui.end_row();
                for row in &self.submissions {
                    let locked = row.is_locked();
                    ui.label(&row.student_email);
                    ui.label(format!("{} / {}", row.module_title, row.assignment_title));
                    if row.file_url.is_empty() {
                        ui.label("-");
                    } else {
                        ui.hyperlink_to("open", &row.file_url);
                    }
                    ui.label(submitted_at_cell(row.submitted_at));
                    if locked {
                        ui.strong("FINAL");
                    } else {
                        ui.label(text_or_dash(&row.status));
                    }

                    let score_draft = self.score_drafts.entry(row.submission_id).or_default();
                    ui.add_enabled(
                        !locked,
                        egui::TextEdit::singleline(score_draft)
                            .hint_text(format!("/ {}", row.max_score))
                            .desired_width(56.0),
                    );
                    let feedback_draft =
                        self.feedback_drafts.entry(row.submission_id).or_default();
                    ui.add_enabled(
                        !locked,
                        egui::TextEdit::singleline(feedback_draft).desired_width(180.0),
                    );

                    ui.horizontal(|ui| {
                        let can_act = !locked && !self.busy;
                        if ui
                            .add_enabled(can_act, egui::Button::new("Save grade"))
                            .clicked()
                        {
                            queued.push(BackendCommand::GradeSubmission {
                                submission_id: row.submission_id,
                                score: score_draft.clone(),
                                feedback: feedback_draft.clone(),
                            });
                        }
                        let lockable = can_act && row.graded;
                        if self.pending_lock == Some(row.submission_id) {
                            ui.label("Lock as FINAL? This cannot be undone.");
                            if ui.button("Confirm").clicked() {
                                self.pending_lock = None;
                                queued.push(BackendCommand::LockSubmission {
                                    submission_id: row.submission_id,
                                });
                            }
                            if ui.button("Cancel").clicked() {
                                self.pending_lock = None;
                            }
                        } else if ui
                            .add_enabled(lockable, egui::Button::new("Lock (FINAL)"))
                            .clicked()
                        {
                            self.pending_lock = Some(row.submission_id);
                        }
                    });
                    ui.end_row();
                }
            });
    }

    fn show_portal(&mut self, ctx: &egui::Context) {
        self.show_header(ctx);
        let mut queued: Vec<BackendCommand> = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                match self.selected_course.clone() {
                    None => self.show_courses(ui, &mut queued),
                    Some(course) => {
                        ui.heading(&course.course_title);
                        if !course.course_description.is_empty() {
                            ui.label(&course.course_description);
                        }
                        ui.add_space(8.0);
                        self.show_mode_toggle(ui, &mut queued);
                        match self.view_mode {
                            ViewMode::Student => {
                                self.show_grade_summary(ui);
                                ui.add_space(16.0);
                                ui.separator();
                                ui.add_space(8.0);
                                self.show_assignments(ui, &mut queued);
                            }
                            ViewMode::Lecturer => {
                                self.show_lecturer_panel(ui, &mut queued);
                            }
                        }
                    }
                }
            });
        });
        for cmd in queued {
            self.dispatch(cmd);
        }
    }
}

impl eframe::App for PortalGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_backend_events();
        // Backend events arrive off the UI thread; poll for them even
        // while the pointer is idle.
        ctx.request_repaint_after(Duration::from_millis(200));

        self.show_status_bar(ctx);
        if self.user.is_none() {
            self.show_login(ctx);
        } else {
            self.show_portal(ctx);
        }
    }
}
