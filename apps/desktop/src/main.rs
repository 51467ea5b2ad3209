use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{load_settings, FileCredentialStore, PortalApi};
use shared::domain::{AssignmentId, CourseId, SubmissionId};

#[derive(Parser, Debug)]
#[command(about = "Command-line client for the campus portal")]
struct Args {
    /// Override the grading service base URL from settings.
    #[arg(long)]
    api_base: Option<String>,
    /// Directory holding the persisted session tokens.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange an identity-provider credential for a portal session.
    Login {
        #[arg(long)]
        id_token: String,
    },
    /// Forget the stored session tokens.
    Logout,
    /// List enrolled courses.
    Courses,
    /// List assignments for a course.
    Assignments {
        #[arg(long)]
        course_id: i64,
    },
    /// Show the grade summary for a course.
    Grades {
        #[arg(long)]
        course_id: i64,
    },
    /// Submit a file URL for an assignment.
    Submit {
        #[arg(long)]
        assignment_id: i64,
        #[arg(long)]
        file_url: String,
    },
    /// List submissions for a course (staff only).
    Submissions {
        #[arg(long)]
        course_id: i64,
        #[arg(long)]
        assignment_id: Option<i64>,
    },
    /// Save score and feedback for a submission (staff only).
    Grade {
        #[arg(long)]
        submission_id: i64,
        #[arg(long)]
        score: f64,
        #[arg(long, default_value = "")]
        feedback: String,
    },
    /// Mark a grade as final (staff only).
    Lock {
        #[arg(long)]
        submission_id: i64,
    },
}

fn default_data_dir() -> Result<PathBuf> {
    let base = dirs::data_local_dir().context("unable to resolve local app data dir")?;
    Ok(base.join("campus_portal"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(api_base) = args.api_base {
        settings.api_base = api_base;
    }
    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    let store = Arc::new(FileCredentialStore::in_data_dir(&data_dir));
    let api = PortalApi::new(settings.api_base, store);

    match args.command {
        Command::Login { id_token } => {
            let response = api.exchange_identity(&id_token).await?;
            api.store_tokens(response.tokens.clone()).await?;
            println!(
                "Logged in as {} (cohort: {})",
                response.user.email, response.user.cohort.name
            );
        }
        Command::Logout => {
            api.clear_tokens().await?;
            println!("Logged out");
        }
        Command::Courses => {
            let courses = api.list_my_courses().await?;
            println!("{}", serde_json::to_string_pretty(&courses)?);
        }
        Command::Assignments { course_id } => {
            let assignments = api.list_my_assignments(CourseId(course_id)).await?;
            println!("{}", serde_json::to_string_pretty(&assignments)?);
        }
        Command::Grades { course_id } => {
            let summary = api.get_my_grades(CourseId(course_id)).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Submit {
            assignment_id,
            file_url,
        } => {
            let response = api
                .submit_assignment(AssignmentId(assignment_id), file_url.trim())
                .await?;
            println!("{}", response.detail);
        }
        Command::Submissions {
            course_id,
            assignment_id,
        } => {
            let submissions = api
                .list_lecturer_submissions(CourseId(course_id), assignment_id.map(AssignmentId))
                .await?;
            println!("{}", serde_json::to_string_pretty(&submissions)?);
        }
        Command::Grade {
            submission_id,
            score,
            feedback,
        } => {
            let response = api
                .grade_submission(SubmissionId(submission_id), score, &feedback)
                .await?;
            println!("{}", response.detail);
        }
        Command::Lock { submission_id } => {
            let response = api.lock_submission(SubmissionId(submission_id)).await?;
            println!("{}", response.detail);
        }
    }

    Ok(())
}
