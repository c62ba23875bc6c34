//! CLI command definitions for the `studylife` binary.
//!
//! Uses clap derive macros for argument parsing. Commands that touch a
//! student's data open a one-shot workspace for the signed-in user (or
//! `--user`) and flush pending edits before exiting.

pub mod auth;
pub mod chat;
pub mod insight;
pub mod plan;
pub mod pomodoro;
pub mod profile;
pub mod sos;
pub mod status;
pub mod task;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use studylife_infra::filesystem::load_session;
use studylife_types::identity::AuthIdentity;
use studylife_types::notice::NoticeLevel;

use crate::state::AppState;

/// Your study companion: tasks, plans, wellness and an AI assistant.
#[derive(Parser)]
#[command(name = "studylife", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Act as this user id instead of the signed-in session.
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export tracing spans to stdout via OpenTelemetry.
    #[arg(long, global = true, env = "STUDYLIFE_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in, register, sign out.
    Auth {
        #[command(subcommand)]
        action: auth::AuthCommand,
    },

    /// Show or edit your profile.
    Profile {
        #[command(subcommand)]
        action: profile::ProfileCommand,
    },

    /// Manage study tasks.
    Task {
        #[command(subcommand)]
        action: task::TaskCommand,
    },

    /// Generate a study plan for a topic and add it to your tasks.
    Plan {
        /// What you want to study.
        #[arg(required = true, num_args = 1..)]
        topic: Vec<String>,
    },

    /// Get a wellness tip based on your sleep and energy.
    Insight,

    /// Chat with the study assistant.
    Chat,

    /// Run a Pomodoro focus timer.
    Pomodoro {
        /// Stop after this many completed sessions.
        #[arg(long)]
        sessions: Option<u32>,
    },

    /// Show emergency contacts and activate emergency mode.
    Sos,

    /// Dashboard: profile, tasks and wellness at a glance.
    Status,

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// The identity to act as: `--user`, then the saved session.
pub async fn resolve_identity(state: &AppState, user: Option<&str>) -> Result<AuthIdentity> {
    if let Some(id) = user {
        let id = id.trim();
        if id.is_empty() {
            bail!("--user must not be empty");
        }
        return Ok(AuthIdentity {
            id: id.to_string(),
            display_name: None,
            email: None,
        });
    }
    match load_session(&state.data_dir).await {
        Some(identity) => Ok(identity),
        None => bail!(
            "Not signed in. Run `studylife auth login` or pass --user <id>."
        ),
    }
}

/// Print unexpired notices published during this command.
pub fn print_notices(state: &AppState, quiet: bool) {
    if quiet {
        return;
    }
    for notice in state.notices.active(chrono::Utc::now()) {
        let marker = match notice.level {
            NoticeLevel::Success => style("✓").green(),
            NoticeLevel::Info => style("ℹ").cyan(),
            NoticeLevel::Error => style("✗").red(),
        };
        eprintln!("  {marker} {}", notice.message);
    }
}

/// A cyan spinner, hidden for JSON output.
pub fn spinner(message: &'static str, json: bool) -> ProgressBar {
    if json {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}
