//! Profile subcommands.

use anyhow::Result;
use clap::Subcommand;
use console::style;

use studylife_core::workspace::StudentWorkspace;

use crate::http::handlers::profile::ProfileView;

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Show your profile.
    Show,

    /// Update profile fields and save.
    Set {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Hours slept last night (0-24).
        #[arg(long)]
        sleep: Option<f64>,
    },
}

pub async fn handle_profile_command(
    cmd: ProfileCommand,
    ws: &mut StudentWorkspace,
    json: bool,
) -> Result<()> {
    match cmd {
        ProfileCommand::Show => show_profile(ws, json),
        ProfileCommand::Set { name, email, sleep } => {
            if let Some(hours) = sleep {
                ws.set_sleep_hours(hours)?;
            }
            if let Some(name) = name {
                ws.set_name(name);
            }
            if let Some(email) = email {
                ws.set_email(email);
            }
            ws.save_profile().await;
            show_profile(ws, json)
        }
    }
}

fn show_profile(ws: &StudentWorkspace, json: bool) -> Result<()> {
    let view = ProfileView::of(ws);
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let or_unset = |s: &str| {
        if s.is_empty() {
            style("(not set)".to_string()).dim()
        } else {
            style(s.to_string())
        }
    };
    println!();
    println!("  {}", style("── Profile ──").dim());
    println!("  Name:   {}", or_unset(&view.name));
    println!("  Email:  {}", or_unset(&view.email));
    println!("  Sleep:  {}h", view.sleep_hours);
    println!(
        "  {}",
        style(format!(
            "{} tasks, {} chat messages",
            view.task_count, view.message_count
        ))
        .dim()
    );
    println!();
    Ok(())
}
