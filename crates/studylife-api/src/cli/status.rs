//! `studylife status`: the dashboard.

use anyhow::Result;
use console::style;

use studylife_core::workspace::StudentWorkspace;
use studylife_types::wellness::StressLevel;

use crate::state::AppState;

pub async fn status(state: &AppState, ws: &StudentWorkspace, json: bool) -> Result<()> {
    let summary = ws.dashboard();
    let last_saved = state
        .store
        .last_saved(ws.user_id())
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not read last save time");
            None
        });

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "storage": state.store.kind(),
            "last_saved": last_saved.map(|t| t.to_rfc3339()),
            "assistant": {
                "configured": state.assistant_configured(),
                "model": state.assistant.model(),
            },
            "dashboard": summary,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} StudyLife v{}",
        style("📚").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("  Hi, {}!", style(&summary.greeting_name).cyan().bold());
    println!();

    println!("  {}", style("── Wellness ──").dim());
    println!("  Sleep:    {}h", summary.sleep_hours);
    println!("  Energy:   {}/10", summary.energy_level.min(100) / 10);
    let stress = match summary.stress {
        StressLevel::High => style(summary.stress.to_string()).red(),
        StressLevel::Normal => style(summary.stress.to_string()).yellow(),
        StressLevel::Low => style(summary.stress.to_string()).green(),
    };
    println!("  Stress:   {stress}");
    println!();

    println!("  {}", style("── Tasks ──").dim());
    println!(
        "  Done:     {}/{}",
        style(summary.completed_tasks).green(),
        summary.total_tasks
    );
    println!();

    println!("  {}", style("── Setup ──").dim());
    println!("  Data:      {}", state.data_dir.display());
    println!("  Storage:   {}", state.store.kind());
    match last_saved {
        Some(at) => println!("  Saved:     {}", at.format("%Y-%m-%d %H:%M UTC")),
        None if !ws.is_autosave_engaged() => {
            println!("  Saved:     {}", style("paused (profile failed to load)").yellow())
        }
        None => println!("  Saved:     {}", style("never").dim()),
    }
    if state.assistant_configured() {
        println!("  Assistant: {}", state.assistant.model());
    } else {
        println!(
            "  Assistant: {}",
            style("not configured (set GEMINI_API_KEY)").yellow()
        );
    }
    println!();
    Ok(())
}
