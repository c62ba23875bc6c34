//! `studylife plan <topic>`: ask the assistant for a study plan.

use anyhow::{Result, anyhow};
use console::style;

use studylife_core::workspace::StudentWorkspace;

use super::spinner;
use super::task::print_tasks;

pub async fn generate_plan(ws: &mut StudentWorkspace, topic: &str, json: bool) -> Result<()> {
    let spinner = spinner("Generating study plan...", json);
    let result = ws.generate_plan(topic).await;
    spinner.finish_and_clear();

    let added = result.map_err(|e| anyhow!("Failed to generate study plan: {e}"))?;
    if !json && !added.is_empty() {
        println!(
            "  {} Added {} tasks for {}",
            style("✓").green().bold(),
            added.len(),
            style(topic.trim()).cyan()
        );
    }
    print_tasks(&added, json)
}
