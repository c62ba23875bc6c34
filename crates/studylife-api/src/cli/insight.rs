//! `studylife insight`: a wellness tip from sleep and energy.

use anyhow::Result;
use console::style;

use studylife_core::workspace::StudentWorkspace;

use super::spinner;

pub async fn generate_insight(ws: &mut StudentWorkspace, json: bool) -> Result<()> {
    let spinner = spinner("Thinking...", json);
    let insight = ws.generate_insight().await;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::json!({ "insight": insight }));
    } else {
        let metrics = ws.metrics();
        println!();
        println!(
            "  {}",
            style(format!(
                "Sleep {}h · Energy {}/10",
                metrics.sleep_hours,
                metrics.energy_out_of_ten()
            ))
            .dim()
        );
        println!("  {} {insight}", style("💡").bold());
        println!();
    }
    Ok(())
}
