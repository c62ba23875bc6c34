//! `studylife sos`: emergency mode with contacts.

use anyhow::Result;
use console::style;

use studylife_core::workspace::{EMERGENCY_NOTICE, StudentWorkspace};

pub fn activate(ws: &mut StudentWorkspace, json: bool) -> Result<()> {
    ws.activate_sos();
    ws.notices().error(EMERGENCY_NOTICE);

    if json {
        let contacts = serde_json::to_value(ws.emergency_contacts())?;
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "active": ws.is_sos_active(),
                "contacts": contacts,
            }))?
        );
        return Ok(());
    }

    println!();
    println!("  {}", style("🚨 EMERGENCY MODE").red().bold());
    println!("  {}", style("Help is on the way. Stay calm.").red());
    println!();
    for contact in ws.emergency_contacts() {
        println!("  {:<18} {}", contact.label, style(&contact.phone).bold());
    }
    println!();
    Ok(())
}
