//! Task subcommands: list, add, done, rename, rm.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use studylife_core::workspace::StudentWorkspace;
use studylife_types::task::{StudyTask, TaskPriority};

#[derive(Subcommand)]
pub enum TaskCommand {
    /// List your tasks.
    #[command(alias = "ls")]
    List,

    /// Add a task.
    Add {
        /// Task title.
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,

        /// Priority: high, medium or low.
        #[arg(short, long, default_value = "medium")]
        priority: TaskPriority,
    },

    /// Toggle a task between done and not done.
    Done {
        id: u64,
    },

    /// Change a task's title.
    Rename {
        id: u64,

        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },

    /// Delete a task.
    #[command(alias = "delete")]
    Rm {
        id: u64,
    },
}

pub async fn handle_task_command(
    cmd: TaskCommand,
    ws: &mut StudentWorkspace,
    json: bool,
) -> Result<()> {
    match cmd {
        TaskCommand::List => print_tasks(ws.tasks(), json),
        TaskCommand::Add { title, priority } => {
            let task = ws.add_task(&title.join(" "), priority)?;
            report(&task, "Added", json)
        }
        TaskCommand::Done { id } => {
            let completed = ws.toggle_task(id)?;
            if json {
                println!("{}", serde_json::json!({ "id": id, "completed": completed }));
            } else if completed {
                println!("  {} Task {id} done", style("✓").green().bold());
            } else {
                println!("  {} Task {id} reopened", style("↺").yellow());
            }
            Ok(())
        }
        TaskCommand::Rename { id, title } => {
            ws.rename_task(id, &title.join(" "))?;
            match ws.tasks().iter().find(|t| t.id == id) {
                Some(task) => report(task, "Renamed", json),
                None => Ok(()),
            }
        }
        TaskCommand::Rm { id } => {
            let removed = ws.remove_task(id)?;
            report(&removed, "Removed", json)
        }
    }
}

fn report(task: &StudyTask, verb: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(task)?);
    } else {
        println!(
            "  {} {verb} [{}] {}",
            style("✓").green().bold(),
            task.id,
            style(&task.title).cyan()
        );
    }
    Ok(())
}

pub fn print_tasks(tasks: &[StudyTask], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tasks)?);
        return Ok(());
    }
    if tasks.is_empty() {
        println!("  {}", style("No tasks yet. Add one with `studylife task add`.").dim());
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::White),
            Cell::new("").fg(Color::White),
            Cell::new("Task").fg(Color::White),
            Cell::new("Priority").fg(Color::White),
        ]);

    for task in tasks {
        let check = if task.completed { "✓" } else { " " };
        let title = if task.completed {
            Cell::new(&task.title).fg(Color::DarkGrey)
        } else {
            Cell::new(&task.title)
        };
        table.add_row(vec![
            Cell::new(task.id),
            Cell::new(check).fg(Color::Green),
            title,
            Cell::new(task.priority).fg(priority_color(task.priority)),
        ]);
    }

    println!("{table}");
    Ok(())
}

fn priority_color(priority: TaskPriority) -> Color {
    match priority {
        TaskPriority::High => Color::Red,
        TaskPriority::Medium => Color::Yellow,
        TaskPriority::Low => Color::Green,
    }
}
