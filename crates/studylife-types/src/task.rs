//! Study task types.
//!
//! `StudyTask` is the persisted planner entry; `PlannedTask` is what the
//! assistant returns before ids are assigned.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task priority as shown in the planner.
///
/// Serialized in title case (`"High"`, `"Medium"`, `"Low"`) to match the
/// stored documents and the assistant's JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskPriority::High => write!(f, "High"),
            TaskPriority::Medium => write!(f, "Medium"),
            TaskPriority::Low => write!(f, "Low"),
        }
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(TaskPriority::High),
            "medium" => Ok(TaskPriority::Medium),
            "low" => Ok(TaskPriority::Low),
            other => Err(format!("invalid task priority: '{other}'")),
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

/// A task in the study planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyTask {
    pub id: u64,
    pub title: String,
    pub priority: TaskPriority,
    #[serde(default)]
    pub completed: bool,
}

/// A task suggested by the assistant, not yet added to the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedTask {
    pub title: String,
    pub priority: TaskPriority,
}

/// Tasks every new profile starts with.
pub fn starter_tasks() -> Vec<StudyTask> {
    vec![
        StudyTask {
            id: 1,
            title: "Complete ML Project".to_string(),
            priority: TaskPriority::High,
            completed: false,
        },
        StudyTask {
            id: 2,
            title: "Study Data Structures".to_string(),
            priority: TaskPriority::Medium,
            completed: false,
        },
    ]
}
