use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Server-assigned task identifier.
pub type TaskId = i64;

/// Input structure for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task, already trimmed.
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// New tasks are always created open.
    pub completed: bool,
}

impl TaskInput {
    /// Builds the creation payload from raw user input.
    /// Returns `None` when nothing but whitespace was typed.
    pub fn from_raw(title: &str) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            completed: false,
        })
    }
}

/// Represents a task as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: TaskId,
    /// The title of the task.
    pub title: String,
    /// Whether the task has been done.
    pub completed: bool,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Returns a copy of the task with its completed flag inverted,
    /// used as the full body of the update request.
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }
}

/// Orders tasks newest first. Ties keep their current relative order.
pub fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Client-side view filter over the task cache.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Every task.
    #[default]
    All,
    /// Tasks not yet completed.
    Active,
    /// Completed tasks.
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" => Ok(Filter::Completed),
            other => Err(format!(
                "unknown filter '{}', expected one of: all, active, completed",
                other
            )),
        }
    }
}
