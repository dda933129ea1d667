//! Rendering of page state into plain data, plus a text form of it for the terminal.

use std::fmt;
use std::time::Duration;

use crate::models::{Filter, TaskId, User};
use crate::tasks::AppState;

/// How long a notice on the task page stays visible.
pub const NOTICE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Danger,
}

/// A transient, user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub dismiss_after: Duration,
}

impl Notice {
    pub fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            dismiss_after: NOTICE_TIMEOUT,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, text)
    }

    pub fn danger(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Danger, text)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tag = match self.kind {
            NoticeKind::Success => "ok",
            NoticeKind::Danger => "error",
        };
        write!(f, "[{}] {}", tag, self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The cache holds no task at all.
    NoTasks,
    /// Tasks exist but none matches the active filter.
    NoMatches,
}

impl EmptyState {
    pub fn message(self) -> &'static str {
        match self {
            EmptyState::NoTasks => "Your to-do list is empty!",
            EmptyState::NoMatches => "No tasks for this filter.",
        }
    }
}

/// One list row. Clicking the title toggles the task; the row also offers a delete action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBanner {
    pub greeting: String,
    pub email: String,
}

impl UserBanner {
    /// No banner for a profile without a username.
    pub fn for_user(user: &User) -> Option<Self> {
        if user.username.is_empty() {
            return None;
        }
        Some(Self {
            greeting: format!("Welcome, {}!", user.username),
            email: user.email.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListView {
    pub banner: Option<UserBanner>,
    /// The highlighted filter button.
    pub filter: Filter,
    pub rows: Vec<TaskRow>,
    pub empty: Option<EmptyState>,
}

pub fn render(state: &AppState) -> TaskListView {
    let rows: Vec<TaskRow> = state
        .visible()
        .map(|task| TaskRow {
            id: task.id,
            title: task.title.clone(),
            completed: task.completed,
        })
        .collect();

    let empty = if state.tasks.is_empty() {
        Some(EmptyState::NoTasks)
    } else if rows.is_empty() {
        Some(EmptyState::NoMatches)
    } else {
        None
    };

    TaskListView {
        banner: state.user.as_ref().and_then(UserBanner::for_user),
        filter: state.filter,
        rows,
        empty,
    }
}

impl fmt::Display for TaskListView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(banner) = &self.banner {
            writeln!(f, "{} <{}>", banner.greeting, banner.email)?;
        }

        let filters: Vec<String> = Filter::ALL
            .iter()
            .map(|filter| {
                if *filter == self.filter {
                    format!("[{}]", filter)
                } else {
                    filter.to_string()
                }
            })
            .collect();
        writeln!(f, "{}", filters.join("  "))?;

        if let Some(empty) = self.empty {
            return writeln!(f, "  {}", empty.message());
        }
        for row in &self.rows {
            let mark = if row.completed { "x" } else { " " };
            writeln!(f, "  [{}] {:>4}  {}", mark, row.id, row.title)?;
        }
        Ok(())
    }
}
