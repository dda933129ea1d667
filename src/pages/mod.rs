//! Page controllers.
//!
//! Each page is driven by typed events (what the user did) and answers with an update value
//! (what should change on screen). The pages own their state; nothing here draws anything,
//! so a terminal, a test or any other surface can sit on top.

pub mod auth;
pub mod tasks;

use std::fmt;
use std::time::Duration;

pub use auth::{AuthEvent, AuthPage, AuthUpdate};
pub use tasks::{PageUpdate, TaskEvent, TaskPage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Login and registration forms.
    Auth,
    /// The task list.
    App,
}

impl Page {
    pub fn path(self) -> &'static str {
        match self {
            Page::Auth => "/auth/",
            Page::App => "/api/app/",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Navigation to another page, optionally after a pause so a notice can be read first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    pub to: Page,
    pub delay: Duration,
}

impl Redirect {
    pub fn now(to: Page) -> Self {
        Self {
            to,
            delay: Duration::ZERO,
        }
    }

    pub fn after(to: Page, delay: Duration) -> Self {
        Self { to, delay }
    }
}
