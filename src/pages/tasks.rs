use log::error;

use super::{Page, Redirect};
use crate::error::ClientError;
use crate::models::{Filter, TaskId};
use crate::storage::KeyValueStore;
use crate::tasks::TaskManager;
use crate::view::{render, Notice, TaskListView};

pub const FETCH_FAILED: &str = "Error fetching tasks. Please refresh.";
pub const ADD_FAILED: &str = "Failed to add task.";
pub const UPDATE_FAILED: &str = "Failed to update task.";
pub const DELETE_FAILED: &str = "Failed to delete task.";
pub const CLEAR_FAILED: &str = "Failed to clear completed tasks.";
pub const CLEAR_SUCCESS: &str = "Cleared all completed tasks.";

/// What the user did on the task page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    Loaded,
    /// The new-task form was submitted with this raw text.
    Submitted(String),
    /// A task title was clicked.
    TitleClicked(TaskId),
    DeleteClicked(TaskId),
    FilterSelected(Filter),
    ClearCompletedClicked,
    LogoutClicked,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageUpdate {
    /// Fresh list to display, when it may have changed.
    pub view: Option<TaskListView>,
    pub notice: Option<Notice>,
    pub redirect: Option<Redirect>,
    /// Empty the new-task input.
    pub clear_input: bool,
}

impl PageUpdate {
    fn redirect(to: Page) -> Self {
        Self {
            redirect: Some(Redirect::now(to)),
            ..Self::default()
        }
    }
}

pub struct TaskPage<S> {
    tasks: TaskManager<S>,
}

impl<S: KeyValueStore> TaskPage<S> {
    pub fn new(tasks: TaskManager<S>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &TaskManager<S> {
        &self.tasks
    }

    pub async fn dispatch(&mut self, event: TaskEvent) -> PageUpdate {
        match event {
            TaskEvent::Loaded => {
                if !self.tasks.has_session() {
                    return PageUpdate::redirect(Page::Auth);
                }
                let result = self.tasks.fetch_tasks().await;
                self.settle(result, FETCH_FAILED, None)
            }
            TaskEvent::Submitted(title) => match self.tasks.add_task(&title).await {
                Ok(false) => PageUpdate::default(),
                Ok(true) => PageUpdate {
                    clear_input: true,
                    ..self.rendered()
                },
                Err(err) => self.failed(err, ADD_FAILED),
            },
            TaskEvent::TitleClicked(id) => {
                let result = self.tasks.toggle_complete(id).await;
                self.settle(result, UPDATE_FAILED, None)
            }
            TaskEvent::DeleteClicked(id) => {
                let result = self.tasks.delete_task(id).await;
                self.settle(result, DELETE_FAILED, None)
            }
            TaskEvent::FilterSelected(filter) => {
                self.tasks.set_filter(filter);
                self.rendered()
            }
            TaskEvent::ClearCompletedClicked => {
                if let Err(err) = self.tasks.clear_completed().await {
                    return self.failed(err, CLEAR_FAILED);
                }
                // The tasks are gone on the server; from here only the refresh can fail.
                let result = self.tasks.fetch_tasks().await;
                self.settle(result, FETCH_FAILED, Some(Notice::success(CLEAR_SUCCESS)))
            }
            TaskEvent::LogoutClicked => {
                self.tasks.logout().await;
                PageUpdate::redirect(Page::Auth)
            }
        }
    }

    fn rendered(&self) -> PageUpdate {
        PageUpdate {
            view: Some(render(self.tasks.state())),
            ..PageUpdate::default()
        }
    }

    fn settle(
        &self,
        result: Result<(), ClientError>,
        failure: &str,
        success: Option<Notice>,
    ) -> PageUpdate {
        match result {
            Ok(()) => PageUpdate {
                notice: success,
                ..self.rendered()
            },
            Err(err) => self.failed(err, failure),
        }
    }

    /// 401 wins over any message: the session is already gone, so go back to the auth page.
    fn failed(&self, err: ClientError, message: &str) -> PageUpdate {
        if err.is_unauthorized() {
            return PageUpdate::redirect(Page::Auth);
        }
        error!("{} {}", message, err);
        PageUpdate {
            notice: Some(Notice::danger(message)),
            ..self.rendered()
        }
    }
}
