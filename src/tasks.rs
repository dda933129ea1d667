//! The task cache and the operations that keep it in step with the server.
//!
//! `TaskManager` owns the application state of the task page: the cached task list, the
//! active filter and the signed-in user. Every mutation goes to the server first and the
//! cache is only updated from what the server returns, or by refetching the whole list.
//! Any 401 clears the stored session before the error is handed back.

use log::{debug, info, warn};
use validator::Validate;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::{sort_newest_first, Filter, Task, TaskId, TaskInput, User};
use crate::storage::{KeyValueStore, SessionStore};

/// In-memory state of the task page.
#[derive(Debug, Default, Clone)]
pub struct AppState {
    pub tasks: Vec<Task>,
    pub filter: Filter,
    pub user: Option<User>,
}

impl AppState {
    /// Cached tasks matching the current filter, in cache order.
    pub fn visible(&self) -> impl Iterator<Item = &Task> {
        let filter = self.filter;
        self.tasks.iter().filter(move |task| filter.matches(task))
    }

    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }
}

pub struct TaskManager<S> {
    api: ApiClient,
    sessions: SessionStore<S>,
    token: Option<String>,
    state: AppState,
}

impl<S: KeyValueStore> TaskManager<S> {
    /// Reads the stored session; without one every remote operation fails with `Unauthorized`.
    pub fn new(api: ApiClient, sessions: SessionStore<S>) -> Self {
        let session = sessions.load();
        let state = AppState {
            user: session.as_ref().map(|s| s.user.clone()),
            ..AppState::default()
        };
        Self {
            api,
            sessions,
            token: session.map(|s| s.token),
            state,
        }
    }

    pub fn has_session(&self) -> bool {
        self.token.is_some()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn sessions(&self) -> &SessionStore<S> {
        &self.sessions
    }

    fn token(&self) -> Result<&str, ClientError> {
        self.token
            .as_deref()
            .ok_or_else(|| ClientError::Unauthorized("No stored session".into()))
    }

    /// Drops the session locally and in storage.
    fn end_session(&mut self) {
        self.token = None;
        self.state.user = None;
        if let Err(e) = self.sessions.clear() {
            warn!("Failed to clear stored session: {}", e);
        }
    }

    fn guard<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(err) = &result {
            if err.is_unauthorized() {
                info!("Session rejected by server, signing out");
                self.end_session();
            }
        }
        result
    }

    /// Replaces the cache with the server's list, in server order.
    /// On failure the previous cache is kept.
    pub async fn fetch_tasks(&mut self) -> Result<(), ClientError> {
        let result = match self.token() {
            Ok(token) => self.api.list_tasks(token).await,
            Err(e) => Err(e),
        };
        let tasks = self.guard(result)?;
        debug!("Fetched {} tasks", tasks.len());
        self.state.tasks = tasks;
        Ok(())
    }

    /// Creates a task from raw input. Returns `Ok(false)` without any request when the
    /// trimmed title is empty.
    pub async fn add_task(&mut self, title: &str) -> Result<bool, ClientError> {
        let Some(input) = TaskInput::from_raw(title) else {
            return Ok(false);
        };
        input.validate()?;

        let result = match self.token() {
            Ok(token) => self.api.create_task(token, &input).await,
            Err(e) => Err(e),
        };
        let created = self.guard(result)?;
        debug!("Created task {}", created.id);
        self.state.tasks.push(created);
        sort_newest_first(&mut self.state.tasks);
        Ok(true)
    }

    /// Flips the completed flag on the server and caches whatever the server answers with.
    pub async fn toggle_complete(&mut self, id: TaskId) -> Result<(), ClientError> {
        let toggled = self
            .state
            .find(id)
            .map(Task::toggled)
            .ok_or_else(|| ClientError::NotFound(format!("task {} is not cached", id)))?;

        let result = match self.token() {
            Ok(token) => self.api.update_task(token, &toggled).await,
            Err(e) => Err(e),
        };
        let updated = self.guard(result)?;
        // The entry may have vanished through a refetch while the request was in flight.
        if let Some(slot) = self.state.tasks.iter_mut().find(|task| task.id == id) {
            *slot = updated;
        }
        Ok(())
    }

    pub async fn delete_task(&mut self, id: TaskId) -> Result<(), ClientError> {
        let result = match self.token() {
            Ok(token) => self.api.delete_task(token, id).await,
            Err(e) => Err(e),
        };
        self.guard(result)?;
        self.state.tasks.retain(|task| task.id != id);
        Ok(())
    }

    /// Asks the server to drop every completed task. The cache is left alone; the caller
    /// refetches with [`fetch_tasks`](Self::fetch_tasks), whose failure is reported apart
    /// from this one.
    pub async fn clear_completed(&mut self) -> Result<(), ClientError> {
        let result = match self.token() {
            Ok(token) => self.api.clear_completed(token).await,
            Err(e) => Err(e),
        };
        self.guard(result)?;
        debug!("Server cleared completed tasks");
        Ok(())
    }

    /// Local only; never touches the network.
    pub fn set_filter(&mut self, filter: Filter) {
        self.state.filter = filter;
    }

    /// Best-effort server logout. The local session is cleared whatever the outcome.
    pub async fn logout(&mut self) {
        if let Some(token) = self.token.as_deref() {
            if let Err(e) = self.api.logout(token).await {
                warn!("Logout request failed: {}", e);
            }
        }
        self.end_session();
        self.state.tasks.clear();
        info!("Signed out");
    }
}
