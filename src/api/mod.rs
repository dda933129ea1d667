//! Typed client for the to-do REST API.
//!
//! Authorized calls carry `Authorization: Token <token>`; mutating calls additionally carry
//! the CSRF token in `X-CSRFToken` when one is known. Responses are classified once, in
//! [`ApiClient::send`]: 401 becomes [`ClientError::Unauthorized`], any other non-success
//! status becomes [`ClientError::Api`] with the JSON error body when there is one.

pub mod csrf;

use log::{debug, warn};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;

use crate::config::Config;
use crate::error::ClientError;
use crate::models::{LoginInput, LoginResponse, RegisterInput, Task, TaskId, TaskInput};

pub const LOGIN_PATH: &str = "/api/login/";
pub const REGISTER_PATH: &str = "/api/register/";
pub const LOGOUT_PATH: &str = "/api/logout/";
pub const TODOS_PATH: &str = "/api/todos/";
pub const CLEAR_COMPLETED_PATH: &str = "/api/todos/clear_completed/";

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    csrf_token: Option<String>,
}

impl ApiClient {
    /// A path prefix in `base_url` is kept: every endpoint resolves below it.
    pub fn new(mut base_url: Url, csrf_token: Option<String>) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            http: Client::new(),
            base_url,
            csrf_token,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_url.clone(), config.csrf_token())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        // Joined relative to the base, so "/api/..." does not replace a prefix.
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::Validation(format!("invalid endpoint {}: {}", path, e)))
    }

    fn task_endpoint(&self, id: TaskId) -> Result<Url, ClientError> {
        self.endpoint(&format!("{}{}/", TODOS_PATH, id))
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Token {}", token))
    }

    fn mutating(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        let request = self.authorized(request, token);
        let Some(csrf_token) = self.csrf_token.as_deref() else {
            return request;
        };
        match HeaderValue::from_str(csrf_token) {
            Ok(value) => request.header(csrf::CSRF_HEADER, value),
            Err(e) => {
                warn!("CSRF token is not a valid header value, sending without it: {}", e);
                request
            }
        }
    }

    /// Sends the request and turns every non-success status into an error.
    async fn send(request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        debug!("{} <- {}", status, response.url().path());

        if status.is_success() {
            return Ok(response);
        }

        // Error bodies are informative only; a missing or non-JSON body is not an error of its own.
        let body = response.json::<Value>().await.ok();
        if status == StatusCode::UNAUTHORIZED {
            let message = body
                .as_ref()
                .and_then(|b| b.get("detail").or_else(|| b.get("error")))
                .and_then(Value::as_str)
                .unwrap_or("Authentication credentials were not valid")
                .to_string();
            return Err(ClientError::Unauthorized(message));
        }
        Err(ClientError::Api {
            status: status.as_u16(),
            body,
        })
    }

    /// `POST /api/login/`. A 2xx carrying `{"error": ...}` is returned as `LoginResponse::Failure`.
    pub async fn login(&self, input: &LoginInput) -> Result<LoginResponse, ClientError> {
        let request = self.http.post(self.endpoint(LOGIN_PATH)?).json(input);
        let response = Self::send(request).await?;
        Ok(response.json::<LoginResponse>().await?)
    }

    /// `POST /api/register/`. The success body is not used.
    pub async fn register(&self, input: &RegisterInput) -> Result<(), ClientError> {
        let request = self.http.post(self.endpoint(REGISTER_PATH)?).json(input);
        Self::send(request).await?;
        Ok(())
    }

    pub async fn logout(&self, token: &str) -> Result<(), ClientError> {
        let request = self.mutating(self.http.post(self.endpoint(LOGOUT_PATH)?), token);
        Self::send(request).await?;
        Ok(())
    }

    pub async fn list_tasks(&self, token: &str) -> Result<Vec<Task>, ClientError> {
        let request = self.authorized(self.http.get(self.endpoint(TODOS_PATH)?), token);
        let response = Self::send(request).await?;
        Ok(response.json::<Vec<Task>>().await?)
    }

    pub async fn create_task(&self, token: &str, input: &TaskInput) -> Result<Task, ClientError> {
        let request = self
            .mutating(self.http.post(self.endpoint(TODOS_PATH)?), token)
            .json(input);
        let response = Self::send(request).await?;
        Ok(response.json::<Task>().await?)
    }

    /// `PUT /api/todos/{id}/` with the full task body; returns the server's version.
    pub async fn update_task(&self, token: &str, task: &Task) -> Result<Task, ClientError> {
        let request = self
            .mutating(self.http.put(self.task_endpoint(task.id)?), token)
            .json(task);
        let response = Self::send(request).await?;
        Ok(response.json::<Task>().await?)
    }

    pub async fn delete_task(&self, token: &str, id: TaskId) -> Result<(), ClientError> {
        let request = self.mutating(self.http.delete(self.task_endpoint(id)?), token);
        Self::send(request).await?;
        Ok(())
    }

    /// `POST /api/todos/clear_completed/`. Whatever body the server sends back is ignored.
    pub async fn clear_completed(&self, token: &str) -> Result<(), ClientError> {
        let request = self.mutating(self.http.post(self.endpoint(CLEAR_COMPLETED_PATH)?), token);
        Self::send(request).await?;
        Ok(())
    }
}
