//! Login and registration against the API, and the stored session they produce.

use log::{info, warn};
use serde_json::Value;
use validator::Validate;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::{LoginInput, LoginResponse, RegisterInput, Session};
use crate::storage::{KeyValueStore, SessionStore};

pub const PASSWORD_MISMATCH: &str = "Passwords do not match.";

/// Registration error fields in the order they are reported. Only the first present one is shown.
const REGISTER_ERROR_FIELDS: [(&str, Option<&str>); 4] = [
    ("username", Some("Username")),
    ("email", Some("Email")),
    ("password", Some("Password")),
    ("non_field_errors", None),
];

pub struct AuthController<S> {
    api: ApiClient,
    sessions: SessionStore<S>,
}

impl<S: KeyValueStore> AuthController<S> {
    pub fn new(api: ApiClient, sessions: SessionStore<S>) -> Self {
        Self { api, sessions }
    }

    pub fn sessions(&self) -> &SessionStore<S> {
        &self.sessions
    }

    /// The stored session, if any. Never touches the network.
    pub fn existing_session(&self) -> Option<Session> {
        self.sessions.load()
    }

    /// Exchanges credentials for a session and persists it.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Session, ClientError> {
        let input = LoginInput {
            username: username.to_string(),
            password: password.to_string(),
        };

        let result = self.api.login(&input).await;
        match self.guard(result)? {
            LoginResponse::Success(session) => {
                self.sessions.save(&session)?;
                info!("Signed in as {}", session.user.username);
                Ok(session)
            }
            LoginResponse::Failure { error } => Err(ClientError::Rejected(error)),
        }
    }

    /// Creates an account. Mismatched passwords fail before any request is made.
    pub async fn register(&mut self, input: &RegisterInput) -> Result<(), ClientError> {
        input
            .validate()
            .map_err(|_| ClientError::Validation(PASSWORD_MISMATCH.to_string()))?;

        let result = self.api.register(input).await;
        self.guard(result)?;
        info!("Registered {}", input.username);
        Ok(())
    }

    /// A 401 from any endpoint invalidates whatever session is stored.
    fn guard<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(err) = &result {
            if err.is_unauthorized() {
                if let Err(e) = self.sessions.clear() {
                    warn!("Failed to clear stored session: {}", e);
                }
            }
        }
        result
    }
}

/// Collapses a field-error map such as `{"email": ["Enter a valid email address."]}`
/// into one line, checking `username`, `email`, `password`, then `non_field_errors`.
pub fn register_error_message(body: &Value) -> Option<String> {
    REGISTER_ERROR_FIELDS.iter().find_map(|(field, label)| {
        let messages = join_messages(body.get(*field)?)?;
        Some(match label {
            Some(label) => format!("{}: {}", label, messages),
            None => messages,
        })
    })
}

fn join_messages(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" "),
        ),
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
