use log::error;
use std::time::Duration;

use super::{Page, Redirect};
use crate::auth::{register_error_message, AuthController};
use crate::error::ClientError;
use crate::models::RegisterInput;
use crate::storage::KeyValueStore;
use crate::view::Notice;

pub const LOGIN_REDIRECT_DELAY: Duration = Duration::from_millis(1000);
pub const SWITCH_TO_LOGIN_DELAY: Duration = Duration::from_millis(1500);

pub const LOGIN_SUCCESS: &str = "Login successful! Redirecting...";
pub const LOGIN_FAILED: &str = "Login failed. Please try again.";
pub const REGISTER_SUCCESS: &str = "Registration successful! Please login with your credentials.";
pub const REGISTER_FAILED: &str = "Registration failed. Please try again.";
pub const NETWORK_ERROR: &str = "Network error. Please try again.";

#[derive(Debug, Clone)]
pub enum AuthEvent {
    Loaded,
    LoginSubmitted { username: String, password: String },
    RegisterSubmitted(RegisterInput),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AuthUpdate {
    pub notice: Option<Notice>,
    pub redirect: Option<Redirect>,
    /// Show the login form after this delay.
    pub switch_to_login: Option<Duration>,
    pub reset_register_form: bool,
}

impl AuthUpdate {
    fn notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            ..Self::default()
        }
    }
}

pub struct AuthPage<S> {
    controller: AuthController<S>,
}

impl<S: KeyValueStore> AuthPage<S> {
    pub fn new(controller: AuthController<S>) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &AuthController<S> {
        &self.controller
    }

    pub async fn dispatch(&mut self, event: AuthEvent) -> AuthUpdate {
        match event {
            AuthEvent::Loaded => self.on_loaded(),
            AuthEvent::LoginSubmitted { username, password } => {
                self.on_login(&username, &password).await
            }
            AuthEvent::RegisterSubmitted(input) => self.on_register(&input).await,
        }
    }

    fn on_loaded(&self) -> AuthUpdate {
        match self.controller.existing_session() {
            Some(_) => AuthUpdate {
                redirect: Some(Redirect::now(Page::App)),
                ..AuthUpdate::default()
            },
            None => AuthUpdate::default(),
        }
    }

    async fn on_login(&mut self, username: &str, password: &str) -> AuthUpdate {
        match self.controller.login(username, password).await {
            Ok(_) => AuthUpdate {
                notice: Some(Notice::success(LOGIN_SUCCESS)),
                redirect: Some(Redirect::after(Page::App, LOGIN_REDIRECT_DELAY)),
                ..AuthUpdate::default()
            },
            // A 401 here sends the user to the page they are already on,
            // so the server's explanation is still shown.
            Err(err) => {
                error!("Login error: {}", err);
                let text = match &err {
                    ClientError::Transport(_) => NETWORK_ERROR.to_string(),
                    other => other
                        .server_message()
                        .map(str::to_string)
                        .unwrap_or_else(|| LOGIN_FAILED.to_string()),
                };
                AuthUpdate::notice(Notice::danger(text))
            }
        }
    }

    async fn on_register(&mut self, input: &RegisterInput) -> AuthUpdate {
        match self.controller.register(input).await {
            Ok(()) => AuthUpdate {
                notice: Some(Notice::success(REGISTER_SUCCESS)),
                switch_to_login: Some(SWITCH_TO_LOGIN_DELAY),
                reset_register_form: true,
                ..AuthUpdate::default()
            },
            Err(ClientError::Validation(message)) => AuthUpdate::notice(Notice::danger(message)),
            Err(err) => {
                error!("Registration error: {}", err);
                let text = match &err {
                    ClientError::Transport(_) => NETWORK_ERROR.to_string(),
                    ClientError::Api {
                        body: Some(body), ..
                    } => register_error_message(body).unwrap_or_else(|| REGISTER_FAILED.to_string()),
                    _ => REGISTER_FAILED.to_string(),
                };
                AuthUpdate::notice(Notice::danger(text))
            }
        }
    }
}
