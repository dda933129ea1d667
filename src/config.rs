use reqwest::Url;
use std::env;
use std::path::PathBuf;

use crate::api::csrf;
use crate::error::ClientError;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_STORE_PATH: &str = ".todo-client.json";

pub struct Config {
    pub api_url: Url,
    pub store_path: PathBuf,
    /// Raw `Cookie` string as the browser would hold it, e.g. `csrftoken=abc; sessionid=xyz`.
    pub cookies: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ClientError> {
        let api_url = env::var("TODO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&api_url).map_err(|e| {
            ClientError::Validation(format!("TODO_API_URL is not a valid URL: {}", e))
        })?;

        Ok(Self {
            api_url,
            store_path: env::var("TODO_STORE_PATH")
                .unwrap_or_else(|_| DEFAULT_STORE_PATH.to_string())
                .into(),
            cookies: env::var("TODO_COOKIES").ok(),
        })
    }

    /// The CSRF token sent with mutating requests, read from the `csrftoken` cookie.
    pub fn csrf_token(&self) -> Option<String> {
        self.cookies
            .as_deref()
            .and_then(|cookies| csrf::cookie_value(cookies, csrf::CSRF_COOKIE))
    }
}
