use serde::{Deserialize, Serialize};
use validator::Validate;

/// Profile of the signed-in user, as returned by the login endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// An authenticated session: the opaque token plus the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Body of a login answer. A success status does not guarantee a session:
/// the server may still report `{"error": ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LoginResponse {
    Success(Session),
    Failure { error: String },
}

/// Registration form, serialized as-is as the request body.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Checked locally; the request is never sent when it differs from `password`.
    #[validate(must_match = "password")]
    pub password_confirm: String,
}
