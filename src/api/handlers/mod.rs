pub mod health;
pub use self::health::health;

pub mod signup;
pub use self::signup::signup;

pub mod login;
pub use self::login::login;

pub mod enable_2fa;
pub use self::enable_2fa::enable_2fa;

pub mod verify_2fa;
pub use self::verify_2fa::verify_2fa;

// common functions for the handlers
use crate::auth::AuthError;
use axum::{http::StatusCode, response::Json};
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;
use utoipa::ToSchema;

/// Generic `{ "message": ... }` response body (documentation schema).
#[derive(ToSchema, Serialize, Debug)]
pub struct Message {
    pub message: String,
}

pub fn valid_username(username: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9._-]{3,64}$").is_ok_and(|re| re.is_match(username))
}

pub(crate) fn message(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": message })))
}

/// Map a core error onto an HTTP response. Each endpoint keeps its own 401
/// wording via `unauthorized_message` without revealing which check failed.
pub(crate) fn error_response(
    err: &AuthError,
    unauthorized_message: &str,
) -> (StatusCode, Json<Value>) {
    match err {
        AuthError::Validation(msg) => message(StatusCode::BAD_REQUEST, msg),
        AuthError::Policy { missing } => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "message": "Password requirements not met.",
                "missing": format!("Your password needs: {}", missing.join(", ")),
            })),
        ),
        AuthError::Conflict => message(StatusCode::CONFLICT, "Username already exists."),
        AuthError::NotFound => message(StatusCode::NOT_FOUND, "User not found."),
        AuthError::Unauthorized => message(StatusCode::UNAUTHORIZED, unauthorized_message),
        AuthError::Internal(err) => {
            error!("internal error: {err:?}");

            message(StatusCode::INTERNAL_SERVER_ERROR, "Server error.")
        }
    }
}
