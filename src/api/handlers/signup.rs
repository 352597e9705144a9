use crate::api::handlers::{error_response, message, valid_username, Message};
use crate::auth::Authenticator;
use axum::{extract::Extension, http::StatusCode, response::Json};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug)]
pub struct Signup {
    username: String,
    #[schema(value_type = String, format = Password)]
    password: SecretString,
}

#[utoipa::path(
    post,
    path = "/api/signup",
    request_body = Signup,
    responses (
        (status = 201, description = "Signup successful", body = Message),
        (status = 400, description = "Missing input or password requirements not met", body = Message),
        (status = 409, description = "Username already exists", body = Message),
    ),
    tag = "auth"
)]
#[instrument(skip(auth))]
pub async fn signup(
    auth: Extension<Arc<Authenticator>>,
    payload: Option<Json<Signup>>,
) -> (StatusCode, Json<Value>) {
    let Some(Json(signup)) = payload else {
        return message(StatusCode::BAD_REQUEST, "Missing payload");
    };

    // SecretString keeps the password out of the log line
    debug!("signup request: {:?}", signup);

    if !valid_username(&signup.username) {
        return message(StatusCode::BAD_REQUEST, "Invalid username.");
    }

    match auth.register(&signup.username, &signup.password).await {
        Ok(account) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Signup successful.",
                "user": {
                    "id": account.id,
                    "username": account.username,
                    "twoFactorEnabled": account.two_factor_enabled,
                },
            })),
        ),
        Err(err) => error_response(&err, "Unauthorized"),
    }
}
