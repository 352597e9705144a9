use crate::api::handlers::{error_response, message, Message};
use crate::auth::Authenticator;
use axum::{extract::Extension, http::StatusCode, response::Json};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug)]
pub struct Login {
    username: String,
    #[schema(value_type = String, format = Password)]
    password: SecretString,
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = Login,
    responses (
        (status = 200, description = "Login successful; caller must still run the 2FA step when twoFactorEnabled is true", body = Message),
        (status = 400, description = "Missing username or password", body = Message),
        (status = 401, description = "Invalid username or password", body = Message),
    ),
    tag = "auth"
)]
#[instrument(skip(auth))]
pub async fn login(
    auth: Extension<Arc<Authenticator>>,
    payload: Option<Json<Login>>,
) -> (StatusCode, Json<Value>) {
    let Some(Json(login)) = payload else {
        return message(StatusCode::BAD_REQUEST, "Missing payload");
    };

    debug!("login request: {:?}", login);

    match auth.authenticate(&login.username, &login.password).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "message": "Login successful.",
                "twoFactorEnabled": outcome.two_factor_enabled,
            })),
        ),
        // Unknown username and wrong password share one message on purpose
        Err(err) => error_response(&err, "Invalid username or password."),
    }
}
