use crate::api::handlers::{error_response, message, Message};
use crate::auth::Authenticator;
use axum::{extract::Extension, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug)]
pub struct VerifyTwoFactor {
    username: String,
    token: String,
}

#[utoipa::path(
    post,
    path = "/api/verify-2fa",
    request_body = VerifyTwoFactor,
    responses (
        (status = 200, description = "Authentication successful", body = Message),
        (status = 401, description = "Invalid 2FA code", body = Message),
        (status = 404, description = "User not found", body = Message),
    ),
    tag = "auth"
)]
#[instrument(skip(auth))]
pub async fn verify_2fa(
    auth: Extension<Arc<Authenticator>>,
    payload: Option<Json<VerifyTwoFactor>>,
) -> (StatusCode, Json<Value>) {
    let Some(Json(request)) = payload else {
        return message(StatusCode::BAD_REQUEST, "Missing payload");
    };

    debug!("verify-2fa request: {:?}", request);

    match auth.verify_two_factor(&request.username, &request.token).await {
        Ok(()) => message(StatusCode::OK, "Authentication successful."),
        Err(err) => error_response(&err, "Invalid 2FA code."),
    }
}
