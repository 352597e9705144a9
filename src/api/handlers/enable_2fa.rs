use crate::api::handlers::{error_response, message, Message};
use crate::auth::Authenticator;
use axum::{extract::Extension, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug)]
pub struct EnableTwoFactor {
    username: String,
}

#[utoipa::path(
    post,
    path = "/api/enable-2fa",
    request_body = EnableTwoFactor,
    responses (
        (status = 200, description = "2FA enabled; returns the secret, provisioning URI and QR data URL", body = Message),
        (status = 404, description = "User not found", body = Message),
    ),
    tag = "auth"
)]
#[instrument(skip(auth))]
pub async fn enable_2fa(
    auth: Extension<Arc<Authenticator>>,
    payload: Option<Json<EnableTwoFactor>>,
) -> (StatusCode, Json<Value>) {
    let Some(Json(request)) = payload else {
        return message(StatusCode::BAD_REQUEST, "Missing payload");
    };

    debug!("enable-2fa request: {:?}", request);

    match auth.enable_two_factor(&request.username).await {
        Ok(enrollment) => (
            StatusCode::OK,
            Json(json!({
                "message": "2FA enabled.",
                "secret": enrollment.secret_base32,
                "otpauthUrl": enrollment.provisioning_uri,
                "qrCode": enrollment.qr_png_base64,
            })),
        ),
        Err(err) => error_response(&err, "Unauthorized"),
    }
}
