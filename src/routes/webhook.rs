use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;

use crate::error::{DispatchError, ValidationError};
use crate::models::WebhookResponse;
use crate::sample::{LocationSample, LATITUDE_KEY, LONGITUDE_KEY};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/webhook/{webhook_id}", post(handle_webhook))
}

fn reject(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(WebhookResponse::rejected(message)),
    )
        .into_response()
}

/// POST /api/webhook/{webhook_id} - Deliver a location payload to a device.
async fn handle_webhook(
    State(state): State<AppState>,
    Path(webhook_id): Path<String>,
    body: Bytes,
) -> Response {
    let payload = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => map,
        _ => {
            tracing::error!("Received invalid JSON for webhook {}", webhook_id);
            return reject("Invalid JSON");
        }
    };

    if !payload.contains_key(LATITUDE_KEY) || !payload.contains_key(LONGITUDE_KEY) {
        tracing::error!(
            "Received payload without latitude or longitude for webhook {}",
            webhook_id
        );
        return reject(ValidationError::MissingCoordinates.to_string());
    }

    let sample = match LocationSample::from_payload(payload) {
        Ok(sample) => sample,
        Err(e) => {
            tracing::warn!("Rejected payload for webhook {}: {}", webhook_id, e);
            return reject(e.to_string());
        }
    };

    // Stamped on arrival; a delivery queued behind the device lock keeps
    // its arrival time as `last_updated`.
    let received_at = Utc::now();
    match state.registry.dispatch(&webhook_id, &sample, received_at).await {
        Ok(_) => (StatusCode::OK, Json(WebhookResponse::ok())).into_response(),
        Err(DispatchError::UnknownWebhook(_)) => {
            tracing::error!("Received data for unknown webhook: {}", webhook_id);
            reject("Unknown webhook ID")
        }
        Err(DispatchError::Validation(e)) => {
            tracing::warn!("Rejected payload for webhook {}: {}", webhook_id, e);
            reject(e.to_string())
        }
    }
}
