use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::db;
use crate::error::RegistryError;
use crate::models::{
    ApiError, DeletableAttributesResponse, DeleteAttributesRequest, EntityStateResponse,
    ListDevicesResponse, RegisterDeviceRequest,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/devices", post(register_device).get(list_devices))
        .route("/devices/{webhook_id}", delete(remove_device))
        .route("/devices/{webhook_id}/state", get(device_state))
        .route("/devices/{webhook_id}/attributes", get(deletable_attributes))
        .route(
            "/devices/{webhook_id}/attributes/delete",
            post(delete_attributes),
        )
}

/// POST /devices - Register a device and hand out its webhook URL.
async fn register_device(
    State(state): State<AppState>,
    Json(req): Json<RegisterDeviceRequest>,
) -> Result<Response, ApiError> {
    let device_name = req.device_name.trim();
    if device_name.is_empty() {
        return Err(RegistryError::EmptyDeviceName.into());
    }

    let webhook_id = Uuid::new_v4().simple().to_string();
    let device = db::insert_device(&state.pool, &webhook_id, device_name).await?;
    state
        .registry
        .setup(&device.webhook_id, &device.device_name);

    let response = state.device_response(&device);
    tracing::info!(
        "Registered device {}, webhook URL: {}",
        response.device_name,
        response.webhook_url
    );

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// GET /devices - List registered devices.
async fn list_devices(State(state): State<AppState>) -> Result<Json<ListDevicesResponse>, ApiError> {
    let devices = db::list_devices(&state.pool).await?;
    Ok(Json(ListDevicesResponse {
        devices: devices.iter().map(|d| state.device_response(d)).collect(),
    }))
}

/// DELETE /devices/{webhook_id} - Unregister a device and drop its tracker.
async fn remove_device(
    State(state): State<AppState>,
    Path(webhook_id): Path<String>,
) -> Result<Response, ApiError> {
    let device = db::get_device(&state.pool, &webhook_id)
        .await?
        .ok_or_else(|| RegistryError::UnknownWebhook(webhook_id.clone()))?;

    db::delete_device(&state.pool, &webhook_id).await?;
    state.registry.teardown(&webhook_id);

    Ok(Json(state.device_response(&device)).into_response())
}

/// GET /devices/{webhook_id}/state - Current entity state.
async fn device_state(
    State(state): State<AppState>,
    Path(webhook_id): Path<String>,
) -> Result<Json<EntityStateResponse>, ApiError> {
    let device = state.registry.get_or_err(&webhook_id)?;
    let device = device.lock().await;
    Ok(Json(EntityStateResponse::from(&*device)))
}

/// GET /devices/{webhook_id}/attributes - Attributes that may be removed.
async fn deletable_attributes(
    State(state): State<AppState>,
    Path(webhook_id): Path<String>,
) -> Result<Json<DeletableAttributesResponse>, ApiError> {
    let device = state.registry.get_or_err(&webhook_id)?;
    let device = device.lock().await;
    Ok(Json(DeletableAttributesResponse {
        deletable: device.deletable_attributes(),
    }))
}

/// POST /devices/{webhook_id}/attributes/delete - Remove attributes.
async fn delete_attributes(
    State(state): State<AppState>,
    Path(webhook_id): Path<String>,
    Json(req): Json<DeleteAttributesRequest>,
) -> Result<Json<EntityStateResponse>, ApiError> {
    let device = state.registry.get_or_err(&webhook_id)?;
    let mut device = device.lock().await;

    let removed = device.tracker.remove_attributes(&req.attributes);
    tracing::info!(
        "Removed {} attribute(s) from {}: {}",
        removed,
        device.device_name,
        req.attributes.join(", ")
    );

    Ok(Json(EntityStateResponse::from(&*device)))
}
