use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::registry::TrackedDevice;
use crate::tracker::Attributes;

/// A registered device (persisted).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Device {
    pub id: i64,
    pub webhook_id: String,
    pub device_name: String,
    pub created_epoch_ms: i64,
}

/// Request to register a new device.
#[derive(Debug, Deserialize)]
pub struct RegisterDeviceRequest {
    pub device_name: String,
}

/// A device together with the URL it should post locations to.
#[derive(Debug, Serialize)]
pub struct DeviceResponse {
    pub device_name: String,
    pub webhook_id: String,
    pub webhook_url: String,
}

/// Response for listing devices.
#[derive(Debug, Serialize)]
pub struct ListDevicesResponse {
    pub devices: Vec<DeviceResponse>,
}

/// Body returned by the location webhook.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WebhookResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Current state of a tracked device as exposed to consumers.
#[derive(Debug, Serialize)]
pub struct EntityStateResponse {
    pub unique_id: String,
    pub name: String,
    pub device_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub attributes: Attributes,
}

impl From<&TrackedDevice> for EntityStateResponse {
    fn from(device: &TrackedDevice) -> Self {
        let position = device.tracker.state().current_position;
        Self {
            unique_id: device.unique_id(),
            name: device.name(),
            device_name: device.device_name.clone(),
            latitude: position.map(|p| p.latitude),
            longitude: position.map(|p| p.longitude),
            attributes: device.tracker.state_attributes(),
        }
    }
}

/// Attributes an operator may remove.
#[derive(Debug, Serialize)]
pub struct DeletableAttributesResponse {
    pub deletable: Vec<String>,
}

/// Request to remove attributes from a device.
#[derive(Debug, Deserialize)]
pub struct DeleteAttributesRequest {
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// Error returned by the management endpoints.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::EmptyDeviceName => ApiError::BadRequest(err.to_string()),
            RegistryError::DuplicateDevice(_) => ApiError::Conflict(err.to_string()),
            RegistryError::UnknownWebhook(_) => ApiError::NotFound(err.to_string()),
            RegistryError::Database(e) => {
                tracing::error!("Database error: {}", e);
                ApiError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        RegistryError::Database(err).into()
    }
}
