use sqlx::SqlitePool;
use std::sync::Arc;

use crate::models::{Device, DeviceResponse};
use crate::registry::TrackerRegistry;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub registry: Arc<TrackerRegistry>,
    pub webhook_base_url: Arc<str>,
}

impl AppState {
    pub fn new(pool: SqlitePool, registry: TrackerRegistry, webhook_base_url: &str) -> Self {
        Self {
            pool,
            registry: Arc::new(registry),
            webhook_base_url: Arc::from(webhook_base_url.trim_end_matches('/')),
        }
    }

    pub fn webhook_url(&self, webhook_id: &str) -> String {
        format!("{}/{}", self.webhook_base_url, webhook_id)
    }

    pub fn device_response(&self, device: &Device) -> DeviceResponse {
        DeviceResponse {
            device_name: device.device_name.clone(),
            webhook_id: device.webhook_id.clone(),
            webhook_url: self.webhook_url(&device.webhook_id),
        }
    }
}
