//! Binding from webhook ids to the trackers that own them.
//!
//! Each device sits behind its own async mutex. Deliveries for one device
//! queue on that mutex in arrival order and apply one at a time; different
//! devices never contend.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::error::{DispatchError, RegistryError};
use crate::geo::Coordinate;
use crate::models::Device;
use crate::sample::{LocationSample, LATITUDE_KEY, LONGITUDE_KEY};
use crate::tracker::{Attributes, MotionPolicy, MotionTracker, DERIVED_KEYS};

pub const ENTITY_ID_PREFIX: &str = "homeward";

/// Keys an operator is never offered for removal.
const RESERVED_KEYS: [&str; 4] = ["friendly_name", "icon", LATITUDE_KEY, LONGITUDE_KEY];

/// A device registration plus its live tracker.
#[derive(Debug)]
pub struct TrackedDevice {
    pub webhook_id: String,
    pub device_name: String,
    pub tracker: MotionTracker,
}

impl TrackedDevice {
    pub fn unique_id(&self) -> String {
        format!("{}_{}", ENTITY_ID_PREFIX, self.webhook_id)
    }

    pub fn name(&self) -> String {
        format!("Tracker {}", self.device_name)
    }

    /// Attribute keys that came from the device rather than the tracker, sorted.
    pub fn deletable_attributes(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .tracker
            .attributes()
            .keys()
            .filter(|k| !RESERVED_KEYS.contains(&k.as_str()) && !DERIVED_KEYS.contains(&k.as_str()))
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

pub type SharedDevice = Arc<Mutex<TrackedDevice>>;

/// Owned collection of every tracked device.
pub struct TrackerRegistry {
    home: Coordinate,
    policy: MotionPolicy,
    devices: DashMap<String, SharedDevice>,
}

impl TrackerRegistry {
    pub fn new(home: Coordinate, policy: MotionPolicy) -> Self {
        Self {
            home,
            policy,
            devices: DashMap::new(),
        }
    }

    /// Start tracking a device with fresh state.
    ///
    /// An existing tracker under the same webhook id is replaced.
    pub fn setup(&self, webhook_id: &str, device_name: &str) -> SharedDevice {
        let device = Arc::new(Mutex::new(TrackedDevice {
            webhook_id: webhook_id.to_string(),
            device_name: device_name.to_string(),
            tracker: MotionTracker::new(self.home, self.policy),
        }));
        self.devices
            .insert(webhook_id.to_string(), Arc::clone(&device));
        tracing::info!("Tracking device {} ({})", device_name, webhook_id);
        device
    }

    /// Set up a tracker for every persisted registration.
    pub fn restore(&self, devices: &[Device]) {
        for device in devices {
            self.setup(&device.webhook_id, &device.device_name);
        }
    }

    /// Stop tracking a device and discard its state.
    pub fn teardown(&self, webhook_id: &str) -> Option<SharedDevice> {
        let removed = self.devices.remove(webhook_id).map(|(_, device)| device);
        if removed.is_some() {
            tracing::info!("Stopped tracking {}", webhook_id);
        }
        removed
    }

    pub fn get(&self, webhook_id: &str) -> Option<SharedDevice> {
        self.devices
            .get(webhook_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn get_or_err(&self, webhook_id: &str) -> Result<SharedDevice, RegistryError> {
        self.get(webhook_id)
            .ok_or_else(|| RegistryError::UnknownWebhook(webhook_id.to_string()))
    }

    /// Route a sample to the tracker bound to `webhook_id`.
    pub async fn dispatch(
        &self,
        webhook_id: &str,
        sample: &LocationSample,
        now: DateTime<Utc>,
    ) -> Result<Attributes, DispatchError> {
        let device = self
            .get(webhook_id)
            .ok_or_else(|| DispatchError::UnknownWebhook(webhook_id.to_string()))?;

        let mut device = device.lock().await;
        let attrs = device.tracker.ingest(sample, now)?;
        tracing::debug!(
            device = %device.device_name,
            position = ?sample.coordinate,
            "Location update"
        );
        Ok(attrs)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
