pub mod config;
pub mod db;
pub mod error;
pub mod geo;
pub mod models;
pub mod registry;
pub mod routes;
pub mod sample;
pub mod state;
pub mod tracker;
pub mod validation;

pub use config::Config;
pub use db::{init_pool, list_devices, run_migrations};
pub use error::{ConfigError, DispatchError, RegistryError, ValidationError};
pub use geo::{calculate_bearing, calculate_distance, get_cardinal_direction, Coordinate};
pub use models::{ApiError, Device};
pub use registry::{TrackedDevice, TrackerRegistry};
pub use routes::create_router;
pub use sample::LocationSample;
pub use state::AppState;
pub use tracker::{Attributes, Direction, MotionPolicy, MotionTracker, TrackerState};
