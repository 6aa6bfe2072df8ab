use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid latitude {0}: must be between -90 and 90")]
    InvalidLatitude(f64),

    #[error("Invalid longitude {0}: must be between -180 and 180")]
    InvalidLongitude(f64),

    #[error("Latitude and longitude are required")]
    MissingCoordinates,

    #[error("Field {0} must be a number")]
    NotANumber(&'static str),
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Device name cannot be empty")]
    EmptyDeviceName,

    #[error("Device already registered: {0}")]
    DuplicateDevice(String),

    #[error("Unknown webhook ID: {0}")]
    UnknownWebhook(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Failure to route a sample to its tracker.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Unknown webhook ID: {0}")]
    UnknownWebhook(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
