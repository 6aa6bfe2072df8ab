use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::geo::Coordinate;
use crate::tracker::{MotionPolicy, DEFAULT_METERS_PER_MILE, DEFAULT_SIGNIFICANT_CHANGE_M};

/// Server configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub database_url: String,
    pub external_url: String,
    pub home: Coordinate,
    pub policy: MotionPolicy,
}

impl Config {
    /// Load configuration from environment variables.
    /// HOMEWARD_HOME_LATITUDE and HOMEWARD_HOME_LONGITUDE are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("HOMEWARD_DATABASE_URL")
            .unwrap_or_else(|| "sqlite://homeward.db".to_string());

        let listen_addr: SocketAddr = lookup("HOMEWARD_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid(
                    "HOMEWARD_LISTEN_ADDR",
                    "must be a valid socket address".to_string(),
                )
            })?;

        let external_url = lookup("HOMEWARD_EXTERNAL_URL")
            .unwrap_or_else(|| format!("http://{}", listen_addr))
            .trim_end_matches('/')
            .to_string();

        let latitude: f64 = required(&lookup, "HOMEWARD_HOME_LATITUDE")?;
        let longitude: f64 = required(&lookup, "HOMEWARD_HOME_LONGITUDE")?;
        let home = Coordinate::new(latitude, longitude)
            .map_err(|e| ConfigError::Invalid("HOMEWARD_HOME_LATITUDE/LONGITUDE", e.to_string()))?;

        let policy = MotionPolicy {
            significant_change_m: positive(
                &lookup,
                "HOMEWARD_SIGNIFICANT_CHANGE_METERS",
                DEFAULT_SIGNIFICANT_CHANGE_M,
            )?,
            meters_per_mile: positive(&lookup, "HOMEWARD_METERS_PER_MILE", DEFAULT_METERS_PER_MILE)?,
        };

        Ok(Config {
            listen_addr,
            database_url,
            external_url,
            home,
            policy,
        })
    }

    pub fn webhook_base_url(&self) -> String {
        format!("{}/api/webhook", self.external_url)
    }
}

fn required<T, F>(lookup: &F, name: &'static str) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .ok_or(ConfigError::Missing(name))?
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(name, "must be a number".to_string()))
}

fn positive<F>(lookup: &F, name: &'static str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::Invalid(name, "must be a number".to_string()))?,
        None => default,
    };
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::Invalid(name, "must be greater than zero".to_string()));
    }
    Ok(value)
}
