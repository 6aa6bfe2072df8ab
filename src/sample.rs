use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::geo::Coordinate;

pub const LATITUDE_KEY: &str = "latitude";
pub const LONGITUDE_KEY: &str = "longitude";

/// One inbound location ping for a device.
///
/// `extra` holds every payload key except `latitude`/`longitude`, untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationSample {
    pub coordinate: Option<Coordinate>,
    pub extra: Map<String, Value>,
}

impl LocationSample {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate: Some(coordinate),
            extra: Map::new(),
        }
    }

    /// A ping that carries attributes only.
    pub fn attributes_only(extra: Map<String, Value>) -> Self {
        Self {
            coordinate: None,
            extra,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Split a JSON object payload into a sample.
    ///
    /// A position is only taken when both keys are present; a payload with
    /// just one of them becomes an attribute-only sample. Present keys must
    /// hold in-range numbers.
    pub fn from_payload(mut payload: Map<String, Value>) -> Result<Self, ValidationError> {
        let latitude = payload.remove(LATITUDE_KEY);
        let longitude = payload.remove(LONGITUDE_KEY);

        let coordinate = match (latitude, longitude) {
            (Some(lat), Some(lon)) => {
                let lat = lat
                    .as_f64()
                    .ok_or(ValidationError::NotANumber(LATITUDE_KEY))?;
                let lon = lon
                    .as_f64()
                    .ok_or(ValidationError::NotANumber(LONGITUDE_KEY))?;
                Some(Coordinate::new(lat, lon)?)
            }
            _ => None,
        };

        Ok(Self {
            coordinate,
            extra: payload,
        })
    }
}
