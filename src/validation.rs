use crate::error::ValidationError;

/// Validator for inbound coordinates.
pub struct Validator;

impl Validator {
    /// Validate latitude value.
    pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
        if lat.is_nan() || !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::InvalidLatitude(lat));
        }
        Ok(())
    }

    /// Validate longitude value.
    pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
        if lon.is_nan() || !(-180.0..=180.0).contains(&lon) {
            return Err(ValidationError::InvalidLongitude(lon));
        }
        Ok(())
    }

    pub fn validate_coordinate(lat: f64, lon: f64) -> Result<(), ValidationError> {
        Self::validate_latitude(lat)?;
        Self::validate_longitude(lon)?;
        Ok(())
    }
}
