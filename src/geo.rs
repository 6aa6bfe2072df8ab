//! Great-circle math on a spherical Earth.
//!
//! All functions are pure and take degrees. Distances are in meters.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validation::Validator;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Compass labels, clockwise from north, one per 22.5° sector.
pub const CARDINAL_DIRECTIONS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const SECTOR_DEGREES: f64 = 360.0 / 16.0;

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside the valid ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        Validator::validate_coordinate(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        calculate_distance(self.latitude, self.longitude, other.latitude, other.longitude)
    }

    pub fn bearing_to(&self, other: &Coordinate) -> f64 {
        calculate_bearing(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Haversine distance in meters between two points.
pub fn calculate_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial bearing in degrees, in `[0, 360)`, from point 1 towards point 2.
///
/// Identical points have no defined bearing; 0.0 is returned for them.
pub fn calculate_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if lat1 == lat2 && lon1 == lon2 {
        return 0.0;
    }

    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Map a bearing to one of the 16 compass labels.
///
/// Each label owns the sector `label_angle ± 11.25°`. Any finite input is
/// first wrapped into `[0, 360)`.
pub fn get_cardinal_direction(bearing: f64) -> &'static str {
    let bearing = normalize_degrees(bearing);
    let index = ((bearing + SECTOR_DEGREES / 2.0) / SECTOR_DEGREES).floor() as usize;
    CARDINAL_DIRECTIONS[index % CARDINAL_DIRECTIONS.len()]
}

fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OSLO: (f64, f64) = (59.9139, 10.7522);
    const BERGEN: (f64, f64) = (60.3913, 5.3221);

    #[test]
    fn test_distance_to_self_is_zero() {
        for (lat, lon) in [(0.0, 0.0), OSLO, BERGEN, (-89.9, 179.9), (45.0, -120.0)] {
            assert_eq!(calculate_distance(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (OSLO, BERGEN),
            ((0.0, 0.0), (0.0, 0.001)),
            ((-33.8688, 151.2093), (51.5074, -0.1278)),
            ((89.0, 0.0), (-89.0, 180.0)),
        ];
        for ((lat1, lon1), (lat2, lon2)) in pairs {
            let ab = calculate_distance(lat1, lon1, lat2, lon2);
            let ba = calculate_distance(lat2, lon2, lat1, lon1);
            assert!((ab - ba).abs() < 1e-6, "{} != {}", ab, ba);
        }
    }

    #[test]
    fn test_distance_known_values() {
        // One thousandth of a degree along the equator.
        let d = calculate_distance(0.0, 0.0, 0.0, 0.001);
        assert!((d - 111.19).abs() < 0.01, "got {}", d);

        let d = calculate_distance(OSLO.0, OSLO.1, BERGEN.0, BERGEN.1);
        assert!((d - 305_000.0).abs() < 5_000.0, "got {}", d);

        // Antipodes are half the circumference apart.
        let d = calculate_distance(0.0, 0.0, 0.0, 180.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1e-3);
    }

    #[test]
    fn test_bearing_cardinal_axes() {
        assert!((calculate_bearing(0.0, 0.0, 1.0, 0.0) - 0.0).abs() < 1e-9);
        assert!((calculate_bearing(0.0, 0.0, 0.0, 1.0) - 90.0).abs() < 1e-9);
        assert!((calculate_bearing(0.0, 0.0, -1.0, 0.0) - 180.0).abs() < 1e-9);
        assert!((calculate_bearing(0.0, 0.0, 0.0, -1.0) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_in_range() {
        let points = [(0.0, 0.0), OSLO, BERGEN, (-45.0, -170.0), (10.0, 170.0)];
        for &(lat1, lon1) in &points {
            for &(lat2, lon2) in &points {
                let b = calculate_bearing(lat1, lon1, lat2, lon2);
                assert!((0.0..360.0).contains(&b), "bearing {} out of range", b);
            }
        }
    }

    #[test]
    fn test_bearing_identical_points_is_zero() {
        assert_eq!(calculate_bearing(OSLO.0, OSLO.1, OSLO.0, OSLO.1), 0.0);
    }

    #[test]
    fn test_bearing_oslo_to_bergen() {
        let b = calculate_bearing(OSLO.0, OSLO.1, BERGEN.0, BERGEN.1);
        assert!((b - 282.37).abs() < 0.01, "got {}", b);
        assert_eq!(get_cardinal_direction(b), "WNW");
    }

    #[test]
    fn test_cardinal_main_points() {
        assert_eq!(get_cardinal_direction(0.0), "N");
        assert_eq!(get_cardinal_direction(90.0), "E");
        assert_eq!(get_cardinal_direction(180.0), "S");
        assert_eq!(get_cardinal_direction(270.0), "W");
    }

    #[test]
    fn test_cardinal_every_label_centered() {
        for (i, label) in CARDINAL_DIRECTIONS.iter().enumerate() {
            let center = i as f64 * 22.5;
            assert_eq!(get_cardinal_direction(center), *label);
            assert_eq!(get_cardinal_direction(center + 11.0), *label);
            assert_eq!(get_cardinal_direction(center - 11.0), *label);
        }
    }

    #[test]
    fn test_cardinal_sector_boundaries() {
        assert_eq!(get_cardinal_direction(11.24), "N");
        assert_eq!(get_cardinal_direction(11.25), "NNE");
        assert_eq!(get_cardinal_direction(348.75), "N");
        assert_eq!(get_cardinal_direction(348.74), "NNW");
        assert_eq!(get_cardinal_direction(359.99), "N");
    }

    #[test]
    fn test_cardinal_normalizes_input() {
        assert_eq!(get_cardinal_direction(360.0), "N");
        assert_eq!(get_cardinal_direction(450.0), "E");
        assert_eq!(get_cardinal_direction(-90.0), "W");
        assert_eq!(get_cardinal_direction(-1e-12), "N");
    }

    #[test]
    fn test_cardinal_always_a_known_label() {
        let mut b = 0.0;
        while b < 360.0 {
            assert!(CARDINAL_DIRECTIONS.contains(&get_cardinal_direction(b)));
            b += 0.37;
        }
    }

    #[test]
    fn test_coordinate_new_rejects_out_of_range() {
        assert!(Coordinate::new(59.9, 10.7).is_ok());
        assert_eq!(
            Coordinate::new(91.0, 0.0),
            Err(ValidationError::InvalidLatitude(91.0))
        );
        assert_eq!(
            Coordinate::new(0.0, -181.0),
            Err(ValidationError::InvalidLongitude(-181.0))
        );
    }
}
