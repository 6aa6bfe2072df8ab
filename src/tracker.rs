//! Per-device motion tracking.
//!
//! A [`MotionTracker`] turns a stream of location samples into distance
//! metrics and a debounced towards/away-from-home direction. Small moves are
//! accumulated as drift; the direction is only re-evaluated once the drift
//! since the last decision reaches [`MotionPolicy::significant_change_m`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::geo::{get_cardinal_direction, Coordinate};
use crate::sample::{LocationSample, LATITUDE_KEY, LONGITUDE_KEY};
use crate::validation::Validator;

pub const DISTANCE_METERS_KEY: &str = "distance_from_home_meters";
pub const DISTANCE_MILES_KEY: &str = "distance_from_home_miles";
pub const DIRECTION_KEY: &str = "direction_relative_to_home";
pub const CARDINAL_KEY: &str = "cardinal_direction_from_home";
pub const LAST_UPDATED_KEY: &str = "last_updated";
pub const LAST_SIGNIFICANT_CHANGE_KEY: &str = "time_since_last_significant_change";

/// Written to `time_since_last_significant_change` before the first event.
pub const NO_SIGNIFICANT_CHANGE: &str = "N/A";

/// Attribute keys the tracker derives itself.
pub const DERIVED_KEYS: [&str; 6] = [
    DISTANCE_METERS_KEY,
    DISTANCE_MILES_KEY,
    DIRECTION_KEY,
    CARDINAL_KEY,
    LAST_UPDATED_KEY,
    LAST_SIGNIFICANT_CHANGE_KEY,
];

pub const DEFAULT_SIGNIFICANT_CHANGE_M: f64 = 10.0;
pub const DEFAULT_METERS_PER_MILE: f64 = 1609.34;

/// Flat string-keyed attribute mapping exposed to consumers.
pub type Attributes = Map<String, Value>;

/// Coarse movement relative to home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Stationary,
    Towards,
    AwayFrom,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Stationary => "stationary",
            Direction::Towards => "towards",
            Direction::AwayFrom => "away_from",
        }
    }

    fn between(baseline: f64, current: f64) -> Self {
        if current > baseline {
            Direction::AwayFrom
        } else if current < baseline {
            Direction::Towards
        } else {
            Direction::Stationary
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunable thresholds for motion classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionPolicy {
    /// Accumulated drift, in meters, that triggers a new direction decision.
    pub significant_change_m: f64,
    pub meters_per_mile: f64,
}

impl Default for MotionPolicy {
    fn default() -> Self {
        Self {
            significant_change_m: DEFAULT_SIGNIFICANT_CHANGE_M,
            meters_per_mile: DEFAULT_METERS_PER_MILE,
        }
    }
}

/// Mutable state owned by one device's tracker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerState {
    pub current_position: Option<Coordinate>,
    /// Distance from home at the last direction decision.
    pub last_significant_distance: Option<f64>,
    /// Drift accumulated since the last decision. Never negative.
    pub cumulative_change: f64,
    pub direction: Direction,
    pub last_significant_change_time: Option<DateTime<Utc>>,
    pub extra_attributes: Attributes,
}

/// Stateful motion classifier for a single device.
#[derive(Debug, Clone)]
pub struct MotionTracker {
    home: Coordinate,
    policy: MotionPolicy,
    state: TrackerState,
}

impl MotionTracker {
    pub fn new(home: Coordinate, policy: MotionPolicy) -> Self {
        Self {
            home,
            policy,
            state: TrackerState::default(),
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn attributes(&self) -> &Attributes {
        &self.state.extra_attributes
    }

    /// Apply one sample and return the updated attribute mapping.
    ///
    /// The coordinate is checked before anything is touched, so a rejected
    /// sample leaves the state exactly as it was.
    pub fn ingest(
        &mut self,
        sample: &LocationSample,
        now: DateTime<Utc>,
    ) -> Result<Attributes, ValidationError> {
        if let Some(position) = sample.coordinate {
            Validator::validate_coordinate(position.latitude, position.longitude)?;
            self.update_position(position, now);
        }

        for (key, value) in &sample.extra {
            if key != LATITUDE_KEY && key != LONGITUDE_KEY {
                self.state
                    .extra_attributes
                    .insert(key.clone(), value.clone());
            }
        }

        Ok(self.state.extra_attributes.clone())
    }

    /// Drop the named attributes. Missing keys are ignored.
    ///
    /// Returns how many attributes were actually removed.
    pub fn remove_attributes<I, K>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        keys.into_iter()
            .filter(|key| self.state.extra_attributes.remove(key.as_ref()).is_some())
            .count()
    }

    /// Full attribute view: the position (when known) followed by every
    /// tracked attribute.
    pub fn state_attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        if let Some(position) = self.state.current_position {
            attrs.insert(LATITUDE_KEY.to_string(), Value::from(position.latitude));
            attrs.insert(LONGITUDE_KEY.to_string(), Value::from(position.longitude));
        }
        attrs.extend(
            self.state
                .extra_attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        attrs
    }

    fn update_position(&mut self, position: Coordinate, now: DateTime<Utc>) {
        let state = &mut self.state;
        state.current_position = Some(position);

        let current_distance = self.home.distance_to(&position);
        state.extra_attributes.insert(
            DISTANCE_METERS_KEY.to_string(),
            Value::from(round2(current_distance)),
        );
        state.extra_attributes.insert(
            DISTANCE_MILES_KEY.to_string(),
            Value::from(round2(current_distance / self.policy.meters_per_mile)),
        );

        match state.last_significant_distance {
            None => {
                state.last_significant_distance = Some(current_distance);
                state.direction = Direction::Stationary;
                state.extra_attributes.insert(
                    DIRECTION_KEY.to_string(),
                    Value::from(state.direction.as_str()),
                );
            }
            Some(baseline) => {
                state.cumulative_change += (current_distance - baseline).abs();

                if state.cumulative_change >= self.policy.significant_change_m {
                    state.last_significant_change_time = Some(now);
                    state.direction = Direction::between(baseline, current_distance);
                    state.extra_attributes.insert(
                        DIRECTION_KEY.to_string(),
                        Value::from(state.direction.as_str()),
                    );

                    tracing::debug!(
                        direction = %state.direction,
                        distance_m = current_distance,
                        drift_m = state.cumulative_change,
                        "Significant change"
                    );

                    state.last_significant_distance = Some(current_distance);
                    state.cumulative_change = 0.0;
                }
            }
        }

        state.extra_attributes.insert(
            LAST_UPDATED_KEY.to_string(),
            Value::from(now.to_rfc3339()),
        );

        let since = match state.last_significant_change_time {
            Some(at) => at.to_rfc3339(),
            None => NO_SIGNIFICANT_CHANGE.to_string(),
        };
        state
            .extra_attributes
            .insert(LAST_SIGNIFICANT_CHANGE_KEY.to_string(), Value::from(since));

        let cardinal = get_cardinal_direction(self.home.bearing_to(&position));
        state
            .extra_attributes
            .insert(CARDINAL_KEY.to_string(), Value::from(cardinal));
    }
}

/// Two-decimal rounding with ties going to the even digit.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
