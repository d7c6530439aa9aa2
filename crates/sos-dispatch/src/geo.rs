//! Great-circle math and the coordinate representation shared by every entity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean Earth radius used for every distance in the service, in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Decimal places retained when a coordinate is normalized for storage.
pub const COORDINATE_SCALE: usize = 8;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        haversine_miles(*self, *other)
    }
}

/// Haversine distance between two points in miles. NaN inputs yield NaN.
pub fn haversine_miles(from: Coordinates, to: Coordinates) -> f64 {
    let phi_from = from.latitude.to_radians();
    let phi_to = to.latitude.to_radians();
    let delta_phi = (to.latitude - from.latitude).to_radians();
    let delta_lambda = (to.longitude - from.longitude).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi_from.cos() * phi_to.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

pub fn latitude_in_range(value: f64) -> bool {
    (-90.0..=90.0).contains(&value)
}

pub fn longitude_in_range(value: f64) -> bool {
    (-180.0..=180.0).contains(&value)
}

/// Coordinate stored as a decimal string, the way the wire format carries it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecimalDegrees(String);

impl DecimalDegrees {
    /// Placeholder used when an upstream element carries no position.
    pub fn zero() -> Self {
        Self("0".to_string())
    }

    /// Render a finite value with at most [`COORDINATE_SCALE`] decimals.
    pub fn from_f64(value: f64) -> Self {
        Self(format_degrees(value))
    }

    /// Parse and normalize textual input. Returns `None` for non-numeric or non-finite text.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim().parse::<f64>().ok()?;
        value.is_finite().then(|| Self::from_f64(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value; NaN when the stored text is not a number.
    pub fn value(&self) -> f64 {
        self.0.trim().parse().unwrap_or(f64::NAN)
    }
}

impl fmt::Display for DecimalDegrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn format_degrees(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let plain = value.to_string();
    match plain.split_once('.') {
        Some((_, fraction)) if fraction.len() > COORDINATE_SCALE => {
            let fixed = format!("{value:.prec$}", prec = COORDINATE_SCALE);
            fixed.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => plain,
    }
}

/// Coordinate as submitted by clients: either a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateInput {
    Number(f64),
    Text(String),
}

impl CoordinateInput {
    pub fn normalize(&self) -> Option<DecimalDegrees> {
        match self {
            CoordinateInput::Number(value) if value.is_finite() => {
                Some(DecimalDegrees::from_f64(*value))
            }
            CoordinateInput::Number(_) => None,
            CoordinateInput::Text(raw) => DecimalDegrees::parse(raw),
        }
    }
}

impl From<f64> for CoordinateInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for CoordinateInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
