use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const EARTH_RADIUS: f64 = 6371.0;   // [km]

/// Latitude + longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint { latitude, longitude }
    }

    /// Builds a point from nullable coordinates as they come from airport records.
    pub fn from_optional(latitude: Option<f64>, longitude: Option<f64>) -> Option<GeoPoint> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance in km.
    pub fn distance_in_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lon1 = self.longitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let lon2 = other.longitude.to_radians();

        let arg = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon2 - lon1).cos();
        if arg >= 1.0 {
            return 0_f64;
        }

        arg.acos() * EARTH_RADIUS
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lat:{:.4}; lon:{:.4}", self.latitude, self.longitude)
    }
}

/// Sunrise and sunset of a single location on a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunWindow {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

impl SunWindow {
    pub fn new(sunrise: DateTime<Utc>, sunset: DateTime<Utc>) -> SunWindow {
        SunWindow { sunrise, sunset }
    }
}

impl fmt::Display for SunWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sunrise {} / sunset {}", self.sunrise.format("%H:%M"), self.sunset.format("%H:%M"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    MissingCoordinates,
    InvalidCoordinates,
    InvalidFlightTime,
    OracleUnavailable,
    DegenerateWindow,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnavailableReason::MissingCoordinates => "missing airport coordinates",
            UnavailableReason::InvalidCoordinates => "airport coordinates out of range",
            UnavailableReason::InvalidFlightTime => "unparsable flight time",
            UnavailableReason::OracleUnavailable => "sun times not available",
            UnavailableReason::DegenerateWindow => "flight has no duration",
        };
        write!(f, "{s}")
    }
}

/// Outcome of a night time estimate. Keeps "could not compute" apart from "zero minutes".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NightTime {
    Computed(u32),
    Unavailable(UnavailableReason),
}

impl NightTime {
    pub fn minutes(&self) -> Option<u32> {
        match self {
            NightTime::Computed(minutes) => Some(*minutes),
            NightTime::Unavailable(_) => None,
        }
    }

    /// Night minutes, with every unavailable outcome collapsed into 0.
    pub fn minutes_or_zero(&self) -> u32 {
        self.minutes().unwrap_or(0)
    }
}
