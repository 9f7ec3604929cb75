//! Night time estimation for pilot logbook flights.
//!
//! The estimator takes a flight's date, takeoff and landing times (UTC) and
//! the positions of both airports, asks a [`sun::SunTimesSource`] for
//! sunrise/sunset at each end and counts the minutes flown in darkness while
//! the day/night boundary is interpolated along the route.

pub mod configuration;
pub mod logbook;
pub mod night;
pub mod sun;

pub use night::{GeoPoint, NightTime, NightTimeEstimator, SunWindow, UnavailableReason};
pub use sun::{SunTimesError, SunTimesSource};
