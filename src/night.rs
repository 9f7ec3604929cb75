pub mod data_structures;
pub mod estimator;
pub mod flight_window;

pub use data_structures::{GeoPoint, NightTime, SunWindow, UnavailableReason};
pub use estimator::{count_night_minutes, NightTimeEstimator};
pub use flight_window::{FlightTimeError, FlightWindow};
