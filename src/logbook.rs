use std::path::Path;

use thiserror::Error;

pub mod airport_manager;
pub mod flight;
pub mod time_format;

pub use airport_manager::{AirportManager, AirportRecord};
pub use flight::{compute_night_records, load_flights, Flight, FlightNightRecord, LogbookTotals};

#[derive(Debug, Error)]
pub enum LogbookError {
    #[error("Could not read '{path}': {source}")]
    Io { path: String, source: std::io::Error },

    #[error("Could not parse json: {0}")]
    Parse(#[from] serde_json::Error),
}

impl LogbookError {
    pub fn io(path: &Path, source: std::io::Error) -> LogbookError {
        LogbookError::Io { path: path.display().to_string(), source }
    }
}
