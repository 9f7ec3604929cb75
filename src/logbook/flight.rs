use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use log::{info, warn};
use serde::Deserialize;

use crate::logbook::airport_manager::AirportManager;
use crate::logbook::LogbookError;
use crate::night::data_structures::{NightTime, UnavailableReason};
use crate::night::estimator::NightTimeEstimator;
use crate::night::flight_window::FlightWindow;
use crate::sun::SunTimesSource;

/// A flight as recorded in the logbook. Times are "HH:MM" UTC.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Flight {
    #[serde(default)]
    pub id: Option<String>,
    pub date: NaiveDate,
    pub departure_airport_code: String,
    #[serde(default)]
    pub departure_runway: Option<String>,
    pub destination_airport_code: String,
    #[serde(default)]
    pub destination_runway: Option<String>,
    #[serde(default)]
    pub block_start: Option<String>,
    #[serde(default)]
    pub block_end: Option<String>,
    #[serde(default)]
    pub flight_start: Option<String>,
    #[serde(default)]
    pub flight_end: Option<String>,
    #[serde(default)]
    pub total_block_minutes: Option<u32>,
    #[serde(default)]
    pub total_air_minutes: Option<u32>,
    #[serde(default)]
    pub remarks: Option<String>,
}

fn window_minutes(date: NaiveDate, start: &Option<String>, end: &Option<String>) -> Option<u32> {
    let (start, end) = (start.as_deref()?, end.as_deref()?);
    match FlightWindow::parse(date, start, end) {
        Ok(window) => u32::try_from(window.duration_minutes()).ok(),
        Err(e) => {
            warn!("{e}");
            None
        },
    }
}

impl Flight {
    pub fn route(&self) -> String {
        format!("{}-{}", self.departure_airport_code, self.destination_airport_code)
    }

    /// Recorded air time, or the one derived from takeoff/landing times.
    pub fn air_minutes(&self) -> Option<u32> {
        self.total_air_minutes
            .or_else(|| window_minutes(self.date, &self.flight_start, &self.flight_end))
    }

    /// Recorded block time, or the one derived from off/on block times.
    pub fn block_minutes(&self) -> Option<u32> {
        self.total_block_minutes
            .or_else(|| window_minutes(self.date, &self.block_start, &self.block_end))
    }

    /// Takeoff/landing times if both are known, block times otherwise.
    pub fn night_window_times(&self) -> Option<(&str, &str)> {
        match (&self.flight_start, &self.flight_end) {
            (Some(start), Some(end)) => Some((start.as_str(), end.as_str())),
            _ => match (&self.block_start, &self.block_end) {
                (Some(start), Some(end)) => Some((start.as_str(), end.as_str())),
                _ => None,
            },
        }
    }

    pub fn night_time<S: SunTimesSource>(&self, airports: &AirportManager, estimator: &NightTimeEstimator<S>) -> NightTime {
        let (start, end) = match self.night_window_times() {
            Some(times) => times,
            None => {
                warn!("Flight {} on {} has no times recorded", self.route(), self.date);
                return NightTime::Unavailable(UnavailableReason::InvalidFlightTime);
            },
        };

        let departure = airports.position(&self.departure_airport_code);
        let destination = airports.position(&self.destination_airport_code);

        estimator.estimate(self.date, start, end, departure, destination)
    }
}

pub fn load_flights<P: AsRef<Path>>(filepath: P) -> Result<Vec<Flight>, LogbookError> {
    let filepath = filepath.as_ref();
    info!("Reading flights from '{}'", filepath.display());

    let data = fs::read_to_string(filepath).map_err(|e| LogbookError::io(filepath, e))?;
    let flights: Vec<Flight> = serde_json::from_str(&data)?;
    info!("Loaded {} flights", flights.len());

    Ok(flights)
}

/// One line of the logbook listing.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightNightRecord {
    pub flight: Flight,
    pub air_minutes: Option<u32>,
    pub block_minutes: Option<u32>,
    pub night: NightTime,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogbookTotals {
    pub flights: usize,
    pub air_minutes: u32,
    pub block_minutes: u32,
    pub night_minutes: u32,
    pub night_unavailable: usize,
}

pub fn compute_night_records<S: SunTimesSource>(
    flights: Vec<Flight>,
    airports: &AirportManager,
    estimator: &NightTimeEstimator<S>,
) -> (Vec<FlightNightRecord>, LogbookTotals) {
    let mut totals = LogbookTotals::default();
    let mut records = Vec::with_capacity(flights.len());

    for flight in flights.into_iter() {
        let night = flight.night_time(airports, estimator);
        let air_minutes = flight.air_minutes();
        let block_minutes = flight.block_minutes();

        totals.flights += 1;
        totals.air_minutes += air_minutes.unwrap_or(0);
        totals.block_minutes += block_minutes.unwrap_or(0);
        match night {
            NightTime::Computed(minutes) => totals.night_minutes += minutes,
            NightTime::Unavailable(reason) => {
                info!("Night time of {} on {} unavailable: {reason}", flight.route(), flight.date);
                totals.night_unavailable += 1;
            },
        }

        records.push(FlightNightRecord { flight, air_minutes, block_minutes, night });
    }

    (records, totals)
}
