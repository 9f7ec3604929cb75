use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FlightTimeError {
    #[error("Invalid time of day: '{0}'")]
    InvalidTime(String),
}

/// Parses "HH:MM" (or "HH:MM:SS") wall-clock time.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, FlightTimeError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| FlightTimeError::InvalidTime(value.to_string()))
}

/// Date + start/end time of a flight, all in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightWindow {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl FlightWindow {
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> FlightWindow {
        FlightWindow { date, start, end }
    }

    pub fn parse(date: NaiveDate, start: &str, end: &str) -> Result<FlightWindow, FlightTimeError> {
        Ok(FlightWindow::new(date, parse_time_of_day(start)?, parse_time_of_day(end)?))
    }

    pub fn start_instant(&self) -> DateTime<Utc> {
        self.date.and_time(self.start).and_utc()
    }

    /// End instant; an end before the start means the flight landed after midnight.
    pub fn end_instant(&self) -> DateTime<Utc> {
        let end = self.date.and_time(self.end).and_utc();
        if end < self.start_instant() {
            end + Duration::days(1)
        } else {
            end
        }
    }

    pub fn crosses_midnight(&self) -> bool {
        self.end < self.start
    }

    /// Whole minutes between start and end.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_instant() - self.start_instant()).num_minutes()
    }
}
