use std::str::FromStr;

use chrono::NaiveDate;
use log::{error, info, warn};
use thiserror::Error;

use crate::configuration::get_sun_cache_ttl;
use crate::night::data_structures::{GeoPoint, SunWindow};

pub mod caching;
pub mod day_table;
pub mod solar_calculator;
pub mod sunrise_sunset_api;

mod expiring_dict;

pub use caching::CachingSunTimes;
pub use solar_calculator::SolarCalculator;
pub use sunrise_sunset_api::SunriseSunsetApi;

#[derive(Debug, Error)]
pub enum SunTimesError {
    #[error("Request to sun times service failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid sun times service url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Sun times service returned HTTP {0}")]
    Status(u16),

    #[error("Sun times service returned status '{0}'")]
    ServiceStatus(String),

    #[error("Malformed sun times payload: {0}")]
    Payload(String),

    #[error("Sun times calculation failed: {0}")]
    Calculation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SunSourceKind {
    /// api.sunrise-sunset.org
    Api,
    /// offline SPA calculation
    Solar,
}

impl FromStr for SunSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "api" => Ok(SunSourceKind::Api),
            "solar" => Ok(SunSourceKind::Solar),
            other => Err(format!("unknown sun times source '{other}'")),
        }
    }
}

/// Where the night begins and ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SunHorizon {
    /// geometric sunrise and sunset
    Sunset,
    /// end and start of civil twilight
    Civil,
}

impl FromStr for SunHorizon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sunset" => Ok(SunHorizon::Sunset),
            "civil" => Ok(SunHorizon::Civil),
            other => Err(format!("unknown sun horizon '{other}'")),
        }
    }
}

/// The configured source, wrapped in a cache.
/// Civil twilight is only computed by the solar source.
pub fn build_source(
    kind: SunSourceKind,
    horizon: SunHorizon,
) -> Result<Box<dyn SunTimesSource>, SunTimesError> {
    let ttl = get_sun_cache_ttl();
    let source: Box<dyn SunTimesSource> = match kind {
        SunSourceKind::Api => {
            if horizon == SunHorizon::Civil {
                warn!("Civil twilight needs the solar source; using sunrise and sunset");
            }
            Box::new(CachingSunTimes::new(SunriseSunsetApi::from_config()?, ttl))
        },
        SunSourceKind::Solar => Box::new(CachingSunTimes::new(SolarCalculator::for_horizon(horizon), ttl)),
    };
    info!("Using {kind:?} sun times source, {horizon:?} horizon");

    Ok(source)
}

/// Anything able to tell sunrise and sunset (UTC) of a place on a date.
pub trait SunTimesSource: Sync {
    fn sun_window(&self, point: &GeoPoint, date: NaiveDate) -> Result<SunWindow, SunTimesError>;
}

impl<S: SunTimesSource + ?Sized> SunTimesSource for &S {
    fn sun_window(&self, point: &GeoPoint, date: NaiveDate) -> Result<SunWindow, SunTimesError> {
        (**self).sun_window(point, date)
    }
}

impl<S: SunTimesSource + ?Sized> SunTimesSource for Box<S> {
    fn sun_window(&self, point: &GeoPoint, date: NaiveDate) -> Result<SunWindow, SunTimesError> {
        (**self).sun_window(point, date)
    }
}

/// Asks the source for all (point, date) pairs at once, one scoped thread per request.
/// Results come back in request order.
pub fn fetch_concurrently<S: SunTimesSource + ?Sized>(
    source: &S,
    requests: &[(GeoPoint, NaiveDate)],
) -> Vec<Result<SunWindow, SunTimesError>> {
    let res = crossbeam::scope(|s| {
        let handles: Vec<_> = requests.iter()
            .map(|(point, date)| s.spawn(move |_| source.sun_window(point, *date)))
            .collect();

        handles.into_iter()
            .map(|h| h.join().unwrap_or_else(|_| Err(SunTimesError::Calculation("sun times worker panicked".into()))))
            .collect::<Vec<_>>()
    });

    match res {
        Ok(results) => results,
        Err(_) => {
            error!("Sun times fetch scope panicked");
            requests.iter()
                .map(|_| Err(SunTimesError::Calculation("sun times worker panicked".into())))
                .collect()
        },
    }
}
