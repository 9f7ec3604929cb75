/**
 * Client of the https://sunrise-sunset.org/api service.
 *
 * GET {url}?lat=..&lng=..&date=YYYY-MM-DD&formatted=0
 * -> {"results": {"sunrise": "2024-03-10T05:52:11+00:00", "sunset": "..", ..}, "status": "OK"}
 */

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use log::{debug, error};
use serde::Deserialize;
use url::Url;

use crate::configuration::{get_sun_api_timeout, get_sun_api_url};
use crate::night::data_structures::{GeoPoint, SunWindow};
use crate::sun::{SunTimesError, SunTimesSource};

#[derive(Deserialize, Debug)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    results: serde_json::Value,
}

#[derive(Deserialize, Debug)]
struct ApiResults {
    sunrise: String,
    sunset: String,
}

pub struct SunriseSunsetApi {
    client: reqwest::blocking::Client,
    base_url: Url,
}

impl SunriseSunsetApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<SunriseSunsetApi, SunTimesError> {
        let base_url = Url::parse(base_url)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(SunriseSunsetApi { client, base_url })
    }

    /// Service url and timeout taken from the configuration.
    pub fn from_config() -> Result<SunriseSunsetApi, SunTimesError> {
        SunriseSunsetApi::new(&get_sun_api_url(), Duration::from_secs(get_sun_api_timeout()))
    }

    pub fn request_url(&self, point: &GeoPoint, date: NaiveDate) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("lat", &point.latitude.to_string())
            .append_pair("lng", &point.longitude.to_string())
            .append_pair("date", &date.format("%Y-%m-%d").to_string())
            .append_pair("formatted", "0");
        url
    }
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, SunTimesError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SunTimesError::Payload(format!("bad instant '{value}': {e}")))
}

/// Sunrise or sunset of `date` never lies further than a day from it.
fn check_near_date(
    instant: DateTime<Utc>,
    date: NaiveDate,
) -> Result<DateTime<Utc>, SunTimesError> {
    let day_start = date.and_time(NaiveTime::MIN).and_utc();
    let earliest = day_start - chrono::Duration::days(1);
    let latest = day_start + chrono::Duration::days(2);

    if instant < earliest || instant > latest {
        // polar day or night is answered with a 1970 placeholder
        return Err(SunTimesError::Payload(format!("instant {instant} is not near {date}")));
    }

    Ok(instant)
}

/// Extracts the sun window of `date` out of a `formatted=0` response body.
pub fn parse_response(body: &str, date: NaiveDate) -> Result<SunWindow, SunTimesError> {
    let resp: ApiResponse = serde_json::from_str(body)
        .map_err(|e| SunTimesError::Payload(e.to_string()))?;

    if resp.status != "OK" {
        return Err(SunTimesError::ServiceStatus(resp.status));
    }

    let results: ApiResults = serde_json::from_value(resp.results)
        .map_err(|e| SunTimesError::Payload(format!("no usable results: {e}")))?;

    let sunrise = check_near_date(parse_instant(&results.sunrise)?, date)?;
    let sunset = check_near_date(parse_instant(&results.sunset)?, date)?;

    Ok(SunWindow::new(sunrise, sunset))
}

impl SunTimesSource for SunriseSunsetApi {
    fn sun_window(&self, point: &GeoPoint, date: NaiveDate) -> Result<SunWindow, SunTimesError> {
        let url = self.request_url(point, date);
        debug!("Fetching sun times from {url}");

        let resp = self.client.get(url).send().map_err(|e| {
            error!("Unable to fetch sun times for {point} on {date}: {e}");
            SunTimesError::Request(e)
        })?;

        if !resp.status().is_success() {
            error!("Sun times service replied {} for {point} on {date}", resp.status());
            return Err(SunTimesError::Status(resp.status().as_u16()));
        }

        let body = resp.text()?;
        parse_response(&body, date).map_err(|e| {
            error!("Unusable sun times for {point} on {date}: {e}");
            e
        })
    }
}
