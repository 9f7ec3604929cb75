use chrono::{Duration, NaiveDate, NaiveTime};
use log::debug;
use solar_positioning::time::DeltaT;
use solar_positioning::{spa, Horizon, SunriseResult};

use crate::night::data_structures::{GeoPoint, SunWindow};
use crate::sun::{SunHorizon, SunTimesError, SunTimesSource};

/// Offline sun times computed with the NREL SPA algorithm.
///
/// Polar day yields a window spanning the whole UTC day; polar night yields
/// a window whose sunset precedes its sunrise, so every instant of the day
/// classifies as night.
#[derive(Debug, Clone, Copy)]
pub struct SolarCalculator {
    horizon: Horizon,
}

impl SolarCalculator {
    pub fn new() -> SolarCalculator {
        SolarCalculator { horizon: Horizon::SunriseSunset }
    }

    /// Night starting at the end of civil twilight instead of the geometric sunset.
    pub fn civil_twilight() -> SolarCalculator {
        SolarCalculator { horizon: Horizon::CivilTwilight }
    }

    pub fn for_horizon(horizon: SunHorizon) -> SolarCalculator {
        match horizon {
            SunHorizon::Sunset => SolarCalculator::new(),
            SunHorizon::Civil => SolarCalculator::civil_twilight(),
        }
    }
}

impl Default for SolarCalculator {
    fn default() -> Self {
        SolarCalculator::new()
    }
}

impl SunTimesSource for SolarCalculator {
    fn sun_window(&self, point: &GeoPoint, date: NaiveDate) -> Result<SunWindow, SunTimesError> {
        let day_start = date.and_time(NaiveTime::MIN).and_utc();
        let day_end = day_start + Duration::days(1);

        let delta_t = DeltaT::estimate_from_date_like(day_start)
            .map_err(|e| SunTimesError::Calculation(e.to_string()))?;

        let res = spa::sunrise_sunset_for_horizon(day_start, point.latitude, point.longitude, delta_t, self.horizon)
            .map_err(|e| SunTimesError::Calculation(e.to_string()))?;

        let window = match res {
            SunriseResult::RegularDay { sunrise, sunset, .. } => SunWindow::new(sunrise, sunset),
            SunriseResult::AllDay { .. } => {
                debug!("Polar day at {point} on {date}");
                SunWindow::new(day_start, day_end)
            },
            SunriseResult::AllNight { .. } => {
                debug!("Polar night at {point} on {date}");
                SunWindow::new(day_end, day_start)
            },
        };

        Ok(window)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_frankfurt_in_march() {
        let eddf = GeoPoint::new(50.0333, 8.5706);
        let window = SolarCalculator::new().sun_window(&eddf, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()).unwrap();

        assert!((window.sunrise - at("2024-03-10T05:52:00Z")).num_minutes().abs() <= 5, "sunrise {}", window.sunrise);
        assert!((window.sunset - at("2024-03-10T17:21:00Z")).num_minutes().abs() <= 5, "sunset {}", window.sunset);
    }

    #[test]
    fn test_civil_twilight_extends_the_day() {
        let eddf = GeoPoint::new(50.0333, 8.5706);
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let geometric = SolarCalculator::new().sun_window(&eddf, date).unwrap();
        let civil = SolarCalculator::civil_twilight().sun_window(&eddf, date).unwrap();

        assert!(civil.sunrise < geometric.sunrise);
        assert!(civil.sunset > geometric.sunset);
    }

    #[test]
    fn test_polar_night_and_day() {
        let ensb = GeoPoint::new(78.2461, 15.4656);

        let winter = SolarCalculator::new().sun_window(&ensb, NaiveDate::from_ymd_opt(2023, 12, 21).unwrap()).unwrap();
        assert!(winter.sunset < winter.sunrise);
        assert_eq!(winter.sunset, at("2023-12-21T00:00:00Z"));

        let summer = SolarCalculator::new().sun_window(&ensb, NaiveDate::from_ymd_opt(2023, 6, 21).unwrap()).unwrap();
        assert_eq!(summer.sunrise, at("2023-06-21T00:00:00Z"));
        assert_eq!(summer.sunset, at("2023-06-22T00:00:00Z"));
    }

    #[test]
    fn test_out_of_range_coordinates() {
        let res = SolarCalculator::new().sun_window(&GeoPoint::new(95.0, 0.0), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert!(matches!(res, Err(SunTimesError::Calculation(_))));
    }
}
