use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::{debug, warn};

use crate::night::data_structures::{GeoPoint, NightTime, SunWindow, UnavailableReason};
use crate::night::flight_window::FlightWindow;
use crate::sun::{fetch_concurrently, SunTimesSource};

fn interpolate(from: DateTime<Utc>, to: DateTime<Utc>, progress: f64) -> DateTime<Utc> {
    let shift = (to - from).num_milliseconds() as f64 * progress;
    from + Duration::milliseconds(shift.round() as i64)
}

/// Counts the minutes of `[start, end)` flown at night.
///
/// Every whole minute is classified by its first instant. The day/night
/// boundary moves linearly from the departure's sun window to the
/// destination's as the flight progresses. A minute is night when it falls
/// after the interpolated sunset or before the interpolated sunrise. Both
/// windows belong to the same date, so flights covering more than one
/// sunrise/sunset cycle are not classified exactly.
///
/// Returns `None` when `end` is not after `start`.
pub fn count_night_minutes(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    departure: &SunWindow,
    destination: &SunWindow,
) -> Option<u32> {
    let total_minutes = (end - start).num_minutes();
    if total_minutes <= 0 {
        return None;
    }

    let mut night_minutes = 0_u32;
    for minute in 0..total_minutes {
        let current = start + Duration::minutes(minute);
        let progress = minute as f64 / total_minutes as f64;

        let sunset = interpolate(departure.sunset, destination.sunset, progress);
        let sunrise = interpolate(departure.sunrise, destination.sunrise, progress);

        if current > sunset || current < sunrise {
            night_minutes += 1;
        }
    }

    Some(night_minutes)
}

/// Night time of flights, with sun times taken from an injected source.
pub struct NightTimeEstimator<S> {
    source: S,
}

impl<S: SunTimesSource> NightTimeEstimator<S> {
    pub fn new(source: S) -> NightTimeEstimator<S> {
        NightTimeEstimator { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn estimate_window(&self, window: &FlightWindow, departure: Option<GeoPoint>, destination: Option<GeoPoint>) -> NightTime {
        let (departure, destination) = match (departure, destination) {
            (Some(dep), Some(dest)) => (dep, dest),
            _ => {
                warn!("Missing coordinates for one or both airports");
                return NightTime::Unavailable(UnavailableReason::MissingCoordinates);
            },
        };

        if !departure.is_valid() || !destination.is_valid() {
            warn!("Airport coordinates out of range: {departure} -> {destination}");
            return NightTime::Unavailable(UnavailableReason::InvalidCoordinates);
        }

        let start = window.start_instant();
        let end = window.end_instant();
        if window.crosses_midnight() {
            debug!("Flight spans midnight, landing on {}", end.date_naive());
        }
        if end <= start {
            warn!("Flight on {} from {} to {} has no duration", window.date, window.start, window.end);
            return NightTime::Unavailable(UnavailableReason::DegenerateWindow);
        }

        debug!("Getting sun times for {departure} -> {destination} ({:.0} km) on {}",
            departure.distance_in_km(&destination), window.date);

        let mut results = fetch_concurrently(&self.source, &[(departure, window.date), (destination, window.date)]).into_iter();
        let (dep_times, dest_times) = match (results.next(), results.next()) {
            (Some(Ok(dep)), Some(Ok(dest))) => (dep, dest),
            (dep, dest) => {
                for err in [dep, dest].into_iter().flatten().filter_map(Result::err) {
                    warn!("Sun times unavailable: {err}");
                }
                return NightTime::Unavailable(UnavailableReason::OracleUnavailable);
            },
        };

        debug!("Sun times: departure {dep_times}; destination {dest_times}");

        match count_night_minutes(start, end, &dep_times, &dest_times) {
            Some(minutes) => {
                debug!("Night time {minutes} min of {} min flight", window.duration_minutes());
                NightTime::Computed(minutes)
            },
            None => NightTime::Unavailable(UnavailableReason::DegenerateWindow),
        }
    }

    /// `start` and `end` are "HH:MM" UTC on `date`.
    pub fn estimate(&self, date: NaiveDate, start: &str, end: &str, departure: Option<GeoPoint>, destination: Option<GeoPoint>) -> NightTime {
        if departure.is_none() || destination.is_none() {
            warn!("Missing coordinates for one or both airports");
            return NightTime::Unavailable(UnavailableReason::MissingCoordinates);
        }

        match FlightWindow::parse(date, start, end) {
            Ok(window) => self.estimate_window(&window, departure, destination),
            Err(e) => {
                warn!("{e}");
                NightTime::Unavailable(UnavailableReason::InvalidFlightTime)
            },
        }
    }

    /// Like [`estimate`](Self::estimate), with every unavailable outcome reported as 0 minutes.
    pub fn compute_night_minutes(&self, date: NaiveDate, start: &str, end: &str, departure: Option<GeoPoint>, destination: Option<GeoPoint>) -> u32 {
        self.estimate(date, start, end, departure, destination).minutes_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    use chrono::TimeZone;
    use proptest::prelude::*;

    use super::*;
    use crate::sun::SunTimesError;

    fn utc(date: NaiveDate, h: u32, m: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_hms_opt(h, m, 0).unwrap())
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn dep_point() -> GeoPoint {
        GeoPoint::new(50.0333, 8.5706)
    }

    fn dest_point() -> GeoPoint {
        GeoPoint::new(51.4706, -0.4619)
    }

    /// Answers with fixed windows keyed by latitude.
    struct FixedSource {
        windows: HashMap<i64, SunWindow>,
        calls: AtomicU32,
    }

    impl FixedSource {
        fn new(dep: SunWindow, dest: SunWindow) -> FixedSource {
            let mut windows = HashMap::new();
            windows.insert((dep_point().latitude * 1e4) as i64, dep);
            windows.insert((dest_point().latitude * 1e4) as i64, dest);
            FixedSource { windows, calls: AtomicU32::new(0) }
        }

        /// Departure sunset 18:00Z, sunrise 06:00Z; destination sunset 18:30Z, sunrise 06:10Z.
        fn scenario() -> FixedSource {
            FixedSource::new(
                SunWindow::new(utc(date(), 6, 0), utc(date(), 18, 0)),
                SunWindow::new(utc(date(), 6, 10), utc(date(), 18, 30)),
            )
        }
    }

    impl SunTimesSource for FixedSource {
        fn sun_window(&self, point: &GeoPoint, _date: NaiveDate) -> Result<SunWindow, SunTimesError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.windows.get(&((point.latitude * 1e4) as i64))
                .copied()
                .ok_or(SunTimesError::Status(404))
        }
    }

    struct FailingSource;

    impl SunTimesSource for FailingSource {
        fn sun_window(&self, _point: &GeoPoint, _date: NaiveDate) -> Result<SunWindow, SunTimesError> {
            Err(SunTimesError::ServiceStatus("INVALID_REQUEST".into()))
        }
    }

    #[test]
    fn test_flight_after_both_sunsets_is_all_night() {
        let estimator = NightTimeEstimator::new(FixedSource::scenario());
        let res = estimator.estimate(date(), "19:00", "21:00", Some(dep_point()), Some(dest_point()));
        assert_eq!(res, NightTime::Computed(120));
        assert_eq!(estimator.source().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_flight_through_sunset_is_partly_night() {
        let estimator = NightTimeEstimator::new(FixedSource::scenario());
        let minutes = estimator.compute_night_minutes(date(), "17:00", "19:00", Some(dep_point()), Some(dest_point()));
        assert!(minutes > 0 && minutes < 120, "got {minutes}");
        // boundary sweeps 18:00 -> 18:30, overtaken at minute 80
        assert_eq!(minutes, 39);
    }

    #[test]
    fn test_daytime_flight_has_no_night() {
        let estimator = NightTimeEstimator::new(FixedSource::scenario());
        let res = estimator.estimate(date(), "08:00", "15:30", Some(dep_point()), Some(dest_point()));
        assert_eq!(res, NightTime::Computed(0));
    }

    #[test]
    fn test_early_morning_flight_before_sunrise() {
        let estimator = NightTimeEstimator::new(FixedSource::scenario());
        let res = estimator.estimate(date(), "05:00", "06:30", Some(dep_point()), Some(dest_point()));
        // sunrise drifts 06:00 -> 06:10 and stays ahead until minute 67
        assert_eq!(res, NightTime::Computed(68));
    }

    #[test]
    fn test_midnight_crossing_flight() {
        let estimator = NightTimeEstimator::new(FixedSource::scenario());
        let res = estimator.estimate(date(), "23:30", "00:45", Some(dep_point()), Some(dest_point()));
        assert_eq!(res, NightTime::Computed(75));
    }

    #[test]
    fn test_missing_coordinates_yield_zero_without_fetching() {
        let estimator = NightTimeEstimator::new(FixedSource::scenario());

        assert_eq!(estimator.estimate(date(), "19:00", "21:00", None, Some(dest_point())),
            NightTime::Unavailable(UnavailableReason::MissingCoordinates));
        assert_eq!(estimator.compute_night_minutes(date(), "19:00", "21:00", Some(dep_point()), None), 0);
        assert_eq!(estimator.compute_night_minutes(date(), "garbage", "21:00", None, None), 0);
        assert_eq!(estimator.source().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_oracle_failure_yields_unavailable() {
        let estimator = NightTimeEstimator::new(FailingSource);
        let res = estimator.estimate(date(), "19:00", "21:00", Some(dep_point()), Some(dest_point()));
        assert_eq!(res, NightTime::Unavailable(UnavailableReason::OracleUnavailable));
        assert_eq!(res.minutes_or_zero(), 0);

        // only one endpoint known to the source
        let estimator = NightTimeEstimator::new(FixedSource::scenario());
        let res = estimator.estimate(date(), "19:00", "21:00", Some(dep_point()), Some(GeoPoint::new(40.0, 3.0)));
        assert_eq!(res, NightTime::Unavailable(UnavailableReason::OracleUnavailable));
    }

    #[test]
    fn test_degenerate_and_invalid_inputs() {
        let estimator = NightTimeEstimator::new(FixedSource::scenario());

        assert_eq!(estimator.estimate(date(), "12:00", "12:00", Some(dep_point()), Some(dest_point())),
            NightTime::Unavailable(UnavailableReason::DegenerateWindow));
        assert_eq!(estimator.estimate(date(), "12:00", "12:61", Some(dep_point()), Some(dest_point())),
            NightTime::Unavailable(UnavailableReason::InvalidFlightTime));
        assert_eq!(estimator.estimate(date(), "12:00", "13:00", Some(GeoPoint::new(91.0, 0.0)), Some(dest_point())),
            NightTime::Unavailable(UnavailableReason::InvalidCoordinates));
        assert_eq!(estimator.source().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_count_rejects_empty_window() {
        let window = SunWindow::new(utc(date(), 6, 0), utc(date(), 18, 0));
        assert_eq!(count_night_minutes(utc(date(), 10, 0), utc(date(), 10, 0), &window, &window), None);
        assert_eq!(count_night_minutes(utc(date(), 10, 0), utc(date(), 9, 0), &window, &window), None);
    }

    #[test]
    fn test_identical_windows_behave_like_single_location() {
        let window = SunWindow::new(utc(date(), 6, 0), utc(date(), 18, 0));
        // 17:30 - 18:30: the minute starting exactly at sunset is still day
        assert_eq!(count_night_minutes(utc(date(), 17, 30), utc(date(), 18, 30), &window, &window), Some(29));
    }

    proptest! {
        #[test]
        fn prop_night_minutes_within_flight_duration(
            start_min in 0u32..1440,
            duration in 1i64..1500,
            dep_rise in 240i64..480, dep_set in 960i64..1260,
            dest_rise in 240i64..480, dest_set in 960i64..1260,
        ) {
            let start = utc(date(), start_min / 60, start_min % 60);
            let end = start + Duration::minutes(duration);
            let midnight = utc(date(), 0, 0);
            let dep = SunWindow::new(midnight + Duration::minutes(dep_rise), midnight + Duration::minutes(dep_set));
            let dest = SunWindow::new(midnight + Duration::minutes(dest_rise), midnight + Duration::minutes(dest_set));

            let first = count_night_minutes(start, end, &dep, &dest).unwrap();
            prop_assert!(i64::from(first) <= duration);
            prop_assert_eq!(Some(first), count_night_minutes(start, end, &dep, &dest));
        }

        #[test]
        fn prop_flight_between_sunset_and_midnight_is_all_night(
            offset in 1i64..120,
            duration in 1i64..120,
        ) {
            let dep = SunWindow::new(utc(date(), 6, 0), utc(date(), 19, 0));
            let dest = SunWindow::new(utc(date(), 6, 30), utc(date(), 19, 30));
            let start = utc(date(), 19, 30) + Duration::minutes(offset);
            let end = start + Duration::minutes(duration);
            prop_assert_eq!(count_night_minutes(start, end, &dep, &dest), Some(duration as u32));
        }
    }
}
