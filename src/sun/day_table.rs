use chrono::{Duration, NaiveDate};
use log::error;

use crate::night::data_structures::{GeoPoint, SunWindow};
use crate::sun::{fetch_concurrently, SunTimesError, SunTimesSource};

/// Days shown around the reference day: two days back up to tomorrow.
const DAY_OFFSETS: [i64; 4] = [-2, -1, 0, 1];

#[derive(Debug, Clone, PartialEq)]
pub struct DaySunTimes {
    pub date: NaiveDate,
    pub label: String,
    pub window: SunWindow,
}

pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        -2 => "2 Days Ago".into(),
        -1 => "Yesterday".into(),
        0 => "Today".into(),
        1 => "Tomorrow".into(),
        _ => date.format("%a, %b %-d").to_string(),
    }
}

/// Sun times of `point` for the days around `today`. Fails as a whole if any day fails.
pub fn sun_times_around<S: SunTimesSource + ?Sized>(source: &S, point: &GeoPoint, today: NaiveDate) -> Result<Vec<DaySunTimes>, SunTimesError> {
    let requests: Vec<(GeoPoint, NaiveDate)> = DAY_OFFSETS.iter()
        .map(|offset| (*point, today + Duration::days(*offset)))
        .collect();

    let results = fetch_concurrently(source, &requests);

    let mut table = Vec::with_capacity(requests.len());
    for ((_, date), res) in requests.iter().zip(results) {
        let window = res.map_err(|e| {
            error!("Failed to load sun times for {point} on {date}: {e}");
            e
        })?;

        table.push(DaySunTimes {
            date: *date,
            label: day_label(*date, today),
            window,
        });
    }

    Ok(table)
}
