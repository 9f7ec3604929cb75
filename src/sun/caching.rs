use std::sync::Mutex;

use chrono::NaiveDate;
use log::{debug, warn};

use crate::night::data_structures::{GeoPoint, SunWindow};
use crate::sun::expiring_dict::ExpiringDict;
use crate::sun::{SunTimesError, SunTimesSource};

// coordinates rounded to 1e-4 deg (~11 m)
type CacheKey = (i64, i64, NaiveDate);

fn cache_key(point: &GeoPoint, date: NaiveDate) -> CacheKey {
    ((point.latitude * 1e4).round() as i64, (point.longitude * 1e4).round() as i64, date)
}

/// Remembers successful answers of the wrapped source for `ttl` seconds.
/// Failures are never cached.
pub struct CachingSunTimes<S> {
    inner: S,
    cache: Mutex<ExpiringDict<CacheKey, SunWindow>>,
}

impl<S: SunTimesSource> CachingSunTimes<S> {
    pub fn new(inner: S, ttl: u64) -> CachingSunTimes<S> {
        CachingSunTimes {
            inner,
            cache: Mutex::new(ExpiringDict::new(ttl as i64 * 1000)),
        }
    }

    pub fn len(&self) -> usize {
        match self.cache.lock() {
            Ok(cache) => cache.len(),
            Err(_) => 0,
        }
    }
}

impl<S: SunTimesSource> SunTimesSource for CachingSunTimes<S> {
    fn sun_window(&self, point: &GeoPoint, date: NaiveDate) -> Result<SunWindow, SunTimesError> {
        let key = cache_key(point, date);

        match self.cache.lock() {
            Ok(mut cache) => {
                cache.tick();
                if let Some(window) = cache.get(&key) {
                    debug!("Sun times for {point} on {date} served from cache");
                    return Ok(window);
                }
            },
            Err(_) => warn!("Sun times cache lock poisoned, bypassing cache"),
        }

        // the lock is not held while fetching
        let window = self.inner.sun_window(point, date)?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, window);
        }

        Ok(window)
    }
}
