use std::env;
use std::str::FromStr;

use simplelog::LevelFilter;

pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;

pub fn get_log_level() -> LevelFilter {
    env::var("LOG_LEVEL").ok()
        .and_then(|level| LevelFilter::from_str(&level).ok())
        .unwrap_or(LOG_LEVEL)
}

pub const AIRPORTS_FILEPATH: &str = "./data/airports.json";

pub fn get_airports_filepath() -> String {
    env::var("AIRPORTS_FILE").unwrap_or(AIRPORTS_FILEPATH.into())
}

const SUN_API_URL: &str = "https://api.sunrise-sunset.org/json";
const SUN_API_TIMEOUT: u64 = 10;    // [s]

pub fn get_sun_api_url() -> String {
    env::var("SUN_API_URL").unwrap_or(SUN_API_URL.into())
}

pub fn get_sun_api_timeout() -> u64 {
    env::var("SUN_API_TIMEOUT").ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(SUN_API_TIMEOUT)
}

/// "api" or "solar"
pub const SUN_SOURCE: &str = "api";

pub fn get_sun_source() -> String {
    env::var("SUN_SOURCE").unwrap_or(SUN_SOURCE.into())
}

/// "sunset" or "civil"
pub const SUN_HORIZON: &str = "sunset";

pub fn get_sun_horizon() -> String {
    env::var("SUN_HORIZON").unwrap_or(SUN_HORIZON.into())
}

pub const SUN_CACHE_TTL: u64 = 8*60*60;   // [s]

pub fn get_sun_cache_ttl() -> u64 {
    env::var("SUN_CACHE_TTL").ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(SUN_CACHE_TTL)
}
