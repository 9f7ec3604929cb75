use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::Deserialize;

use crate::logbook::LogbookError;
use crate::night::data_structures::GeoPoint;

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct AirportRecord {
    pub icao: String,
    #[serde(default)]
    pub iata: Option<String>,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub long: Option<f64>,
    #[serde(default)]
    pub elevation: Option<f64>,   // [ft]
    #[serde(default)]
    pub tz: Option<String>,
}

impl AirportRecord {
    /// None if the record lacks either coordinate.
    pub fn position(&self) -> Option<GeoPoint> {
        GeoPoint::from_optional(self.lat, self.long)
    }
}

impl fmt::Display for AirportRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position() {
            Some(p) => write!(f, "#AirportRecord: {0} ({1}); lat:{2:.4}; lon:{3:.4}", self.icao, self.name, p.latitude, p.longitude),
            None => write!(f, "#AirportRecord: {0} ({1}); no coordinates", self.icao, self.name),
        }
    }
}

pub struct AirportManager {
    by_icao: HashMap<String, AirportRecord>,
    iata_to_icao: HashMap<String, String>,
}

impl AirportManager {
    pub fn new(airports: Vec<AirportRecord>) -> AirportManager {
        let mut by_icao = HashMap::new();
        let mut iata_to_icao = HashMap::new();

        for ap in airports.into_iter() {
            let icao = ap.icao.trim().to_uppercase();
            if icao.is_empty() {
                warn!("Skipping airport '{}' without ICAO code", ap.name);
                continue;
            }
            if let Some(iata) = ap.iata.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                iata_to_icao.insert(iata.to_uppercase(), icao.clone());
            }
            by_icao.insert(icao, ap);
        }

        AirportManager { by_icao, iata_to_icao }
    }

    pub fn from_file<P: AsRef<Path>>(filepath: P) -> Result<AirportManager, LogbookError> {
        let filepath = filepath.as_ref();
        info!("Reading airports from '{}'", filepath.display());

        let data = fs::read_to_string(filepath).map_err(|e| LogbookError::io(filepath, e))?;

        AirportManager::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<AirportManager, LogbookError> {
        let airports: Vec<AirportRecord> = serde_json::from_str(data)?;
        info!("Loaded {} airports", airports.len());

        Ok(AirportManager::new(airports))
    }

    pub fn len(&self) -> usize {
        self.by_icao.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_icao.is_empty()
    }

    /// Looks up by ICAO code first, then by IATA code; case insensitive.
    pub fn get(&self, code: &str) -> Option<&AirportRecord> {
        let code = code.trim().to_uppercase();
        self.by_icao.get(&code).or_else(|| {
            self.iata_to_icao.get(&code).and_then(|icao| self.by_icao.get(icao))
        })
    }

    /// Position of the airport; None for unknown airports or missing coordinates.
    pub fn position(&self, code: &str) -> Option<GeoPoint> {
        match self.get(code) {
            Some(ap) => {
                let pos = ap.position();
                if pos.is_none() {
                    warn!("Airport '{}' has no coordinates", ap.icao);
                }
                pos
            },
            None => {
                warn!("Unknown airport '{code}'");
                None
            },
        }
    }
}
