//! Localities file model.
//!
//! The file is a JSON object keyed by locality name. Coordinates come from a
//! spreadsheet export and may be numbers or numeric strings.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::QrResult;

/// Resized copies of one photo, keyed by size name (`thumb`, `large`).
pub type ImageSet = BTreeMap<String, String>;

/// All localities, ordered by name.
pub type LocalityMap = BTreeMap<String, Locality>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Individual {
    pub individual: String,
    #[serde(default)]
    pub datetime: String,
    #[serde(default)]
    pub images: Vec<ImageSet>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Locality {
    pub locality_name: String,
    #[serde(default)]
    pub locality_description: String,
    #[serde(deserialize_with = "coordinate")]
    pub lat: f64,
    #[serde(deserialize_with = "coordinate")]
    pub lon: f64,
    #[serde(default)]
    pub individuals: Vec<Individual>,
    #[serde(default)]
    pub images: Vec<ImageSet>,
}

impl Locality {
    pub fn position(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}

fn coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Coordinate {
        Number(f64),
        Text(String),
    }

    match Coordinate::deserialize(deserializer)? {
        Coordinate::Number(n) => Ok(n),
        Coordinate::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid coordinate '{s}'"))),
    }
}

/// South-west and north-east corners enclosing a set of positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south_west: (f64, f64),
    pub north_east: (f64, f64),
}

impl Bounds {
    /// `None` for an empty set.
    pub fn enclosing(positions: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        positions.into_iter().fold(None, |bounds, (lat, lon)| {
            Some(match bounds {
                None => Bounds {
                    south_west: (lat, lon),
                    north_east: (lat, lon),
                },
                Some(b) => Bounds {
                    south_west: (b.south_west.0.min(lat), b.south_west.1.min(lon)),
                    north_east: (b.north_east.0.max(lat), b.north_east.1.max(lon)),
                },
            })
        })
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.south_west.0 + self.north_east.0) / 2.0,
            (self.south_west.1 + self.north_east.1) / 2.0,
        )
    }
}

pub fn parse_localities(json: &str) -> QrResult<LocalityMap> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_localities(path: &Path) -> QrResult<LocalityMap> {
    let json = std::fs::read_to_string(path)?;
    let localities = parse_localities(&json)?;
    tracing::info!(path = %path.display(), count = localities.len(), "Loaded localities");
    Ok(localities)
}
