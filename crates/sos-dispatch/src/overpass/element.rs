use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level Overpass `[out:json]` document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub version: Option<f64>,
    #[serde(default)]
    pub generator: Option<String>,
    #[serde(default)]
    pub elements: Vec<RawMapElement>,
}

/// Tagged node or way as returned by Overpass.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawMapElement {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    /// Present on ways when the query ends in `out center`.
    #[serde(default)]
    pub center: Option<ElementCenter>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ElementCenter {
    pub lat: f64,
    pub lon: f64,
}

impl RawMapElement {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Own position first, then the computed way center.
    pub fn position(&self) -> (Option<f64>, Option<f64>) {
        match (self.lat, self.lon, self.center) {
            (Some(lat), Some(lon), _) => (Some(lat), Some(lon)),
            (lat, lon, Some(center)) => (lat.or(Some(center.lat)), lon.or(Some(center.lon))),
            (lat, lon, None) => (lat, lon),
        }
    }
}
