use std::fmt::Write;

use crate::geo::Coordinates;

/// Tag selectors for every facility the translator understands.
const SELECTORS: [(&str, &str); 5] = [
    ("amenity", "hospital"),
    ("amenity", "clinic"),
    ("amenity", "police"),
    ("amenity", "fire_station"),
    ("emergency", "ambulance_station"),
];

/// Build the Overpass QL union of nodes and ways around `origin`, with way centers included.
pub fn build_query(origin: Coordinates, radius_meters: u32, timeout_secs: u64) -> String {
    let around = format!(
        "(around:{radius_meters},{},{})",
        origin.latitude, origin.longitude
    );

    let mut query = format!("[out:json][timeout:{timeout_secs}];\n(\n");
    for element in ["node", "way"] {
        for (key, value) in SELECTORS {
            // Writing into a String cannot fail.
            let _ = writeln!(query, "  {element}[{key}={value}]{around};");
        }
    }
    query.push_str(");\nout center;\n");
    query
}
