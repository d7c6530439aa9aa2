//! Live facility lookups against OpenStreetMap's Overpass API.

mod client;
mod element;
mod query;
mod translate;

use std::future::Future;

use crate::dispatch::domain::EmergencyService;
use crate::geo::Coordinates;

pub use client::OverpassClient;
pub use element::{ElementCenter, OverpassResponse, RawMapElement};
pub use query::build_query;
pub use translate::translate_elements;

/// Source of facilities near a point, usually [`OverpassClient`].
pub trait GeodataSource: Send + Sync {
    fn nearby_services(
        &self,
        origin: Coordinates,
        radius_meters: u32,
    ) -> impl Future<Output = Result<Vec<EmergencyService>, GeodataError>> + Send;
}

/// Failure talking to the geodata upstream.
#[derive(Debug, thiserror::Error)]
pub enum GeodataError {
    #[error("Overpass request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Overpass API request failed: {status} from {endpoint}")]
    Status { status: u16, endpoint: String },
    #[error("Overpass response from {endpoint} was not valid JSON: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("geodata lookup unavailable: {0}")]
    Unavailable(String),
}
