use std::time::Duration;

use tracing::{debug, error};

use super::element::{OverpassResponse, RawMapElement};
use super::query::build_query;
use super::translate::translate_elements;
use super::{GeodataError, GeodataSource};
use crate::config::OverpassConfig;
use crate::dispatch::domain::EmergencyService;
use crate::geo::Coordinates;

/// HTTP client for an Overpass-compatible interpreter endpoint.
///
/// One request per lookup: no caching, no retries.
#[derive(Debug, Clone)]
pub struct OverpassClient {
    http: reqwest::Client,
    endpoint: String,
    timeout_secs: u64,
}

impl OverpassClient {
    pub fn new(config: &OverpassConfig) -> Result<Self, GeodataError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| GeodataError::Request {
                endpoint: config.endpoint.clone(),
                source,
            })?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run the facility query and return the raw elements.
    pub async fn fetch_elements(
        &self,
        origin: Coordinates,
        radius_meters: u32,
    ) -> Result<Vec<RawMapElement>, GeodataError> {
        let query = build_query(origin, radius_meters, self.timeout_secs);

        let response = self
            .http
            .post(&self.endpoint)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|source| GeodataError::Request {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), endpoint = %self.endpoint, "overpass request failed");
            return Err(GeodataError::Status {
                status: status.as_u16(),
                endpoint: self.endpoint.clone(),
            });
        }

        let body: OverpassResponse = response.json().await.map_err(|source| {
            GeodataError::Decode {
                endpoint: self.endpoint.clone(),
                source,
            }
        })?;

        debug!(
            elements = body.elements.len(),
            radius_meters, "overpass response received"
        );
        Ok(body.elements)
    }
}

impl GeodataSource for OverpassClient {
    async fn nearby_services(
        &self,
        origin: Coordinates,
        radius_meters: u32,
    ) -> Result<Vec<EmergencyService>, GeodataError> {
        let elements = self.fetch_elements(origin, radius_meters).await?;
        Ok(translate_elements(&elements))
    }
}
