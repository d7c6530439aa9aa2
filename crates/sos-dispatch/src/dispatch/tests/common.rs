use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::dispatch::domain::{
    EmergencyService, Incident, NewEmergencyService, NewIncident, NewResponseTeam, NewSosAlert,
    RecordId, ResponseTeam, ServiceKind, SosAlert,
};
use crate::dispatch::repository::{EmergencyStore, RepositoryError};
use crate::dispatch::validation::IncidentSubmission;
use crate::dispatch::{dispatch_router, DispatchService, MemoryStore};
use crate::geo::{CoordinateInput, Coordinates, DecimalDegrees};
use crate::overpass::{GeodataError, GeodataSource};

pub(super) const RADIUS_METERS: u32 = 10_000;

pub(super) fn build_service() -> (DispatchService<MemoryStore, StaticGeodata>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let service = DispatchService::new(
        store.clone(),
        Arc::new(StaticGeodata::default()),
        RADIUS_METERS,
    );
    (service, store)
}

pub(super) fn build_seeded_service() -> DispatchService<MemoryStore, StaticGeodata> {
    let store = Arc::new(MemoryStore::seeded().expect("seed succeeds"));
    DispatchService::new(store, Arc::new(StaticGeodata::default()), RADIUS_METERS)
}

pub(super) fn router_with<G: GeodataSource + 'static>(
    store: MemoryStore,
    geodata: G,
) -> axum::Router {
    dispatch_router(Arc::new(DispatchService::new(
        Arc::new(store),
        Arc::new(geodata),
        RADIUS_METERS,
    )))
}

pub(super) fn incident_submission() -> IncidentSubmission {
    IncidentSubmission {
        kind: Some("fire".into()),
        severity: Some("high".into()),
        description: Some("Smoke from a basement window".into()),
        latitude: Some(CoordinateInput::Number(40.71)),
        longitude: Some(CoordinateInput::Number(-74.00)),
        address: None,
        reported_by: Some("anonymous".into()),
        status: Some("reported".into()),
        photo_url: None,
    }
}

pub(super) fn live_service(name: &str, latitude: &str, longitude: &str) -> EmergencyService {
    EmergencyService {
        id: RecordId(1),
        name: name.to_string(),
        kind: ServiceKind::Hospital,
        latitude: DecimalDegrees::parse(latitude).expect("valid latitude"),
        longitude: DecimalDegrees::parse(longitude).expect("valid longitude"),
        address: "Address not available".to_string(),
        phone: "Phone not available".to_string(),
        is_active: true,
    }
}

/// Geodata fake returning a fixed list and recording the radius it was asked for.
#[derive(Default)]
pub(super) struct StaticGeodata {
    pub(super) services: Vec<EmergencyService>,
    pub(super) requests: std::sync::Mutex<Vec<(Coordinates, u32)>>,
}

impl StaticGeodata {
    pub(super) fn with_services(services: Vec<EmergencyService>) -> Self {
        Self {
            services,
            requests: Default::default(),
        }
    }

    pub(super) fn requests(&self) -> Vec<(Coordinates, u32)> {
        self.requests.lock().expect("requests mutex poisoned").clone()
    }
}

impl GeodataSource for StaticGeodata {
    async fn nearby_services(
        &self,
        origin: Coordinates,
        radius_meters: u32,
    ) -> Result<Vec<EmergencyService>, GeodataError> {
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push((origin, radius_meters));
        Ok(self.services.clone())
    }
}

pub(super) struct FailingGeodata;

impl GeodataSource for FailingGeodata {
    async fn nearby_services(
        &self,
        _origin: Coordinates,
        _radius_meters: u32,
    ) -> Result<Vec<EmergencyService>, GeodataError> {
        Err(GeodataError::Status {
            status: 504,
            endpoint: "http://overpass.test/api/interpreter".to_string(),
        })
    }
}

pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl EmergencyStore for UnavailableStore {
    fn services(&self) -> Result<Vec<EmergencyService>, RepositoryError> {
        offline()
    }

    fn insert_service(
        &self,
        _draft: NewEmergencyService,
    ) -> Result<EmergencyService, RepositoryError> {
        offline()
    }

    fn incidents(&self) -> Result<Vec<Incident>, RepositoryError> {
        offline()
    }

    fn fetch_incident(&self, _id: RecordId) -> Result<Option<Incident>, RepositoryError> {
        offline()
    }

    fn insert_incident(
        &self,
        _draft: NewIncident,
        _reported_at: DateTime<Utc>,
    ) -> Result<Incident, RepositoryError> {
        offline()
    }

    fn update_incident(&self, _incident: Incident) -> Result<(), RepositoryError> {
        offline()
    }

    fn sos_alerts(&self) -> Result<Vec<SosAlert>, RepositoryError> {
        offline()
    }

    fn fetch_sos_alert(&self, _id: RecordId) -> Result<Option<SosAlert>, RepositoryError> {
        offline()
    }

    fn insert_sos_alert(
        &self,
        _draft: NewSosAlert,
        _raised_at: DateTime<Utc>,
    ) -> Result<SosAlert, RepositoryError> {
        offline()
    }

    fn update_sos_alert(&self, _alert: SosAlert) -> Result<(), RepositoryError> {
        offline()
    }

    fn response_teams(&self) -> Result<Vec<ResponseTeam>, RepositoryError> {
        offline()
    }

    fn fetch_response_team(&self, _id: RecordId) -> Result<Option<ResponseTeam>, RepositoryError> {
        offline()
    }

    fn insert_response_team(
        &self,
        _draft: NewResponseTeam,
    ) -> Result<ResponseTeam, RepositoryError> {
        offline()
    }

    fn update_response_team(&self, _team: ResponseTeam) -> Result<(), RepositoryError> {
        offline()
    }
}

pub(super) fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serialize body")))
        .expect("request builds")
}

pub(super) fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
