use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::domain::RecordId;
use super::ranking::DEFAULT_NEARBY_LIMIT;
use super::repository::EmergencyStore;
use super::service::{DispatchError, DispatchService};
use super::validation::{
    parse_query_coordinates, IncidentStatusUpdate, IncidentSubmission, ResponseTeamSubmission,
    ServiceSubmission, SosAlertSubmission, TeamStatusUpdate, ValidationError,
};
use crate::overpass::GeodataSource;

type SharedService<S, G> = State<Arc<DispatchService<S, G>>>;

/// Router exposing the emergency services, incident, SOS and response team endpoints.
pub fn dispatch_router<S, G>(service: Arc<DispatchService<S, G>>) -> Router
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    Router::new()
        .route(
            "/api/emergency-services",
            get(list_services_handler::<S, G>).post(create_service_handler::<S, G>),
        )
        .route(
            "/api/emergency-services/nearby",
            get(nearby_services_handler::<S, G>),
        )
        .route(
            "/api/emergency-services/:kind",
            get(services_by_kind_handler::<S, G>),
        )
        .route(
            "/api/incidents",
            get(list_incidents_handler::<S, G>).post(create_incident_handler::<S, G>),
        )
        .route(
            "/api/incidents/active",
            get(active_incidents_handler::<S, G>),
        )
        .route("/api/incidents/:id", get(incident_handler::<S, G>))
        .route(
            "/api/incidents/:id/status",
            patch(incident_status_handler::<S, G>),
        )
        .route(
            "/api/sos-alerts",
            get(active_sos_alerts_handler::<S, G>).post(create_sos_alert_handler::<S, G>),
        )
        .route(
            "/api/sos-alerts/:id/deactivate",
            patch(deactivate_sos_alert_handler::<S, G>),
        )
        .route(
            "/api/response-teams",
            get(list_teams_handler::<S, G>).post(create_team_handler::<S, G>),
        )
        .route(
            "/api/response-teams/available",
            get(available_teams_handler::<S, G>),
        )
        .route(
            "/api/response-teams/:id/status",
            patch(team_status_handler::<S, G>),
        )
        .with_state(service)
}

/// Query string of `GET /api/emergency-services`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub use_real: Option<String>,
}

impl ServiceQuery {
    /// Live lookups need `useReal=true` and both coordinates present and non-blank.
    fn wants_live(&self) -> bool {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .is_some_and(|value| !value.trim().is_empty())
        };
        self.use_real.as_deref() == Some("true") && present(&self.lat) && present(&self.lon)
    }
}

/// Query string of `GET /api/emergency-services/nearby`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub limit: Option<String>,
    pub use_real: Option<String>,
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, DispatchError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(err) => err.into_response(),
    }
}

fn parse_id(raw: &str, entity: &'static str) -> Result<RecordId, DispatchError> {
    // Non-numeric ids cannot name a record.
    raw.trim()
        .parse::<u64>()
        .map(RecordId)
        .map_err(|_| DispatchError::NotFound {
            entity,
            id: RecordId(0),
        })
}

fn read_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    entity: &'static str,
) -> Result<T, DispatchError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ValidationError::malformed(entity, rejection.body_text()).into())
}

fn parse_limit(raw: Option<&str>) -> Result<usize, ValidationError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(DEFAULT_NEARBY_LIMIT),
        Some(value) => value.parse::<usize>().map_err(|_| {
            ValidationError::single("query", "limit", "must be a non-negative integer")
        }),
    }
}

pub(crate) async fn list_services_handler<S, G>(
    State(service): SharedService<S, G>,
    Query(query): Query<ServiceQuery>,
) -> Response
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    if !query.wants_live() {
        return respond(StatusCode::OK, service.active_services());
    }

    let result = match parse_query_coordinates(query.lat.as_deref(), query.lon.as_deref()) {
        Ok(origin) => service.live_services(origin).await,
        Err(err) => Err(err.into()),
    };
    respond(StatusCode::OK, result)
}

pub(crate) async fn nearby_services_handler<S, G>(
    State(service): SharedService<S, G>,
    Query(query): Query<NearbyQuery>,
) -> Response
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    let origin = match parse_query_coordinates(query.lat.as_deref(), query.lon.as_deref()) {
        Ok(origin) => origin,
        Err(err) => return DispatchError::from(err).into_response(),
    };
    let limit = match parse_limit(query.limit.as_deref()) {
        Ok(limit) => limit,
        Err(err) => return DispatchError::from(err).into_response(),
    };
    let live = query.use_real.as_deref() == Some("true");

    respond(
        StatusCode::OK,
        service.nearby_services(origin, limit, live).await,
    )
}

pub(crate) async fn services_by_kind_handler<S, G>(
    State(service): SharedService<S, G>,
    Path(kind): Path<String>,
) -> Response
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    respond(StatusCode::OK, service.services_by_kind(&kind))
}

pub(crate) async fn create_service_handler<S, G>(
    State(service): SharedService<S, G>,
    payload: Result<Json<ServiceSubmission>, JsonRejection>,
) -> Response
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    let result = read_body(payload, "emergency service")
        .and_then(|submission| service.create_service(submission));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn list_incidents_handler<S, G>(State(service): SharedService<S, G>) -> Response
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    respond(StatusCode::OK, service.incidents())
}

pub(crate) async fn active_incidents_handler<S, G>(
    State(service): SharedService<S, G>,
) -> Response
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    respond(StatusCode::OK, service.active_incidents())
}

pub(crate) async fn incident_handler<S, G>(
    State(service): SharedService<S, G>,
    Path(id): Path<String>,
) -> Response
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    let result = parse_id(&id, "Incident").and_then(|id| service.incident(id));
    respond(StatusCode::OK, result)
}

pub(crate) async fn create_incident_handler<S, G>(
    State(service): SharedService<S, G>,
    payload: Result<Json<IncidentSubmission>, JsonRejection>,
) -> Response
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    let result =
        read_body(payload, "incident").and_then(|submission| service.create_incident(submission));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn incident_status_handler<S, G>(
    State(service): SharedService<S, G>,
    Path(id): Path<String>,
    payload: Result<Json<IncidentStatusUpdate>, JsonRejection>,
) -> Response
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    let result = read_body(payload, "incident status").and_then(|update| {
        let id = parse_id(&id, "Incident")?;
        service.update_incident_status(id, update)
    });
    respond(StatusCode::OK, result)
}

pub(crate) async fn active_sos_alerts_handler<S, G>(
    State(service): SharedService<S, G>,
) -> Response
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    respond(StatusCode::OK, service.active_sos_alerts())
}

pub(crate) async fn create_sos_alert_handler<S, G>(
    State(service): SharedService<S, G>,
    payload: Result<Json<SosAlertSubmission>, JsonRejection>,
) -> Response
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    let result =
        read_body(payload, "SOS alert").and_then(|submission| service.create_sos_alert(submission));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn deactivate_sos_alert_handler<S, G>(
    State(service): SharedService<S, G>,
    Path(id): Path<String>,
) -> Response
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    let result = parse_id(&id, "SOS alert").and_then(|id| service.deactivate_sos_alert(id));
    respond(StatusCode::OK, result)
}

pub(crate) async fn list_teams_handler<S, G>(State(service): SharedService<S, G>) -> Response
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    respond(StatusCode::OK, service.response_teams())
}

pub(crate) async fn available_teams_handler<S, G>(
    State(service): SharedService<S, G>,
) -> Response
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    respond(StatusCode::OK, service.available_response_teams())
}

pub(crate) async fn create_team_handler<S, G>(
    State(service): SharedService<S, G>,
    payload: Result<Json<ResponseTeamSubmission>, JsonRejection>,
) -> Response
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    let result = read_body(payload, "response team")
        .and_then(|submission| service.create_response_team(submission));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn team_status_handler<S, G>(
    State(service): SharedService<S, G>,
    Path(id): Path<String>,
    payload: Result<Json<TeamStatusUpdate>, JsonRejection>,
) -> Response
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    let result = read_body(payload, "response team status").and_then(|update| {
        let id = parse_id(&id, "Response team")?;
        service.update_response_team_status(id, update)
    });
    respond(StatusCode::OK, result)
}
