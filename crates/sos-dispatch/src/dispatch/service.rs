use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};

use super::domain::{
    EmergencyService, Incident, RecordId, ResponseTeam, ServiceKind, SosAlert, TeamStatus,
};
use super::ranking::{rank_services, RankedService};
use super::repository::{EmergencyStore, RepositoryError};
use super::validation::{
    IncidentStatusUpdate, IncidentSubmission, ResponseTeamSubmission, ServiceSubmission,
    SosAlertSubmission, TeamStatusUpdate, ValidationError,
};
use crate::geo::Coordinates;
use crate::overpass::{GeodataError, GeodataSource};

/// Coordinates the store, the geodata source, and the lifecycle rules for every entity kind.
pub struct DispatchService<S, G> {
    store: Arc<S>,
    geodata: Arc<G>,
    radius_meters: u32,
}

impl<S, G> DispatchService<S, G>
where
    S: EmergencyStore + 'static,
    G: GeodataSource + 'static,
{
    pub fn new(store: Arc<S>, geodata: Arc<G>, radius_meters: u32) -> Self {
        Self {
            store,
            geodata,
            radius_meters,
        }
    }

    /// Stored services with `isActive = true`, in insertion order.
    pub fn active_services(&self) -> Result<Vec<EmergencyService>, DispatchError> {
        let services = self.store.services()?;
        Ok(services
            .into_iter()
            .filter(|service| service.is_active)
            .collect())
    }

    /// Active services of one kind. An unrecognised kind matches nothing.
    pub fn services_by_kind(&self, kind: &str) -> Result<Vec<EmergencyService>, DispatchError> {
        let Some(kind) = ServiceKind::parse(kind) else {
            return Ok(Vec::new());
        };
        let services = self.active_services()?;
        Ok(services
            .into_iter()
            .filter(|service| service.kind == kind)
            .collect())
    }

    pub fn create_service(
        &self,
        submission: ServiceSubmission,
    ) -> Result<EmergencyService, DispatchError> {
        let draft = submission.validate()?;
        let service = self.store.insert_service(draft)?;
        info!(service_id = %service.id, kind = service.kind.label(), "emergency service registered");
        Ok(service)
    }

    /// Facilities around `origin` from the live geodata source. Failures are not retried.
    pub async fn live_services(
        &self,
        origin: Coordinates,
    ) -> Result<Vec<EmergencyService>, DispatchError> {
        match self.geodata.nearby_services(origin, self.radius_meters).await {
            Ok(services) => {
                info!(
                    count = services.len(),
                    radius_meters = self.radius_meters,
                    "live emergency services fetched"
                );
                Ok(services)
            }
            Err(err) => {
                warn!(error = %err, "live emergency service lookup failed");
                Err(DispatchError::Upstream(err))
            }
        }
    }

    /// The `limit` services nearest to `origin`, drawn from the store or the live source.
    pub async fn nearby_services(
        &self,
        origin: Coordinates,
        limit: usize,
        live: bool,
    ) -> Result<Vec<RankedService>, DispatchError> {
        let services = if live {
            self.live_services(origin).await?
        } else {
            self.active_services()?
        };
        Ok(rank_services(&services, Some(origin), limit))
    }

    pub fn incidents(&self) -> Result<Vec<Incident>, DispatchError> {
        Ok(self.store.incidents()?)
    }

    /// Incidents whose status is anything but resolved.
    pub fn active_incidents(&self) -> Result<Vec<Incident>, DispatchError> {
        let incidents = self.store.incidents()?;
        Ok(incidents
            .into_iter()
            .filter(Incident::is_active)
            .collect())
    }

    pub fn incident(&self, id: RecordId) -> Result<Incident, DispatchError> {
        self.store
            .fetch_incident(id)?
            .ok_or(DispatchError::NotFound {
                entity: "Incident",
                id,
            })
    }

    pub fn create_incident(
        &self,
        submission: IncidentSubmission,
    ) -> Result<Incident, DispatchError> {
        let draft = submission.validate()?;
        let incident = self.store.insert_incident(draft, Utc::now())?;
        info!(
            incident_id = %incident.id,
            kind = incident.kind.label(),
            severity = incident.severity.label(),
            "incident reported"
        );
        Ok(incident)
    }

    /// Any valid status may follow any other. `resolvedAt` tracks whether the latest status is resolved.
    pub fn update_incident_status(
        &self,
        id: RecordId,
        update: IncidentStatusUpdate,
    ) -> Result<Incident, DispatchError> {
        let status = update.validate()?;
        let mut incident = self.incident(id)?;
        let previous = incident.status;
        incident.apply_status(status, Utc::now());
        self.store
            .update_incident(incident.clone())
            .map_err(|err| not_found_as(err, "Incident", id))?;
        info!(
            incident_id = %id,
            from = previous.label(),
            to = status.label(),
            "incident status changed"
        );
        Ok(incident)
    }

    pub fn active_sos_alerts(&self) -> Result<Vec<SosAlert>, DispatchError> {
        let alerts = self.store.sos_alerts()?;
        Ok(alerts.into_iter().filter(|alert| alert.is_active).collect())
    }

    pub fn create_sos_alert(
        &self,
        submission: SosAlertSubmission,
    ) -> Result<SosAlert, DispatchError> {
        let draft = submission.validate()?;
        let alert = self.store.insert_sos_alert(draft, Utc::now())?;
        warn!(
            alert_id = %alert.id,
            user_id = %alert.user_id,
            latitude = %alert.latitude,
            longitude = %alert.longitude,
            "SOS alert raised"
        );
        Ok(alert)
    }

    /// Deactivation is one-way: an alert that is already inactive reads as not found.
    pub fn deactivate_sos_alert(&self, id: RecordId) -> Result<SosAlert, DispatchError> {
        let missing = DispatchError::NotFound {
            entity: "SOS alert",
            id,
        };
        let Some(mut alert) = self.store.fetch_sos_alert(id)? else {
            return Err(missing);
        };
        if !alert.deactivate(Utc::now()) {
            return Err(missing);
        }
        self.store
            .update_sos_alert(alert.clone())
            .map_err(|err| not_found_as(err, "SOS alert", id))?;
        info!(alert_id = %id, "SOS alert deactivated");
        Ok(alert)
    }

    pub fn response_teams(&self) -> Result<Vec<ResponseTeam>, DispatchError> {
        Ok(self.store.response_teams()?)
    }

    pub fn available_response_teams(&self) -> Result<Vec<ResponseTeam>, DispatchError> {
        let teams = self.store.response_teams()?;
        Ok(teams
            .into_iter()
            .filter(|team| team.status == TeamStatus::Available)
            .collect())
    }

    pub fn create_response_team(
        &self,
        submission: ResponseTeamSubmission,
    ) -> Result<ResponseTeam, DispatchError> {
        let draft = submission.validate()?;
        let team = self.store.insert_response_team(draft)?;
        info!(team_id = %team.id, kind = team.kind.label(), "response team registered");
        Ok(team)
    }

    pub fn update_response_team_status(
        &self,
        id: RecordId,
        update: TeamStatusUpdate,
    ) -> Result<ResponseTeam, DispatchError> {
        let change = update.validate()?;
        let mut team = self
            .store
            .fetch_response_team(id)?
            .ok_or(DispatchError::NotFound {
                entity: "Response team",
                id,
            })?;
        let previous = team.status;
        team.apply_status(change.status, change.latitude, change.longitude);
        self.store
            .update_response_team(team.clone())
            .map_err(|err| not_found_as(err, "Response team", id))?;
        info!(
            team_id = %id,
            from = previous.label(),
            to = change.status.label(),
            "response team status changed"
        );
        Ok(team)
    }
}

fn not_found_as(err: RepositoryError, entity: &'static str, id: RecordId) -> DispatchError {
    match err {
        RepositoryError::NotFound => DispatchError::NotFound { entity, id },
        other => DispatchError::Repository(other),
    }
}

/// Error raised by the dispatch service.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: RecordId },
    #[error(transparent)]
    Upstream(#[from] GeodataError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl DispatchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::Validation(_) => StatusCode::BAD_REQUEST,
            DispatchError::NotFound { .. } => StatusCode::NOT_FOUND,
            DispatchError::Upstream(_) | DispatchError::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let payload = match &self {
            DispatchError::Validation(err) => json!({
                "message": err.to_string(),
                "details": err.violations,
            }),
            DispatchError::NotFound { .. } => json!({
                "message": self.to_string(),
            }),
            DispatchError::Upstream(err) => {
                error!(error = %err, "geodata upstream failure");
                json!({
                    "message": "Failed to fetch emergency services",
                    "error": err.to_string(),
                })
            }
            DispatchError::Repository(err) => {
                error!(error = %err, "dispatch storage failure");
                json!({
                    "message": "Internal server error",
                })
            }
        };
        (status, Json(payload)).into_response()
    }
}
