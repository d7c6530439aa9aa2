use chrono::{DateTime, Utc};

use super::domain::{
    EmergencyService, Incident, NewEmergencyService, NewIncident, NewResponseTeam, NewSosAlert,
    RecordId, ResponseTeam, SosAlert,
};

/// Storage abstraction so the dispatch service can run against memory or a relational backend.
///
/// Each call is atomic on its own. Status changes are a `fetch_*` followed by an `update_*`,
/// so two writers racing on the same id can lose one update.
pub trait EmergencyStore: Send + Sync {
    fn services(&self) -> Result<Vec<EmergencyService>, RepositoryError>;
    fn insert_service(&self, draft: NewEmergencyService)
        -> Result<EmergencyService, RepositoryError>;

    fn incidents(&self) -> Result<Vec<Incident>, RepositoryError>;
    fn fetch_incident(&self, id: RecordId) -> Result<Option<Incident>, RepositoryError>;
    fn insert_incident(
        &self,
        draft: NewIncident,
        reported_at: DateTime<Utc>,
    ) -> Result<Incident, RepositoryError>;
    fn update_incident(&self, incident: Incident) -> Result<(), RepositoryError>;

    fn sos_alerts(&self) -> Result<Vec<SosAlert>, RepositoryError>;
    fn fetch_sos_alert(&self, id: RecordId) -> Result<Option<SosAlert>, RepositoryError>;
    fn insert_sos_alert(
        &self,
        draft: NewSosAlert,
        raised_at: DateTime<Utc>,
    ) -> Result<SosAlert, RepositoryError>;
    fn update_sos_alert(&self, alert: SosAlert) -> Result<(), RepositoryError>;

    fn response_teams(&self) -> Result<Vec<ResponseTeam>, RepositoryError>;
    fn fetch_response_team(&self, id: RecordId) -> Result<Option<ResponseTeam>, RepositoryError>;
    fn insert_response_team(&self, draft: NewResponseTeam)
        -> Result<ResponseTeam, RepositoryError>;
    fn update_response_team(&self, team: ResponseTeam) -> Result<(), RepositoryError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
