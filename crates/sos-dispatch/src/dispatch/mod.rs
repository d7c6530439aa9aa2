//! Emergency services, incidents, SOS alerts and response teams.
//!
//! [`DispatchService`] owns the lifecycle rules and [`dispatch_router`] exposes them over HTTP.
//! Storage sits behind [`EmergencyStore`]; [`MemoryStore`] is the bundled backend.

pub mod domain;
pub mod import;
pub mod memory;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    EmergencyService, Incident, IncidentKind, IncidentStatus, NewEmergencyService, NewIncident,
    NewResponseTeam, NewSosAlert, RecordId, ResponseTeam, ServiceKind, Severity, SosAlert,
    TeamKind, TeamStatus,
};
pub use import::{ImportError, ServiceCsvImporter};
pub use memory::{demo_response_teams, demo_services, MemoryStore};
pub use ranking::{rank_services, RankedService, DEFAULT_NEARBY_LIMIT};
pub use repository::{EmergencyStore, RepositoryError};
pub use router::dispatch_router;
pub use service::{DispatchError, DispatchService};
pub use validation::{
    parse_query_coordinates, FieldViolation, IncidentStatusUpdate, IncidentSubmission,
    ResponseTeamSubmission, ServiceSubmission, SosAlertSubmission, TeamStatusChange,
    TeamStatusUpdate, TextInput, ValidationError,
};
