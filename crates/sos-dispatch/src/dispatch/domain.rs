use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::{Coordinates, DecimalDegrees};

/// Identifier shared by every stored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category of an emergency facility. Ambulance stations are folded into `Hospital`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Hospital,
    Police,
    Fire,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 3] = [ServiceKind::Hospital, ServiceKind::Police, ServiceKind::Fire];

    pub const fn label(self) -> &'static str {
        match self {
            ServiceKind::Hospital => "hospital",
            ServiceKind::Police => "police",
            ServiceKind::Fire => "fire",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyService {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ServiceKind,
    pub latitude: DecimalDegrees,
    pub longitude: DecimalDegrees,
    pub address: String,
    pub phone: String,
    pub is_active: bool,
}

impl EmergencyService {
    pub fn from_draft(id: RecordId, draft: NewEmergencyService) -> Self {
        Self {
            id,
            name: draft.name,
            kind: draft.kind,
            latitude: draft.latitude,
            longitude: draft.longitude,
            address: draft.address,
            phone: draft.phone,
            is_active: draft.is_active,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude.value(), self.longitude.value())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEmergencyService {
    pub name: String,
    pub kind: ServiceKind,
    pub latitude: DecimalDegrees,
    pub longitude: DecimalDegrees,
    pub address: String,
    pub phone: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    Medical,
    Fire,
    Crime,
    Accident,
}

impl IncidentKind {
    pub const ALL: [IncidentKind; 4] = [
        IncidentKind::Medical,
        IncidentKind::Fire,
        IncidentKind::Crime,
        IncidentKind::Accident,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            IncidentKind::Medical => "medical",
            IncidentKind::Fire => "fire",
            IncidentKind::Crime => "crime",
            IncidentKind::Accident => "accident",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

    pub const fn label(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|severity| severity.label() == value)
    }
}

/// Incident lifecycle. Any state may be set from any other; only `Resolved` carries a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Reported,
    Acknowledged,
    InProgress,
    Resolved,
}

impl IncidentStatus {
    pub const ALL: [IncidentStatus; 4] = [
        IncidentStatus::Reported,
        IncidentStatus::Acknowledged,
        IncidentStatus::InProgress,
        IncidentStatus::Resolved,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            IncidentStatus::Reported => "reported",
            IncidentStatus::Acknowledged => "acknowledged",
            IncidentStatus::InProgress => "in_progress",
            IncidentStatus::Resolved => "resolved",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.label() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: IncidentKind,
    pub severity: Severity,
    pub description: Option<String>,
    pub latitude: DecimalDegrees,
    pub longitude: DecimalDegrees,
    pub address: Option<String>,
    pub reported_by: String,
    pub status: IncidentStatus,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Incident {
    pub fn from_draft(id: RecordId, draft: NewIncident, reported_at: DateTime<Utc>) -> Self {
        let mut incident = Self {
            id,
            kind: draft.kind,
            severity: draft.severity,
            description: draft.description,
            latitude: draft.latitude,
            longitude: draft.longitude,
            address: draft.address,
            reported_by: draft.reported_by,
            status: draft.status,
            photo_url: draft.photo_url,
            created_at: reported_at,
            resolved_at: None,
        };
        incident.apply_status(draft.status, reported_at);
        incident
    }

    /// Active means anything short of resolved.
    pub fn is_active(&self) -> bool {
        self.status != IncidentStatus::Resolved
    }

    /// Set the status, stamping `resolved_at` only for `Resolved` and clearing it otherwise.
    pub fn apply_status(&mut self, status: IncidentStatus, now: DateTime<Utc>) {
        self.status = status;
        self.resolved_at = match status {
            IncidentStatus::Resolved => Some(now),
            _ => None,
        };
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewIncident {
    pub kind: IncidentKind,
    pub severity: Severity,
    pub description: Option<String>,
    pub latitude: DecimalDegrees,
    pub longitude: DecimalDegrees,
    pub address: Option<String>,
    pub reported_by: String,
    pub status: IncidentStatus,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SosAlert {
    pub id: RecordId,
    pub user_id: String,
    pub latitude: DecimalDegrees,
    pub longitude: DecimalDegrees,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl SosAlert {
    pub fn from_draft(id: RecordId, draft: NewSosAlert, raised_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            latitude: draft.latitude,
            longitude: draft.longitude,
            is_active: true,
            created_at: raised_at,
            deactivated_at: None,
        }
    }

    /// One-way switch. Returns `false` when the alert was already inactive.
    pub fn deactivate(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        self.is_active = false;
        self.deactivated_at = Some(now);
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSosAlert {
    pub user_id: String,
    pub latitude: DecimalDegrees,
    pub longitude: DecimalDegrees,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamKind {
    Ambulance,
    FireTruck,
    PoliceUnit,
}

impl TeamKind {
    pub const ALL: [TeamKind; 3] = [TeamKind::Ambulance, TeamKind::FireTruck, TeamKind::PoliceUnit];

    pub const fn label(self) -> &'static str {
        match self {
            TeamKind::Ambulance => "ambulance",
            TeamKind::FireTruck => "fire_truck",
            TeamKind::PoliceUnit => "police_unit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamStatus {
    Available,
    EnRoute,
    Busy,
}

impl TeamStatus {
    pub const ALL: [TeamStatus; 3] = [TeamStatus::Available, TeamStatus::EnRoute, TeamStatus::Busy];

    pub const fn label(self) -> &'static str {
        match self {
            TeamStatus::Available => "available",
            TeamStatus::EnRoute => "en_route",
            TeamStatus::Busy => "busy",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.label() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTeam {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TeamKind,
    pub status: TeamStatus,
    pub latitude: Option<DecimalDegrees>,
    pub longitude: Option<DecimalDegrees>,
    pub assigned_incident_id: Option<RecordId>,
}

impl ResponseTeam {
    pub fn from_draft(id: RecordId, draft: NewResponseTeam) -> Self {
        Self {
            id,
            name: draft.name,
            kind: draft.kind,
            status: draft.status,
            latitude: draft.latitude,
            longitude: draft.longitude,
            assigned_incident_id: draft.assigned_incident_id,
        }
    }

    /// Status is freely settable. Position parts that are not supplied keep their last value.
    ///
    /// `assigned_incident_id` is left untouched, so it can disagree with `status`.
    pub fn apply_status(
        &mut self,
        status: TeamStatus,
        latitude: Option<DecimalDegrees>,
        longitude: Option<DecimalDegrees>,
    ) {
        self.status = status;
        if let Some(latitude) = latitude {
            self.latitude = Some(latitude);
        }
        if let Some(longitude) = longitude {
            self.longitude = Some(longitude);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewResponseTeam {
    pub name: String,
    pub kind: TeamKind,
    pub status: TeamStatus,
    pub latitude: Option<DecimalDegrees>,
    pub longitude: Option<DecimalDegrees>,
    pub assigned_incident_id: Option<RecordId>,
}

/// Lowercase label list used in validation messages.
pub(crate) fn expected_labels<T: Copy>(all: &[T], label: fn(T) -> &'static str) -> String {
    all.iter()
        .map(|value| label(*value))
        .collect::<Vec<_>>()
        .join(", ")
}
