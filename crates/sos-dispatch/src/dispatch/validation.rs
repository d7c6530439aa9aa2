//! Inbound payloads and the field-level checks that turn them into store drafts.
//!
//! Text, enum and coordinate fields are loose ([`TextInput`], [`CoordinateInput`]), so a value of the
//! wrong JSON type becomes a violation on that field. `isActive` and `assignedIncidentId` stay typed;
//! a mismatch there rejects the body as a whole.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{
    expected_labels, IncidentKind, IncidentStatus, NewEmergencyService, NewIncident,
    NewResponseTeam, NewSosAlert, RecordId, ServiceKind, Severity, TeamKind, TeamStatus,
};
use crate::geo::{
    latitude_in_range, longitude_in_range, CoordinateInput, Coordinates, DecimalDegrees,
};

const DEFAULT_REPORTER: &str = "Anonymous";

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Payload rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub entity: &'static str,
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn single(entity: &'static str, field: &str, message: impl Into<String>) -> Self {
        Self {
            entity,
            violations: vec![FieldViolation {
                field: field.to_string(),
                message: message.into(),
            }],
        }
    }

    /// Body could not be read as JSON at all.
    pub fn malformed(entity: &'static str, detail: impl Into<String>) -> Self {
        Self::single(entity, "body", detail)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|violation| violation.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} data", self.entity)?;
        for (index, violation) in self.violations.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{} {}", violation.field, violation.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Text as submitted by clients. Anything other than a JSON string is kept so the checker can name
/// the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    Text(String),
    Other(serde_json::Value),
}

impl From<&str> for TextInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TextInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

struct Checker {
    entity: &'static str,
    violations: Vec<FieldViolation>,
}

impl Checker {
    fn new(entity: &'static str) -> Self {
        Self {
            entity,
            violations: Vec::new(),
        }
    }

    fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Unwrap a loose text field; a non-string value is rejected and treated as absent.
    fn text(&mut self, field: &str, value: Option<TextInput>) -> Option<String> {
        match value? {
            TextInput::Text(text) => Some(text),
            TextInput::Other(serde_json::Value::Null) => None,
            TextInput::Other(_) => {
                self.reject(field, "must be a string");
                None
            }
        }
    }

    fn required_text(&mut self, field: &str, value: Option<TextInput>) -> Option<String> {
        let rejected = self.violations.len();
        match non_blank(self.text(field, value)) {
            Some(text) => Some(text),
            None => {
                if self.violations.len() == rejected {
                    self.reject(field, "is required");
                }
                None
            }
        }
    }

    fn required_enum<T: Copy>(
        &mut self,
        field: &str,
        value: Option<TextInput>,
        parse: fn(&str) -> Option<T>,
        all: &[T],
        label: fn(T) -> &'static str,
    ) -> Option<T> {
        let raw = self.required_text(field, value)?;
        self.checked_enum(field, &raw, parse, all, label)
    }

    fn optional_enum<T: Copy>(
        &mut self,
        field: &str,
        value: Option<TextInput>,
        parse: fn(&str) -> Option<T>,
        all: &[T],
        label: fn(T) -> &'static str,
    ) -> Option<T> {
        let raw = self.text(field, value)?;
        self.checked_enum(field, &raw, parse, all, label)
    }

    fn checked_enum<T: Copy>(
        &mut self,
        field: &str,
        raw: &str,
        parse: fn(&str) -> Option<T>,
        all: &[T],
        label: fn(T) -> &'static str,
    ) -> Option<T> {
        let parsed = parse(raw);
        if parsed.is_none() {
            self.reject(
                field,
                format!("must be one of: {}", expected_labels(all, label)),
            );
        }
        parsed
    }

    fn required_coordinate(
        &mut self,
        field: &str,
        value: Option<&CoordinateInput>,
        in_range: fn(f64) -> bool,
    ) -> Option<DecimalDegrees> {
        match value {
            None => {
                self.reject(field, "is required");
                None
            }
            Some(input) => self.optional_coordinate(field, Some(input), in_range),
        }
    }

    fn optional_coordinate(
        &mut self,
        field: &str,
        value: Option<&CoordinateInput>,
        in_range: fn(f64) -> bool,
    ) -> Option<DecimalDegrees> {
        let input = value?;
        match input.normalize() {
            Some(degrees) if in_range(degrees.value()) => Some(degrees),
            Some(_) => {
                self.reject(field, "is out of range");
                None
            }
            None => {
                self.reject(field, "must be a number or numeric string");
                None
            }
        }
    }

    fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, ValidationError> {
        if self.violations.is_empty() {
            if let Some(value) = build() {
                return Ok(value);
            }
        }
        Err(ValidationError {
            entity: self.entity,
            violations: self.violations,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Body of `POST /api/incidents`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentSubmission {
    #[serde(rename = "type", default)]
    pub kind: Option<TextInput>,
    #[serde(default)]
    pub severity: Option<TextInput>,
    #[serde(default)]
    pub description: Option<TextInput>,
    #[serde(default)]
    pub latitude: Option<CoordinateInput>,
    #[serde(default)]
    pub longitude: Option<CoordinateInput>,
    #[serde(default)]
    pub address: Option<TextInput>,
    #[serde(default)]
    pub reported_by: Option<TextInput>,
    #[serde(default)]
    pub status: Option<TextInput>,
    #[serde(default)]
    pub photo_url: Option<TextInput>,
}

impl IncidentSubmission {
    pub fn validate(self) -> Result<NewIncident, ValidationError> {
        let mut check = Checker::new("incident");
        let kind = check.required_enum(
            "type",
            self.kind,
            IncidentKind::parse,
            &IncidentKind::ALL,
            IncidentKind::label,
        );
        let severity = check.required_enum(
            "severity",
            self.severity,
            Severity::parse,
            &Severity::ALL,
            Severity::label,
        );
        let status = check
            .optional_enum(
                "status",
                self.status,
                IncidentStatus::parse,
                &IncidentStatus::ALL,
                IncidentStatus::label,
            )
            .unwrap_or(IncidentStatus::Reported);
        let latitude =
            check.required_coordinate("latitude", self.latitude.as_ref(), latitude_in_range);
        let longitude =
            check.required_coordinate("longitude", self.longitude.as_ref(), longitude_in_range);
        let description = check.text("description", self.description);
        let address = check.text("address", self.address);
        let photo_url = check.text("photoUrl", self.photo_url);
        let reported_by = non_blank(check.text("reportedBy", self.reported_by))
            .unwrap_or_else(|| DEFAULT_REPORTER.to_string());

        check.finish(|| {
            Some(NewIncident {
                kind: kind?,
                severity: severity?,
                description,
                latitude: latitude?,
                longitude: longitude?,
                address,
                reported_by,
                status,
                photo_url,
            })
        })
    }
}

/// Body of `POST /api/sos-alerts`. Any client-provided `isActive` is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SosAlertSubmission {
    #[serde(default)]
    pub user_id: Option<TextInput>,
    #[serde(default)]
    pub latitude: Option<CoordinateInput>,
    #[serde(default)]
    pub longitude: Option<CoordinateInput>,
}

impl SosAlertSubmission {
    pub fn validate(self) -> Result<NewSosAlert, ValidationError> {
        let mut check = Checker::new("SOS alert");
        let user_id = check.required_text("userId", self.user_id);
        let latitude =
            check.required_coordinate("latitude", self.latitude.as_ref(), latitude_in_range);
        let longitude =
            check.required_coordinate("longitude", self.longitude.as_ref(), longitude_in_range);

        check.finish(|| {
            Some(NewSosAlert {
                user_id: user_id?,
                latitude: latitude?,
                longitude: longitude?,
            })
        })
    }
}

/// Body of `POST /api/emergency-services`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSubmission {
    #[serde(default)]
    pub name: Option<TextInput>,
    #[serde(rename = "type", default)]
    pub kind: Option<TextInput>,
    #[serde(default)]
    pub latitude: Option<CoordinateInput>,
    #[serde(default)]
    pub longitude: Option<CoordinateInput>,
    #[serde(default)]
    pub address: Option<TextInput>,
    #[serde(default)]
    pub phone: Option<TextInput>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl ServiceSubmission {
    pub fn validate(self) -> Result<NewEmergencyService, ValidationError> {
        let mut check = Checker::new("emergency service");
        let name = check.required_text("name", self.name);
        let kind = check.required_enum(
            "type",
            self.kind,
            ServiceKind::parse,
            &ServiceKind::ALL,
            ServiceKind::label,
        );
        let latitude =
            check.required_coordinate("latitude", self.latitude.as_ref(), latitude_in_range);
        let longitude =
            check.required_coordinate("longitude", self.longitude.as_ref(), longitude_in_range);
        let address = check.required_text("address", self.address);
        let phone = check.required_text("phone", self.phone);

        check.finish(|| {
            Some(NewEmergencyService {
                name: name?,
                kind: kind?,
                latitude: latitude?,
                longitude: longitude?,
                address: address?,
                phone: phone?,
                is_active: self.is_active.unwrap_or(true),
            })
        })
    }
}

/// Body of `POST /api/response-teams`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTeamSubmission {
    #[serde(default)]
    pub name: Option<TextInput>,
    #[serde(rename = "type", default)]
    pub kind: Option<TextInput>,
    #[serde(default)]
    pub status: Option<TextInput>,
    #[serde(default)]
    pub latitude: Option<CoordinateInput>,
    #[serde(default)]
    pub longitude: Option<CoordinateInput>,
    #[serde(default)]
    pub assigned_incident_id: Option<u64>,
}

impl ResponseTeamSubmission {
    pub fn validate(self) -> Result<NewResponseTeam, ValidationError> {
        let mut check = Checker::new("response team");
        let name = check.required_text("name", self.name);
        let kind = check.required_enum(
            "type",
            self.kind,
            TeamKind::parse,
            &TeamKind::ALL,
            TeamKind::label,
        );
        let status = check
            .optional_enum(
                "status",
                self.status,
                TeamStatus::parse,
                &TeamStatus::ALL,
                TeamStatus::label,
            )
            .unwrap_or(TeamStatus::Available);
        let latitude =
            check.optional_coordinate("latitude", self.latitude.as_ref(), latitude_in_range);
        let longitude =
            check.optional_coordinate("longitude", self.longitude.as_ref(), longitude_in_range);

        check.finish(|| {
            Some(NewResponseTeam {
                name: name?,
                kind: kind?,
                status,
                latitude,
                longitude,
                assigned_incident_id: self.assigned_incident_id.map(RecordId),
            })
        })
    }
}

/// Body of `PATCH /api/incidents/:id/status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentStatusUpdate {
    #[serde(default)]
    pub status: Option<TextInput>,
}

impl IncidentStatusUpdate {
    pub fn new(status: IncidentStatus) -> Self {
        Self {
            status: Some(status.label().into()),
        }
    }

    pub fn validate(self) -> Result<IncidentStatus, ValidationError> {
        let mut check = Checker::new("incident status");
        let status = check.required_enum(
            "status",
            self.status,
            IncidentStatus::parse,
            &IncidentStatus::ALL,
            IncidentStatus::label,
        );
        check.finish(|| status)
    }
}

/// Body of `PATCH /api/response-teams/:id/status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStatusUpdate {
    #[serde(default)]
    pub status: Option<TextInput>,
    #[serde(default)]
    pub latitude: Option<CoordinateInput>,
    #[serde(default)]
    pub longitude: Option<CoordinateInput>,
}

/// Validated team status change.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamStatusChange {
    pub status: TeamStatus,
    pub latitude: Option<DecimalDegrees>,
    pub longitude: Option<DecimalDegrees>,
}

impl TeamStatusUpdate {
    pub fn new(status: TeamStatus) -> Self {
        Self {
            status: Some(status.label().into()),
            ..Self::default()
        }
    }

    pub fn validate(self) -> Result<TeamStatusChange, ValidationError> {
        let mut check = Checker::new("response team status");
        let status = check.required_enum(
            "status",
            self.status,
            TeamStatus::parse,
            &TeamStatus::ALL,
            TeamStatus::label,
        );
        let latitude =
            check.optional_coordinate("latitude", self.latitude.as_ref(), latitude_in_range);
        let longitude =
            check.optional_coordinate("longitude", self.longitude.as_ref(), longitude_in_range);

        check.finish(|| {
            Some(TeamStatusChange {
                status: status?,
                latitude,
                longitude,
            })
        })
    }
}

/// Parse `lat`/`lon` query values, rejecting anything non-numeric.
pub fn parse_query_coordinates(
    lat: Option<&str>,
    lon: Option<&str>,
) -> Result<Coordinates, ValidationError> {
    let mut check = Checker::new("coordinate");
    let latitude = check.required_coordinate(
        "lat",
        lat.map(CoordinateInput::from).as_ref(),
        latitude_in_range,
    );
    let longitude = check.required_coordinate(
        "lon",
        lon.map(CoordinateInput::from).as_ref(),
        longitude_in_range,
    );
    check.finish(|| {
        Some(Coordinates::new(latitude?.value(), longitude?.value()))
    })
}
