use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::domain::{
    EmergencyService, Incident, NewEmergencyService, NewIncident, NewResponseTeam, NewSosAlert,
    RecordId, ResponseTeam, ServiceKind, SosAlert, TeamKind, TeamStatus,
};
use super::repository::{EmergencyStore, RepositoryError};
use crate::geo::DecimalDegrees;

/// Process-local store. Ids come from one counter shared by every entity kind.
#[derive(Debug)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Debug)]
struct Tables {
    next_id: u64,
    services: BTreeMap<RecordId, EmergencyService>,
    incidents: BTreeMap<RecordId, Incident>,
    sos_alerts: BTreeMap<RecordId, SosAlert>,
    response_teams: BTreeMap<RecordId, ResponseTeam>,
}

impl Tables {
    fn allocate(&mut self) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables {
                next_id: 1,
                services: BTreeMap::new(),
                incidents: BTreeMap::new(),
                sos_alerts: BTreeMap::new(),
                response_teams: BTreeMap::new(),
            }),
        }
    }

    /// Store preloaded with the demo services and response teams.
    pub fn seeded() -> Result<Self, RepositoryError> {
        let store = Self::new();
        for draft in demo_services() {
            store.insert_service(draft)?;
        }
        for draft in demo_response_teams() {
            store.insert_response_team(draft)?;
        }
        debug!("memory store seeded with demo data");
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("memory store lock poisoned".to_string()))
    }
}

fn replace<T>(
    table: &mut BTreeMap<RecordId, T>,
    id: RecordId,
    record: T,
) -> Result<(), RepositoryError> {
    match table.get_mut(&id) {
        Some(slot) => {
            *slot = record;
            Ok(())
        }
        None => Err(RepositoryError::NotFound),
    }
}

impl EmergencyStore for MemoryStore {
    fn services(&self) -> Result<Vec<EmergencyService>, RepositoryError> {
        Ok(self.lock()?.services.values().cloned().collect())
    }

    fn insert_service(
        &self,
        draft: NewEmergencyService,
    ) -> Result<EmergencyService, RepositoryError> {
        let mut tables = self.lock()?;
        let id = tables.allocate();
        let service = EmergencyService::from_draft(id, draft);
        tables.services.insert(id, service.clone());
        Ok(service)
    }

    fn incidents(&self) -> Result<Vec<Incident>, RepositoryError> {
        Ok(self.lock()?.incidents.values().cloned().collect())
    }

    fn fetch_incident(&self, id: RecordId) -> Result<Option<Incident>, RepositoryError> {
        Ok(self.lock()?.incidents.get(&id).cloned())
    }

    fn insert_incident(
        &self,
        draft: NewIncident,
        reported_at: DateTime<Utc>,
    ) -> Result<Incident, RepositoryError> {
        let mut tables = self.lock()?;
        let id = tables.allocate();
        let incident = Incident::from_draft(id, draft, reported_at);
        tables.incidents.insert(id, incident.clone());
        Ok(incident)
    }

    fn update_incident(&self, incident: Incident) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        replace(&mut tables.incidents, incident.id, incident)
    }

    fn sos_alerts(&self) -> Result<Vec<SosAlert>, RepositoryError> {
        Ok(self.lock()?.sos_alerts.values().cloned().collect())
    }

    fn fetch_sos_alert(&self, id: RecordId) -> Result<Option<SosAlert>, RepositoryError> {
        Ok(self.lock()?.sos_alerts.get(&id).cloned())
    }

    fn insert_sos_alert(
        &self,
        draft: NewSosAlert,
        raised_at: DateTime<Utc>,
    ) -> Result<SosAlert, RepositoryError> {
        let mut tables = self.lock()?;
        let id = tables.allocate();
        let alert = SosAlert::from_draft(id, draft, raised_at);
        tables.sos_alerts.insert(id, alert.clone());
        Ok(alert)
    }

    fn update_sos_alert(&self, alert: SosAlert) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        replace(&mut tables.sos_alerts, alert.id, alert)
    }

    fn response_teams(&self) -> Result<Vec<ResponseTeam>, RepositoryError> {
        Ok(self.lock()?.response_teams.values().cloned().collect())
    }

    fn fetch_response_team(&self, id: RecordId) -> Result<Option<ResponseTeam>, RepositoryError> {
        Ok(self.lock()?.response_teams.get(&id).cloned())
    }

    fn insert_response_team(
        &self,
        draft: NewResponseTeam,
    ) -> Result<ResponseTeam, RepositoryError> {
        let mut tables = self.lock()?;
        let id = tables.allocate();
        let team = ResponseTeam::from_draft(id, draft);
        tables.response_teams.insert(id, team.clone());
        Ok(team)
    }

    fn update_response_team(&self, team: ResponseTeam) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        replace(&mut tables.response_teams, team.id, team)
    }
}

fn degrees(raw: &str) -> DecimalDegrees {
    DecimalDegrees::parse(raw).unwrap_or_else(DecimalDegrees::zero)
}

/// Facilities around lower Manhattan used for local development.
pub fn demo_services() -> Vec<NewEmergencyService> {
    const SERVICES: &[(&str, ServiceKind, &str, &str, &str, &str)] = &[
        (
            "General Hospital",
            ServiceKind::Hospital,
            "40.7138",
            "-74.0070",
            "123 Medical Center Dr",
            "555-0101",
        ),
        (
            "Police Station",
            ServiceKind::Police,
            "40.7118",
            "-74.0050",
            "456 Safety Blvd",
            "555-0102",
        ),
        (
            "Fire Department",
            ServiceKind::Fire,
            "40.7108",
            "-74.0080",
            "789 Fire Station Rd",
            "555-0103",
        ),
        (
            "Central Hospital",
            ServiceKind::Hospital,
            "40.7158",
            "-74.0040",
            "321 Health Ave",
            "555-0104",
        ),
        (
            "North Police Precinct",
            ServiceKind::Police,
            "40.7148",
            "-74.0090",
            "654 Law Enforcement Way",
            "555-0105",
        ),
        (
            "West Fire Station",
            ServiceKind::Fire,
            "40.7098",
            "-74.0060",
            "987 Rescue Lane",
            "555-0106",
        ),
    ];

    SERVICES
        .iter()
        .map(
            |(name, kind, latitude, longitude, address, phone)| NewEmergencyService {
                name: name.to_string(),
                kind: *kind,
                latitude: degrees(latitude),
                longitude: degrees(longitude),
                address: address.to_string(),
                phone: phone.to_string(),
                is_active: true,
            },
        )
        .collect()
}

pub fn demo_response_teams() -> Vec<NewResponseTeam> {
    const TEAMS: &[(&str, TeamKind, &str, &str)] = &[
        ("Ambulance Unit 1", TeamKind::Ambulance, "40.7138", "-74.0070"),
        ("Fire Truck 7", TeamKind::FireTruck, "40.7108", "-74.0080"),
        ("Patrol Unit 23", TeamKind::PoliceUnit, "40.7118", "-74.0050"),
    ];

    TEAMS
        .iter()
        .map(|(name, kind, latitude, longitude)| NewResponseTeam {
            name: name.to_string(),
            kind: *kind,
            status: TeamStatus::Available,
            latitude: Some(degrees(latitude)),
            longitude: Some(degrees(longitude)),
            assigned_incident_id: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::domain::{IncidentKind, IncidentStatus, Severity};

    fn incident_draft() -> NewIncident {
        NewIncident {
            kind: IncidentKind::Accident,
            severity: Severity::Medium,
            description: None,
            latitude: degrees("40.71"),
            longitude: degrees("-74.00"),
            address: None,
            reported_by: "Anonymous".to_string(),
            status: IncidentStatus::Reported,
            photo_url: None,
        }
    }

    #[test]
    fn seeded_store_shares_one_id_sequence() {
        let store = MemoryStore::seeded().expect("seed succeeds");
        let services = store.services().expect("list services");
        let teams = store.response_teams().expect("list teams");

        assert_eq!(services.len(), 6);
        assert_eq!(teams.len(), 3);
        assert_eq!(services.first().map(|s| s.id), Some(RecordId(1)));
        assert_eq!(teams.first().map(|t| t.id), Some(RecordId(7)));
        assert!(teams.iter().all(|team| team.status == TeamStatus::Available));

        let incident = store
            .insert_incident(incident_draft(), Utc::now())
            .expect("insert incident");
        assert_eq!(incident.id, RecordId(10));
    }

    #[test]
    fn update_of_unknown_record_is_not_found() {
        let store = MemoryStore::new();
        let incident = Incident::from_draft(RecordId(42), incident_draft(), Utc::now());

        assert!(matches!(
            store.update_incident(incident),
            Err(RepositoryError::NotFound)
        ));
        assert!(store.incidents().expect("list").is_empty());
    }

    #[test]
    fn listings_follow_insertion_order() {
        let store = MemoryStore::new();
        let first = store
            .insert_incident(incident_draft(), Utc::now())
            .expect("first");
        let second = store
            .insert_incident(incident_draft(), Utc::now())
            .expect("second");

        let ids: Vec<_> = store
            .incidents()
            .expect("list")
            .into_iter()
            .map(|incident| incident.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }
}
