use std::cmp::Ordering;

use serde::Serialize;

use super::domain::EmergencyService;
use crate::geo::Coordinates;

/// Number of services shown in the "nearest" panel.
pub const DEFAULT_NEARBY_LIMIT: usize = 3;

/// Service annotated with its distance from the caller, in miles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedService {
    #[serde(flatten)]
    pub service: EmergencyService,
    pub distance: f64,
}

/// Annotate services with their distance from `origin`, nearest first, keeping at most `limit`.
///
/// Without an origin every distance is `0` and input order is kept. Equal distances keep their
/// input order, and NaN distances (unparsable coordinates) sort last.
pub fn rank_services(
    services: &[EmergencyService],
    origin: Option<Coordinates>,
    limit: usize,
) -> Vec<RankedService> {
    let mut ranked: Vec<RankedService> = services
        .iter()
        .map(|service| RankedService {
            distance: origin.map_or(0.0, |origin| origin.distance_to(&service.coordinates())),
            service: service.clone(),
        })
        .collect();

    if origin.is_some() {
        ranked.sort_by(|a, b| compare_distance(a.distance, b.distance));
    }

    ranked.truncate(limit);
    ranked
}

fn compare_distance(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b)
        .unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::domain::{RecordId, ServiceKind};
    use crate::geo::DecimalDegrees;

    const ORIGIN: Coordinates = Coordinates::new(40.0, -74.0);

    fn service(id: u64, latitude: &str, longitude: &str) -> EmergencyService {
        EmergencyService {
            id: RecordId(id),
            name: format!("Station {id}"),
            kind: ServiceKind::Fire,
            latitude: DecimalDegrees::parse(latitude).unwrap_or_else(DecimalDegrees::zero),
            longitude: DecimalDegrees::parse(longitude).unwrap_or_else(DecimalDegrees::zero),
            address: "Address not available".to_string(),
            phone: "Phone not available".to_string(),
            is_active: true,
        }
    }

    fn ids(ranked: &[RankedService]) -> Vec<u64> {
        ranked.iter().map(|entry| entry.service.id.0).collect()
    }

    #[test]
    fn sorts_nearest_first_and_truncates() {
        // One degree of latitude is ~69.1 miles; these sit ~5.0, ~1.2 and ~3.4 miles north.
        let services = vec![
            service(1, "40.07236", "-74.0"),
            service(2, "40.01736", "-74.0"),
            service(3, "40.04920", "-74.0"),
        ];

        let ranked = rank_services(&services, Some(ORIGIN), 2);

        assert_eq!(ids(&ranked), vec![2, 3]);
        assert!((ranked[0].distance - 1.2).abs() < 0.01);
        assert!((ranked[1].distance - 3.4).abs() < 0.01);
    }

    #[test]
    fn missing_origin_keeps_input_order_with_zero_distance() {
        let services = vec![
            service(1, "41.0", "-74.0"),
            service(2, "40.1", "-74.0"),
            service(3, "40.5", "-74.0"),
            service(4, "40.2", "-74.0"),
        ];

        let ranked = rank_services(&services, None, 3);

        assert_eq!(ids(&ranked), vec![1, 2, 3]);
        assert!(ranked.iter().all(|entry| entry.distance == 0.0));
    }

    #[test]
    fn ties_keep_input_order() {
        let services = vec![
            service(7, "40.1", "-74.0"),
            service(3, "40.1", "-74.0"),
            service(5, "40.05", "-74.0"),
            service(1, "40.1", "-74.0"),
        ];

        let ranked = rank_services(&services, Some(ORIGIN), 10);

        assert_eq!(ids(&ranked), vec![5, 7, 3, 1]);
    }

    #[test]
    fn ranking_is_deterministic() {
        let services = vec![
            service(1, "40.3", "-74.1"),
            service(2, "40.3", "-74.1"),
            service(3, "39.9", "-73.9"),
        ];

        let first = rank_services(&services, Some(ORIGIN), 3);
        let second = rank_services(&services, Some(ORIGIN), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn unparsable_coordinates_sort_last() {
        let mut broken = service(1, "0", "0");
        broken.latitude = serde_json::from_str("\"unknown\"").expect("string degrees");
        let services = vec![broken, service(2, "45.0", "-74.0")];

        let ranked = rank_services(&services, Some(ORIGIN), 2);

        assert_eq!(ids(&ranked), vec![2, 1]);
        assert!(ranked[1].distance.is_nan());
    }

    #[test]
    fn serializes_service_fields_alongside_distance() {
        let ranked = rank_services(&[service(9, "40.0", "-74.0")], Some(ORIGIN), 1);
        let value = serde_json::to_value(&ranked[0]).expect("serializes");

        assert_eq!(value["id"], 9);
        assert_eq!(value["type"], "fire");
        assert_eq!(value["isActive"], true);
        assert_eq!(value["distance"], 0.0);
    }
}
