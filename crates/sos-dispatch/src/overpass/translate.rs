use super::element::RawMapElement;
use crate::dispatch::domain::{EmergencyService, RecordId, ServiceKind};
use crate::geo::DecimalDegrees;

const ADDRESS_FALLBACK: &str = "Address not available";
const PHONE_FALLBACK: &str = "Phone not available";
const ADDRESS_PARTS: [&str; 4] = ["addr:housenumber", "addr:street", "addr:city", "addr:postcode"];

/// Convert raw map elements into services, skipping unnamed or unrecognized ones.
///
/// Ids run from 1 over accepted elements only, so they are not stable across calls. Node/way
/// pairs describing the same facility are not merged.
pub fn translate_elements(elements: &[RawMapElement]) -> Vec<EmergencyService> {
    let mut services = Vec::new();
    for element in elements {
        let id = RecordId(services.len() as u64 + 1);
        if let Some(service) = translate_element(element, id) {
            services.push(service);
        }
    }
    services
}

fn translate_element(element: &RawMapElement, id: RecordId) -> Option<EmergencyService> {
    let name = element.tag("name")?;
    let kind = classify(element)?;
    let (lat, lon) = element.position();

    Some(EmergencyService {
        id,
        name: name.to_string(),
        kind,
        latitude: lat.map_or_else(DecimalDegrees::zero, DecimalDegrees::from_f64),
        longitude: lon.map_or_else(DecimalDegrees::zero, DecimalDegrees::from_f64),
        address: build_address(element).unwrap_or_else(|| ADDRESS_FALLBACK.to_string()),
        phone: element
            .tag("phone")
            .unwrap_or(PHONE_FALLBACK)
            .to_string(),
        is_active: true,
    })
}

pub(crate) fn classify(element: &RawMapElement) -> Option<ServiceKind> {
    match element.tag("amenity") {
        Some("hospital" | "clinic") => return Some(ServiceKind::Hospital),
        Some("police") => return Some(ServiceKind::Police),
        Some("fire_station") => return Some(ServiceKind::Fire),
        _ => {}
    }

    match element.tag("emergency") {
        Some("ambulance_station") => Some(ServiceKind::Hospital),
        _ => None,
    }
}

fn build_address(element: &RawMapElement) -> Option<String> {
    let parts: Vec<&str> = ADDRESS_PARTS
        .iter()
        .filter_map(|key| element.tag(key))
        .collect();

    (!parts.is_empty()).then(|| parts.join(", "))
}
