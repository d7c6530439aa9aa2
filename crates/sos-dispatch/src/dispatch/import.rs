use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{EmergencyService, RecordId};
use super::validation::{ServiceSubmission, TextInput, ValidationError};
use crate::geo::CoordinateInput;

/// Loads emergency services from a CSV export.
///
/// Expected header: `name,type,latitude,longitude,address,phone` with an optional `is_active`
/// column. Rows get ids `1..=n` in file order.
#[derive(Debug, Default, Clone, Copy)]
pub struct ServiceCsvImporter;

impl ServiceCsvImporter {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<EmergencyService>, ImportError> {
        let file = File::open(path.as_ref()).map_err(|source| ImportError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<EmergencyService>, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut services = Vec::new();

        for (index, record) in csv_reader.deserialize::<ServiceRow>().enumerate() {
            // Header is line 1.
            let line = index + 2;
            let row = record?;
            let submission = row
                .into_submission()
                .map_err(|source| ImportError::Validation { line, source })?;
            let draft = submission
                .validate()
                .map_err(|source| ImportError::Validation { line, source })?;
            let id = RecordId(services.len() as u64 + 1);
            services.push(EmergencyService::from_draft(id, draft));
        }

        Ok(services)
    }
}

#[derive(Debug, Deserialize)]
struct ServiceRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "empty_string_as_none")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    latitude: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    longitude: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    address: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    phone: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    is_active: Option<String>,
}

impl ServiceRow {
    fn into_submission(self) -> Result<ServiceSubmission, ValidationError> {
        let is_active = match self.is_active.as_deref() {
            None => None,
            Some(raw) => Some(parse_flag(raw).ok_or_else(|| {
                ValidationError::single("emergency service", "is_active", "must be true or false")
            })?),
        };

        Ok(ServiceSubmission {
            name: self.name.map(TextInput::Text),
            kind: self.kind.map(TextInput::Text),
            latitude: self.latitude.map(CoordinateInput::Text),
            longitude: self.longitude.map(CoordinateInput::Text),
            address: self.address.map(TextInput::Text),
            phone: self.phone.map(TextInput::Text),
            is_active,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("unable to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row on line {line} rejected: {source}")]
    Validation {
        line: usize,
        #[source]
        source: ValidationError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::domain::ServiceKind;

    const SAMPLE: &str = "\
name,type,latitude,longitude,address,phone,is_active
Harbor Clinic,hospital,40.7041,-74.0132,1 Battery Pl,(212) 555-0101,
Precinct 9,police, 40.7203 ,-73.9881,321 E 5th St,(212) 555-0109,false
";

    #[test]
    fn imports_rows_with_sequential_ids() {
        let services = ServiceCsvImporter::from_reader(SAMPLE.as_bytes()).expect("sample parses");

        assert_eq!(services.len(), 2);
        assert_eq!(services[0].id, RecordId(1));
        assert_eq!(services[0].kind, ServiceKind::Hospital);
        assert!(services[0].is_active);
        assert_eq!(services[1].id, RecordId(2));
        assert_eq!(services[1].latitude.as_str(), "40.7203");
        assert!(!services[1].is_active);
    }

    #[test]
    fn is_active_column_is_optional() {
        let csv = "name,type,latitude,longitude,address,phone\n\
                   Engine 4,fire,40.7,-74.0,5 Main St,911\n";
        let services = ServiceCsvImporter::from_reader(csv.as_bytes()).expect("parses");
        assert_eq!(services.len(), 1);
        assert!(services[0].is_active);
    }

    #[test]
    fn reports_line_of_invalid_row() {
        let csv = "name,type,latitude,longitude,address,phone\n\
                   Engine 4,fire,40.7,-74.0,5 Main St,911\n\
                   Mystery,bakery,north,-74.0,6 Main St,912\n";

        match ServiceCsvImporter::from_reader(csv.as_bytes()) {
            Err(ImportError::Validation { line, source }) => {
                assert_eq!(line, 3);
                assert!(source.has_field("type"));
                assert!(source.has_field("latitude"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = ServiceCsvImporter::from_path("/nonexistent/services.csv");
        assert!(matches!(result, Err(ImportError::Io { .. })));
    }
}
