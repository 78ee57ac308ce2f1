//! Firestore's typed JSON value encoding and the mapping between report
//! records and document fields.

use std::collections::BTreeMap;

use aasrah_shared::{
    Coordinates, NewReport, Report, ReportId, ReportStatus, ServiceError, StatusUpdate,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub type Fields = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    /// int64 travels as a decimal string.
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(GeoPoint),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: Fields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl Document {
    /// Document id: the last segment of the resource name.
    pub fn id(&self) -> Option<&str> {
        self.name.rsplit('/').next().filter(|s| !s.is_empty())
    }
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::StringValue(s.into())
    }

    pub fn optional_string(s: Option<&str>) -> Self {
        s.map_or(Value::NullValue(()), Value::string)
    }

    pub fn timestamp(at: DateTime<Utc>) -> Self {
        Value::TimestampValue(at.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::StringValue(s) => Some(s),
            _ => None,
        }
    }

    /// Accepts both native timestamps and RFC 3339 strings.
    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::TimestampValue(s) | Value::StringValue(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            _ => None,
        }
    }

    /// Accepts geo points, `{lat, lng}` maps and `"lat,lng"` strings.
    pub fn as_coordinates(&self) -> Option<Coordinates> {
        match self {
            Value::GeoPointValue(p) => Coordinates::new(p.latitude, p.longitude).ok(),
            Value::StringValue(s) => Coordinates::parse(s).ok(),
            Value::MapValue(m) => {
                let lat = m.fields.get("lat").and_then(Value::as_f64)?;
                let lng = m.fields.get("lng").and_then(Value::as_f64)?;
                Coordinates::new(lat, lng).ok()
            }
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::DoubleValue(v) => Some(*v),
            Value::IntegerValue(s) => s.parse::<i64>().ok().map(|v| v as f64),
            _ => None,
        }
    }
}

impl From<Coordinates> for Value {
    fn from(c: Coordinates) -> Self {
        Value::GeoPointValue(GeoPoint {
            latitude: c.lat,
            longitude: c.lng,
        })
    }
}

/// Fields of a freshly submitted report document.
pub fn new_report_fields(report: &NewReport) -> Fields {
    let mut fields = Fields::new();
    fields.insert("description".into(), Value::string(&report.description));
    fields.insert(
        "animalType".into(),
        Value::optional_string(report.animal_type.as_deref()),
    );
    fields.insert("location".into(), Value::string(&report.location));
    fields.insert(
        "coordinates".into(),
        report
            .coordinates
            .map_or(Value::NullValue(()), Value::from),
    );
    fields.insert("image".into(), Value::optional_string(report.image.as_deref()));
    fields.insert("date".into(), Value::timestamp(report.date));
    fields.insert("createdAt".into(), Value::timestamp(report.created_at));
    fields.insert("status".into(), Value::string(report.status.as_str()));
    fields.insert("userId".into(), Value::string(&report.user_id));
    fields.insert("userEmail".into(), Value::string(&report.user_email));
    fields
}

/// Fields and update mask of a targeted status write.
pub fn status_fields(update: &StatusUpdate) -> (Fields, Vec<&'static str>) {
    let mut fields = Fields::new();
    let mut mask = vec!["status"];
    fields.insert("status".into(), Value::string(update.status.as_str()));
    if let Some((actor_field, time_field)) = update.actor_fields() {
        fields.insert(actor_field.into(), Value::string(&update.actor_id));
        fields.insert(time_field.into(), Value::timestamp(update.at));
        mask.push(actor_field);
        mask.push(time_field);
    }
    (fields, mask)
}

fn text(fields: &Fields, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

fn time(fields: &Fields, key: &str) -> Option<DateTime<Utc>> {
    fields.get(key).and_then(Value::as_time)
}

/// Decode a report document. Only `status` is strictly required; timestamps
/// fall back through `createdAt`, `date` and the document's create time.
pub fn report_from_document(doc: &Document) -> Result<Report, ServiceError> {
    let id = doc
        .id()
        .ok_or_else(|| ServiceError::InvalidResponse("Document without a name".to_string()))?;
    let f = &doc.fields;

    let status_text = text(f, "status").unwrap_or_default();
    let status = ReportStatus::parse(&status_text).ok_or_else(|| {
        ServiceError::InvalidResponse(format!("Report {id} has unknown status '{status_text}'"))
    })?;

    let create_time = doc
        .create_time
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));
    let created_at = time(f, "createdAt")
        .or_else(|| time(f, "date"))
        .or(create_time)
        .ok_or_else(|| ServiceError::InvalidResponse(format!("Report {id} has no timestamp")))?;

    Ok(Report {
        id: ReportId::from(id),
        description: text(f, "description").unwrap_or_default(),
        animal_type: text(f, "animalType"),
        location: text(f, "location").unwrap_or_default(),
        coordinates: f.get("coordinates").and_then(Value::as_coordinates),
        image: text(f, "image").filter(|s| !s.is_empty()),
        date: time(f, "date").unwrap_or(created_at),
        created_at,
        status,
        user_id: text(f, "userId").unwrap_or_default(),
        user_email: text(f, "userEmail").unwrap_or_default(),
        accepted_by: text(f, "acceptedBy"),
        accepted_at: time(f, "acceptedAt"),
        declined_by: text(f, "declinedBy"),
        declined_at: time(f, "declinedAt"),
        completed_by: text(f, "completedBy"),
        completed_at: time(f, "completedAt"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_wire_format() {
        assert_eq!(
            serde_json::to_value(Value::string("Submitted")).unwrap(),
            json!({"stringValue": "Submitted"})
        );
        assert_eq!(
            serde_json::to_value(Value::NullValue(())).unwrap(),
            json!({"nullValue": null})
        );
        assert_eq!(
            serde_json::to_value(Value::from(Coordinates::new(12.5, 77.25).unwrap())).unwrap(),
            json!({"geoPointValue": {"latitude": 12.5, "longitude": 77.25}})
        );
    }

    #[test]
    fn test_decode_document_from_store() {
        let doc: Document = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/reports/k3yX9",
            "fields": {
                "description": {"stringValue": "Cat stuck on a roof"},
                "location": {"stringValue": "12.971600, 77.594600"},
                "coordinates": {"mapValue": {"fields": {
                    "lat": {"doubleValue": 12.9716},
                    "lng": {"doubleValue": 77.5946}
                }}},
                "image": {"nullValue": null},
                "status": {"stringValue": "In Progress"},
                "userId": {"stringValue": "u1"},
                "userEmail": {"stringValue": "asha@example.com"},
                "createdAt": {"timestampValue": "2024-03-01T10:15:30.123456Z"},
                "acceptedBy": {"stringValue": "ngo-7"},
                "acceptedAt": {"timestampValue": "2024-03-01T11:00:00Z"},
                "legacyRef": {"referenceValue": "projects/p/databases/(default)/documents/x/y"}
            },
            "createTime": "2024-03-01T10:15:31Z",
            "updateTime": "2024-03-01T11:00:01Z"
        }))
        .unwrap();

        let report = report_from_document(&doc).unwrap();
        assert_eq!(report.id, ReportId::from("k3yX9"));
        assert_eq!(report.status, ReportStatus::InProgress);
        assert_eq!(report.image, None);
        assert_eq!(report.accepted_by.as_deref(), Some("ngo-7"));
        assert_eq!(
            report.coordinates,
            Some(Coordinates::new(12.9716, 77.5946).unwrap())
        );
        // Missing `date` falls back to createdAt.
        assert_eq!(report.date, report.created_at);
    }

    #[test]
    fn test_timestamp_falls_back_to_create_time() {
        let doc = Document {
            name: "reports/abc".into(),
            fields: Fields::from([("status".to_string(), Value::string("Submitted"))]),
            create_time: Some("2024-01-02T03:04:05Z".into()),
            update_time: None,
        };
        let report = report_from_document(&doc).unwrap();
        assert_eq!(report.created_at.to_rfc3339(), "2024-01-02T03:04:05+00:00");
    }

    #[test]
    fn test_unknown_status_rejected() {
        let doc = Document {
            name: "reports/abc".into(),
            fields: Fields::from([
                ("status".to_string(), Value::string("Resolved")),
                ("createdAt".to_string(), Value::timestamp(Utc::now())),
            ]),
            ..Default::default()
        };
        assert!(matches!(
            report_from_document(&doc),
            Err(ServiceError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_new_report_fields_decode_back() {
        let now = Utc::now();
        let new = NewReport {
            description: "Injured cow".into(),
            animal_type: Some("cow".into()),
            location: "Near the temple".into(),
            coordinates: Some(Coordinates::new(26.9124, 75.7873).unwrap()),
            image: Some("https://example.com/img.jpg".into()),
            date: now,
            created_at: now,
            status: ReportStatus::Submitted,
            user_id: "u9".into(),
            user_email: "ravi@example.com".into(),
        };
        let doc = Document {
            name: "reports/new1".into(),
            fields: new_report_fields(&new),
            ..Default::default()
        };
        let decoded = report_from_document(&doc).unwrap();
        let expected = new.into_report(ReportId::from("new1"));
        assert_eq!(decoded.description, expected.description);
        assert_eq!(decoded.coordinates, expected.coordinates);
        assert_eq!(decoded.image, expected.image);
        assert_eq!(
            decoded.created_at.timestamp_micros(),
            expected.created_at.timestamp_micros()
        );
    }

    #[test]
    fn test_status_fields_mask() {
        let update = StatusUpdate::new(ReportStatus::Declined, "ngo-1");
        let (fields, mask) = status_fields(&update);
        assert_eq!(mask, vec!["status", "declinedBy", "declinedAt"]);
        assert_eq!(fields.get("declinedBy"), Some(&Value::string("ngo-1")));
        assert!(matches!(fields.get("declinedAt"), Some(Value::TimestampValue(_))));
    }
}
