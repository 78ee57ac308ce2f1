//! Report records and their status lifecycle.
//!
//! Status moves `Submitted -> In Progress -> Completed`, with `Declined` as
//! the other terminal state. The document store does not enforce this; the
//! client checks it against its local snapshot before writing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportId(pub String);

impl ReportId {
    /// First eight characters, as shown on report cards.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReportId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    #[serde(rename = "Submitted")]
    Submitted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Declined")]
    Declined,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 4] = [
        ReportStatus::Submitted,
        ReportStatus::InProgress,
        ReportStatus::Completed,
        ReportStatus::Declined,
    ];

    /// Wire value stored in the `status` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Submitted => "Submitted",
            ReportStatus::InProgress => "In Progress",
            ReportStatus::Completed => "Completed",
            ReportStatus::Declined => "Declined",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Completed | ReportStatus::Declined)
    }

    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        matches!(
            (self, next),
            (ReportStatus::Submitted, ReportStatus::InProgress)
                | (ReportStatus::Submitted, ReportStatus::Declined)
                | (ReportStatus::InProgress, ReportStatus::Completed)
        )
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animal_type: Option<String>,
    /// Free-text address or `"lat, lng"`.
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Retrievable address of the uploaded photo.
    #[serde(default)]
    pub image: Option<String>,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub status: ReportStatus,
    pub user_id: String,
    pub user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declined_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declined_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Report {
    /// Write the status field plus the matching actor id and timestamp.
    pub fn apply_status(&mut self, update: &StatusUpdate) {
        self.status = update.status;
        let actor = Some(update.actor_id.clone());
        let at = Some(update.at);
        match update.status {
            ReportStatus::InProgress => {
                self.accepted_by = actor;
                self.accepted_at = at;
            }
            ReportStatus::Declined => {
                self.declined_by = actor;
                self.declined_at = at;
            }
            ReportStatus::Completed => {
                self.completed_by = actor;
                self.completed_at = at;
            }
            ReportStatus::Submitted => {}
        }
    }
}

/// A report as written by the submission form, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub description: String,
    pub animal_type: Option<String>,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub image: Option<String>,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub status: ReportStatus,
    pub user_id: String,
    pub user_email: String,
}

impl NewReport {
    pub fn into_report(self, id: ReportId) -> Report {
        Report {
            id,
            description: self.description,
            animal_type: self.animal_type,
            location: self.location,
            coordinates: self.coordinates,
            image: self.image,
            date: self.date,
            created_at: self.created_at,
            status: self.status,
            user_id: self.user_id,
            user_email: self.user_email,
            accepted_by: None,
            accepted_at: None,
            declined_by: None,
            declined_at: None,
            completed_by: None,
            completed_at: None,
        }
    }
}

/// Targeted write of one report's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: ReportStatus,
    pub actor_id: String,
    pub at: DateTime<Utc>,
}

impl StatusUpdate {
    pub fn new(status: ReportStatus, actor_id: impl Into<String>) -> Self {
        Self {
            status,
            actor_id: actor_id.into(),
            at: Utc::now(),
        }
    }

    /// Document field names for the actor id and timestamp of this status.
    pub fn actor_fields(&self) -> Option<(&'static str, &'static str)> {
        match self.status {
            ReportStatus::InProgress => Some(("acceptedBy", "acceptedAt")),
            ReportStatus::Declined => Some(("declinedBy", "declinedAt")),
            ReportStatus::Completed => Some(("completedBy", "completedAt")),
            ReportStatus::Submitted => None,
        }
    }
}

/// Equality filters supported by the document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportFilter {
    Status(ReportStatus),
    OwnerEmail(String),
}

impl ReportFilter {
    /// `(field path, value)` of the equality clause.
    pub fn clause(&self) -> (&'static str, &str) {
        match self {
            ReportFilter::Status(status) => ("status", status.as_str()),
            ReportFilter::OwnerEmail(email) => ("userEmail", email.as_str()),
        }
    }

    pub fn matches(&self, report: &Report) -> bool {
        match self {
            ReportFilter::Status(status) => report.status == *status,
            ReportFilter::OwnerEmail(email) => report.user_email == *email,
        }
    }
}
