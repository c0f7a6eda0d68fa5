//! Report domain types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::flow::FormData;

/// Errors for report conversion and lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("missing field '{0}'")]
    MissingField(String),

    #[error("invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("report '{0}' not found")]
    NotFound(Uuid),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("unknown status '{0}'")]
    UnknownStatus(String),
}

/// What kind of problem a report describes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ReportCategory {
    Pothole,
    Streetlight,
    Graffiti,
    Trash,
    Sidewalk,
    Water,
    Noise,
    Other,
}

impl ReportCategory {
    pub fn all() -> &'static [ReportCategory] {
        &[
            ReportCategory::Pothole,
            ReportCategory::Streetlight,
            ReportCategory::Graffiti,
            ReportCategory::Trash,
            ReportCategory::Sidewalk,
            ReportCategory::Water,
            ReportCategory::Noise,
            ReportCategory::Other,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            ReportCategory::Pothole => "pothole",
            ReportCategory::Streetlight => "streetlight",
            ReportCategory::Graffiti => "graffiti",
            ReportCategory::Trash => "trash",
            ReportCategory::Sidewalk => "sidewalk",
            ReportCategory::Water => "water",
            ReportCategory::Noise => "noise",
            ReportCategory::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportCategory::Pothole => "Pothole",
            ReportCategory::Streetlight => "Broken streetlight",
            ReportCategory::Graffiti => "Graffiti",
            ReportCategory::Trash => "Illegal dumping / trash",
            ReportCategory::Sidewalk => "Damaged sidewalk",
            ReportCategory::Water => "Water leak or flooding",
            ReportCategory::Noise => "Noise",
            ReportCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ReportCategory {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = squash(s);
        ReportCategory::all()
            .iter()
            .copied()
            .find(|c| squash(c.key()) == wanted)
            .ok_or_else(|| ReportError::UnknownCategory(s.to_string()))
    }
}

/// Lifecycle of a report once submitted
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ReportStatus {
    #[default]
    Submitted,
    InReview,
    InProgress,
    Resolved,
    Rejected,
}

impl ReportStatus {
    pub fn all() -> &'static [ReportStatus] {
        &[
            ReportStatus::Submitted,
            ReportStatus::InReview,
            ReportStatus::InProgress,
            ReportStatus::Resolved,
            ReportStatus::Rejected,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            ReportStatus::Submitted => "submitted",
            ReportStatus::InReview => "in_review",
            ReportStatus::InProgress => "in_progress",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Rejected => "rejected",
        }
    }

    /// Whether the report still needs work
    pub fn is_open(&self) -> bool {
        !matches!(self, ReportStatus::Resolved | ReportStatus::Rejected)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ReportStatus {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = squash(s);
        ReportStatus::all()
            .iter()
            .copied()
            .find(|st| squash(st.key()) == wanted)
            .ok_or_else(|| ReportError::UnknownStatus(s.to_string()))
    }
}

/// Lowercase alphanumerics only, so "In Review", "in-review" and "in_review" compare equal
fn squash(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Where the problem is; an address, a map pin, or both
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
pub struct Location {
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A stored citizen report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
pub struct Report {
    pub id: Uuid,
    pub category: ReportCategory,
    pub title: String,
    pub description: String,
    pub location: Location,
    pub photo_url: Option<String>,
    pub status: ReportStatus,
    /// Hide the reporter's name on public listings
    pub anonymous: bool,
    pub created_at: DateTime<Utc>,
}

/// A report built from a completed flow, before it is stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub category: ReportCategory,
    pub title: String,
    pub description: String,
    pub location: Location,
    pub photo_url: Option<String>,
    pub anonymous: bool,
}

impl NewReport {
    /// Build from the accumulated form data of a report flow
    pub fn from_form(form: &FormData) -> Result<Self, ReportError> {
        let required = |name: &str| {
            form.text(name)
                .map(str::to_string)
                .ok_or_else(|| ReportError::MissingField(name.to_string()))
        };
        let coordinate = |name: &str| -> Result<Option<f64>, ReportError> {
            form.text(name)
                .map(|raw| {
                    raw.parse::<f64>().map_err(|_| ReportError::InvalidField {
                        field: name.to_string(),
                        message: "must be a number".to_string(),
                    })
                })
                .transpose()
        };

        let category = required("category")?.parse::<ReportCategory>()?;
        let location = Location {
            address: form.text("address").map(str::to_string),
            latitude: coordinate("latitude")?,
            longitude: coordinate("longitude")?,
        };
        if location.address.is_none() && (location.latitude.is_none() || location.longitude.is_none())
        {
            return Err(ReportError::MissingField("address".to_string()));
        }

        Ok(Self {
            category,
            title: required("title")?,
            description: required("description")?,
            location,
            photo_url: form.text("photo_url").map(str::to_string),
            anonymous: form.flag("anonymous").unwrap_or(false),
        })
    }

    pub fn into_report(self, id: Uuid, created_at: DateTime<Utc>) -> Report {
        Report {
            id,
            category: self.category,
            title: self.title,
            description: self.description,
            location: self.location,
            photo_url: self.photo_url,
            status: ReportStatus::Submitted,
            anonymous: self.anonymous,
            created_at,
        }
    }
}

/// Listing filter; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub category: Option<ReportCategory>,
    pub status: Option<ReportStatus>,
}

impl ReportFilter {
    pub fn matches(&self, report: &Report) -> bool {
        self.category.map_or(true, |c| c == report.category)
            && self.status.map_or(true, |s| s == report.status)
    }
}
