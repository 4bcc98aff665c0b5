use serde::{Deserialize, Serialize};

/// Starting balance granted to every new account.
pub const STARTING_POINTS: i64 = 100;

/// A user record as persisted in the users file, keyed by username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Argon2id PHC string.
    pub password: String,
    pub point: i64,
}

impl UserRecord {
    pub fn new(password_hash: String) -> Self {
        Self {
            password: password_hash,
            point: STARTING_POINTS,
        }
    }
}

/// A lost-item listing. Field names match the persisted JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub owner: String,
    pub item: String,
    pub point: i64,
    pub characteristic: String,
    pub start_lat: String,
    pub start_lng: String,
    pub lat: String,
    pub lng: String,
    pub start_address: String,
    pub end_address: String,
    /// Stored upload filename, empty when the listing has no photo.
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub reports: Vec<Report>,
}

/// The owner-supplied part of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewItem {
    pub item: String,
    pub point: i64,
    pub characteristic: String,
    pub start_lat: String,
    pub start_lng: String,
    pub lat: String,
    pub lng: String,
    pub start_address: String,
    pub end_address: String,
    pub photo: String,
}

/// A "found it" claim embedded in an [`Item`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub reporter: String,
    pub status: ReportStatus,
}

impl Report {
    pub fn pending(reporter: impl Into<String>) -> Self {
        Self {
            reporter: reporter.into(),
            status: ReportStatus::Pending,
        }
    }
}

/// Rejected reports are removed rather than marked, so there is no `no` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Yes,
}

/// Owner's verdict on a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "yes", alias = "accept")]
    Accept,
    #[serde(rename = "no", alias = "reject")]
    Reject,
}
