//! Core domain types and error definitions for the pet clinic visits API.
//!
//! This crate provides the types shared by the client, the visits adapter and
//! the visits service:
//!
//! - [`Visit`] — A visit record as returned by the backend
//! - [`NewVisit`] — The payload submitted when recording a visit
//! - [`RouteParams`] and [`VisitScope`] — Owner/pet scoping and the REST path
//! - [`VisitError`] — Error type for read and write operations
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use petclinic_core::{NewVisit, RouteParams, VisitScope};
//!
//! let params = RouteParams::from_pairs([("ownerId", "42")]);
//! let scope = VisitScope::from(&params);
//! assert_eq!(scope.path(), "api/visit/owners/42/pets/0/visits");
//!
//! let visit = NewVisit::new(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), "Annual checkup");
//! let json = serde_json::to_string(&visit).unwrap();
//! assert_eq!(json, r#"{"date":"2024-03-05","description":"Annual checkup"}"#);
//! ```

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire format for visit dates (`yyyy-MM-dd`).
pub const VISIT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors that can occur while reading or recording visits.
#[derive(Error, Debug)]
pub enum VisitError {
    /// The request never produced a response (connection, timeout).
    #[error("Request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("Visits API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// A date string was not in `yyyy-MM-dd` form.
    #[error("Invalid visit date: '{0}'")]
    InvalidDate(String),

    /// A submission is already in flight for this form.
    #[error("A visit submission is already in progress")]
    SubmissionInFlight,
}

impl VisitError {
    /// Creates a status error from a code and response body.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status { status, body: body.into() }
    }

    /// Returns `true` if repeating the same request may succeed.
    ///
    /// Transport failures, server errors and throttling are retryable.
    /// Client errors, decode failures and rejected duplicate submissions are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            VisitError::Request(_) => true,
            VisitError::Status { status, .. } => *status >= 500 || *status == 429,
            VisitError::Decode(_) | VisitError::InvalidDate(_) | VisitError::SubmissionInFlight => false,
        }
    }
}

impl From<serde_json::Error> for VisitError {
    fn from(err: serde_json::Error) -> Self {
        VisitError::Decode(err.to_string())
    }
}

// ============================================================================
// Dates
// ============================================================================

/// Formats a date the way the visits API expects it.
pub fn format_visit_date(date: NaiveDate) -> String {
    date.format(VISIT_DATE_FORMAT).to_string()
}

/// Parses a `yyyy-MM-dd` date.
pub fn parse_visit_date(value: &str) -> Result<NaiveDate, VisitError> {
    NaiveDate::parse_from_str(value.trim(), VISIT_DATE_FORMAT)
        .map_err(|_| VisitError::InvalidDate(value.to_string()))
}

/// Serde adapter for `NaiveDate` fields carried as `yyyy-MM-dd` strings.
///
/// ```rust
/// use chrono::NaiveDate;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Row {
///     #[serde(with = "petclinic_core::visit_date")]
///     date: NaiveDate,
/// }
///
/// let row: Row = serde_json::from_str(r#"{"date":"2024-01-01"}"#).unwrap();
/// assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
/// ```
pub mod visit_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_visit_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_visit_date(&raw).map_err(de::Error::custom)
    }

    /// Same format for `Option<NaiveDate>`; `null` maps to `None`.
    pub mod option {
        use chrono::NaiveDate;
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| crate::parse_visit_date(&raw).map_err(de::Error::custom))
                .transpose()
        }
    }
}

/// Reads a string field, treating `null` as empty.
fn null_as_empty<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Visit Types
// ============================================================================

/// A visit record as held by the backend.
///
/// Records are not validated: a `null` or missing date reads as `None` and a
/// `null` description reads as empty, so one sparse record never rejects a
/// whole list. The backend may also echo its own `id` and `petId`, which are
/// kept when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    /// Backend identifier, when the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    /// Day of the visit, if the backend has one.
    #[serde(default, with = "visit_date::option")]
    pub date: Option<NaiveDate>,
    /// Free-text notes. Not validated; may be empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Pet the visit belongs to, when the service reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_id: Option<u32>,
}

impl Visit {
    /// Creates a visit without backend identifiers.
    pub fn new(date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            id: None,
            date: Some(date),
            description: description.into(),
            pet_id: None,
        }
    }
}

/// Payload for recording a new visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVisit {
    #[serde(with = "visit_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

impl NewVisit {
    pub fn new(date: NaiveDate, description: impl Into<String>) -> Self {
        Self { date, description: description.into() }
    }
}

// ============================================================================
// Route Scoping
// ============================================================================

/// Owner and pet identifiers taken from the calling view's route.
///
/// Either may be absent; absent identifiers resolve to `0` when building
/// a [`VisitScope`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteParams {
    pub owner_id: Option<u32>,
    pub pet_id: Option<u32>,
}

impl RouteParams {
    pub fn new(owner_id: Option<u32>, pet_id: Option<u32>) -> Self {
        Self { owner_id, pet_id }
    }

    /// Builds params from raw route key/value pairs (`ownerId`, `petId`).
    ///
    /// Empty or non-numeric values count as missing. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let parsed = value.as_ref().trim().parse::<u32>().ok();
            match key.as_ref() {
                "ownerId" => params.owner_id = parsed,
                "petId" => params.pet_id = parsed,
                _ => {}
            }
        }
        params
    }
}

/// Resolved owner/pet pair that addresses one pet's visits collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VisitScope {
    pub owner_id: u32,
    pub pet_id: u32,
}

impl VisitScope {
    pub fn new(owner_id: u32, pet_id: u32) -> Self {
        Self { owner_id, pet_id }
    }

    /// Relative REST path of this pet's visits collection.
    pub fn path(&self) -> String {
        format!(
            "api/visit/owners/{}/pets/{}/visits",
            self.owner_id, self.pet_id
        )
    }
}

impl From<&RouteParams> for VisitScope {
    fn from(params: &RouteParams) -> Self {
        Self {
            owner_id: params.owner_id.unwrap_or(0),
            pet_id: params.pet_id.unwrap_or(0),
        }
    }
}

impl From<RouteParams> for VisitScope {
    fn from(params: RouteParams) -> Self {
        VisitScope::from(&params)
    }
}

impl fmt::Display for VisitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner {} / pet {}", self.owner_id, self.pet_id)
    }
}
