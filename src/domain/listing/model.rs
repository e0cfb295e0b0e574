//! Listing domain entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::DomainError;

// ── Identifiers ────────────────────────────────────────────────

/// Opaque, stable listing identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(Uuid);

impl ListingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ListingId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| DomainError::Validation(format!("id: '{}' is not a valid listing id", s)))
    }
}

/// Weak reference to the submitting account; used for lookups only
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// URL slug. Unique across listings and never reassigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derive a slug from a title: lowercase, runs of anything that is not a
    /// letter or digit collapse to a single `-`.
    pub fn from_title(title: &str) -> Self {
        let mut slug = String::with_capacity(title.len());
        let mut pending_dash = false;

        for ch in title.chars() {
            if ch.is_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.extend(ch.to_lowercase());
            } else {
                pending_dash = true;
            }
        }

        if slug.is_empty() {
            slug.push_str("listing");
        }
        Self(slug)
    }

    /// Collision candidate: `base-2`, `base-3`, ...
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}-{}", self.0, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Slug {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ── Location ───────────────────────────────────────────────────

/// Local (target-country) market or anywhere else
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationContext {
    Local,
    Other,
}

impl LocationContext {
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for LocationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationContext {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "other" | "global" => Ok(Self::Other),
            other => Err(DomainError::Validation(format!(
                "location: expected 'local' or 'other', got '{}'",
                other
            ))),
        }
    }
}

/// How the stored `is_global` value was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationDetectionMethod {
    #[default]
    Auto,
    UserConfirmed,
    AdminOverride,
}

impl LocationDetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::UserConfirmed => "user_confirmed",
            Self::AdminOverride => "admin_override",
        }
    }
}

impl fmt::Display for LocationDetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for LocationDetectionMethod {
    fn from(s: &str) -> Self {
        match s {
            "user_confirmed" => Self::UserConfirmed,
            "admin_override" => Self::AdminOverride,
            _ => Self::Auto,
        }
    }
}

/// Market scope of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketContext {
    Local,
    Global,
    #[default]
    All,
}

impl MarketContext {
    /// Required value of `is_global`, if any
    pub fn is_global_constraint(&self) -> Option<bool> {
        match self {
            Self::Local => Some(false),
            Self::Global => Some(true),
            Self::All => None,
        }
    }
}

impl FromStr for MarketContext {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "global" => Ok(Self::Global),
            "all" | "" => Ok(Self::All),
            other => Err(DomainError::Validation(format!(
                "market: expected local, global or all, got '{}'",
                other
            ))),
        }
    }
}

// ── State views ────────────────────────────────────────────────

/// Approval axis. Rejection is a hard delete, so it never shows up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    Pending,
    Approved,
}

/// Location-verification axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationState {
    Unverified,
    UserConfirmed,
    AdminVerified,
}

// ── Listing ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub slug: Slug,
    pub title: String,
    pub description: Option<String>,
    pub city: String,
    pub address: String,
    pub categories: super::Categories,
    pub approved: bool,
    /// Display badge; unrelated to location verification
    pub is_verified: bool,
    pub is_featured: bool,
    /// Average review rating, 0.0 to 5.0
    pub rating: Option<f32>,
    pub is_global: bool,
    pub location_verified: bool,
    pub location_detection_method: LocationDetectionMethod,
    /// Submitter's answer when classification was ambiguous
    pub location_confirmation: Option<LocationContext>,
    pub owner: OwnerId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn approval_state(&self) -> ApprovalState {
        if self.approved {
            ApprovalState::Approved
        } else {
            ApprovalState::Pending
        }
    }

    pub fn location_state(&self) -> LocationState {
        if self.location_verified {
            LocationState::AdminVerified
        } else if self.location_detection_method == LocationDetectionMethod::UserConfirmed {
            LocationState::UserConfirmed
        } else {
            LocationState::Unverified
        }
    }

    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        &self.owner == owner
    }

    /// Case fold used wherever cities are compared or deduplicated
    pub fn city_key(city: &str) -> String {
        city.trim().to_lowercase()
    }
}
