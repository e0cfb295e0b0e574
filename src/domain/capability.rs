//! Capability tokens
//!
//! The authorization collaborator decides who the caller is and hands the
//! core a `Capability`. Every moderation and owner operation takes one
//! explicitly; nothing here looks at request context.

use serde::{Deserialize, Serialize};

use super::listing::{Listing, OwnerId};
use crate::domain::DomainResult;
use crate::shared::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Capability {
    /// May moderate any listing
    Admin { admin_id: String },
    /// May submit listings and manage its own
    Owner { owner_id: OwnerId },
}

impl Capability {
    pub fn admin(admin_id: impl Into<String>) -> Self {
        Self::Admin {
            admin_id: admin_id.into(),
        }
    }

    pub fn owner(owner_id: impl Into<String>) -> Self {
        Self::Owner {
            owner_id: OwnerId::new(owner_id),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin { .. })
    }

    /// Name of the acting principal, for logs and events
    pub fn subject(&self) -> &str {
        match self {
            Self::Admin { admin_id } => admin_id,
            Self::Owner { owner_id } => owner_id.as_str(),
        }
    }

    /// Owner recorded on listings this principal submits
    pub fn as_owner(&self) -> OwnerId {
        match self {
            Self::Admin { admin_id } => OwnerId::new(admin_id.clone()),
            Self::Owner { owner_id } => owner_id.clone(),
        }
    }

    pub fn require_admin(&self, action: &str) -> DomainResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::Forbidden(format!(
                "{} requires an administrator capability",
                action
            )))
        }
    }

    /// Admins manage everything; owners manage their own listings.
    pub fn can_manage(&self, listing: &Listing) -> bool {
        match self {
            Self::Admin { .. } => true,
            Self::Owner { owner_id } => listing.is_owned_by(owner_id),
        }
    }

    pub fn require_manage(&self, listing: &Listing, action: &str) -> DomainResult<()> {
        if self.can_manage(listing) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(format!(
                "{} on listing {} is limited to its owner",
                action, listing.id
            )))
        }
    }

    /// Unapproved listings are visible to their owner and administrators only.
    pub fn can_view(viewer: Option<&Capability>, listing: &Listing) -> bool {
        listing.approved || viewer.map(|c| c.can_manage(listing)).unwrap_or(false)
    }
}
