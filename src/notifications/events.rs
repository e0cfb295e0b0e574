//! Listing lifecycle events
//!
//! Published by the moderation services after each successful transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ListingId, LocationContext};

/// Event types for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// New listing persisted as pending
    ListingSubmitted(ListingSubmittedEvent),
    /// Owner edit (approval reset)
    ListingEdited(ListingEditedEvent),
    /// Owner answered an ambiguous classification
    LocationConfirmed(LocationConfirmedEvent),
    ListingApproved(ModerationEvent),
    /// Rejected listings are deleted
    ListingRejected(ModerationEvent),
    LocationVerified(LocationVerifiedEvent),
    ListingDeleted(ModerationEvent),
    /// Featured flag, verified badge or rating changed
    AttributesChanged(AttributesChangedEvent),
}

impl Event {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::ListingSubmitted(_) => "listing_submitted",
            Event::ListingEdited(_) => "listing_edited",
            Event::LocationConfirmed(_) => "location_confirmed",
            Event::ListingApproved(_) => "listing_approved",
            Event::ListingRejected(_) => "listing_rejected",
            Event::LocationVerified(_) => "location_verified",
            Event::ListingDeleted(_) => "listing_deleted",
            Event::AttributesChanged(_) => "attributes_changed",
        }
    }

    pub fn listing_id(&self) -> ListingId {
        match self {
            Event::ListingSubmitted(e) => e.listing_id,
            Event::ListingEdited(e) => e.listing_id,
            Event::LocationConfirmed(e) => e.listing_id,
            Event::ListingApproved(e) => e.listing_id,
            Event::ListingRejected(e) => e.listing_id,
            Event::LocationVerified(e) => e.listing_id,
            Event::ListingDeleted(e) => e.listing_id,
            Event::AttributesChanged(e) => e.listing_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSubmittedEvent {
    pub listing_id: ListingId,
    pub slug: String,
    pub owner: String,
    pub is_global: bool,
    pub needs_confirmation: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingEditedEvent {
    pub listing_id: ListingId,
    pub actor: String,
    pub location_changed: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfirmedEvent {
    pub listing_id: ListingId,
    pub confirmation: LocationContext,
    pub timestamp: DateTime<Utc>,
}

/// Approve, reject and delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationEvent {
    pub listing_id: ListingId,
    pub actor: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationVerifiedEvent {
    pub listing_id: ListingId,
    pub admin_id: String,
    pub is_global: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributesChangedEvent {
    pub listing_id: ListingId,
    pub admin_id: String,
    pub field: String,
    pub timestamp: DateTime<Utc>,
}

/// Wrapper for sending events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let id = ListingId::new();
        let message = EventMessage::new(Event::ListingApproved(ModerationEvent {
            listing_id: id,
            actor: "admin-1".into(),
            timestamp: Utc::now(),
        }));
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "ListingApproved");
        assert_eq!(json["data"]["listing_id"], id.to_string());
        assert_eq!(message.event.event_type(), "listing_approved");
    }
}
