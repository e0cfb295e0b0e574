//! Notifications module
//!
//! Broadcasts listing lifecycle events to in-process subscribers
//! (sitemap refreshers, cache invalidation, audit logging).
//!
//! # Usage
//! ```ignore
//! use geo_listings::notifications::{create_event_bus, Event, ModerationEvent};
//!
//! let event_bus = create_event_bus();
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus.publish(Event::ListingApproved(ModerationEvent {
//!     listing_id,
//!     actor: "admin-1".to_string(),
//!     timestamp: Utc::now(),
//! }));
//! ```

pub mod event_bus;
pub mod events;

pub use event_bus::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
pub use events::*;
