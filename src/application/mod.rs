//! Application layer
//!
//! Use cases on top of the domain: geo-classification of submissions, the
//! moderation state machine with its bulk coordinator, and listing queries.

pub mod geo;
pub mod moderation;
pub mod query;

pub use geo::{Classification, Confidence, Gazetteer, GazetteerMatch, GeoClassifier};
pub use moderation::{BulkCoordinator, BulkOutcome, BulkReport, BulkStatus, ListingService};
pub use query::{listing_url, render_sitemap, Facets, QueryEngine};
