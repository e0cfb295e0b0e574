//! Listing moderation
//!
//! `ListingService` owns the single-listing lifecycle; `BulkCoordinator`
//! fans administrator actions out over many listings.

pub mod bulk;
pub mod service;

pub use bulk::{parse_ids, BulkCoordinator, BulkOutcome, BulkReport, BulkStatus};
pub use service::ListingService;
