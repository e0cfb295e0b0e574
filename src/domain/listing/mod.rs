//! Listing aggregate
//!
//! Contains the Listing entity, its value objects, DTOs, the storage-agnostic
//! predicate/patch types and the repository interface.

pub mod category;
pub mod model;
pub mod predicate;
pub mod repository;

mod dto_edit;
mod dto_filters;
mod dto_submit;

pub use category::{Categories, Category};
pub use model::{
    ApprovalState, Listing, ListingId, LocationContext, LocationDetectionMethod, LocationState,
    MarketContext, OwnerId, Slug,
};
pub use predicate::{canonical_order, ListingPatch, ListingPredicate, PatchGuard};

pub use dto_edit::EditListingDto;
pub use dto_filters::ListingFilters;
pub use dto_submit::SubmitListingDto;

pub use repository::ListingRepository;
