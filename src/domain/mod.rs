pub mod capability;
pub mod listing;
pub mod repositories;

// Re-export commonly used types
pub use capability::Capability;
pub use listing::{
    ApprovalState, Categories, Category, EditListingDto, Listing, ListingFilters, ListingId,
    ListingPatch, ListingPredicate, ListingRepository, LocationContext, LocationDetectionMethod,
    LocationState, MarketContext, OwnerId, PatchGuard, Slug, SubmitListingDto,
};
pub use repositories::{DomainResult, RepositoryProvider};

pub use crate::shared::errors::DomainError;
