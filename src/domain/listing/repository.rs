//! Listing repository interface
//!
//! The persistence collaborator. Implementations must:
//! - reject a second listing with an existing slug (`Conflict`),
//! - apply each `update` as one atomic whole-record write, evaluating the
//!   patch guard in the same step (`InvalidState` when it fails),
//! - evaluate the `delete` guard in the same step as the removal,
//! - return `list` results in [`canonical_order`](super::canonical_order).

use async_trait::async_trait;

use super::{Listing, ListingId, ListingPatch, ListingPredicate, PatchGuard, Slug};
use crate::domain::DomainResult;

#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn find_by_id(&self, id: &ListingId) -> DomainResult<Option<Listing>>;
    async fn find_by_slug(&self, slug: &Slug) -> DomainResult<Option<Listing>>;
    async fn create(&self, listing: Listing) -> DomainResult<Listing>;
    /// `NotFound` for an unknown id
    async fn update(&self, id: &ListingId, patch: ListingPatch) -> DomainResult<Listing>;
    /// `NotFound` for an unknown id, `InvalidState` when the guard fails.
    /// `PatchGuard::default()` deletes unconditionally.
    async fn delete(&self, id: &ListingId, guard: PatchGuard) -> DomainResult<()>;
    /// `limit = None` returns everything from `offset` on
    async fn list(
        &self,
        predicate: &ListingPredicate,
        offset: u64,
        limit: Option<u64>,
    ) -> DomainResult<Vec<Listing>>;
    async fn count(&self, predicate: &ListingPredicate) -> DomainResult<u64>;
}
