//! In-memory storage implementation

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::listing::canonical_order;
use crate::domain::{
    DomainError, DomainResult, Listing, ListingId, ListingPatch, ListingPredicate,
    ListingRepository, PatchGuard, RepositoryProvider, Slug,
};

/// In-memory listing store for development and testing
///
/// Updates and deletes run under the DashMap shard lock of the listing, which
/// makes the guard check and the write a single step.
pub struct InMemoryListingRepository {
    listings: DashMap<ListingId, Listing>,
    slugs: DashMap<String, ListingId>,
}

impl InMemoryListingRepository {
    pub fn new() -> Self {
        Self {
            listings: DashMap::new(),
            slugs: DashMap::new(),
        }
    }

    fn matching(&self, predicate: &ListingPredicate) -> Vec<Listing> {
        self.listings
            .iter()
            .filter(|e| predicate.matches(e.value()))
            .map(|e| e.value().clone())
            .collect()
    }
}

impl Default for InMemoryListingRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListingRepository for InMemoryListingRepository {
    async fn find_by_id(&self, id: &ListingId) -> DomainResult<Option<Listing>> {
        Ok(self.listings.get(id).map(|l| l.clone()))
    }

    async fn find_by_slug(&self, slug: &Slug) -> DomainResult<Option<Listing>> {
        let id = match self.slugs.get(slug.as_str()) {
            Some(id) => *id,
            None => return Ok(None),
        };
        self.find_by_id(&id).await
    }

    async fn create(&self, listing: Listing) -> DomainResult<Listing> {
        // Reserve the slug first so two racing creates cannot both win it
        match self.slugs.entry(listing.slug.as_str().to_string()) {
            Entry::Occupied(_) => {
                return Err(DomainError::Conflict(format!(
                    "slug '{}' is already taken",
                    listing.slug
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(listing.id);
            }
        }

        if self.listings.contains_key(&listing.id) {
            self.slugs.remove(listing.slug.as_str());
            return Err(DomainError::Conflict(format!(
                "listing {} already exists",
                listing.id
            )));
        }

        self.listings.insert(listing.id, listing.clone());
        Ok(listing)
    }

    async fn update(&self, id: &ListingId, patch: ListingPatch) -> DomainResult<Listing> {
        let mut entry = self
            .listings
            .get_mut(id)
            .ok_or_else(|| DomainError::listing_not_found("id", id.to_string()))?;

        patch
            .guard
            .check(entry.value())
            .map_err(|reason| DomainError::invalid_state(id, reason))?;

        patch.apply(entry.value_mut());
        Ok(entry.value().clone())
    }

    async fn delete(&self, id: &ListingId, guard: PatchGuard) -> DomainResult<()> {
        if let Some((_, listing)) = self.listings.remove_if(id, |_, l| guard.check(l).is_ok()) {
            self.slugs.remove(listing.slug.as_str());
            return Ok(());
        }

        match self.listings.get(id) {
            Some(entry) => {
                let reason = guard
                    .check(entry.value())
                    .err()
                    .unwrap_or_else(|| "listing changed concurrently".to_string());
                Err(DomainError::invalid_state(id, reason))
            }
            None => Err(DomainError::listing_not_found("id", id.to_string())),
        }
    }

    async fn list(
        &self,
        predicate: &ListingPredicate,
        offset: u64,
        limit: Option<u64>,
    ) -> DomainResult<Vec<Listing>> {
        let mut listings = self.matching(predicate);
        listings.sort_by(canonical_order);

        let iter = listings.into_iter().skip(offset as usize);
        Ok(match limit {
            Some(limit) => iter.take(limit as usize).collect(),
            None => iter.collect(),
        })
    }

    async fn count(&self, predicate: &ListingPredicate) -> DomainResult<u64> {
        Ok(self
            .listings
            .iter()
            .filter(|e| predicate.matches(e.value()))
            .count() as u64)
    }
}

/// `RepositoryProvider` backed by in-memory repositories
pub struct InMemoryRepositoryProvider {
    listings: InMemoryListingRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self {
            listings: InMemoryListingRepository::new(),
        }
    }
}

impl Default for InMemoryRepositoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn listings(&self) -> &dyn ListingRepository {
        &self.listings
    }
}
