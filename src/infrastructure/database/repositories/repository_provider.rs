//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::listing::ListingRepository;
use crate::domain::repositories::RepositoryProvider;

use super::listing_repository::SeaOrmListingRepository;

/// Unified repository provider backed by SeaORM.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let listing = repos.listings().find_by_slug(&slug).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    listings: SeaOrmListingRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            listings: SeaOrmListingRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn listings(&self) -> &dyn ListingRepository {
        &self.listings
    }
}
