//! Context-aware listing queries
//!
//! Read-only view over the repository. The market context is always applied
//! before any user filter, so a local query can never surface a global
//! listing and vice versa.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::domain::{
    Category, DomainResult, Listing, ListingFilters, ListingPredicate, MarketContext,
    RepositoryProvider,
};
use crate::shared::{with_timeout, PageRequest, PaginatedResult};

/// Distinct filter values available in the current result set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub cities: Vec<String>,
    pub sub_categories: Vec<Category>,
}

pub struct QueryEngine {
    repos: Arc<dyn RepositoryProvider>,
    timeout: Duration,
    max_page_size: u32,
}

impl QueryEngine {
    pub fn new(repos: Arc<dyn RepositoryProvider>, timeout: Duration, max_page_size: u32) -> Self {
        Self {
            repos,
            timeout,
            max_page_size,
        }
    }

    pub async fn query(
        &self,
        market: MarketContext,
        filters: &ListingFilters,
        page: PageRequest,
        include_unapproved: bool,
    ) -> DomainResult<PaginatedResult<Listing>> {
        filters.validate()?;
        let page = page.validated(self.max_page_size)?;
        let predicate = filters.to_predicate(market, include_unapproved);

        let total = self
            .call("count", self.repos.listings().count(&predicate))
            .await?;

        if page.offset() >= total {
            debug!(?market, page = page.page, total, "Page beyond last page");
            return Ok(PaginatedResult::empty(total, page.page, page.page_size));
        }

        let items = self
            .call(
                "list",
                self.repos
                    .listings()
                    .list(&predicate, page.offset(), Some(page.page_size as u64)),
            )
            .await?;

        debug!(
            ?market,
            page = page.page,
            returned = items.len(),
            total,
            "Listings queried"
        );
        Ok(PaginatedResult::new(items, total, page.page, page.page_size))
    }

    /// Facets over the approved listings matching `market` and `filters`.
    pub async fn facets(
        &self,
        market: MarketContext,
        filters: &ListingFilters,
    ) -> DomainResult<Facets> {
        filters.validate()?;
        let predicate = filters.to_predicate(market, false);
        let listings = self.list_all(&predicate).await?;
        Ok(facets_of(&listings))
    }

    /// Every approved listing in `market`, unpaginated, in canonical order.
    pub async fn all_approved(&self, market: MarketContext) -> DomainResult<Vec<Listing>> {
        let predicate = ListingPredicate {
            is_global: market.is_global_constraint(),
            approved_only: true,
            ..Default::default()
        };
        self.list_all(&predicate).await
    }

    async fn list_all(&self, predicate: &ListingPredicate) -> DomainResult<Vec<Listing>> {
        self.call("list", self.repos.listings().list(predicate, 0, None))
            .await
    }

    async fn call<T, F>(&self, operation: &str, fut: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        with_timeout(self.timeout, operation, fut).await
    }
}

fn facets_of(listings: &[Listing]) -> Facets {
    let mut seen_cities = HashSet::new();
    let mut cities: Vec<String> = listings
        .iter()
        .map(|l| l.city.trim())
        .filter(|c| !c.is_empty())
        .filter(|c| seen_cities.insert(Listing::city_key(c)))
        .map(str::to_string)
        .collect();
    cities.sort_by_key(|c| Listing::city_key(c));

    let mut seen_slugs = HashSet::new();
    let mut sub_categories: Vec<Category> = listings
        .iter()
        .flat_map(|l| l.categories.iter())
        .filter(|c| seen_slugs.insert(c.slug.clone()))
        .map(|c| Category {
            is_primary: false,
            ..c.clone()
        })
        .collect();
    sub_categories.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.slug.cmp(&b.slug))
    });

    Facets {
        cities,
        sub_categories,
    }
}
