//! Reusable listings runtime
//!
//! [`ListingsRuntime`] wires configuration, storage, the geo-classifier, the
//! event bus and the application services. The CLI and any embedding host
//! build it once and call services through it.

use std::sync::Arc;

use tracing::info;

use crate::application::{BulkCoordinator, Gazetteer, GeoClassifier, ListingService, QueryEngine};
use crate::config::AppConfig;
use crate::domain::RepositoryProvider;
use crate::infrastructure::{init_and_migrate, DatabaseConfig, InMemoryRepositoryProvider};
use crate::notifications::{create_event_bus, SharedEventBus};
use crate::shared::AppError;
use crate::SeaOrmRepositoryProvider;

pub struct ListingsRuntime {
    /// Lifecycle events of every listing
    pub event_bus: SharedEventBus,
    pub repos: Arc<dyn RepositoryProvider>,
    pub listings: Arc<ListingService>,
    pub bulk: BulkCoordinator,
    pub query: QueryEngine,
    /// The configuration the runtime was built with
    pub config: AppConfig,
}

impl ListingsRuntime {
    /// Connect to the configured database, apply migrations and build the
    /// services on top of it.
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        info!("Starting geo-listings runtime...");

        let db_config = DatabaseConfig {
            url: config.database.url.clone(),
        };
        let db = init_and_migrate(&db_config)
            .await
            .map_err(crate::shared::InfraError::from)?;

        let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db));
        Ok(Self::with_repositories(config, repos))
    }

    /// Runtime over volatile in-process storage
    pub fn in_memory(config: AppConfig) -> Self {
        Self::with_repositories(config, Arc::new(InMemoryRepositoryProvider::new()))
    }

    pub fn with_repositories(config: AppConfig, repos: Arc<dyn RepositoryProvider>) -> Self {
        let gazetteer = Gazetteer::with_extra(
            &config.gazetteer.extra_local,
            &config.gazetteer.extra_global,
        );
        info!(
            local = gazetteer.local_entries().len(),
            global = gazetteer.global_entries().len(),
            "Gazetteer loaded"
        );
        let classifier = Arc::new(GeoClassifier::new(gazetteer));

        let event_bus = create_event_bus();
        let timeout = config.persistence.timeout();

        let listings = Arc::new(ListingService::new(
            repos.clone(),
            classifier,
            event_bus.clone(),
            timeout,
        ));
        let bulk = BulkCoordinator::new(
            listings.clone(),
            config.bulk.max_ids,
            config.bulk.concurrency,
        );
        let query = QueryEngine::new(repos.clone(), timeout, config.query.max_page_size);

        Self {
            event_bus,
            repos,
            listings,
            bulk,
            query,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Capability, Categories, Category, ListingFilters, MarketContext, SubmitListingDto,
    };

    fn bakery(title: &str, city: &str) -> SubmitListingDto {
        SubmitListingDto {
            title: title.into(),
            description: None,
            city: city.into(),
            address: String::new(),
            categories: Categories::with_primary(Category::new("bakery", "Bakery"), Vec::new())
                .unwrap(),
            location_confirmation: None,
        }
    }

    async fn sqlite_runtime() -> ListingsRuntime {
        let mut config = AppConfig::default();
        config.database.url = "sqlite::memory:".to_string();
        ListingsRuntime::start(config).await.unwrap()
    }

    #[tokio::test]
    async fn configured_gazetteer_entries_reach_the_classifier() {
        let mut config = AppConfig::default();
        config.gazetteer.extra_local = vec!["Diriyah".to_string()];
        let runtime = ListingsRuntime::in_memory(config);

        let classification = runtime.listings.classify("Diriyah", "");
        assert!(!classification.needs_confirmation);
        assert!(!classification.is_global());
    }

    #[tokio::test]
    async fn start_on_sqlite_memory() {
        let runtime = sqlite_runtime().await;
        let listing = runtime
            .listings
            .submit(&Capability::owner("owner-1"), bakery("Olaya Bakery", "Riyadh"))
            .await
            .unwrap();
        assert_eq!(listing.slug.as_str(), "olaya-bakery");
    }

    #[tokio::test]
    async fn unpaginated_queries_on_sqlite() {
        let runtime = sqlite_runtime().await;
        let admin = Capability::admin("admin-1");
        for (title, city) in [("Olaya Bakery", "Riyadh"), ("Corniche Bakery", "Jeddah")] {
            let listing = runtime
                .listings
                .submit(&Capability::owner("owner-1"), bakery(title, city))
                .await
                .unwrap();
            runtime.listings.approve(&admin, &listing.id).await.unwrap();
        }
        runtime
            .listings
            .submit(&Capability::owner("owner-1"), bakery("Pending Bakery", "Abha"))
            .await
            .unwrap();

        let approved = runtime.query.all_approved(MarketContext::All).await.unwrap();
        let titles: Vec<&str> = approved.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Corniche Bakery", "Olaya Bakery"]);

        let facets = runtime
            .query
            .facets(MarketContext::All, &ListingFilters::default())
            .await
            .unwrap();
        assert_eq!(facets.cities, vec!["Jeddah", "Riyadh"]);
        assert_eq!(facets.sub_categories.len(), 1);
    }
}
