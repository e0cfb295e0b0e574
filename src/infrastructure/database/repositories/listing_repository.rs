//! SeaORM implementation of ListingRepository

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use tracing::debug;

use crate::domain::{
    Categories, DomainError, DomainResult, Listing, ListingId, ListingPatch, ListingPredicate,
    ListingRepository, LocationContext, LocationDetectionMethod, OwnerId, PatchGuard, Slug,
};
use crate::infrastructure::database::entities::listing;

/// Compare-and-swap rounds before an update gives up
const MAX_UPDATE_ATTEMPTS: u32 = 5;

/// SQLite accepts OFFSET only together with LIMIT
const UNBOUNDED_LIMIT: u64 = i64::MAX as u64;

// ── Conversion helpers ──────────────────────────────────────────

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(format!("Database error: {}", e))
}

fn entity_to_domain(m: listing::Model) -> DomainResult<Listing> {
    let id = m.id.parse::<ListingId>()?;
    let categories: Categories = serde_json::from_str(&m.categories_json).map_err(|e| {
        DomainError::Storage(format!("listing {}: corrupt categories: {}", m.id, e))
    })?;
    let location_confirmation = m
        .location_confirmation
        .as_deref()
        .map(str::parse::<LocationContext>)
        .transpose()?;

    Ok(Listing {
        id,
        slug: Slug::from(m.slug),
        title: m.title,
        description: m.description,
        city: m.city,
        address: m.address,
        categories,
        approved: m.approved,
        is_verified: m.is_verified,
        is_featured: m.is_featured,
        rating: m.rating,
        is_global: m.is_global,
        location_verified: m.location_verified,
        location_detection_method: LocationDetectionMethod::from(m.location_detection_method.as_str()),
        location_confirmation,
        owner: OwnerId::new(m.owner),
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn domain_to_active(l: &Listing, revision: i64) -> DomainResult<listing::ActiveModel> {
    let categories_json = serde_json::to_string(&l.categories)
        .map_err(|e| DomainError::Storage(format!("Serialization error: {}", e)))?;

    Ok(listing::ActiveModel {
        id: Set(l.id.to_string()),
        slug: Set(l.slug.to_string()),
        title: Set(l.title.clone()),
        description: Set(l.description.clone()),
        city: Set(l.city.clone()),
        address: Set(l.address.clone()),
        categories_json: Set(categories_json),
        category_slugs: Set(slug_column(&l.categories)),
        approved: Set(l.approved),
        is_verified: Set(l.is_verified),
        is_featured: Set(l.is_featured),
        rating: Set(l.rating),
        is_global: Set(l.is_global),
        location_verified: Set(l.location_verified),
        location_detection_method: Set(l.location_detection_method.as_str().to_string()),
        location_confirmation: Set(l.location_confirmation.map(|c| c.as_str().to_string())),
        owner: Set(l.owner.to_string()),
        sort_key: Set(l.title.to_ascii_lowercase()),
        city_key: Set(Listing::city_key(&l.city)),
        search_key: Set(search_column(l)),
        revision: Set(revision),
        created_at: Set(l.created_at),
        updated_at: Set(l.updated_at),
    })
}

fn slug_column(categories: &Categories) -> String {
    let mut column = String::from("|");
    for category in categories.iter() {
        column.push_str(&category.slug);
        column.push('|');
    }
    column
}

/// Title and description, lowercased, separated by a control character so a
/// needle cannot match across the boundary.
fn search_column(l: &Listing) -> String {
    let mut column = l.title.to_lowercase();
    if let Some(ref description) = l.description {
        column.push('\u{1f}');
        column.push_str(&description.to_lowercase());
    }
    column
}

fn predicate_to_condition(p: &ListingPredicate) -> Condition {
    let mut condition = Condition::all();

    if let Some(is_global) = p.is_global {
        condition = condition.add(listing::Column::IsGlobal.eq(is_global));
    }
    if p.approved_only {
        condition = condition.add(listing::Column::Approved.eq(true));
    }
    if let Some(ref owner) = p.owner {
        condition = condition.add(listing::Column::Owner.eq(owner.as_str()));
    }
    if let Some(ref city) = p.city {
        condition = condition.add(listing::Column::CityKey.eq(Listing::city_key(city)));
    }
    if let Some(ref slug) = p.sub_category {
        // instr() is case-sensitive and needs no wildcard escaping
        condition = condition.add(Expr::cust_with_values(
            "instr(category_slugs, ?) > 0",
            [format!("|{}|", slug)],
        ));
    }
    if let Some(tier) = p.min_rating {
        condition = condition.add(listing::Column::Rating.gte(tier as f32));
    }
    if p.featured_only {
        condition = condition.add(listing::Column::IsFeatured.eq(true));
    }
    if p.verified_only {
        condition = condition.add(listing::Column::IsVerified.eq(true));
    }
    if let Some(ref needle) = p.search_text {
        condition = condition.add(Expr::cust_with_values(
            "instr(search_key, ?) > 0",
            [needle.to_lowercase()],
        ));
    }

    condition
}

fn guard_to_condition(guard: &PatchGuard) -> Condition {
    let mut condition = Condition::all();
    if let Some(approved) = guard.approved {
        condition = condition.add(listing::Column::Approved.eq(approved));
    }
    if let Some(verified) = guard.location_verified {
        condition = condition.add(listing::Column::LocationVerified.eq(verified));
    }
    condition
}

// ── SeaOrmListingRepository ─────────────────────────────────────

pub struct SeaOrmListingRepository {
    db: DatabaseConnection,
}

impl SeaOrmListingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: &ListingId) -> DomainResult<Option<listing::Model>> {
        listing::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)
    }
}

#[async_trait]
impl ListingRepository for SeaOrmListingRepository {
    async fn find_by_id(&self, id: &ListingId) -> DomainResult<Option<Listing>> {
        self.find_model(id).await?.map(entity_to_domain).transpose()
    }

    async fn find_by_slug(&self, slug: &Slug) -> DomainResult<Option<Listing>> {
        listing::Entity::find()
            .filter(listing::Column::Slug.eq(slug.as_str()))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(entity_to_domain)
            .transpose()
    }

    async fn create(&self, l: Listing) -> DomainResult<Listing> {
        let model = domain_to_active(&l, 0)?;
        match model.insert(&self.db).await {
            Ok(inserted) => {
                debug!("Listing stored: {} ({})", inserted.slug, inserted.id);
                entity_to_domain(inserted)
            }
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(DomainError::Conflict(format!(
                    "slug '{}' is already taken",
                    l.slug
                ))),
                _ => Err(db_err(e)),
            },
        }
    }

    /// Read, check the guard, then write the whole row only if the revision
    /// is still the one that was read. A lost race re-reads and re-checks.
    async fn update(&self, id: &ListingId, patch: ListingPatch) -> DomainResult<Listing> {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let current = self
                .find_model(id)
                .await?
                .ok_or_else(|| DomainError::listing_not_found("id", id.to_string()))?;
            let revision = current.revision;
            let mut listing = entity_to_domain(current)?;

            patch
                .guard
                .check(&listing)
                .map_err(|reason| DomainError::invalid_state(id, reason))?;

            patch.clone().apply(&mut listing);
            let model = domain_to_active(&listing, revision + 1)?;

            let result = listing::Entity::update_many()
                .set(model)
                .filter(listing::Column::Id.eq(id.to_string()))
                .filter(listing::Column::Revision.eq(revision))
                .exec(&self.db)
                .await
                .map_err(db_err)?;

            if result.rows_affected == 1 {
                return Ok(listing);
            }
            debug!("Listing {} changed concurrently (attempt {})", id, attempt);
        }

        Err(DomainError::Conflict(format!(
            "listing {} is being modified concurrently",
            id
        )))
    }

    /// The guard is part of the DELETE statement. When nothing was deleted
    /// the row is re-read to tell a missing listing from a failed guard.
    async fn delete(&self, id: &ListingId, guard: PatchGuard) -> DomainResult<()> {
        let result = listing::Entity::delete_many()
            .filter(listing::Column::Id.eq(id.to_string()))
            .filter(guard_to_condition(&guard))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 1 {
            return Ok(());
        }

        match self.find_model(id).await? {
            Some(current) => {
                let reason = guard
                    .check(&entity_to_domain(current)?)
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
        let mut select = listing::Entity::find()
            .filter(predicate_to_condition(predicate))
            .order_by_asc(listing::Column::SortKey)
            .order_by_asc(listing::Column::Id);
        if offset > 0 || limit.is_some() {
            select = select
                .offset(offset)
                .limit(limit.unwrap_or(UNBOUNDED_LIMIT));
        }
        let models = select
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(entity_to_domain).collect()
    }

    async fn count(&self, predicate: &ListingPredicate) -> DomainResult<u64> {
        listing::Entity::find()
            .filter(predicate_to_condition(predicate))
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}
