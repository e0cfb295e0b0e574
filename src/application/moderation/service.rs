//! Listing lifecycle and moderation
//!
//! Approval axis: Pending -> Approved, or Pending -> Rejected (hard delete).
//! Location axis: Unverified -> UserConfirmed -> AdminVerified, or
//! Unverified -> AdminVerified. Owner edits send a listing back to Pending
//! and, when city or address change, back to Unverified.
//!
//! Each transition is a single `update` against the repository. Preconditions
//! are also placed on the patch guard so a concurrent transition cannot slip
//! in between the state check and the write.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::application::geo::{Classification, GeoClassifier};
use crate::domain::{
    Capability, DomainResult, EditListingDto, Listing, ListingId, ListingPatch,
    LocationContext, LocationDetectionMethod, PatchGuard, RepositoryProvider, Slug,
    SubmitListingDto,
};
use crate::notifications::{
    AttributesChangedEvent, Event, ListingEditedEvent, ListingSubmittedEvent,
    LocationConfirmedEvent, LocationVerifiedEvent, ModerationEvent, SharedEventBus,
};
use crate::shared::{with_timeout, DomainError};

/// Slug candidates tried before giving up (`base`, `base-2`, ... `base-50`)
const MAX_SLUG_ATTEMPTS: u32 = 50;

pub struct ListingService {
    repos: Arc<dyn RepositoryProvider>,
    classifier: Arc<GeoClassifier>,
    event_bus: SharedEventBus,
    timeout: Duration,
}

impl ListingService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        classifier: Arc<GeoClassifier>,
        event_bus: SharedEventBus,
        timeout: Duration,
    ) -> Self {
        Self {
            repos,
            classifier,
            event_bus,
            timeout,
        }
    }

    pub fn classify(&self, city: &str, address: &str) -> Classification {
        self.classifier.classify(city, address)
    }

    // ── Owner operations ───────────────────────────────────────

    pub async fn submit(&self, actor: &Capability, dto: SubmitListingDto) -> DomainResult<Listing> {
        let dto = dto.normalized();
        dto.validate()?;

        let classification = self.classifier.classify(&dto.city, &dto.address);
        let location = resolve_location(&classification, dto.location_confirmation)?;

        let now = Utc::now();
        let base_slug = Slug::from_title(&dto.title);
        let mut listing = Listing {
            id: ListingId::new(),
            slug: base_slug.clone(),
            title: dto.title,
            description: dto.description,
            city: dto.city,
            address: dto.address,
            categories: dto.categories,
            approved: false,
            is_verified: false,
            is_featured: false,
            rating: None,
            is_global: location.is_global,
            location_verified: false,
            location_detection_method: location.method,
            location_confirmation: location.confirmation,
            owner: actor.as_owner(),
            created_at: now,
            updated_at: now,
        };

        let created = self.create_with_unique_slug(&mut listing, &base_slug).await?;

        info!(
            listing_id = %created.id,
            slug = %created.slug,
            owner = %created.owner,
            is_global = created.is_global,
            method = %created.location_detection_method,
            "Listing submitted"
        );
        record("submit");
        self.event_bus.publish(Event::ListingSubmitted(ListingSubmittedEvent {
            listing_id: created.id,
            slug: created.slug.to_string(),
            owner: created.owner.to_string(),
            is_global: created.is_global,
            needs_confirmation: classification.needs_confirmation,
            timestamp: Utc::now(),
        }));

        Ok(created)
    }

    async fn create_with_unique_slug(
        &self,
        listing: &mut Listing,
        base: &Slug,
    ) -> DomainResult<Listing> {
        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            listing.slug = if attempt == 1 {
                base.clone()
            } else {
                base.with_suffix(attempt)
            };

            match self
                .call("create", self.repos.listings().create(listing.clone()))
                .await
            {
                Ok(created) => return Ok(created),
                Err(DomainError::Conflict(_)) => {
                    debug!(slug = %listing.slug, "Slug taken, trying next candidate");
                }
                Err(e) => return Err(e),
            }
        }

        Err(DomainError::Conflict(format!(
            "no free slug for '{}' after {} attempts",
            base, MAX_SLUG_ATTEMPTS
        )))
    }

    /// Owner edit. Always returns the listing to Pending; a changed city or
    /// address is re-classified and loses any location verification.
    pub async fn edit(
        &self,
        actor: &Capability,
        id: &ListingId,
        dto: EditListingDto,
    ) -> DomainResult<Listing> {
        let dto = dto.normalized();
        dto.validate()?;

        let current = self.load(id).await?;
        actor.require_manage(&current, "edit")?;

        let city = dto.city.unwrap_or_else(|| current.city.clone());
        let address = dto.address.unwrap_or_else(|| current.address.clone());
        let location_changed = city != current.city || address != current.address;

        let mut patch = ListingPatch {
            title: dto.title,
            description: dto.description.map(|d| if d.is_empty() { None } else { Some(d) }),
            categories: dto.categories,
            approved: Some(false),
            ..Default::default()
        };

        if location_changed {
            let classification = self.classifier.classify(&city, &address);
            let location = resolve_location(&classification, dto.location_confirmation)?;
            patch.city = Some(city);
            patch.address = Some(address);
            patch.is_global = Some(location.is_global);
            patch.location_verified = Some(false);
            patch.location_detection_method = Some(location.method);
            patch.location_confirmation = Some(location.confirmation);
        } else if dto.location_confirmation.is_some() {
            debug!(listing_id = %id, "Confirmation without location change ignored");
        }

        let updated = self
            .call("update", self.repos.listings().update(id, patch))
            .await?;

        info!(
            listing_id = %id,
            actor = actor.subject(),
            location_changed,
            "Listing edited, approval reset"
        );
        record("edit");
        self.event_bus.publish(Event::ListingEdited(ListingEditedEvent {
            listing_id: *id,
            actor: actor.subject().to_string(),
            location_changed,
            timestamp: Utc::now(),
        }));

        Ok(updated)
    }

    /// Owner answer for an ambiguous classification: Unverified ->
    /// UserConfirmed. May be repeated until an administrator verifies.
    pub async fn confirm_location(
        &self,
        actor: &Capability,
        id: &ListingId,
        confirmation: LocationContext,
    ) -> DomainResult<Listing> {
        let current = self.load(id).await?;
        actor.require_manage(&current, "confirm location")?;

        if current.location_verified {
            return Err(DomainError::invalid_state(
                id,
                "location already verified by an administrator",
            ));
        }
        let classification = self.classifier.classify(&current.city, &current.address);
        if !classification.needs_confirmation {
            return Err(DomainError::invalid_state(
                id,
                "location was classified unambiguously; nothing to confirm",
            ));
        }

        let patch = ListingPatch {
            is_global: Some(confirmation.is_global()),
            location_detection_method: Some(LocationDetectionMethod::UserConfirmed),
            location_confirmation: Some(Some(confirmation)),
            ..Default::default()
        }
        .expect_location_verified(false);

        let updated = self
            .call("update", self.repos.listings().update(id, patch))
            .await?;

        info!(listing_id = %id, confirmation = %confirmation, "Location confirmed by owner");
        record("confirm_location");
        self.event_bus.publish(Event::LocationConfirmed(LocationConfirmedEvent {
            listing_id: *id,
            confirmation,
            timestamp: Utc::now(),
        }));

        Ok(updated)
    }

    /// Owner or administrator; any state.
    pub async fn delete(&self, actor: &Capability, id: &ListingId) -> DomainResult<()> {
        let current = self.load(id).await?;
        actor.require_manage(&current, "delete")?;

        self.call("delete", self.repos.listings().delete(id, PatchGuard::default()))
            .await?;

        info!(listing_id = %id, actor = actor.subject(), "Listing deleted");
        record("delete");
        self.publish_moderation(Event::ListingDeleted, id, actor);
        Ok(())
    }

    // ── Administrator operations ───────────────────────────────

    /// Pending -> Approved
    pub async fn approve(&self, admin: &Capability, id: &ListingId) -> DomainResult<Listing> {
        admin.require_admin("approve")?;

        let current = self.load(id).await?;
        if current.approved {
            return Err(DomainError::invalid_state(id, "listing is already approved"));
        }

        let patch = ListingPatch {
            approved: Some(true),
            ..Default::default()
        }
        .expect_approved(false);

        let updated = self
            .call("update", self.repos.listings().update(id, patch))
            .await?;

        info!(listing_id = %id, admin = admin.subject(), "Listing approved");
        record("approve");
        self.publish_moderation(Event::ListingApproved, id, admin);
        Ok(updated)
    }

    /// Pending -> Rejected. The record is deleted; this cannot be undone.
    /// The pending check travels with the delete, so a listing approved in
    /// the meantime survives.
    pub async fn reject(&self, admin: &Capability, id: &ListingId) -> DomainResult<()> {
        admin.require_admin("reject")?;

        let current = self.load(id).await?;
        if current.approved {
            return Err(DomainError::invalid_state(
                id,
                "only pending listings can be rejected",
            ));
        }

        let pending_only = PatchGuard {
            approved: Some(false),
            ..Default::default()
        };
        self.call("delete", self.repos.listings().delete(id, pending_only))
            .await?;

        info!(listing_id = %id, admin = admin.subject(), "Listing rejected and deleted");
        record("reject");
        self.publish_moderation(Event::ListingRejected, id, admin);
        Ok(())
    }

    /// Any location state -> AdminVerified. Re-callable; the last call wins.
    pub async fn verify_location(
        &self,
        admin: &Capability,
        id: &ListingId,
        is_global: bool,
    ) -> DomainResult<Listing> {
        admin.require_admin("verify location")?;

        let patch = ListingPatch {
            is_global: Some(is_global),
            location_verified: Some(true),
            location_detection_method: Some(LocationDetectionMethod::AdminOverride),
            location_confirmation: Some(None),
            ..Default::default()
        };

        let updated = self
            .call("update", self.repos.listings().update(id, patch))
            .await?;

        info!(listing_id = %id, admin = admin.subject(), is_global, "Location verified");
        record("verify_location");
        self.event_bus.publish(Event::LocationVerified(LocationVerifiedEvent {
            listing_id: *id,
            admin_id: admin.subject().to_string(),
            is_global,
            timestamp: Utc::now(),
        }));

        Ok(updated)
    }

    pub async fn set_featured(
        &self,
        admin: &Capability,
        id: &ListingId,
        featured: bool,
    ) -> DomainResult<Listing> {
        let patch = ListingPatch {
            is_featured: Some(featured),
            ..Default::default()
        };
        self.update_attribute(admin, id, "is_featured", patch).await
    }

    /// Display badge only; has no effect on location verification.
    pub async fn set_verified_badge(
        &self,
        admin: &Capability,
        id: &ListingId,
        verified: bool,
    ) -> DomainResult<Listing> {
        let patch = ListingPatch {
            is_verified: Some(verified),
            ..Default::default()
        };
        self.update_attribute(admin, id, "is_verified", patch).await
    }

    pub async fn set_rating(
        &self,
        admin: &Capability,
        id: &ListingId,
        rating: Option<f32>,
    ) -> DomainResult<Listing> {
        if let Some(value) = rating {
            if !value.is_finite() || !(0.0..=5.0).contains(&value) {
                return Err(DomainError::Validation(format!(
                    "rating: must be between 0 and 5, got {}",
                    value
                )));
            }
        }
        let patch = ListingPatch {
            rating: Some(rating),
            ..Default::default()
        };
        self.update_attribute(admin, id, "rating", patch).await
    }

    async fn update_attribute(
        &self,
        admin: &Capability,
        id: &ListingId,
        field: &'static str,
        patch: ListingPatch,
    ) -> DomainResult<Listing> {
        admin.require_admin("attribute update")?;

        let updated = self
            .call("update", self.repos.listings().update(id, patch))
            .await?;

        info!(listing_id = %id, admin = admin.subject(), field, "Listing attribute updated");
        record("attribute");
        self.event_bus.publish(Event::AttributesChanged(AttributesChangedEvent {
            listing_id: *id,
            admin_id: admin.subject().to_string(),
            field: field.to_string(),
            timestamp: Utc::now(),
        }));

        Ok(updated)
    }

    // ── Lookups ────────────────────────────────────────────────

    /// `NotFound` also covers unapproved listings the viewer may not see.
    pub async fn find_by_id(
        &self,
        viewer: Option<&Capability>,
        id: &ListingId,
    ) -> DomainResult<Listing> {
        let listing = self.load(id).await?;
        if Capability::can_view(viewer, &listing) {
            Ok(listing)
        } else {
            Err(DomainError::listing_not_found("id", id.to_string()))
        }
    }

    pub async fn find_by_slug(
        &self,
        viewer: Option<&Capability>,
        slug: &str,
    ) -> DomainResult<Listing> {
        let slug = Slug::from(slug.trim().to_string());
        let listing = self
            .call("find_by_slug", self.repos.listings().find_by_slug(&slug))
            .await?
            .filter(|l| Capability::can_view(viewer, l));

        listing.ok_or_else(|| DomainError::listing_not_found("slug", slug.into_string()))
    }

    // ── Helpers ────────────────────────────────────────────────

    async fn load(&self, id: &ListingId) -> DomainResult<Listing> {
        self.call("find_by_id", self.repos.listings().find_by_id(id))
            .await?
            .ok_or_else(|| DomainError::listing_not_found("id", id.to_string()))
    }

    async fn call<T, F>(&self, operation: &str, fut: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        with_timeout(self.timeout, operation, fut).await
    }

    fn publish_moderation(
        &self,
        make: fn(ModerationEvent) -> Event,
        id: &ListingId,
        actor: &Capability,
    ) {
        self.event_bus.publish(make(ModerationEvent {
            listing_id: *id,
            actor: actor.subject().to_string(),
            timestamp: Utc::now(),
        }));
    }
}

/// Stored location fields derived from a classification and an optional
/// submitter answer.
struct ResolvedLocation {
    is_global: bool,
    method: LocationDetectionMethod,
    confirmation: Option<LocationContext>,
}

fn resolve_location(
    classification: &Classification,
    confirmation: Option<LocationContext>,
) -> DomainResult<ResolvedLocation> {
    if !classification.needs_confirmation {
        if confirmation.is_some() {
            debug!("Location confirmation ignored for unambiguous classification");
        }
        return Ok(ResolvedLocation {
            is_global: classification.is_global(),
            method: LocationDetectionMethod::Auto,
            confirmation: None,
        });
    }

    match confirmation {
        Some(answer) => Ok(ResolvedLocation {
            is_global: answer.is_global(),
            method: LocationDetectionMethod::UserConfirmed,
            confirmation: Some(answer),
        }),
        None => {
            warn!(reason = %classification.reason, "Submission missing location confirmation");
            Err(DomainError::Validation(format!(
                "location_confirmation: required ({})",
                classification.reason
            )))
        }
    }
}

fn record(action: &'static str) {
    metrics::counter!("listings_moderation_total", "action" => action).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::domain::listing::testing::sample_listing;
    use crate::domain::{
        ApprovalState, Categories, Category, ListingPredicate, ListingRepository, LocationState,
    };
    use crate::infrastructure::storage::{InMemoryListingRepository, InMemoryRepositoryProvider};
    use crate::notifications::create_event_bus;

    /// Approves each listing right after handing out its snapshot, as a
    /// concurrent administrator would.
    struct ApprovingReads {
        inner: InMemoryListingRepository,
    }

    #[async_trait]
    impl ListingRepository for ApprovingReads {
        async fn find_by_id(&self, id: &ListingId) -> DomainResult<Option<Listing>> {
            let found = self.inner.find_by_id(id).await?;
            if found.is_some() {
                let approve = ListingPatch {
                    approved: Some(true),
                    ..Default::default()
                };
                self.inner.update(id, approve).await?;
            }
            Ok(found)
        }

        async fn find_by_slug(&self, slug: &Slug) -> DomainResult<Option<Listing>> {
            self.inner.find_by_slug(slug).await
        }

        async fn create(&self, listing: Listing) -> DomainResult<Listing> {
            self.inner.create(listing).await
        }

        async fn update(&self, id: &ListingId, patch: ListingPatch) -> DomainResult<Listing> {
            self.inner.update(id, patch).await
        }

        async fn delete(&self, id: &ListingId, guard: PatchGuard) -> DomainResult<()> {
            self.inner.delete(id, guard).await
        }

        async fn list(
            &self,
            predicate: &ListingPredicate,
            offset: u64,
            limit: Option<u64>,
        ) -> DomainResult<Vec<Listing>> {
            self.inner.list(predicate, offset, limit).await
        }

        async fn count(&self, predicate: &ListingPredicate) -> DomainResult<u64> {
            self.inner.count(predicate).await
        }
    }

    impl RepositoryProvider for ApprovingReads {
        fn listings(&self) -> &dyn ListingRepository {
            self
        }
    }

    fn service() -> ListingService {
        ListingService::new(
            Arc::new(InMemoryRepositoryProvider::new()),
            Arc::new(GeoClassifier::default()),
            create_event_bus(),
            Duration::from_secs(1),
        )
    }

    fn owner() -> Capability {
        Capability::owner("owner-1")
    }

    fn admin() -> Capability {
        Capability::admin("admin-1")
    }

    fn submission(title: &str, city: &str) -> SubmitListingDto {
        SubmitListingDto {
            title: title.to_string(),
            description: None,
            city: city.to_string(),
            address: String::new(),
            categories: Categories::with_primary(Category::new("cafe", "Cafe"), Vec::new())
                .unwrap(),
            location_confirmation: None,
        }
    }

    #[tokio::test]
    async fn reject_keeps_listing_approved_after_the_read() {
        let repos = Arc::new(ApprovingReads {
            inner: InMemoryListingRepository::new(),
        });
        let listing = repos
            .inner
            .create(sample_listing("Olaya Bakery", "Riyadh"))
            .await
            .unwrap();
        let svc = ListingService::new(
            repos.clone(),
            Arc::new(GeoClassifier::default()),
            create_event_bus(),
            Duration::from_secs(1),
        );

        let err = svc.reject(&admin(), &listing.id).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidState { .. }));

        let stored = repos.inner.find_by_id(&listing.id).await.unwrap().unwrap();
        assert!(stored.approved);
    }

    #[tokio::test]
    async fn submit_creates_pending_unverified_listing() {
        let svc = service();
        let listing = svc.submit(&owner(), submission("Olaya Bakery", "Riyadh")).await.unwrap();

        assert_eq!(listing.approval_state(), ApprovalState::Pending);
        assert_eq!(listing.location_state(), LocationState::Unverified);
        assert!(!listing.is_global);
        assert_eq!(listing.location_detection_method, LocationDetectionMethod::Auto);
        assert_eq!(listing.location_confirmation, None);
        assert_eq!(listing.slug.as_str(), "olaya-bakery");
        assert_eq!(listing.owner.as_str(), "owner-1");
    }

    #[tokio::test]
    async fn foreign_city_is_global() {
        let svc = service();
        let listing = svc.submit(&owner(), submission("Java House", "Nairobi")).await.unwrap();
        assert!(listing.is_global);
        assert!(!listing.location_verified);
    }

    #[tokio::test]
    async fn ambiguous_city_requires_confirmation() {
        let svc = service();
        let err = svc
            .submit(&owner(), submission("Lakeside Lodge", "Naivasha"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m.contains("location_confirmation")));

        let mut dto = submission("Lakeside Lodge", "Naivasha");
        dto.location_confirmation = Some(LocationContext::Local);
        let listing = svc.submit(&owner(), dto).await.unwrap();

        assert!(!listing.is_global);
        assert!(!listing.location_verified);
        assert_eq!(listing.location_detection_method, LocationDetectionMethod::UserConfirmed);
        assert_eq!(listing.location_confirmation, Some(LocationContext::Local));
        assert_eq!(listing.location_state(), LocationState::UserConfirmed);
    }

    #[tokio::test]
    async fn confirmation_ignored_when_unambiguous() {
        let svc = service();
        let mut dto = submission("Olaya Bakery", "Riyadh");
        dto.location_confirmation = Some(LocationContext::Other);
        let listing = svc.submit(&owner(), dto).await.unwrap();

        assert!(!listing.is_global);
        assert_eq!(listing.location_confirmation, None);
    }

    #[tokio::test]
    async fn invalid_payload_is_rejected() {
        let svc = service();
        let err = svc.submit(&owner(), submission("   ", "Riyadh")).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m.contains("title")));
    }

    #[tokio::test]
    async fn slugs_stay_unique() {
        let svc = service();
        let first = svc.submit(&owner(), submission("Coffee House", "Riyadh")).await.unwrap();
        let second = svc.submit(&owner(), submission("Coffee  House!", "Jeddah")).await.unwrap();
        let third = svc.submit(&owner(), submission("coffee house", "Dammam")).await.unwrap();

        assert_eq!(first.slug.as_str(), "coffee-house");
        assert_eq!(second.slug.as_str(), "coffee-house-2");
        assert_eq!(third.slug.as_str(), "coffee-house-3");
    }

    #[tokio::test]
    async fn approve_twice_is_invalid_state() {
        let svc = service();
        let listing = svc.submit(&owner(), submission("Olaya Bakery", "Riyadh")).await.unwrap();

        let approved = svc.approve(&admin(), &listing.id).await.unwrap();
        assert!(approved.approved);

        let err = svc.approve(&admin(), &listing.id).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn approve_requires_admin() {
        let svc = service();
        let listing = svc.submit(&owner(), submission("Olaya Bakery", "Riyadh")).await.unwrap();
        let err = svc.approve(&owner(), &listing.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let svc = service();
        let missing = ListingId::new();
        assert!(matches!(
            svc.approve(&admin(), &missing).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
        assert!(matches!(
            svc.reject(&admin(), &missing).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
        assert!(matches!(
            svc.verify_location(&admin(), &missing, true).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn reject_deletes_listing() {
        let svc = service();
        let listing = svc.submit(&owner(), submission("Olaya Bakery", "Riyadh")).await.unwrap();

        svc.reject(&admin(), &listing.id).await.unwrap();

        let err = svc
            .find_by_slug(Some(&admin()), listing.slug.as_str())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn reject_approved_listing_is_invalid_state() {
        let svc = service();
        let listing = svc.submit(&owner(), submission("Olaya Bakery", "Riyadh")).await.unwrap();
        svc.approve(&admin(), &listing.id).await.unwrap();

        let err = svc.reject(&admin(), &listing.id).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidState { .. }));
        assert!(svc.find_by_slug(None, listing.slug.as_str()).await.is_ok());
    }

    #[tokio::test]
    async fn verify_location_last_call_wins() {
        let svc = service();
        let listing = svc.submit(&owner(), submission("Olaya Bakery", "Riyadh")).await.unwrap();

        let first = svc.verify_location(&admin(), &listing.id, true).await.unwrap();
        assert!(first.is_global);
        assert!(first.location_verified);
        assert_eq!(first.location_detection_method, LocationDetectionMethod::AdminOverride);

        let second = svc.verify_location(&admin(), &listing.id, false).await.unwrap();
        assert!(!second.is_global);
        assert!(second.location_verified);
        assert_eq!(second.location_state(), LocationState::AdminVerified);
    }

    #[tokio::test]
    async fn verify_location_clears_confirmation() {
        let svc = service();
        let mut dto = submission("Lakeside Lodge", "Naivasha");
        dto.location_confirmation = Some(LocationContext::Other);
        let listing = svc.submit(&owner(), dto).await.unwrap();

        let verified = svc.verify_location(&admin(), &listing.id, false).await.unwrap();
        assert_eq!(verified.location_confirmation, None);
        assert!(!verified.is_global);
    }

    #[tokio::test]
    async fn edit_resets_approval() {
        let svc = service();
        let listing = svc.submit(&owner(), submission("Olaya Bakery", "Riyadh")).await.unwrap();
        svc.approve(&admin(), &listing.id).await.unwrap();
        svc.verify_location(&admin(), &listing.id, false).await.unwrap();

        let edited = svc
            .edit(
                &owner(),
                &listing.id,
                EditListingDto {
                    title: Some("Olaya Bakery & Cafe".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!edited.approved);
        assert_eq!(edited.title, "Olaya Bakery & Cafe");
        // Slug is immutable and location untouched
        assert_eq!(edited.slug, listing.slug);
        assert!(edited.location_verified);
    }

    #[tokio::test]
    async fn edit_city_reclassifies_and_unverifies() {
        let svc = service();
        let listing = svc.submit(&owner(), submission("Olaya Bakery", "Riyadh")).await.unwrap();
        svc.verify_location(&admin(), &listing.id, false).await.unwrap();

        let edited = svc
            .edit(
                &owner(),
                &listing.id,
                EditListingDto {
                    city: Some("Dubai".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(edited.is_global);
        assert!(!edited.location_verified);
        assert_eq!(edited.location_detection_method, LocationDetectionMethod::Auto);
    }

    #[tokio::test]
    async fn edit_to_ambiguous_city_requires_confirmation() {
        let svc = service();
        let listing = svc.submit(&owner(), submission("Olaya Bakery", "Riyadh")).await.unwrap();

        let err = svc
            .edit(
                &owner(),
                &listing.id,
                EditListingDto {
                    city: Some("Naivasha".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // Rejected edit leaves the record alone
        let unchanged = svc.find_by_id(Some(&owner()), &listing.id).await.unwrap();
        assert_eq!(unchanged.city, "Riyadh");
    }

    #[tokio::test]
    async fn edit_by_stranger_is_forbidden() {
        let svc = service();
        let listing = svc.submit(&owner(), submission("Olaya Bakery", "Riyadh")).await.unwrap();
        let err = svc
            .edit(&Capability::owner("stranger"), &listing.id, EditListingDto::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn confirm_location_rules() {
        let svc = service();
        let mut dto = submission("Lakeside Lodge", "Naivasha");
        dto.location_confirmation = Some(LocationContext::Other);
        let ambiguous = svc.submit(&owner(), dto).await.unwrap();

        let changed = svc
            .confirm_location(&owner(), &ambiguous.id, LocationContext::Local)
            .await
            .unwrap();
        assert!(!changed.is_global);
        assert_eq!(changed.location_state(), LocationState::UserConfirmed);

        svc.verify_location(&admin(), &ambiguous.id, true).await.unwrap();
        let err = svc
            .confirm_location(&owner(), &ambiguous.id, LocationContext::Local)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState { .. }));

        let clear = svc.submit(&owner(), submission("Olaya Bakery", "Riyadh")).await.unwrap();
        let err = svc
            .confirm_location(&owner(), &clear.id, LocationContext::Other)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn unapproved_listing_hidden_from_public() {
        let svc = service();
        let listing = svc.submit(&owner(), submission("Olaya Bakery", "Riyadh")).await.unwrap();

        assert!(svc.find_by_slug(None, "olaya-bakery").await.is_err());
        assert!(svc
            .find_by_slug(Some(&Capability::owner("stranger")), "olaya-bakery")
            .await
            .is_err());
        assert!(svc.find_by_slug(Some(&owner()), "olaya-bakery").await.is_ok());

        svc.approve(&admin(), &listing.id).await.unwrap();
        assert!(svc.find_by_slug(None, "olaya-bakery").await.is_ok());
    }

    #[tokio::test]
    async fn attribute_updates() {
        let svc = service();
        let listing = svc.submit(&owner(), submission("Olaya Bakery", "Riyadh")).await.unwrap();

        let featured = svc.set_featured(&admin(), &listing.id, true).await.unwrap();
        assert!(featured.is_featured);
        let badged = svc.set_verified_badge(&admin(), &listing.id, true).await.unwrap();
        assert!(badged.is_verified);
        assert!(!badged.location_verified);
        let rated = svc.set_rating(&admin(), &listing.id, Some(4.5)).await.unwrap();
        assert_eq!(rated.rating, Some(4.5));

        assert!(svc.set_rating(&admin(), &listing.id, Some(7.0)).await.is_err());
        assert!(svc.set_featured(&owner(), &listing.id, false).await.is_err());
    }

    #[tokio::test]
    async fn owner_can_delete_own_listing() {
        let svc = service();
        let listing = svc.submit(&owner(), submission("Olaya Bakery", "Riyadh")).await.unwrap();

        assert!(svc.delete(&Capability::owner("stranger"), &listing.id).await.is_err());
        svc.delete(&owner(), &listing.id).await.unwrap();
        assert!(matches!(
            svc.find_by_id(Some(&admin()), &listing.id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn transitions_publish_events() {
        let bus = create_event_bus();
        let svc = ListingService::new(
            Arc::new(InMemoryRepositoryProvider::new()),
            Arc::new(GeoClassifier::default()),
            bus.clone(),
            Duration::from_secs(1),
        );
        let mut subscriber = bus.subscribe();

        let listing = svc.submit(&owner(), submission("Olaya Bakery", "Riyadh")).await.unwrap();
        svc.approve(&admin(), &listing.id).await.unwrap();
        svc.verify_location(&admin(), &listing.id, false).await.unwrap();

        let types: Vec<&str> = subscriber
            .drain()
            .iter()
            .map(|m| m.event.event_type())
            .collect();
        assert_eq!(types, vec!["listing_submitted", "listing_approved", "location_verified"]);
    }

    #[tokio::test]
    async fn concurrent_approvals_succeed_once() {
        let svc = Arc::new(service());
        let listing = svc.submit(&owner(), submission("Olaya Bakery", "Riyadh")).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let svc = svc.clone();
                let id = listing.id;
                tokio::spawn(async move { svc.approve(&admin(), &id).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(DomainError::InvalidState { .. }) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(successes, 1);
    }
}
