//! Storage-agnostic selection and mutation descriptions
//!
//! `ListingPredicate` and `ListingPatch` are plain data. Persistence adapters
//! translate them into their own query language; the in-memory adapter
//! evaluates them directly with [`ListingPredicate::matches`] and
//! [`ListingPatch::apply`].

use std::cmp::Ordering;

use chrono::Utc;

use super::{Categories, Listing, LocationContext, LocationDetectionMethod, OwnerId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPredicate {
    /// Required `is_global`, from the market context
    pub is_global: Option<bool>,
    pub approved_only: bool,
    pub owner: Option<OwnerId>,
    /// Case-insensitive equality on the trimmed city
    pub city: Option<String>,
    /// Any category slug of the listing
    pub sub_category: Option<String>,
    /// `rating >= min_rating`; unrated listings never match
    pub min_rating: Option<u8>,
    pub featured_only: bool,
    pub verified_only: bool,
    /// Case-insensitive substring of title or description
    pub search_text: Option<String>,
}

impl ListingPredicate {
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(is_global) = self.is_global {
            if listing.is_global != is_global {
                return false;
            }
        }
        if self.approved_only && !listing.approved {
            return false;
        }
        if let Some(ref owner) = self.owner {
            if !listing.is_owned_by(owner) {
                return false;
            }
        }
        if let Some(ref city) = self.city {
            if Listing::city_key(&listing.city) != Listing::city_key(city) {
                return false;
            }
        }
        if let Some(ref slug) = self.sub_category {
            if !listing.categories.contains_slug(slug) {
                return false;
            }
        }
        if let Some(tier) = self.min_rating {
            match listing.rating {
                Some(rating) if rating >= tier as f32 => {}
                _ => return false,
            }
        }
        if self.featured_only && !listing.is_featured {
            return false;
        }
        if self.verified_only && !listing.is_verified {
            return false;
        }
        if let Some(ref needle) = self.search_text {
            let needle = needle.to_lowercase();
            let in_title = listing.title.to_lowercase().contains(&needle);
            let in_description = listing
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }
}

/// Order every adapter must return from `list`: title ascending
/// (ASCII case-insensitive), ties by id ascending.
pub fn canonical_order(a: &Listing, b: &Listing) -> Ordering {
    a.title
        .to_ascii_lowercase()
        .cmp(&b.title.to_ascii_lowercase())
        .then_with(|| a.id.cmp(&b.id))
}

/// Preconditions checked atomically together with a patch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchGuard {
    pub approved: Option<bool>,
    pub location_verified: Option<bool>,
}

impl PatchGuard {
    /// `Err(reason)` when the listing does not satisfy the guard
    pub fn check(&self, listing: &Listing) -> Result<(), String> {
        if let Some(expected) = self.approved {
            if listing.approved != expected {
                return Err(format!("expected approved={}", expected));
            }
        }
        if let Some(expected) = self.location_verified {
            if listing.location_verified != expected {
                return Err(format!("expected location_verified={}", expected));
            }
        }
        Ok(())
    }
}

/// A whole-record update. Fields left `None` are untouched; every set field
/// is written in one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPatch {
    pub guard: PatchGuard,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub categories: Option<Categories>,
    pub approved: Option<bool>,
    pub is_verified: Option<bool>,
    pub is_featured: Option<bool>,
    pub rating: Option<Option<f32>>,
    pub is_global: Option<bool>,
    pub location_verified: Option<bool>,
    pub location_detection_method: Option<LocationDetectionMethod>,
    pub location_confirmation: Option<Option<LocationContext>>,
}

impl ListingPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_approved(mut self, approved: bool) -> Self {
        self.guard.approved = Some(approved);
        self
    }

    pub fn expect_location_verified(mut self, verified: bool) -> Self {
        self.guard.location_verified = Some(verified);
        self
    }

    /// Apply set fields and bump `updated_at`.
    pub fn apply(self, listing: &mut Listing) {
        if let Some(v) = self.title {
            listing.title = v;
        }
        if let Some(v) = self.description {
            listing.description = v;
        }
        if let Some(v) = self.city {
            listing.city = v;
        }
        if let Some(v) = self.address {
            listing.address = v;
        }
        if let Some(v) = self.categories {
            listing.categories = v;
        }
        if let Some(v) = self.approved {
            listing.approved = v;
        }
        if let Some(v) = self.is_verified {
            listing.is_verified = v;
        }
        if let Some(v) = self.is_featured {
            listing.is_featured = v;
        }
        if let Some(v) = self.rating {
            listing.rating = v;
        }
        if let Some(v) = self.is_global {
            listing.is_global = v;
        }
        if let Some(v) = self.location_verified {
            listing.location_verified = v;
        }
        if let Some(v) = self.location_detection_method {
            listing.location_detection_method = v;
        }
        if let Some(v) = self.location_confirmation {
            listing.location_confirmation = v;
        }
        listing.updated_at = Utc::now();
    }
}
