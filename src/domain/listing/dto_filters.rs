use serde::{Deserialize, Serialize};

use super::{ListingPredicate, MarketContext, OwnerId};
use crate::domain::DomainResult;
use crate::shared::{normalize_text, parse_bool_param, parse_u8_param, DomainError};

/// Query filters. All set filters must hold (AND).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListingFilters {
    pub sub_category: Option<String>,
    pub city: Option<String>,
    /// 1 to 5: minimum average rating
    pub rating_tier: Option<u8>,
    #[serde(default)]
    pub featured_only: bool,
    #[serde(default)]
    pub verified_only: bool,
    pub search_text: Option<String>,
    pub owner: Option<OwnerId>,
}

impl ListingFilters {
    /// Parse loosely-typed key/value parameters (query strings, form posts).
    /// Unknown keys are ignored; malformed values are rejected.
    pub fn from_params<I, K, V>(params: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filters = Self::default();

        for (key, value) in params {
            let key = key.as_ref();
            let value = value.as_ref();
            match key {
                "sub_category" | "subCategory" | "category" => {
                    filters.sub_category = normalize_text(Some(value));
                }
                "city" => filters.city = normalize_text(Some(value)),
                "rating_tier" | "ratingTier" | "rating" => {
                    filters.rating_tier = parse_u8_param(key, value)?;
                }
                "featured_only" | "featuredOnly" | "featured" => {
                    filters.featured_only = parse_bool_param(key, value)?.unwrap_or(false);
                }
                "verified_only" | "verifiedOnly" | "verified" => {
                    filters.verified_only = parse_bool_param(key, value)?.unwrap_or(false);
                }
                "search" | "q" | "search_text" | "searchText" => {
                    filters.search_text = normalize_text(Some(value));
                }
                "owner" => filters.owner = normalize_text(Some(value)).map(OwnerId::new),
                _ => {}
            }
        }

        filters.validate()?;
        Ok(filters)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if let Some(tier) = self.rating_tier {
            if !(1..=5).contains(&tier) {
                return Err(DomainError::Validation(format!(
                    "rating_tier: must be between 1 and 5, got {}",
                    tier
                )));
            }
        }
        Ok(())
    }

    /// Combine with the market context and eligibility flag.
    pub fn to_predicate(&self, market: MarketContext, include_unapproved: bool) -> ListingPredicate {
        ListingPredicate {
            is_global: market.is_global_constraint(),
            approved_only: !include_unapproved,
            owner: self.owner.clone(),
            city: normalize_text(self.city.as_deref()),
            sub_category: normalize_text(self.sub_category.as_deref()),
            min_rating: self.rating_tier,
            featured_only: self.featured_only,
            verified_only: self.verified_only,
            search_text: normalize_text(self.search_text.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_are_ignored() {
        let filters = ListingFilters::from_params([
            ("city", "Jeddah"),
            ("utm_source", "newsletter"),
            ("sort", "random"),
        ])
        .unwrap();
        assert_eq!(filters.city.as_deref(), Some("Jeddah"));
        assert_eq!(filters.sub_category, None);
    }

    #[test]
    fn camel_case_aliases() {
        let filters = ListingFilters::from_params([
            ("subCategory", "cafe"),
            ("featuredOnly", "true"),
            ("ratingTier", "4"),
            ("q", "  shawarma "),
        ])
        .unwrap();
        assert_eq!(filters.sub_category.as_deref(), Some("cafe"));
        assert!(filters.featured_only);
        assert_eq!(filters.rating_tier, Some(4));
        assert_eq!(filters.search_text.as_deref(), Some("shawarma"));
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(ListingFilters::from_params([("rating_tier", "high")]).is_err());
        assert!(ListingFilters::from_params([("rating_tier", "9")]).is_err());
        assert!(ListingFilters::from_params([("verified_only", "sometimes")]).is_err());
    }

    #[test]
    fn predicate_reflects_market_and_eligibility() {
        let filters = ListingFilters {
            city: Some(" Riyadh ".into()),
            search_text: Some("   ".into()),
            ..Default::default()
        };
        let predicate = filters.to_predicate(MarketContext::Local, false);
        assert_eq!(predicate.is_global, Some(false));
        assert!(predicate.approved_only);
        assert_eq!(predicate.city.as_deref(), Some("Riyadh"));
        assert_eq!(predicate.search_text, None);

        let admin_view = filters.to_predicate(MarketContext::All, true);
        assert_eq!(admin_view.is_global, None);
        assert!(!admin_view.approved_only);
    }
}
