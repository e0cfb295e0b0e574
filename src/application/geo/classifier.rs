//! Geo-classification of submissions
//!
//! Proposes a market context for a city/address pair. The result is advisory:
//! it seeds `is_global` with detection method `Auto` and never marks a
//! location as verified.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::gazetteer::{Gazetteer, GazetteerMatch};
use crate::domain::LocationContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub context: LocationContext,
    pub confidence: Confidence,
    pub needs_confirmation: bool,
    pub reason: String,
}

impl Classification {
    pub fn is_global(&self) -> bool {
        self.context.is_global()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeoClassifier {
    gazetteer: Gazetteer,
}

impl GeoClassifier {
    pub fn new(gazetteer: Gazetteer) -> Self {
        Self { gazetteer }
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    /// City first, address as fallback. Total: an unrecognized location is a
    /// low-confidence `Other` that needs confirmation.
    pub fn classify(&self, city: &str, address: &str) -> Classification {
        let city = city.trim();
        let address = address.trim();

        let (found, source) = match self.gazetteer.match_text(city) {
            GazetteerMatch::NoMatch => (self.gazetteer.match_text(address), "address"),
            found => (found, "city"),
        };

        let classification = match found {
            GazetteerMatch::MatchedLocal(entry) => Classification {
                context: LocationContext::Local,
                confidence: Confidence::High,
                needs_confirmation: false,
                reason: format!("{} matched local locality '{}'", source, entry),
            },
            GazetteerMatch::MatchedGlobal(entry) => Classification {
                context: LocationContext::Other,
                confidence: Confidence::High,
                needs_confirmation: false,
                reason: format!("{} matched foreign locality '{}'", source, entry),
            },
            GazetteerMatch::NoMatch => {
                let value = [city, address]
                    .into_iter()
                    .find(|v| !v.is_empty())
                    .unwrap_or("location");
                Classification {
                    context: LocationContext::Other,
                    confidence: Confidence::Low,
                    needs_confirmation: true,
                    reason: format!("{} not recognized; confirm location", value),
                }
            }
        };

        debug!(
            city,
            context = %classification.context,
            confidence = ?classification.confidence,
            needs_confirmation = classification.needs_confirmation,
            "Location classified"
        );

        classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> GeoClassifier {
        GeoClassifier::default()
    }

    #[test]
    fn local_city() {
        let c = classifier().classify("Riyadh", "");
        assert_eq!(c.context, LocationContext::Local);
        assert_eq!(c.confidence, Confidence::High);
        assert!(!c.needs_confirmation);
    }

    #[test]
    fn foreign_city() {
        let c = classifier().classify("Nairobi", "");
        assert_eq!(c.context, LocationContext::Other);
        assert_eq!(c.confidence, Confidence::High);
        assert!(!c.needs_confirmation);
    }

    #[test]
    fn unknown_city_needs_confirmation() {
        let c = classifier().classify("Naivasha", "");
        assert_eq!(c.context, LocationContext::Other);
        assert_eq!(c.confidence, Confidence::Low);
        assert!(c.needs_confirmation);
        assert_eq!(c.reason, "Naivasha not recognized; confirm location");
    }

    #[test]
    fn exact_local_entries_in_any_case_are_local_high() {
        let c = classifier();
        for entry in c.gazetteer().local_entries().to_vec() {
            for variant in [entry.clone(), entry.to_uppercase()] {
                let result = c.classify(&variant, "");
                assert_eq!(result.context, LocationContext::Local, "{}", variant);
                assert_eq!(result.confidence, Confidence::High);
                assert!(!result.needs_confirmation);
            }
        }
    }

    #[test]
    fn unmatched_strings_are_low_confidence() {
        let c = classifier();
        for city in ["Naivasha", "Springfield", "Atlantis", "", "Bangkok"] {
            let result = c.classify(city, "");
            assert!(result.needs_confirmation, "{}", city);
            assert_eq!(result.confidence, Confidence::Low);
        }
    }

    #[test]
    fn address_fallback_match_is_high() {
        let c = classifier().classify("Olaya", "King Fahd Road, Riyadh");
        assert_eq!(c.context, LocationContext::Local);
        assert_eq!(c.confidence, Confidence::High);
        assert!(!c.needs_confirmation);
        assert!(c.reason.starts_with("address"));
    }

    #[test]
    fn address_only_submission_is_high() {
        let c = classifier().classify("", "Sheikh Zayed Road, Dubai");
        assert_eq!(c.context, LocationContext::Other);
        assert_eq!(c.confidence, Confidence::High);
    }

    #[test]
    fn city_match_is_not_overridden_by_address() {
        let c = classifier().classify("Nairobi", "Riyadh Street");
        assert_eq!(c.context, LocationContext::Other);
    }

    #[test]
    fn blank_input_reason() {
        let c = classifier().classify("  ", "");
        assert_eq!(c.reason, "location not recognized; confirm location");
    }
}
