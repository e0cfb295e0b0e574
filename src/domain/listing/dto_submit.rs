use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Categories, LocationContext};

/// Submission payload
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SubmitListingDto {
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    #[serde(default)]
    pub description: Option<String>,
    #[validate(length(max = 120, message = "must be at most 120 characters"))]
    #[serde(default)]
    pub city: String,
    #[validate(length(max = 300, message = "must be at most 300 characters"))]
    #[serde(default)]
    pub address: String,
    pub categories: Categories,
    /// Required when classification of city/address needs confirmation
    #[serde(default)]
    pub location_confirmation: Option<LocationContext>,
}

impl SubmitListingDto {
    /// Trim free text; a blank description becomes `None`.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.city = self.city.trim().to_string();
        self.address = self.address.trim().to_string();
        self.description = crate::shared::normalize_text(self.description.as_deref());
        self
    }
}
