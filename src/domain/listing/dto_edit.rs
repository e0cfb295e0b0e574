use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Categories, LocationContext};

/// Owner edit. `None` leaves a field unchanged; an empty description clears it.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct EditListingDto {
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 120, message = "must be at most 120 characters"))]
    pub city: Option<String>,
    #[validate(length(max = 300, message = "must be at most 300 characters"))]
    pub address: Option<String>,
    pub categories: Option<Categories>,
    pub location_confirmation: Option<LocationContext>,
}

impl EditListingDto {
    pub fn normalized(mut self) -> Self {
        self.title = self.title.map(|t| t.trim().to_string());
        self.city = self.city.map(|c| c.trim().to_string());
        self.address = self.address.map(|a| a.trim().to_string());
        self.description = self.description.map(|d| d.trim().to_string());
        self
    }
}
