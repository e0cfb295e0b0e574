//! Listing categories
//!
//! A listing carries an ordered, non-empty list of categories with exactly
//! one primary entry. `Categories` can only be built through constructors
//! that check this, including when deserialized.

use serde::{Deserialize, Serialize};

use crate::shared::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub is_primary: bool,
}

impl Category {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            is_primary: false,
        }
    }

    pub fn primary(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            is_primary: true,
            ..Self::new(slug, name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Category>", into = "Vec<Category>")]
pub struct Categories(Vec<Category>);

impl Categories {
    /// Validate an arbitrary list: non-empty, unique slugs, exactly one
    /// primary.
    pub fn new(categories: Vec<Category>) -> Result<Self, DomainError> {
        if categories.is_empty() {
            return Err(DomainError::Validation(
                "categories: at least one category is required".to_string(),
            ));
        }

        for (i, category) in categories.iter().enumerate() {
            if category.slug.trim().is_empty() {
                return Err(DomainError::Validation(
                    "categories: slug must not be empty".to_string(),
                ));
            }
            if categories[..i].iter().any(|c| c.slug == category.slug) {
                return Err(DomainError::Validation(format!(
                    "categories: duplicate slug '{}'",
                    category.slug
                )));
            }
        }

        match categories.iter().filter(|c| c.is_primary).count() {
            1 => Ok(Self(categories)),
            0 => Err(DomainError::Validation(
                "categories: exactly one primary category is required, found none".to_string(),
            )),
            n => Err(DomainError::Validation(format!(
                "categories: exactly one primary category is required, found {}",
                n
            ))),
        }
    }

    /// Build from a primary category and secondaries; the `is_primary`
    /// flags of the inputs are overwritten.
    pub fn with_primary(
        mut primary: Category,
        secondary: impl IntoIterator<Item = Category>,
    ) -> Result<Self, DomainError> {
        primary.is_primary = true;
        let mut list = vec![primary];
        list.extend(secondary.into_iter().map(|mut c| {
            c.is_primary = false;
            c
        }));
        Self::new(list)
    }

    pub fn primary(&self) -> &Category {
        // Constructors guarantee exactly one primary entry.
        self.0
            .iter()
            .find(|c| c.is_primary)
            .unwrap_or(&self.0[0])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Category> {
        self.0.iter()
    }

    pub fn contains_slug(&self, slug: &str) -> bool {
        self.0.iter().any(|c| c.slug == slug)
    }

    pub fn as_slice(&self) -> &[Category] {
        &self.0
    }
}

impl TryFrom<Vec<Category>> for Categories {
    type Error = DomainError;

    fn try_from(value: Vec<Category>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Categories> for Vec<Category> {
    fn from(value: Categories) -> Self {
        value.0
    }
}

impl<'a> IntoIterator for &'a Categories {
    type Item = &'a Category;
    type IntoIter = std::slice::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_at_least_one() {
        assert!(Categories::new(vec![]).is_err());
    }

    #[test]
    fn requires_exactly_one_primary() {
        let none = Categories::new(vec![Category::new("cafe", "Cafe")]);
        assert!(none.is_err());

        let two = Categories::new(vec![
            Category::primary("cafe", "Cafe"),
            Category::primary("bakery", "Bakery"),
        ]);
        assert!(two.is_err());

        let one = Categories::new(vec![
            Category::new("bakery", "Bakery"),
            Category::primary("cafe", "Cafe"),
        ])
        .unwrap();
        assert_eq!(one.primary().slug, "cafe");
    }

    #[test]
    fn rejects_duplicate_slugs() {
        let err = Categories::new(vec![
            Category::primary("cafe", "Cafe"),
            Category::new("cafe", "Coffee"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate slug"));
    }

    #[test]
    fn with_primary_resets_flags() {
        let cats = Categories::with_primary(
            Category::new("restaurant", "Restaurant"),
            vec![Category::primary("grill", "Grill")],
        )
        .unwrap();
        assert_eq!(cats.primary().slug, "restaurant");
        assert_eq!(cats.iter().filter(|c| c.is_primary).count(), 1);
    }

    #[test]
    fn deserialization_enforces_invariant() {
        let bad = r#"[{"slug":"cafe","name":"Cafe"}]"#;
        assert!(serde_json::from_str::<Categories>(bad).is_err());

        let good = r#"[{"slug":"cafe","name":"Cafe","is_primary":true}]"#;
        let cats: Categories = serde_json::from_str(good).unwrap();
        assert!(cats.contains_slug("cafe"));
    }
}
