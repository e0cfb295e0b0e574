//! Listing entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Listing row
///
/// `sort_key`, `city_key`, `search_key` and `category_slugs` are derived
/// from the other columns on every write and only exist for filtering and
/// ordering in SQL.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listings")]
pub struct Model {
    /// Hyphenated lowercase UUID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub slug: String,

    pub title: String,

    pub description: Option<String>,

    pub city: String,

    pub address: String,

    /// JSON array of `{slug, name, is_primary}`
    #[sea_orm(column_type = "Text")]
    pub categories_json: String,

    /// `|slug-a|slug-b|`
    pub category_slugs: String,

    pub approved: bool,

    /// Display badge
    pub is_verified: bool,

    pub is_featured: bool,

    pub rating: Option<f32>,

    pub is_global: bool,

    pub location_verified: bool,

    /// "auto", "user_confirmed" or "admin_override"
    pub location_detection_method: String,

    /// "local" or "other"
    pub location_confirmation: Option<String>,

    pub owner: String,

    /// ASCII-lowercased title
    pub sort_key: String,

    /// Trimmed, ASCII-lowercased city
    pub city_key: String,

    /// Lowercased title and description
    #[sea_orm(column_type = "Text")]
    pub search_key: String,

    /// Bumped on every update; compare-and-swap token
    pub revision: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
