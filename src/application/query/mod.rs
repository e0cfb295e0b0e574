pub mod engine;
pub mod sitemap;

pub use engine::{Facets, QueryEngine};
pub use sitemap::{listing_url, render_sitemap};
