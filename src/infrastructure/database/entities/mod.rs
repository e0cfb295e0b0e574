//! Database entities module

pub mod listing;

pub use listing::Entity as Listing;
