//! # Geo Listings
//!
//! Business listing directory with two market contexts: listings located in
//! the local market and listings abroad ("global").
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Listing aggregate, capabilities, repository traits
//! - **application**: Geo-classification, moderation state machine, bulk
//!   moderation and context-aware queries
//! - **infrastructure**: Persistence (SeaORM/SQLite and in-memory)
//! - **notifications**: In-process lifecycle events
//! - **runtime**: Wiring of all of the above from an [`AppConfig`]

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod notifications;
pub mod runtime;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

// Re-export notifications
pub use notifications::{create_event_bus, Event, EventBus, SharedEventBus};

pub use runtime::ListingsRuntime;
