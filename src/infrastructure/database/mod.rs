pub mod entities;
pub mod migrator;
pub mod repositories;

pub use repositories::{SeaOrmListingRepository, SeaOrmRepositoryProvider};

use sea_orm::{Database, DatabaseConnection};
use tracing::info;

use migrator::{Migrator, MigratorTrait};

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./listings.db?mode=rwc")
    pub url: String,
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!("Connecting to database: {}", config.url);
    let db = Database::connect(&config.url).await?;
    info!("Database connected successfully");
    Ok(db)
}

/// Connect and apply pending migrations
pub async fn init_and_migrate(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    let db = init_database(config).await?;
    Migrator::up(&db, None).await?;
    info!("Database migrations applied");
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_apply_twice() {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
        };
        let db = init_and_migrate(&config).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
    }
}
