//! Create listings table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Listings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Listings::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Listings::Slug).string().not_null())
                    .col(ColumnDef::new(Listings::Title).string().not_null())
                    .col(ColumnDef::new(Listings::Description).text())
                    .col(
                        ColumnDef::new(Listings::City)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Listings::Address)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Listings::CategoriesJson).text().not_null())
                    .col(ColumnDef::new(Listings::CategorySlugs).string().not_null())
                    .col(
                        ColumnDef::new(Listings::Approved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Listings::IsVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Listings::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Listings::Rating).float())
                    .col(
                        ColumnDef::new(Listings::IsGlobal)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Listings::LocationVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Listings::LocationDetectionMethod)
                            .string_len(20)
                            .not_null()
                            .default("auto"),
                    )
                    .col(ColumnDef::new(Listings::LocationConfirmation).string_len(10))
                    .col(ColumnDef::new(Listings::Owner).string().not_null())
                    .col(ColumnDef::new(Listings::SortKey).string().not_null())
                    .col(ColumnDef::new(Listings::CityKey).string().not_null())
                    .col(ColumnDef::new(Listings::SearchKey).text().not_null())
                    .col(
                        ColumnDef::new(Listings::Revision)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Listings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Listings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listings_slug")
                    .table(Listings::Table)
                    .col(Listings::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Public queries: market context + approval, then canonical order
        manager
            .create_index(
                Index::create()
                    .name("idx_listings_market")
                    .table(Listings::Table)
                    .col(Listings::IsGlobal)
                    .col(Listings::Approved)
                    .col(Listings::SortKey)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listings_owner")
                    .table(Listings::Table)
                    .col(Listings::Owner)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Listings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Listings {
    Table,
    Id,
    Slug,
    Title,
    Description,
    City,
    Address,
    CategoriesJson,
    CategorySlugs,
    Approved,
    IsVerified,
    IsFeatured,
    Rating,
    IsGlobal,
    LocationVerified,
    LocationDetectionMethod,
    LocationConfirmation,
    Owner,
    SortKey,
    CityKey,
    SearchKey,
    Revision,
    CreatedAt,
    UpdatedAt,
}
