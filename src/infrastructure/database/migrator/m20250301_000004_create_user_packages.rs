//! Create user_packages table
//!
//! Purchased class-credit bundles with expiry tracking.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserPackages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserPackages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserPackages::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(UserPackages::DisciplineId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserPackages::TotalClasses)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserPackages::UsedClasses)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserPackages::RemainingClasses)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserPackages::ExpiryDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserPackages::Status)
                            .string()
                            .not_null()
                            .default("Active"),
                    )
                    .col(
                        ColumnDef::new(UserPackages::PurchasedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_packages_user_discipline")
                    .table(UserPackages::Table)
                    .col(UserPackages::UserId)
                    .col(UserPackages::DisciplineId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_packages_status")
                    .table(UserPackages::Table)
                    .col(UserPackages::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserPackages::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum UserPackages {
    Table,
    Id,
    UserId,
    DisciplineId,
    TotalClasses,
    UsedClasses,
    RemainingClasses,
    ExpiryDate,
    Status,
    PurchasedAt,
}
