//! Create user_memberships table
//!
//! Recurring entitlements with a free-class allowance per period.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserMemberships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserMemberships::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserMemberships::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(UserMemberships::DisciplineId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserMemberships::TotalFreeClasses)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserMemberships::UsedFreeClasses)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserMemberships::RemainingFreeClasses)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserMemberships::StartsOn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserMemberships::EndsOn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserMemberships::Status)
                            .string()
                            .not_null()
                            .default("Active"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_memberships_user_discipline")
                    .table(UserMemberships::Table)
                    .col(UserMemberships::UserId)
                    .col(UserMemberships::DisciplineId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserMemberships::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum UserMemberships {
    Table,
    Id,
    UserId,
    DisciplineId,
    TotalFreeClasses,
    UsedFreeClasses,
    RemainingFreeClasses,
    StartsOn,
    EndsOn,
    Status,
}
