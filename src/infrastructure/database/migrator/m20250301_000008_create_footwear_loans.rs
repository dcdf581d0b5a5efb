//! Create footwear_loans table
//!
//! Checkout records; a NULL return_date marks the unit as still out.

use sea_orm_migration::prelude::*;

use super::m20250301_000006_create_footwear::Footwear;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FootwearLoans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FootwearLoans::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FootwearLoans::FootwearId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FootwearLoans::UserId).integer().not_null())
                    .col(ColumnDef::new(FootwearLoans::ReservationId).integer())
                    .col(
                        ColumnDef::new(FootwearLoans::LoanDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FootwearLoans::ReturnDate).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_footwear_loans_footwear")
                            .from(FootwearLoans::Table, FootwearLoans::FootwearId)
                            .to(Footwear::Table, Footwear::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_footwear_loans_footwear")
                    .table(FootwearLoans::Table)
                    .col(FootwearLoans::FootwearId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_footwear_loans_return_date")
                    .table(FootwearLoans::Table)
                    .col(FootwearLoans::ReturnDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FootwearLoans::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum FootwearLoans {
    Table,
    Id,
    FootwearId,
    UserId,
    ReservationId,
    LoanDate,
    ReturnDate,
}
