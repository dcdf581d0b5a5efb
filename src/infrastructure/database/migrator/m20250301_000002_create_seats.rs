//! Create seats table
//!
//! Static studio seat positions.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Seats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Seats::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Seats::StudioId).integer().not_null())
                    .col(ColumnDef::new(Seats::SeatRow).integer().not_null())
                    .col(ColumnDef::new(Seats::SeatColumn).integer().not_null())
                    .col(
                        ColumnDef::new(Seats::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_seats_studio")
                    .table(Seats::Table)
                    .col(Seats::StudioId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Seats::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Seats {
    Table,
    Id,
    StudioId,
    SeatRow,
    SeatColumn,
    IsActive,
}
