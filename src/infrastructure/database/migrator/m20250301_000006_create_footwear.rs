//! Create footwear table
//!
//! Rental footwear inventory.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Footwear::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Footwear::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Footwear::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Footwear::Size).integer().not_null())
                    .col(
                        ColumnDef::new(Footwear::IsActive)
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
                    .name("idx_footwear_size")
                    .table(Footwear::Table)
                    .col(Footwear::Size)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Footwear::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Footwear {
    Table,
    Id,
    Code,
    Size,
    IsActive,
}
