//! Create footwear_reservations table
//!
//! Per-schedule unit reservations with expiry tracking.

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_class_schedules::ClassSchedules;
use super::m20250301_000006_create_footwear::Footwear;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FootwearReservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FootwearReservations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FootwearReservations::FootwearId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FootwearReservations::ScheduleId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FootwearReservations::UserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FootwearReservations::Status)
                            .string()
                            .not_null()
                            .default("Pending"),
                    )
                    .col(
                        ColumnDef::new(FootwearReservations::Reference)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FootwearReservations::ConsumedKind).string())
                    .col(ColumnDef::new(FootwearReservations::ConsumedSourceId).integer())
                    .col(
                        ColumnDef::new(FootwearReservations::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FootwearReservations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_footwear_reservations_footwear")
                            .from(
                                FootwearReservations::Table,
                                FootwearReservations::FootwearId,
                            )
                            .to(Footwear::Table, Footwear::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_footwear_reservations_schedule")
                            .from(
                                FootwearReservations::Table,
                                FootwearReservations::ScheduleId,
                            )
                            .to(ClassSchedules::Table, ClassSchedules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_footwear_reservations_schedule_status")
                    .table(FootwearReservations::Table)
                    .col(FootwearReservations::ScheduleId)
                    .col(FootwearReservations::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_footwear_reservations_footwear")
                    .table(FootwearReservations::Table)
                    .col(FootwearReservations::FootwearId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_footwear_reservations_expires")
                    .table(FootwearReservations::Table)
                    .col(FootwearReservations::ExpiresAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FootwearReservations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum FootwearReservations {
    Table,
    Id,
    FootwearId,
    ScheduleId,
    UserId,
    Status,
    Reference,
    ConsumedKind,
    ConsumedSourceId,
    ExpiresAt,
    CreatedAt,
}
