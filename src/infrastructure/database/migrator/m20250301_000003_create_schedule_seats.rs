//! Create schedule_seats table
//!
//! Claim rows binding a seat to one schedule occurrence. The unique
//! (schedule_id, seat_id) index backstops the transactional re-check
//! against double claims.

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_class_schedules::ClassSchedules;
use super::m20250301_000002_create_seats::Seats;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ScheduleSeats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScheduleSeats::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ScheduleSeats::ScheduleId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ScheduleSeats::SeatId).integer().not_null())
                    .col(
                        ColumnDef::new(ScheduleSeats::Status)
                            .string()
                            .not_null()
                            .default("Available"),
                    )
                    .col(ColumnDef::new(ScheduleSeats::UserId).integer())
                    .col(ColumnDef::new(ScheduleSeats::Reference).string())
                    .col(ColumnDef::new(ScheduleSeats::ConsumedKind).string())
                    .col(ColumnDef::new(ScheduleSeats::ConsumedSourceId).integer())
                    .col(ColumnDef::new(ScheduleSeats::ReservedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ScheduleSeats::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedule_seats_schedule")
                            .from(ScheduleSeats::Table, ScheduleSeats::ScheduleId)
                            .to(ClassSchedules::Table, ClassSchedules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedule_seats_seat")
                            .from(ScheduleSeats::Table, ScheduleSeats::SeatId)
                            .to(Seats::Table, Seats::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_schedule_seats_schedule_seat")
                    .table(ScheduleSeats::Table)
                    .col(ScheduleSeats::ScheduleId)
                    .col(ScheduleSeats::SeatId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_schedule_seats_user")
                    .table(ScheduleSeats::Table)
                    .col(ScheduleSeats::ScheduleId)
                    .col(ScheduleSeats::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_schedule_seats_status")
                    .table(ScheduleSeats::Table)
                    .col(ScheduleSeats::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScheduleSeats::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ScheduleSeats {
    Table,
    Id,
    ScheduleId,
    SeatId,
    Status,
    UserId,
    Reference,
    ConsumedKind,
    ConsumedSourceId,
    ReservedAt,
    UpdatedAt,
}
