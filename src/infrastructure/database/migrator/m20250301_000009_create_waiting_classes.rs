//! Create waiting_classes table
//!
//! One queue entry per (schedule, user); the unique index makes the
//! join idempotent under races.

use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_class_schedules::ClassSchedules;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WaitingClasses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WaitingClasses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WaitingClasses::ScheduleId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WaitingClasses::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(WaitingClasses::Status)
                            .string()
                            .not_null()
                            .default("Waiting"),
                    )
                    .col(
                        ColumnDef::new(WaitingClasses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_waiting_classes_schedule")
                            .from(WaitingClasses::Table, WaitingClasses::ScheduleId)
                            .to(ClassSchedules::Table, ClassSchedules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_waiting_classes_schedule_user")
                    .table(WaitingClasses::Table)
                    .col(WaitingClasses::ScheduleId)
                    .col(WaitingClasses::UserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WaitingClasses::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum WaitingClasses {
    Table,
    Id,
    ScheduleId,
    UserId,
    Status,
    CreatedAt,
}
