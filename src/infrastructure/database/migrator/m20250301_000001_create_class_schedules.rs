//! Create class_schedules table
//!
//! One row per class occurrence with capacity and lifecycle status.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClassSchedules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassSchedules::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClassSchedules::DisciplineId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassSchedules::StudioId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClassSchedules::InstructorId).integer())
                    .col(
                        ColumnDef::new(ClassSchedules::StartsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassSchedules::EndsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassSchedules::MaxCapacity)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassSchedules::Status)
                            .string()
                            .not_null()
                            .default("Scheduled"),
                    )
                    .col(
                        ColumnDef::new(ClassSchedules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_class_schedules_discipline")
                    .table(ClassSchedules::Table)
                    .col(ClassSchedules::DisciplineId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_class_schedules_starts_at")
                    .table(ClassSchedules::Table)
                    .col(ClassSchedules::StartsAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_class_schedules_status")
                    .table(ClassSchedules::Table)
                    .col(ClassSchedules::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClassSchedules::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ClassSchedules {
    Table,
    Id,
    DisciplineId,
    StudioId,
    InstructorId,
    StartsAt,
    EndsAt,
    MaxCapacity,
    Status,
    CreatedAt,
}
