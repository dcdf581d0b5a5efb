//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_class_schedules;
mod m20250301_000002_create_seats;
mod m20250301_000003_create_schedule_seats;
mod m20250301_000004_create_user_packages;
mod m20250301_000005_create_user_memberships;
mod m20250301_000006_create_footwear;
mod m20250301_000007_create_footwear_reservations;
mod m20250301_000008_create_footwear_loans;
mod m20250301_000009_create_waiting_classes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_class_schedules::Migration),
            Box::new(m20250301_000002_create_seats::Migration),
            Box::new(m20250301_000003_create_schedule_seats::Migration),
            Box::new(m20250301_000004_create_user_packages::Migration),
            Box::new(m20250301_000005_create_user_memberships::Migration),
            Box::new(m20250301_000006_create_footwear::Migration),
            Box::new(m20250301_000007_create_footwear_reservations::Migration),
            Box::new(m20250301_000008_create_footwear_loans::Migration),
            Box::new(m20250301_000009_create_waiting_classes::Migration),
        ]
    }
}
