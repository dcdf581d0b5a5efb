//! Class schedule entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "class_schedules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub discipline_id: i32,
    pub studio_id: i32,

    #[sea_orm(nullable)]
    pub instructor_id: Option<i32>,

    pub starts_at: DateTimeUtc,
    pub ends_at: DateTimeUtc,

    pub max_capacity: i32,

    /// Schedule status: Scheduled, Completed, Cancelled
    pub status: String,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::schedule_seat::Entity")]
    ScheduleSeats,
    #[sea_orm(has_many = "super::footwear_reservation::Entity")]
    FootwearReservations,
    #[sea_orm(has_many = "super::waiting_class::Entity")]
    WaitingClasses,
}

impl Related<super::schedule_seat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScheduleSeats.def()
    }
}

impl Related<super::footwear_reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FootwearReservations.def()
    }
}

impl Related<super::waiting_class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WaitingClasses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
