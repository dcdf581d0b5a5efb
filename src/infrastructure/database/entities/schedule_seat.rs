//! Schedule seat claim entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "schedule_seats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub schedule_id: i32,
    pub seat_id: i32,

    /// Claim status: Available, Reserved, Occupied, Completed, Blocked
    pub status: String,

    #[sea_orm(nullable)]
    pub user_id: Option<i32>,

    #[sea_orm(nullable)]
    pub reference: Option<String>,

    /// Entitlement source consumed by the claim: membership or package
    #[sea_orm(nullable)]
    pub consumed_kind: Option<String>,

    #[sea_orm(nullable)]
    pub consumed_source_id: Option<i32>,

    #[sea_orm(nullable)]
    pub reserved_at: Option<DateTimeUtc>,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class_schedule::Entity",
        from = "Column::ScheduleId",
        to = "super::class_schedule::Column::Id"
    )]
    ClassSchedule,
    #[sea_orm(
        belongs_to = "super::seat::Entity",
        from = "Column::SeatId",
        to = "super::seat::Column::Id"
    )]
    Seat,
}

impl Related<super::class_schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassSchedule.def()
    }
}

impl Related<super::seat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seat.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
