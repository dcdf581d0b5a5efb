//! Footwear reservation entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "footwear_reservations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub footwear_id: i32,
    pub schedule_id: i32,
    pub user_id: i32,

    /// Reservation status: Pending, Confirmed, Cancelled, Expired
    pub status: String,

    pub reference: String,

    /// Entitlement source consumed by the booking
    #[sea_orm(nullable)]
    pub consumed_kind: Option<String>,

    #[sea_orm(nullable)]
    pub consumed_source_id: Option<i32>,

    pub expires_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::footwear::Entity",
        from = "Column::FootwearId",
        to = "super::footwear::Column::Id"
    )]
    Footwear,
    #[sea_orm(
        belongs_to = "super::class_schedule::Entity",
        from = "Column::ScheduleId",
        to = "super::class_schedule::Column::Id"
    )]
    ClassSchedule,
}

impl Related<super::footwear::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Footwear.def()
    }
}

impl Related<super::class_schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassSchedule.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
