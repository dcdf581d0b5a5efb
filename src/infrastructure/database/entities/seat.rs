//! Seat entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "seats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub studio_id: i32,

    pub seat_row: i32,
    pub seat_column: i32,

    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::schedule_seat::Entity")]
    ScheduleSeats,
}

impl Related<super::schedule_seat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScheduleSeats.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
