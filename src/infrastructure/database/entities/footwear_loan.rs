//! Footwear loan entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "footwear_loans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub footwear_id: i32,
    pub user_id: i32,

    /// Reservation the checkout fulfilled, if any
    #[sea_orm(nullable)]
    pub reservation_id: Option<i32>,

    pub loan_date: DateTimeUtc,

    /// NULL while the unit is still out
    #[sea_orm(nullable)]
    pub return_date: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::footwear::Entity",
        from = "Column::FootwearId",
        to = "super::footwear::Column::Id"
    )]
    Footwear,
}

impl Related<super::footwear::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Footwear.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
