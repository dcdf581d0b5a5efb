//! Footwear unit entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "footwear")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Inventory tag printed on the unit
    #[sea_orm(unique)]
    pub code: String,

    /// EU shoe size
    pub size: i32,

    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::footwear_reservation::Entity")]
    Reservations,
    #[sea_orm(has_many = "super::footwear_loan::Entity")]
    Loans,
}

impl Related<super::footwear_reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl Related<super::footwear_loan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
