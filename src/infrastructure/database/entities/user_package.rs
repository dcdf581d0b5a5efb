//! User package entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_packages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    pub discipline_id: i32,

    pub total_classes: i32,
    pub used_classes: i32,
    pub remaining_classes: i32,

    pub expiry_date: DateTimeUtc,

    /// Package status: Active, Exhausted, Expired, Cancelled
    pub status: String,

    pub purchased_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
