//! User membership entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_memberships")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    pub discipline_id: i32,

    pub total_free_classes: i32,
    pub used_free_classes: i32,
    pub remaining_free_classes: i32,

    pub starts_on: DateTimeUtc,
    pub ends_on: DateTimeUtc,

    /// Membership status: Active, Expired, Cancelled
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
