//! projects entity
//! One row per on-chain project. The id is assigned by the contract, never by the mirror.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    #[sea_orm(column_type = "String(StringLen::N(42))")]
    pub owner: String, // lowercase 0x address
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub funds: String, // wei, decimal string
    pub milestone_reached: bool,
    #[sea_orm(column_type = "String(StringLen::N(66))", nullable)]
    pub tx_hash: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub funding_goal: String, // wei, decimal string
    pub block_number: Option<i64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stakes::Entity")]
    Stakes,
    #[sea_orm(has_many = "super::withdrawals::Entity")]
    Withdrawals,
}

impl Related<super::stakes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stakes.def()
    }
}

impl Related<super::withdrawals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Withdrawals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
