//! withdrawals entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i64,
    #[sea_orm(column_type = "String(StringLen::N(42))")]
    pub withdrawer: String,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub amount: String,
    pub milestone_marked: bool, // caller asserted the milestone with this withdrawal
    #[sea_orm(column_type = "String(StringLen::N(66))", nullable)]
    pub tx_hash: Option<String>,
    pub block_number: Option<i64>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Project,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
