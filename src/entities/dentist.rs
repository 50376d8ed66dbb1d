//! Dentist entity - Read-only directory data.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Dentist database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "DENTIST")]
pub struct Model {
    /// Unique identifier for the dentist
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub full_name: String,
    /// Contact email
    pub email: String,
    /// Branch the dentist practises at
    pub branch_id: i64,
}

/// Defines relationships between Dentist and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each dentist works at one branch
    #[sea_orm(
        belongs_to = "super::branch::Entity",
        from = "Column::BranchId",
        to = "super::branch::Column::Id"
    )]
    Branch,
}

impl Related<super::branch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branch.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
