//! Branch entity - A clinic location. Static reference data.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Branch database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "BRANCH")]
pub struct Model {
    /// Unique identifier for the branch
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Location label (e.g., "Main Branch")
    pub location: String,
}

/// Defines relationships between Branch and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Service links available at this branch
    #[sea_orm(has_many = "super::service_branch::Entity")]
    ServiceBranch,
    /// Schedule slots held at this branch
    #[sea_orm(has_many = "super::schedule::Entity")]
    Schedules,
    /// Dentists working at this branch
    #[sea_orm(has_many = "super::dentist::Entity")]
    Dentists,
}

impl Related<super::service_branch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceBranch.def()
    }
}

impl Related<super::schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedules.def()
    }
}

impl Related<super::dentist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dentists.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
