//! Service/branch join entity.
//!
//! The storage layer does not enforce uniqueness of (`service_id`, `branch_id`);
//! writers go through the insert-if-absent path and readers de-duplicate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Service/branch link database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "SERVICE_BRANCH")]
pub struct Model {
    /// Surrogate key for the link row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Linked service
    pub service_id: i64,
    /// Linked branch
    pub branch_id: i64,
}

/// Defines relationships between ServiceBranch and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The referenced service
    #[sea_orm(
        belongs_to = "super::service::Entity",
        from = "Column::ServiceId",
        to = "super::service::Column::Id"
    )]
    Service,
    /// The referenced branch
    #[sea_orm(
        belongs_to = "super::branch::Entity",
        from = "Column::BranchId",
        to = "super::branch::Column::Id"
    )]
    Branch,
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl Related<super::branch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branch.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
