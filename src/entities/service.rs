//! Service entity - A bookable clinic service such as cleaning or extraction.
//!
//! The service name is the business key: admin upserts and deletes address a
//! service by name rather than by id.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Service database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "SERVICE")]
pub struct Model {
    /// Unique identifier for the service
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name, unique across services (e.g., "Cleaning")
    #[sea_orm(unique)]
    pub name: String,
    /// Short description shown to customers
    pub description: String,
    /// Unit price; multiplied by the tooth count for extraction services
    pub price: f64,
    /// Reference to the service picture
    pub image_path: String,
}

/// Defines relationships between Service and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Branch links offering this service
    #[sea_orm(has_many = "super::service_branch::Entity")]
    ServiceBranch,
    /// Appointments booked for this service
    #[sea_orm(has_many = "super::appointment::Entity")]
    Appointments,
}

impl Related<super::service_branch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceBranch.def()
    }
}

impl Related<super::appointment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appointments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
