//! Schedule entity - A bookable (branch, date-time) slot.
//!
//! A slot starts `Active` and becomes `Inactive` once an appointment consumes it.
//! Nothing moves it back automatically; only an admin re-upsert reactivates it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Availability of a schedule slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum SlotStatus {
    /// Open for booking
    #[sea_orm(string_value = "Active")]
    Active,
    /// Consumed by an appointment
    #[sea_orm(string_value = "Inactive")]
    Inactive,
}

/// Schedule slot database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "SCHEDULE")]
pub struct Model {
    /// Unique identifier for the slot
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Slot number within the branch; (`branch_id`, `slot_number`) is unique
    pub slot_number: i32,
    /// Canonical slot start, stored as `YYYY-MM-DD HH:MM:SS`
    pub date_time: DateTime,
    /// Branch holding the slot
    pub branch_id: i64,
    /// Whether the slot can still be booked
    pub status: SlotStatus,
}

/// Defines relationships between Schedule and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each slot belongs to one branch
    #[sea_orm(
        belongs_to = "super::branch::Entity",
        from = "Column::BranchId",
        to = "super::branch::Column::Id"
    )]
    Branch,
    /// Appointments made against this slot
    #[sea_orm(has_many = "super::appointment::Entity")]
    Appointments,
}

impl Related<super::branch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branch.def()
    }
}

impl Related<super::appointment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appointments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
