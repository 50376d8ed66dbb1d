//! Appointment entity - A booking of one service at one branch slot for one customer.
//!
//! The `total_price` is computed once when the booking is written and never
//! recomputed afterwards. `approval_status` starts `Pending` and is overwritten
//! by staff.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Staff approval state of an appointment
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ApprovalStatus {
    /// Awaiting staff review (initial state)
    #[sea_orm(string_value = "Pending")]
    Pending,
    /// Accepted by staff
    #[sea_orm(string_value = "Approved")]
    Approved,
    /// Rejected by staff
    #[sea_orm(string_value = "Disapproved")]
    Disapproved,
}

impl ApprovalStatus {
    /// Storage label of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Disapproved => "Disapproved",
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Appointment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "APPOINTMENT")]
pub struct Model {
    /// Unique identifier for the appointment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Booked service
    pub service_id: i64,
    /// Branch the service is performed at
    pub branch_id: i64,
    /// Consumed schedule slot
    pub schedule_id: i64,
    /// Customer the appointment is for
    pub customer_id: i64,
    /// Staff account assigned to the appointment, if any
    pub user_id: Option<i64>,
    /// Number of teeth to extract; only meaningful for extraction services
    pub tooth_count: Option<i32>,
    /// Price fixed at booking time
    pub total_price: f64,
    /// When the booking was last submitted
    pub created_at: DateTime,
    /// Staff approval state
    pub approval_status: ApprovalStatus,
}

/// Defines relationships between Appointment and other entities
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
    /// The referenced schedule
    #[sea_orm(
        belongs_to = "super::schedule::Entity",
        from = "Column::ScheduleId",
        to = "super::schedule::Column::Id"
    )]
    Schedule,
    /// The referenced customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    /// Assigned staff account
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
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

impl Related<super::schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedule.def()
    }
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
