//! Customer entity - A patient who books appointments.
//!
//! Customers are de-duplicated by (`first_name`, `last_name`) only; no stronger
//! identity such as phone or email is enforced.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "CUSTOMER")]
pub struct Model {
    /// Unique identifier for the customer
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Given name, half of the de-duplication key
    pub first_name: String,
    /// Middle name
    pub middle_name: String,
    /// Family name, half of the de-duplication key
    pub last_name: String,
    /// Free-form gender label, optional
    pub gender: Option<String>,
    /// Postal address
    pub address: String,
    /// Contact phone number
    pub phone: String,
    /// Contact email address
    pub email: String,
    /// Date of birth
    pub birth_date: Date,
}

/// Defines relationships between Customer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One customer has many appointments
    #[sea_orm(has_many = "super::appointment::Entity")]
    Appointments,
}

impl Related<super::appointment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appointments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
