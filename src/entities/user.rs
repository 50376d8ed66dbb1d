//! User entity - A staff login account.
//!
//! Passwords are stored and compared in clear text. This is a known gap carried
//! over from the system being replaced, not a design feature.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "USER")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name
    pub username: String,
    /// Clear-text password
    pub password: String,
    /// Profile carrying the display name and role
    pub profile_id: i64,
    /// Dentist this account is linked to, if any
    pub dentist_id: Option<i64>,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each account has one profile
    #[sea_orm(
        belongs_to = "super::user_profile::Entity",
        from = "Column::ProfileId",
        to = "super::user_profile::Column::Id"
    )]
    Profile,
    /// Optional dentist link
    #[sea_orm(
        belongs_to = "super::dentist::Entity",
        from = "Column::DentistId",
        to = "super::dentist::Column::Id"
    )]
    Dentist,
}

impl Related<super::user_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::dentist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dentist.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
