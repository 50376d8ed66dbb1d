//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the clinic tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod appointment;
pub mod branch;
pub mod customer;
pub mod dentist;
pub mod schedule;
pub mod service;
pub mod service_branch;
pub mod user;
pub mod user_profile;

// Re-export specific types to avoid conflicts
pub use appointment::{
    ApprovalStatus, Column as AppointmentColumn, Entity as Appointment,
    Model as AppointmentModel,
};
pub use branch::{Column as BranchColumn, Entity as Branch, Model as BranchModel};
pub use customer::{Column as CustomerColumn, Entity as Customer, Model as CustomerModel};
pub use dentist::{Column as DentistColumn, Entity as Dentist, Model as DentistModel};
pub use schedule::{
    Column as ScheduleColumn, Entity as Schedule, Model as ScheduleModel, SlotStatus,
};
pub use service::{Column as ServiceColumn, Entity as Service, Model as ServiceModel};
pub use service_branch::{
    Column as ServiceBranchColumn, Entity as ServiceBranch, Model as ServiceBranchModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use user_profile::{
    Column as UserProfileColumn, Entity as UserProfile, Model as UserProfileModel,
};
