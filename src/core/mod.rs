//! Core business logic for the clinic.
//!
//! Every operation takes a database connection and returns structured data; no
//! function here knows about HTTP, sessions or rendering.

/// Appointments keyed by (service, branch, slot, customer) and their approval
pub mod appointment;
/// Multi-step customer booking flow
pub mod booking;
/// Customer lookup, creation and editing
pub mod customer;
/// Branches, dentists and staff sign-in
pub mod directory;
/// Appointment price rules
pub mod pricing;
/// Read-only dashboard figures
pub mod report;
/// Schedule slots and their Active/Inactive lifecycle
pub mod schedule;
/// Service catalogue and service-branch links
pub mod service;
