//! Customer booking flow.
//!
//! The booking flow spans several requests: pick a service, pick a branch, pick a
//! slot, enter personal details, confirm. [`BookingSession`] carries those choices
//! between steps. It is owned by the caller (for instance stored in an HTTP session)
//! and passed back in on every step; nothing here keeps state of its own.

use crate::{
    core::{
        appointment::{
            AppointmentKey, create_or_update_appointment, find_slot_holder, get_appointment,
        },
        customer::{CustomerDetails, ResolvedCustomer, resolve_or_create_customer},
        directory::require_branch,
        schedule::retire_slot,
        service::get_service,
    },
    entities::{ApprovalStatus, Schedule, SlotStatus, branch, customer, schedule, service},
    errors::{Error, Result},
};
use chrono::NaiveDateTime;
use sea_orm::{TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Choices made so far in one customer's booking flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingSession {
    /// Chosen service
    pub service: Option<service::Model>,
    /// Chosen branch
    pub branch: Option<branch::Model>,
    /// Chosen slot, always at the chosen branch
    pub slot: Option<schedule::Model>,
    /// Identified customer
    pub customer: Option<customer::Model>,
}

/// What the customer sees after a successful booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingConfirmation {
    /// Id of the written appointment
    pub appointment_id: i64,
    /// Booked service
    pub service_name: String,
    /// Branch location label
    pub branch_location: String,
    /// Start of the booked slot
    pub slot_date_time: NaiveDateTime,
    /// Customer first and last name
    pub customer_name: String,
    /// Teeth to extract, as submitted
    pub tooth_count: Option<i32>,
    /// Price fixed for this booking
    pub total_price: f64,
    /// Approval state; `Pending` for a new booking
    pub approval_status: ApprovalStatus,
}

impl BookingSession {
    /// Starts an empty booking flow.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the chosen service.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if the service does not exist.
    pub async fn select_service(
        &mut self,
        db: &DatabaseConnection,
        service_id: i64,
    ) -> Result<&service::Model> {
        let service = get_service(db, service_id)
            .await?
            .ok_or_else(|| Error::not_found("Service", service_id))?;
        Ok(&*self.service.insert(service))
    }

    /// Records the chosen branch. Switching to another branch drops the chosen slot.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if the branch does not exist.
    pub async fn select_branch(
        &mut self,
        db: &DatabaseConnection,
        branch_id: i64,
    ) -> Result<&branch::Model> {
        let branch = require_branch(db, branch_id).await?;
        if self
            .slot
            .as_ref()
            .is_some_and(|slot| slot.branch_id != branch.id)
        {
            self.slot = None;
        }
        Ok(&*self.branch.insert(branch))
    }

    /// Records the chosen slot, which must belong to the chosen branch.
    ///
    /// Availability is checked when the booking is confirmed, so a customer can
    /// resubmit a booking whose slot they already hold.
    ///
    /// # Errors
    /// - [`Error::InvalidInput`] if no branch is chosen yet or the slot is at another branch
    /// - [`Error::NotFound`] if the slot does not exist
    pub async fn select_slot(
        &mut self,
        db: &DatabaseConnection,
        slot_id: i64,
    ) -> Result<&schedule::Model> {
        let branch_id = self
            .branch
            .as_ref()
            .map(|branch| branch.id)
            .ok_or_else(|| Error::invalid("branch", "choose a branch before a schedule"))?;

        let slot = Schedule::find_by_id(slot_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::not_found("Schedule slot", slot_id))?;
        if slot.branch_id != branch_id {
            return Err(Error::invalid(
                "slot",
                format!("slot {slot_id} is not held at branch {branch_id}"),
            ));
        }
        Ok(&*self.slot.insert(slot))
    }

    /// Resolves the customer from the submitted details and records it.
    pub async fn identify_customer(
        &mut self,
        db: &DatabaseConnection,
        details: &CustomerDetails,
    ) -> Result<ResolvedCustomer> {
        let resolved = resolve_or_create_customer(db, details).await?;
        self.customer = Some(resolved.customer.clone());
        Ok(resolved)
    }

    /// Replaces the recorded customer, e.g. after the customer edited their details.
    pub fn set_customer(&mut self, customer: customer::Model) {
        self.customer = Some(customer);
    }

    /// The booking key, once every step has been completed.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] naming the first missing step.
    pub fn key(&self) -> Result<AppointmentKey> {
        let service = self
            .service
            .as_ref()
            .ok_or_else(|| Error::invalid("service", "no service chosen"))?;
        let branch = self
            .branch
            .as_ref()
            .ok_or_else(|| Error::invalid("branch", "no branch chosen"))?;
        let slot = self
            .slot
            .as_ref()
            .ok_or_else(|| Error::invalid("slot", "no schedule chosen"))?;
        let customer = self
            .customer
            .as_ref()
            .ok_or_else(|| Error::invalid("customer", "no customer details entered"))?;

        Ok(AppointmentKey {
            service_id: service.id,
            branch_id: branch.id,
            slot_id: slot.id,
            customer_id: customer.id,
        })
    }
}

/// Confirms the booking held in `session`.
///
/// Writes the appointment (or refreshes the one with the same key) and retires the
/// slot, both in one transaction. A slot that is already retired can only be booked
/// again under the key of its current holder, the appointment that claimed it last.
///
/// # Errors
/// - [`Error::InvalidInput`] if a step of the flow is missing or the tooth count is negative
/// - [`Error::NotFound`] if the slot or service disappeared since it was chosen
/// - [`Error::SlotUnavailable`] if the slot was consumed by another booking
/// - [`Error::Inconsistent`] if the written appointment cannot be read back
#[instrument(skip(db, session))]
pub async fn book_appointment(
    db: &DatabaseConnection,
    session: &BookingSession,
    tooth_count: Option<i32>,
) -> Result<BookingConfirmation> {
    let key = session.key()?;
    let txn = db.begin().await?;

    let slot = Schedule::find_by_id(key.slot_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Schedule slot", key.slot_id))?;
    if slot.status == SlotStatus::Inactive {
        let holder = find_slot_holder(&txn, slot.id).await?;
        if holder.is_none_or(|held| AppointmentKey::from(&held) != key) {
            warn!(slot_id = slot.id, "Slot already consumed by another booking");
            return Err(Error::SlotUnavailable { slot_id: slot.id });
        }
    }

    let appointment_id = create_or_update_appointment(&txn, key, tooth_count).await?;
    retire_slot(&txn, slot.id).await?;

    let appointment = get_appointment(&txn, appointment_id)
        .await?
        .ok_or_else(|| Error::Inconsistent {
            message: format!("appointment {appointment_id} was written but cannot be read back"),
        })?;
    let service = get_service(&txn, key.service_id)
        .await?
        .ok_or_else(|| Error::not_found("Service", key.service_id))?;
    let branch = require_branch(&txn, key.branch_id).await?;

    txn.commit().await?;

    let customer_name = session
        .customer
        .as_ref()
        .map(|c| format!("{} {}", c.first_name, c.last_name))
        .unwrap_or_default();

    info!(appointment_id, slot_id = slot.id, "Booking confirmed");
    Ok(BookingConfirmation {
        appointment_id,
        service_name: service.name,
        branch_location: branch.location,
        slot_date_time: slot.date_time,
        customer_name,
        tooth_count: appointment.tooth_count,
        total_price: appointment.total_price,
        approval_status: appointment.approval_status,
    })
}
