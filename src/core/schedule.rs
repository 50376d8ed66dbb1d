//! Schedule slot business logic.
//!
//! Slots are identified by their business key (`branch_id`, `date_time`) for admin
//! upserts, and by id everywhere else. Consuming a slot retires it; nothing in this
//! module reactivates a retired slot except an explicit upsert.

use crate::{
    core::directory::require_branch,
    entities::{Branch, Schedule, SlotStatus, schedule},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Canonical storage pattern of a slot date-time.
pub const SLOT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accepted input patterns, tried in order. The `T` forms come from HTML
/// `datetime-local` inputs.
const ACCEPTED_DATETIME_FORMATS: [&str; 4] = [
    SLOT_DATETIME_FORMAT,
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parses a slot date-time from form input.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS]`, `YYYY-MM-DDTHH:MM[:SS]` and a bare
/// `YYYY-MM-DD` (midnight).
///
/// # Errors
/// Returns [`Error::InvalidInput`] for anything else.
pub fn parse_slot_datetime(input: &str) -> Result<NaiveDateTime> {
    let trimmed = input.trim();
    for format in ACCEPTED_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| Error::invalid("date_time", format!("unrecognised date-time {input:?}")))
}

/// Formats a slot date-time in its canonical storage pattern.
#[must_use]
pub fn format_slot_datetime(date_time: &NaiveDateTime) -> String {
    date_time.format(SLOT_DATETIME_FORMAT).to_string()
}

/// A schedule slot prepared for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotView {
    /// Slot id
    pub id: i64,
    /// Slot number within the branch
    pub slot_number: i32,
    /// Branch holding the slot
    pub branch_id: i64,
    /// Canonical date-time, unformatted
    pub date_time: NaiveDateTime,
    /// e.g. `"December 01, 2024"`
    pub date_label: String,
    /// e.g. `"09:00 AM"`
    pub time_label: String,
    /// Whether the slot can still be booked
    pub status: SlotStatus,
    /// Branch location, filled in by listings that join it
    pub branch_location: Option<String>,
}

impl SlotView {
    /// Builds the display form of a slot.
    #[must_use]
    pub fn from_model(slot: schedule::Model, branch_location: Option<String>) -> Self {
        Self {
            id: slot.id,
            slot_number: slot.slot_number,
            branch_id: slot.branch_id,
            date_label: slot.date_time.format("%B %d, %Y").to_string(),
            time_label: slot.date_time.format("%I:%M %p").to_string(),
            date_time: slot.date_time,
            status: slot.status,
            branch_location,
        }
    }
}

async fn slots_with_status(
    db: &DatabaseConnection,
    branch_id: i64,
    status: SlotStatus,
) -> Result<Vec<schedule::Model>> {
    Schedule::find()
        .filter(schedule::Column::BranchId.eq(branch_id))
        .filter(schedule::Column::Status.eq(status))
        .order_by_asc(schedule::Column::DateTime)
        .order_by_asc(schedule::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the bookable slots of a branch, earliest first.
pub async fn list_open_slots(db: &DatabaseConnection, branch_id: i64) -> Result<Vec<SlotView>> {
    let slots = slots_with_status(db, branch_id, SlotStatus::Active).await?;
    Ok(slots
        .into_iter()
        .map(|slot| SlotView::from_model(slot, None))
        .collect())
}

/// Lists the consumed slots of a branch, earliest first, with the branch location attached.
pub async fn list_retired_slots(db: &DatabaseConnection, branch_id: i64) -> Result<Vec<SlotView>> {
    let location = Branch::find_by_id(branch_id)
        .one(db)
        .await?
        .map(|branch| branch.location);
    let slots = slots_with_status(db, branch_id, SlotStatus::Inactive).await?;
    Ok(slots
        .into_iter()
        .map(|slot| SlotView::from_model(slot, location.clone()))
        .collect())
}

/// Retrieves a slot by id, returning None if it does not exist.
pub async fn get_schedule_slot(
    db: &DatabaseConnection,
    slot_id: i64,
) -> Result<Option<schedule::Model>> {
    Schedule::find_by_id(slot_id).one(db).await.map_err(Into::into)
}

/// Creates or refreshes the slot at (`branch_id`, `date_time`).
///
/// An existing slot at that branch and time gets the new slot number and is set back
/// to `Active`; otherwise a new `Active` slot is inserted. The read and the write run
/// in one transaction.
///
/// # Errors
/// - [`Error::NotFound`] if the branch does not exist
/// - [`Error::ConstraintViolation`] if the slot number is already taken at the branch
#[instrument(skip(db))]
pub async fn upsert_schedule_slot(
    db: &DatabaseConnection,
    branch_id: i64,
    date_time: NaiveDateTime,
    slot_number: i32,
) -> Result<schedule::Model> {
    let txn = db.begin().await?;

    require_branch(&txn, branch_id).await?;

    let existing = Schedule::find()
        .filter(schedule::Column::BranchId.eq(branch_id))
        .filter(schedule::Column::DateTime.eq(date_time))
        .one(&txn)
        .await?;

    let slot = if let Some(existing) = existing {
        debug!(slot_id = existing.id, "Refreshing existing slot");
        let mut active: schedule::ActiveModel = existing.into();
        active.slot_number = Set(slot_number);
        active.status = Set(SlotStatus::Active);
        active
            .update(&txn)
            .await
            .map_err(|e| Error::from_write(e, "update schedule slot"))?
    } else {
        schedule::ActiveModel {
            slot_number: Set(slot_number),
            date_time: Set(date_time),
            branch_id: Set(branch_id),
            status: Set(SlotStatus::Active),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| Error::from_write(e, "insert schedule slot"))?
    };

    txn.commit().await?;
    info!(slot_id = slot.id, "Schedule slot upserted");
    Ok(slot)
}

/// Moves the identified slot to a new date-time and slot number, in place.
///
/// The slot keeps its id, branch and status. Moving onto a time already held by
/// another slot of the same branch is refused, since (branch, date-time) is the
/// upsert key.
///
/// # Errors
/// - [`Error::NotFound`] if the slot does not exist
/// - [`Error::ConstraintViolation`] if the target time or slot number is taken
#[instrument(skip(db))]
pub async fn update_schedule_slot(
    db: &DatabaseConnection,
    slot_id: i64,
    date_time: NaiveDateTime,
    slot_number: i32,
) -> Result<schedule::Model> {
    let txn = db.begin().await?;

    let slot = Schedule::find_by_id(slot_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Schedule slot", slot_id))?;

    let clash = Schedule::find()
        .filter(schedule::Column::BranchId.eq(slot.branch_id))
        .filter(schedule::Column::DateTime.eq(date_time))
        .filter(schedule::Column::Id.ne(slot_id))
        .one(&txn)
        .await?;
    if let Some(clash) = clash {
        return Err(Error::ConstraintViolation {
            message: format!(
                "slot {} already holds {} at branch {}",
                clash.id,
                format_slot_datetime(&date_time),
                slot.branch_id
            ),
        });
    }

    let mut active: schedule::ActiveModel = slot.into();
    active.date_time = Set(date_time);
    active.slot_number = Set(slot_number);
    let updated = active
        .update(&txn)
        .await
        .map_err(|e| Error::from_write(e, "move schedule slot"))?;

    txn.commit().await?;
    Ok(updated)
}

/// Hard-deletes a slot. Returns whether a row was removed.
///
/// # Errors
/// Returns [`Error::ConstraintViolation`] if an appointment still references the slot.
#[instrument(skip(db))]
pub async fn delete_schedule_slot(db: &DatabaseConnection, slot_id: i64) -> Result<bool> {
    let result = Schedule::delete_by_id(slot_id)
        .exec(db)
        .await
        .map_err(|e| Error::from_write(e, "delete schedule slot"))?;
    Ok(result.rows_affected > 0)
}

/// Marks a slot `Inactive`. Unconditional and idempotent; a missing slot is not an error.
pub async fn retire_slot<C>(db: &C, slot_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Schedule::update_many()
        .col_expr(schedule::Column::Status, Expr::value(SlotStatus::Inactive))
        .filter(schedule::Column::Id.eq(slot_id))
        .exec(db)
        .await?;
    debug!(slot_id, rows = result.rows_affected, "Slot retired");
    Ok(())
}
