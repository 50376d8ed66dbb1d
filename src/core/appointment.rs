//! Appointment business logic.
//!
//! An appointment is identified by its booking key (service, branch, slot, customer).
//! Writing the same key again refreshes the existing row instead of adding a second
//! one, which keeps resubmitted bookings from piling up. Approval is an unguarded
//! overwrite between `Approved` and `Disapproved` and never touches the slot.

use crate::{
    core::pricing::compute_appointment_price,
    entities::{
        Appointment, ApprovalStatus, User, appointment, branch, customer, schedule, service,
    },
    errors::{Error, Result},
};
use chrono::NaiveDateTime;
use sea_orm::{
    FromQueryResult, JoinType, QueryOrder, QuerySelect, Set, prelude::*, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Natural key of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppointmentKey {
    /// Booked service
    pub service_id: i64,
    /// Branch the service is performed at
    pub branch_id: i64,
    /// Consumed schedule slot
    pub slot_id: i64,
    /// Customer the booking is for
    pub customer_id: i64,
}

impl From<&appointment::Model> for AppointmentKey {
    fn from(appointment: &appointment::Model) -> Self {
        Self {
            service_id: appointment.service_id,
            branch_id: appointment.branch_id,
            slot_id: appointment.schedule_id,
            customer_id: appointment.customer_id,
        }
    }
}

/// An appointment joined with the names staff need to review it.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct AppointmentDetails {
    /// Appointment id
    pub id: i64,
    /// Booked service
    pub service_id: i64,
    /// Branch the service is performed at
    pub branch_id: i64,
    /// Consumed schedule slot
    pub schedule_id: i64,
    /// Customer the appointment is for
    pub customer_id: i64,
    /// Assigned staff account, if any
    pub user_id: Option<i64>,
    /// Teeth to extract, for extraction services
    pub tooth_count: Option<i32>,
    /// Price fixed at booking time
    pub total_price: f64,
    /// When the booking was last submitted
    pub created_at: NaiveDateTime,
    /// Staff approval state
    pub approval_status: ApprovalStatus,
    /// Name of the booked service
    pub service_name: String,
    /// Current unit price of the service
    pub service_price: f64,
    /// Branch location label
    pub branch_location: String,
    /// Start of the booked slot
    pub slot_date_time: NaiveDateTime,
    /// Customer first name
    pub customer_first_name: String,
    /// Customer last name
    pub customer_last_name: String,
    /// Customer contact number
    pub customer_phone: String,
}

/// Finds the appointment holding `key`, if any.
pub async fn find_by_key<C>(db: &C, key: AppointmentKey) -> Result<Option<appointment::Model>>
where
    C: ConnectionTrait,
{
    Appointment::find()
        .filter(appointment::Column::ServiceId.eq(key.service_id))
        .filter(appointment::Column::BranchId.eq(key.branch_id))
        .filter(appointment::Column::ScheduleId.eq(key.slot_id))
        .filter(appointment::Column::CustomerId.eq(key.customer_id))
        .order_by_asc(appointment::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// The appointment that most recently claimed a slot, if any.
///
/// A slot can carry several appointments once an admin reactivates it; the one
/// written last is the current holder.
pub async fn find_slot_holder<C>(db: &C, slot_id: i64) -> Result<Option<appointment::Model>>
where
    C: ConnectionTrait,
{
    Appointment::find()
        .filter(appointment::Column::ScheduleId.eq(slot_id))
        .order_by_desc(appointment::Column::CreatedAt)
        .order_by_desc(appointment::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Writes the booking for `key` and returns the appointment id.
///
/// The price is computed from the service at write time. If an appointment with the
/// same key exists, its tooth count, price and timestamp are overwritten and its
/// approval status is left alone. Otherwise a new `Pending` appointment is inserted.
///
/// # Errors
/// - [`Error::NotFound`] if the service does not exist
/// - [`Error::InvalidInput`] for a negative extraction tooth count
/// - [`Error::ConstraintViolation`] if the branch, slot or customer does not exist
#[instrument(skip(db))]
pub async fn create_or_update_appointment<C>(
    db: &C,
    key: AppointmentKey,
    tooth_count: Option<i32>,
) -> Result<i64>
where
    C: ConnectionTrait,
{
    let service = crate::core::service::get_service(db, key.service_id)
        .await?
        .ok_or_else(|| Error::not_found("Service", key.service_id))?;
    let total_price = compute_appointment_price(&service, tooth_count)?;
    let now = chrono::Utc::now().naive_utc();

    if let Some(existing) = find_by_key(db, key).await? {
        let id = existing.id;
        let mut model: appointment::ActiveModel = existing.into();
        model.tooth_count = Set(tooth_count);
        model.total_price = Set(total_price);
        model.created_at = Set(now);
        model.update(db).await?;
        debug!(appointment_id = id, "Existing appointment refreshed");
        return Ok(id);
    }

    let model = appointment::ActiveModel {
        service_id: Set(key.service_id),
        branch_id: Set(key.branch_id),
        schedule_id: Set(key.slot_id),
        customer_id: Set(key.customer_id),
        user_id: Set(None),
        tooth_count: Set(tooth_count),
        total_price: Set(total_price),
        created_at: Set(now),
        approval_status: Set(ApprovalStatus::Pending),
        ..Default::default()
    };
    let inserted = Appointment::insert(model)
        .exec(db)
        .await
        .map_err(|e| Error::from_write(e, "insert appointment"))?;

    info!(appointment_id = inserted.last_insert_id, "Appointment created");
    Ok(inserted.last_insert_id)
}

/// Retrieves an appointment row by id, returning None if it does not exist.
pub async fn get_appointment<C>(db: &C, appointment_id: i64) -> Result<Option<appointment::Model>>
where
    C: ConnectionTrait,
{
    Appointment::find_by_id(appointment_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Overwrites the approval status of an appointment.
///
/// Any of `Approved`/`Disapproved` may follow any state; the consumed slot stays
/// retired either way.
///
/// # Errors
/// - [`Error::InvalidInput`] if `status` is `Pending`
/// - [`Error::NotFound`] if the appointment does not exist
#[instrument(skip(db))]
pub async fn set_approval_status(
    db: &DatabaseConnection,
    appointment_id: i64,
    status: ApprovalStatus,
) -> Result<()> {
    if status == ApprovalStatus::Pending {
        return Err(Error::invalid(
            "approval_status",
            "an appointment can only be approved or disapproved",
        ));
    }

    let result = Appointment::update_many()
        .col_expr(appointment::Column::ApprovalStatus, Expr::value(status))
        .filter(appointment::Column::Id.eq(appointment_id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Appointment", appointment_id));
    }

    info!(appointment_id, %status, "Approval status set");
    Ok(())
}

/// Assigns a staff account to an appointment.
///
/// # Errors
/// Returns [`Error::NotFound`] if the appointment or the account does not exist.
pub async fn assign_staff(db: &DatabaseConnection, appointment_id: i64, user_id: i64) -> Result<()> {
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))?;

    let result = Appointment::update_many()
        .col_expr(appointment::Column::UserId, Expr::value(user_id))
        .filter(appointment::Column::Id.eq(appointment_id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Appointment", appointment_id));
    }
    Ok(())
}

/// The price fixed on an appointment when it was booked.
///
/// # Errors
/// Returns [`Error::NotFound`] if the appointment does not exist.
pub async fn appointment_total_price(db: &DatabaseConnection, appointment_id: i64) -> Result<f64> {
    get_appointment(db, appointment_id)
        .await?
        .map(|appointment| appointment.total_price)
        .ok_or_else(|| Error::not_found("Appointment", appointment_id))
}

fn details_query() -> Select<Appointment> {
    Appointment::find()
        .select_only()
        .columns([
            appointment::Column::Id,
            appointment::Column::ServiceId,
            appointment::Column::BranchId,
            appointment::Column::ScheduleId,
            appointment::Column::CustomerId,
            appointment::Column::UserId,
            appointment::Column::ToothCount,
            appointment::Column::TotalPrice,
            appointment::Column::CreatedAt,
            appointment::Column::ApprovalStatus,
        ])
        .column_as(service::Column::Name, "service_name")
        .column_as(service::Column::Price, "service_price")
        .column_as(branch::Column::Location, "branch_location")
        .column_as(schedule::Column::DateTime, "slot_date_time")
        .column_as(customer::Column::FirstName, "customer_first_name")
        .column_as(customer::Column::LastName, "customer_last_name")
        .column_as(customer::Column::Phone, "customer_phone")
        .join(JoinType::InnerJoin, appointment::Relation::Service.def())
        .join(JoinType::InnerJoin, appointment::Relation::Branch.def())
        .join(JoinType::InnerJoin, appointment::Relation::Schedule.def())
        .join(JoinType::InnerJoin, appointment::Relation::Customer.def())
}

/// Retrieves one appointment with its service, branch, slot and customer names.
pub async fn get_appointment_details(
    db: &DatabaseConnection,
    appointment_id: i64,
) -> Result<Option<AppointmentDetails>> {
    details_query()
        .filter(appointment::Column::Id.eq(appointment_id))
        .into_model::<AppointmentDetails>()
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists a branch's appointments in one approval state, oldest booking first.
pub async fn list_appointments_by_status(
    db: &DatabaseConnection,
    branch_id: i64,
    status: ApprovalStatus,
) -> Result<Vec<AppointmentDetails>> {
    details_query()
        .filter(appointment::Column::BranchId.eq(branch_id))
        .filter(appointment::Column::ApprovalStatus.eq(status))
        .order_by_asc(appointment::Column::Id)
        .into_model::<AppointmentDetails>()
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::schedule::{get_schedule_slot, retire_slot};
    use crate::entities::SlotStatus;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_inserts_pending_appointment() -> Result<()> {
        let fixture = setup_booking_fixture().await?;

        let id = create_or_update_appointment(&fixture.db, fixture.key(), Some(2)).await?;
        let stored = get_appointment(&fixture.db, id).await?.unwrap();

        assert_eq!(stored.approval_status, ApprovalStatus::Pending);
        assert_eq!(stored.tooth_count, Some(2));
        assert_eq!(stored.total_price, fixture.service.price);
        assert_eq!(stored.user_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_extraction_price_is_fixed_at_booking() -> Result<()> {
        let fixture = setup_booking_fixture().await?;
        let extraction = create_test_service(&fixture.db, "Extraction", 1000.0).await?;
        let key = AppointmentKey {
            service_id: extraction.id,
            ..fixture.key()
        };

        let id = create_or_update_appointment(&fixture.db, key, Some(3)).await?;
        assert_eq!(appointment_total_price(&fixture.db, id).await?, 3000.0);

        // Repricing the service later leaves the booked price alone
        crate::core::service::upsert_service(
            &fixture.db,
            &crate::core::service::ServiceInput {
                name: "Extraction".to_string(),
                description: "Tooth extraction".to_string(),
                price: 1200.0,
                image_path: String::new(),
            },
        )
        .await?;
        assert_eq!(appointment_total_price(&fixture.db, id).await?, 3000.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_same_key_updates_existing_row() -> Result<()> {
        let fixture = setup_booking_fixture().await?;
        let extraction = create_test_service(&fixture.db, "Extraction", 1000.0).await?;
        let key = AppointmentKey {
            service_id: extraction.id,
            ..fixture.key()
        };

        let first = create_or_update_appointment(&fixture.db, key, Some(1)).await?;
        set_approval_status(&fixture.db, first, ApprovalStatus::Approved).await?;
        let before = get_appointment(&fixture.db, first).await?.unwrap();

        let second = create_or_update_appointment(&fixture.db, key, Some(4)).await?;
        assert_eq!(first, second);

        let rows = Appointment::find()
            .filter(appointment::Column::BranchId.eq(fixture.branch.id))
            .all(&fixture.db)
            .await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tooth_count, Some(4));
        assert_eq!(rows[0].total_price, 4000.0);
        assert!(rows[0].created_at >= before.created_at);
        // Resubmission does not reset approval
        assert_eq!(rows[0].approval_status, ApprovalStatus::Approved);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_with_unknown_service() -> Result<()> {
        let fixture = setup_booking_fixture().await?;
        let key = AppointmentKey {
            service_id: 999,
            ..fixture.key()
        };
        let result = create_or_update_appointment(&fixture.db, key, None).await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "Service",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_with_unknown_customer_is_refused() -> Result<()> {
        let fixture = setup_booking_fixture().await?;
        let key = AppointmentKey {
            customer_id: 999,
            ..fixture.key()
        };
        let result = create_or_update_appointment(&fixture.db, key, None).await;
        assert!(matches!(result, Err(Error::ConstraintViolation { .. })));
        assert!(Appointment::find().all(&fixture.db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_approval_transitions_are_unguarded() -> Result<()> {
        let fixture = setup_booking_fixture().await?;
        let id = create_or_update_appointment(&fixture.db, fixture.key(), None).await?;
        retire_slot(&fixture.db, fixture.slot.id).await?;

        for status in [
            ApprovalStatus::Approved,
            ApprovalStatus::Disapproved,
            ApprovalStatus::Approved,
            ApprovalStatus::Disapproved,
        ] {
            set_approval_status(&fixture.db, id, status).await?;
            let stored = get_appointment(&fixture.db, id).await?.unwrap();
            assert_eq!(stored.approval_status, status);
        }

        // Disapproval does not hand the slot back
        let slot = get_schedule_slot(&fixture.db, fixture.slot.id).await?.unwrap();
        assert_eq!(slot.status, SlotStatus::Inactive);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_approval_status_rejects_pending_and_missing() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let result = set_approval_status(&db, 1, ApprovalStatus::Pending).await;
        assert!(matches!(
            result,
            Err(Error::InvalidInput {
                field: "approval_status",
                ..
            })
        ));

        let db = setup_test_db().await?;
        let result = set_approval_status(&db, 42, ApprovalStatus::Approved).await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "Appointment",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_by_status_is_enriched() -> Result<()> {
        let fixture = setup_booking_fixture().await?;
        let pending = create_or_update_appointment(&fixture.db, fixture.key(), None).await?;

        let second_slot =
            create_test_slot(&fixture.db, fixture.branch.id, 2, "2025-01-10 11:00:00").await?;
        let approved = create_or_update_appointment(
            &fixture.db,
            AppointmentKey {
                slot_id: second_slot.id,
                ..fixture.key()
            },
            None,
        )
        .await?;
        set_approval_status(&fixture.db, approved, ApprovalStatus::Approved).await?;

        let listed =
            list_appointments_by_status(&fixture.db, fixture.branch.id, ApprovalStatus::Pending)
                .await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, pending);
        assert_eq!(listed[0].service_name, fixture.service.name);
        assert_eq!(listed[0].branch_location, fixture.branch.location);
        assert_eq!(listed[0].slot_date_time, fixture.slot.date_time);
        assert_eq!(listed[0].customer_last_name, fixture.customer.last_name);

        let approved_list =
            list_appointments_by_status(&fixture.db, fixture.branch.id, ApprovalStatus::Approved)
                .await?;
        assert_eq!(approved_list.len(), 1);
        assert_eq!(approved_list[0].id, approved);

        let other_branch = create_test_branch(&fixture.db, "Elsewhere").await?;
        assert!(
            list_appointments_by_status(&fixture.db, other_branch.id, ApprovalStatus::Pending)
                .await?
                .is_empty()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_details_and_staff_assignment() -> Result<()> {
        let fixture = setup_booking_fixture().await?;
        let id = create_or_update_appointment(&fixture.db, fixture.key(), None).await?;
        let staff = create_test_account(&fixture.db, "staff01", "staffpwd", "Staff").await?;

        assign_staff(&fixture.db, id, staff.id).await?;
        let details = get_appointment_details(&fixture.db, id).await?.unwrap();
        assert_eq!(details.user_id, Some(staff.id));
        assert_eq!(details.service_price, fixture.service.price);
        assert_eq!(details.customer_phone, fixture.customer.phone);

        assert!(get_appointment_details(&fixture.db, 999).await?.is_none());
        assert!(matches!(
            assign_staff(&fixture.db, 999, staff.id).await,
            Err(Error::NotFound {
                entity: "Appointment",
                ..
            })
        ));
        assert!(matches!(
            assign_staff(&fixture.db, id, 999).await,
            Err(Error::NotFound { entity: "User", .. })
        ));
        Ok(())
    }
}
