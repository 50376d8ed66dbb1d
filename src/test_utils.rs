//! Shared test utilities for `HealTeeth`.
//!
//! Helpers for setting up an in-memory store and creating clinic rows with
//! sensible defaults.

use crate::{
    core::{
        appointment::AppointmentKey,
        customer::{CustomerDetails, resolve_or_create_customer},
        schedule::{parse_slot_datetime, upsert_schedule_slot},
        service::{ServiceInput, link_service_branch, upsert_service},
    },
    entities::{branch, customer, schedule, service, user, user_profile},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a branch at `location`.
pub async fn create_test_branch(db: &DatabaseConnection, location: &str) -> Result<branch::Model> {
    let model = branch::ActiveModel {
        location: Set(location.to_string()),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Creates a service with a generated description and image path.
pub async fn create_test_service(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
) -> Result<service::Model> {
    upsert_service(
        db,
        &ServiceInput {
            name: name.to_string(),
            description: format!("{name} service"),
            price,
            image_path: format!("images/{}.jfif", name.to_lowercase()),
        },
    )
    .await
}

/// Creates an `Active` slot; `date_time` is `YYYY-MM-DD HH:MM:SS`.
pub async fn create_test_slot(
    db: &DatabaseConnection,
    branch_id: i64,
    slot_number: i32,
    date_time: &str,
) -> Result<schedule::Model> {
    upsert_schedule_slot(db, branch_id, parse_slot_datetime(date_time)?, slot_number).await
}

/// Booking form details for a customer.
///
/// # Defaults
/// * gender: Female
/// * birth date: 1990-04-12
pub fn sample_customer_details(first_name: &str, last_name: &str) -> CustomerDetails {
    CustomerDetails {
        first_name: first_name.to_string(),
        middle_name: "Dela".to_string(),
        last_name: last_name.to_string(),
        gender: Some("Female".to_string()),
        address: "12 Mabini St, Cebu City".to_string(),
        phone: "09171234567".to_string(),
        email: format!(
            "{}.{}@example.com",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        ),
        birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap_or_default(),
    }
}

/// Creates (or reuses) a customer from [`sample_customer_details`].
pub async fn create_test_customer(
    db: &DatabaseConnection,
    first_name: &str,
    last_name: &str,
) -> Result<customer::Model> {
    let details = sample_customer_details(first_name, last_name);
    Ok(resolve_or_create_customer(db, &details).await?.customer)
}

/// Creates a staff account with its profile and no dentist link.
pub async fn create_test_account(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    role: &str,
) -> Result<user::Model> {
    let profile = user_profile::ActiveModel {
        first_name: Set(username.to_string()),
        last_name: Set("Tester".to_string()),
        role: Set(role.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let account = user::ActiveModel {
        username: Set(username.to_string()),
        password: Set(password.to_string()),
        profile_id: Set(profile.id),
        dentist_id: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(account)
}

/// Everything a booking needs, already stored.
pub struct BookingFixture {
    pub db: DatabaseConnection,
    pub service: service::Model,
    pub branch: branch::Model,
    pub slot: schedule::Model,
    pub customer: customer::Model,
}

impl BookingFixture {
    /// Booking key over the fixture rows.
    pub const fn key(&self) -> AppointmentKey {
        AppointmentKey {
            service_id: self.service.id,
            branch_id: self.branch.id,
            slot_id: self.slot.id,
            customer_id: self.customer.id,
        }
    }
}

/// Sets up a store holding one bookable combination.
///
/// # Defaults
/// * service: "Cleaning" at 500.0, offered at the branch
/// * branch: "Main Branch"
/// * slot: number 1 on 2025-01-10 09:00
/// * customer: Maria Santos
pub async fn setup_booking_fixture() -> Result<BookingFixture> {
    let db = setup_test_db().await?;
    let branch = create_test_branch(&db, "Main Branch").await?;
    let service = create_test_service(&db, "Cleaning", 500.0).await?;
    link_service_branch(&db, service.id, branch.id).await?;
    let slot = create_test_slot(&db, branch.id, 1, "2025-01-10 09:00:00").await?;
    let customer = create_test_customer(&db, "Maria", "Santos").await?;

    Ok(BookingFixture {
        db,
        service,
        branch,
        slot,
        customer,
    })
}
