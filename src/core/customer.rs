//! Customer business logic.
//!
//! Customers are identified by (first name, last name). Resolving a customer that
//! already exists returns the stored row unchanged and discards the newly submitted
//! details; changing stored details goes through [`update_customer`].

use crate::{
    entities::{Customer, customer},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Personal details submitted on the booking form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Given name; with `last_name`, the customer's identity
    pub first_name: String,
    /// Middle name, may be empty
    pub middle_name: String,
    /// Family name
    pub last_name: String,
    /// Self-described gender, if given
    pub gender: Option<String>,
    /// Postal address
    pub address: String,
    /// Contact number
    pub phone: String,
    /// Contact email
    pub email: String,
    /// Date of birth
    pub birth_date: NaiveDate,
}

impl CustomerDetails {
    fn validate(&self) -> Result<()> {
        if self.first_name.trim().is_empty() {
            return Err(Error::invalid("first_name", "cannot be empty"));
        }
        if self.last_name.trim().is_empty() {
            return Err(Error::invalid("last_name", "cannot be empty"));
        }
        Ok(())
    }

    fn apply_to(&self, model: &mut customer::ActiveModel) {
        model.first_name = Set(self.first_name.trim().to_string());
        model.middle_name = Set(self.middle_name.trim().to_string());
        model.last_name = Set(self.last_name.trim().to_string());
        model.gender = Set(self.gender.clone());
        model.address = Set(self.address.clone());
        model.phone = Set(self.phone.clone());
        model.email = Set(self.email.clone());
        model.birth_date = Set(self.birth_date);
    }
}

/// Parses a birth date from form input.
///
/// Accepts `YYYY-MM-DD` and the HTTP-date form (`Sun, 01 Dec 2024 00:00:00 GMT`)
/// that round-tripped session data carries.
///
/// # Errors
/// Returns [`Error::InvalidInput`] for anything else.
pub fn parse_birth_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%a, %d %b %Y %H:%M:%S GMT"))
        .map_err(|_| Error::invalid("birth_date", format!("unrecognised date {input:?}")))
}

/// Outcome of [`resolve_or_create_customer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCustomer {
    /// The stored customer row
    pub customer: customer::Model,
    /// True when a new row was inserted, false when an existing one was reused
    pub created: bool,
}

/// Finds a customer by first and last name, returning None if not found.
///
/// When several rows share the name, the oldest one wins.
pub async fn find_customer_by_name<C>(
    db: &C,
    first_name: &str,
    last_name: &str,
) -> Result<Option<customer::Model>>
where
    C: ConnectionTrait,
{
    Customer::find()
        .filter(customer::Column::FirstName.eq(first_name.trim()))
        .filter(customer::Column::LastName.eq(last_name.trim()))
        .order_by_asc(customer::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a customer by id, returning None if it does not exist.
pub async fn get_customer(
    db: &DatabaseConnection,
    customer_id: i64,
) -> Result<Option<customer::Model>> {
    Customer::find_by_id(customer_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the customer with the submitted first and last name, creating it if needed.
///
/// An existing customer is returned as stored; the other submitted fields are ignored.
/// A new customer is inserted with every submitted field and then read back.
///
/// # Errors
/// - [`Error::InvalidInput`] if the first or last name is blank
/// - [`Error::Inconsistent`] if the freshly inserted row cannot be read back
#[instrument(skip(db, details), fields(first_name = %details.first_name, last_name = %details.last_name))]
pub async fn resolve_or_create_customer(
    db: &DatabaseConnection,
    details: &CustomerDetails,
) -> Result<ResolvedCustomer> {
    details.validate()?;

    if let Some(existing) =
        find_customer_by_name(db, &details.first_name, &details.last_name).await?
    {
        debug!(customer_id = existing.id, "Reusing existing customer");
        return Ok(ResolvedCustomer {
            customer: existing,
            created: false,
        });
    }

    let mut model = customer::ActiveModel {
        ..Default::default()
    };
    details.apply_to(&mut model);
    let inserted = Customer::insert(model).exec(db).await?;

    let customer = Customer::find_by_id(inserted.last_insert_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::Inconsistent {
            message: format!(
                "customer {} was inserted but cannot be read back",
                inserted.last_insert_id
            ),
        })?;

    info!(customer_id = customer.id, "New customer created");
    Ok(ResolvedCustomer {
        customer,
        created: true,
    })
}

/// Overwrites every personal field of an existing customer.
///
/// # Errors
/// - [`Error::InvalidInput`] if the first or last name is blank
/// - [`Error::NotFound`] if the customer does not exist
#[instrument(skip(db, details))]
pub async fn update_customer(
    db: &DatabaseConnection,
    customer_id: i64,
    details: &CustomerDetails,
) -> Result<customer::Model> {
    details.validate()?;

    let mut model: customer::ActiveModel = Customer::find_by_id(customer_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Customer", customer_id))?
        .into();

    details.apply_to(&mut model);
    model.update(db).await.map_err(Into::into)
}
