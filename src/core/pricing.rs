//! Appointment pricing.
//!
//! Extraction services are priced per tooth; every other service has a flat price.

use crate::{
    entities::service,
    errors::{Error, Result},
};

/// Services whose name contains this keyword (any case) are priced per tooth.
pub const EXTRACTION_KEYWORD: &str = "extraction";

/// Whether a service with this name is priced per extracted tooth.
#[must_use]
pub fn is_extraction(service_name: &str) -> bool {
    service_name.to_lowercase().contains(EXTRACTION_KEYWORD)
}

/// Computes the total price of an appointment for `service`.
///
/// For extraction services the price is `unit price × tooth_count`, with an absent
/// count treated as zero. For any other service the tooth count is ignored and the
/// unit price is returned as-is.
///
/// # Errors
/// Returns [`Error::InvalidInput`] when an extraction is requested with a negative
/// tooth count.
pub fn compute_appointment_price(service: &service::Model, tooth_count: Option<i32>) -> Result<f64> {
    if !is_extraction(&service.name) {
        return Ok(service.price);
    }

    let teeth = tooth_count.unwrap_or(0);
    if teeth < 0 {
        return Err(Error::invalid(
            "tooth_count",
            format!("cannot extract {teeth} teeth"),
        ));
    }

    Ok(service.price * f64::from(teeth))
}
