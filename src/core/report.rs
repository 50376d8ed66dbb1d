//! Dashboard queries for staff.
//!
//! All figures are computed from stored appointments. Revenue only counts
//! `Approved` appointments and is attributed to the month of the booked slot.

use crate::{
    entities::{Appointment, ApprovalStatus, appointment, schedule, service},
    errors::Result,
};
use chrono::{Datelike, NaiveDateTime};
use sea_orm::{JoinType, QueryOrder, QuerySelect, prelude::*, sea_query::Expr};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Number of services listed in [`DashboardStats::top_services`].
pub const TOP_SERVICES_LIMIT: u64 = 5;

/// Appointment counts per approval status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Awaiting staff review
    pub pending: u64,
    /// Accepted by staff
    pub approved: u64,
    /// Rejected by staff
    pub disapproved: u64,
}

impl StatusCounts {
    fn record(&mut self, status: ApprovalStatus, count: u64) {
        match status {
            ApprovalStatus::Pending => self.pending += count,
            ApprovalStatus::Approved => self.approved += count,
            ApprovalStatus::Disapproved => self.disapproved += count,
        }
    }

    /// Appointments in any state.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.pending + self.approved + self.disapproved
    }
}

/// Figures shown on the staff dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Appointments per approval status
    pub status_counts: StatusCounts,
    /// Revenue of every approved appointment
    pub total_revenue: f64,
    /// Approved revenue in the requested year, keyed by month 1..=12
    pub monthly_revenue: BTreeMap<u32, f64>,
    /// Most booked services with their appointment counts, busiest first
    pub top_services: Vec<(String, u64)>,
}

/// Computes the staff dashboard for `year`.
#[instrument(skip(db))]
pub async fn dashboard_stats(db: &DatabaseConnection, year: i32) -> Result<DashboardStats> {
    let mut status_counts = StatusCounts::default();
    let grouped: Vec<(ApprovalStatus, i64)> = Appointment::find()
        .select_only()
        .column(appointment::Column::ApprovalStatus)
        .column_as(Expr::col((Appointment, appointment::Column::Id)).count(), "count")
        .group_by(appointment::Column::ApprovalStatus)
        .into_tuple()
        .all(db)
        .await?;
    for (status, count) in grouped {
        status_counts.record(status, u64::try_from(count).unwrap_or_default());
    }

    let approved: Vec<(f64, NaiveDateTime)> = Appointment::find()
        .select_only()
        .column(appointment::Column::TotalPrice)
        .column_as(schedule::Column::DateTime, "slot_date_time")
        .join(JoinType::InnerJoin, appointment::Relation::Schedule.def())
        .filter(appointment::Column::ApprovalStatus.eq(ApprovalStatus::Approved))
        .into_tuple()
        .all(db)
        .await?;

    let mut monthly_revenue: BTreeMap<u32, f64> = (1..=12).map(|month| (month, 0.0)).collect();
    let mut total_revenue = 0.0;
    for (price, slot_date_time) in approved {
        total_revenue += price;
        if slot_date_time.year() == year {
            *monthly_revenue.entry(slot_date_time.month()).or_default() += price;
        }
    }

    let top: Vec<(String, i64)> = Appointment::find()
        .select_only()
        .column_as(service::Column::Name, "service_name")
        .column_as(Expr::col((Appointment, appointment::Column::Id)).count(), "count")
        .join(JoinType::InnerJoin, appointment::Relation::Service.def())
        .group_by(service::Column::Name)
        .order_by_desc(Expr::col((Appointment, appointment::Column::Id)).count())
        .order_by_asc(service::Column::Name)
        .limit(TOP_SERVICES_LIMIT)
        .into_tuple()
        .all(db)
        .await?;
    let top_services = top
        .into_iter()
        .map(|(name, count)| (name, u64::try_from(count).unwrap_or_default()))
        .collect();

    debug!(total = status_counts.total(), total_revenue, "Dashboard computed");
    Ok(DashboardStats {
        status_counts,
        total_revenue,
        monthly_revenue,
        top_services,
    })
}
