//! Service catalogue business logic.
//!
//! Services are maintained by name: [`upsert_service`] updates the service with the
//! given name or inserts a new one, and [`delete_service_by_name`] removes it. Which
//! branches offer a service is kept in the service/branch link table, written only
//! through the insert-if-absent [`link_service_branch`] and read back de-duplicated.

use crate::{
    entities::{Branch, Service, ServiceBranch, branch, service, service_branch},
    errors::{Error, Result},
};
use sea_orm::{JoinType, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// Fields of the admin service form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInput {
    /// Service name, the upsert key
    pub name: String,
    /// Description shown to customers
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Path of the service image
    pub image_path: String,
}

/// A service together with the branches that offer it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceOffering {
    /// The service
    pub service: service::Model,
    /// Branches offering it, each once
    pub branches: Vec<branch::Model>,
}

/// Retrieves all services in creation order.
pub async fn list_services(db: &DatabaseConnection) -> Result<Vec<service::Model>> {
    Service::find()
        .order_by_asc(service::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a service by id, returning None if it does not exist.
pub async fn get_service<C>(db: &C, service_id: i64) -> Result<Option<service::Model>>
where
    C: ConnectionTrait,
{
    Service::find_by_id(service_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a service by its exact name.
pub async fn get_service_by_name<C>(db: &C, name: &str) -> Result<Option<service::Model>>
where
    C: ConnectionTrait,
{
    Service::find()
        .filter(service::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Updates the service named `input.name`, or inserts it if no such service exists.
///
/// The name is the key, so a service cannot be renamed through this path.
///
/// # Errors
/// - [`Error::InvalidInput`] if the name is blank or the price is negative or not finite
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn upsert_service(db: &DatabaseConnection, input: &ServiceInput) -> Result<service::Model> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(Error::invalid("name", "service name cannot be empty"));
    }
    if !input.price.is_finite() || input.price < 0.0 {
        return Err(Error::invalid(
            "price",
            format!("{} is not a valid price", input.price),
        ));
    }

    let txn = db.begin().await?;

    let saved = if let Some(existing) = get_service_by_name(&txn, name).await? {
        debug!(service_id = existing.id, "Updating existing service");
        let mut model: service::ActiveModel = existing.into();
        model.description = Set(input.description.clone());
        model.price = Set(input.price);
        model.image_path = Set(input.image_path.clone());
        model.update(&txn).await?
    } else {
        service::ActiveModel {
            name: Set(name.to_string()),
            description: Set(input.description.clone()),
            price: Set(input.price),
            image_path: Set(input.image_path.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| Error::from_write(e, "insert service"))?
    };

    txn.commit().await?;
    info!(service_id = saved.id, "Service saved");
    Ok(saved)
}

/// Deletes the service with the given name along with its branch links.
///
/// Returns whether a service was removed.
///
/// # Errors
/// Returns [`Error::ConstraintViolation`] if appointments still reference the service;
/// nothing is removed in that case.
#[instrument(skip(db))]
pub async fn delete_service_by_name(db: &DatabaseConnection, name: &str) -> Result<bool> {
    let txn = db.begin().await?;

    let Some(existing) = get_service_by_name(&txn, name).await? else {
        return Ok(false);
    };

    ServiceBranch::delete_many()
        .filter(service_branch::Column::ServiceId.eq(existing.id))
        .exec(&txn)
        .await?;
    Service::delete_by_id(existing.id)
        .exec(&txn)
        .await
        .map_err(|e| Error::from_write(e, "delete service"))?;

    txn.commit().await?;
    info!(service_id = existing.id, "Service deleted");
    Ok(true)
}

/// Links a service to a branch unless the link already exists.
///
/// Returns true when a new link row was written. Calling it again for the same pair
/// is a no-op.
///
/// # Errors
/// Returns [`Error::NotFound`] if the service or the branch does not exist.
pub async fn link_service_branch<C>(db: &C, service_id: i64, branch_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    get_service(db, service_id)
        .await?
        .ok_or_else(|| Error::not_found("Service", service_id))?;
    crate::core::directory::require_branch(db, branch_id).await?;

    let existing = ServiceBranch::find()
        .filter(service_branch::Column::ServiceId.eq(service_id))
        .filter(service_branch::Column::BranchId.eq(branch_id))
        .count(db)
        .await?;
    if existing > 0 {
        return Ok(false);
    }

    service_branch::ActiveModel {
        service_id: Set(service_id),
        branch_id: Set(branch_id),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(true)
}

/// Removes every link row between a service and a branch. Returns the number removed.
pub async fn unlink_service_branch<C>(db: &C, service_id: i64, branch_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = ServiceBranch::delete_many()
        .filter(service_branch::Column::ServiceId.eq(service_id))
        .filter(service_branch::Column::BranchId.eq(branch_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Makes the set of branches offering a service exactly `branch_ids`.
///
/// Returns the (added, removed) branch ids.
#[instrument(skip(db))]
pub async fn replace_service_branches(
    db: &DatabaseConnection,
    service_id: i64,
    branch_ids: &[i64],
) -> Result<(Vec<i64>, Vec<i64>)> {
    let txn = db.begin().await?;

    let wanted: BTreeSet<i64> = branch_ids.iter().copied().collect();
    let current: BTreeSet<i64> = ServiceBranch::find()
        .filter(service_branch::Column::ServiceId.eq(service_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|link| link.branch_id)
        .collect();

    let removed: Vec<i64> = current.difference(&wanted).copied().collect();
    let added: Vec<i64> = wanted.difference(&current).copied().collect();

    for branch_id in &removed {
        unlink_service_branch(&txn, service_id, *branch_id).await?;
    }
    for branch_id in &added {
        link_service_branch(&txn, service_id, *branch_id).await?;
    }

    txn.commit().await?;
    Ok((added, removed))
}

/// Lists the branches offering a service, each once, ordered by id.
pub async fn list_branches_for_service(
    db: &DatabaseConnection,
    service_id: i64,
) -> Result<Vec<branch::Model>> {
    Branch::find()
        .join(JoinType::InnerJoin, branch::Relation::ServiceBranch.def())
        .filter(service_branch::Column::ServiceId.eq(service_id))
        .distinct()
        .order_by_asc(branch::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the services offered at a branch, each once, ordered by id.
pub async fn list_services_for_branch(
    db: &DatabaseConnection,
    branch_id: i64,
) -> Result<Vec<service::Model>> {
    Service::find()
        .join(JoinType::InnerJoin, service::Relation::ServiceBranch.def())
        .filter(service_branch::Column::BranchId.eq(branch_id))
        .distinct()
        .order_by_asc(service::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists every service with the branches where it can be booked.
pub async fn list_service_offerings(db: &DatabaseConnection) -> Result<Vec<ServiceOffering>> {
    let mut offerings = Vec::new();
    for service in list_services(db).await? {
        let branches = list_branches_for_service(db, service.id).await?;
        offerings.push(ServiceOffering { service, branches });
    }
    Ok(offerings)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn input(name: &str, price: f64) -> ServiceInput {
        ServiceInput {
            name: name.to_string(),
            description: format!("{name} service"),
            price,
            image_path: format!("images/{}.jfif", name.to_lowercase()),
        }
    }

    #[tokio::test]
    async fn test_upsert_service_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        for bad in [input("", 10.0), input("  ", 10.0)] {
            let result = upsert_service(&db, &bad).await;
            assert!(matches!(result, Err(Error::InvalidInput { field: "name", .. })));
        }
        for price in [-1.0, f64::NAN, f64::INFINITY] {
            let result = upsert_service(&db, &input("Whitening", price)).await;
            assert!(matches!(result, Err(Error::InvalidInput { field: "price", .. })));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_service_is_keyed_by_name() -> Result<()> {
        let db = setup_test_db().await?;

        let created = upsert_service(&db, &input("Whitening", 1200.0)).await?;
        let mut changed = input("Whitening", 1500.0);
        changed.description = "Laser whitening".to_string();
        let updated = upsert_service(&db, &changed).await?;

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.price, 1500.0);
        assert_eq!(updated.description, "Laser whitening");
        assert_eq!(list_services(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_service_by_name() -> Result<()> {
        let db = setup_test_db().await?;
        let branch = create_test_branch(&db, "Main Branch").await?;
        let service = upsert_service(&db, &input("Whitening", 1200.0)).await?;
        link_service_branch(&db, service.id, branch.id).await?;

        assert!(delete_service_by_name(&db, "Whitening").await?);
        assert!(!delete_service_by_name(&db, "Whitening").await?);
        assert!(get_service_by_name(&db, "Whitening").await?.is_none());
        assert!(ServiceBranch::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_booked_service_is_refused() -> Result<()> {
        let fixture = setup_booking_fixture().await?;
        crate::core::appointment::create_or_update_appointment(&fixture.db, fixture.key(), None)
            .await?;

        let result = delete_service_by_name(&fixture.db, &fixture.service.name).await;
        assert!(matches!(result, Err(Error::ConstraintViolation { .. })));
        assert!(
            get_service_by_name(&fixture.db, &fixture.service.name)
                .await?
                .is_some()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_link_is_insert_if_absent() -> Result<()> {
        let db = setup_test_db().await?;
        let branch = create_test_branch(&db, "Main Branch").await?;
        let service = create_test_service(&db, "Cleaning", 500.0).await?;

        assert!(link_service_branch(&db, service.id, branch.id).await?);
        assert!(!link_service_branch(&db, service.id, branch.id).await?);
        assert_eq!(ServiceBranch::find().all(&db).await?.len(), 1);

        let missing = link_service_branch(&db, service.id, 404).await;
        assert!(matches!(missing, Err(Error::NotFound { entity: "Branch", .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_reads_deduplicate_stray_links() -> Result<()> {
        let db = setup_test_db().await?;
        let branch = create_test_branch(&db, "Main Branch").await?;
        let service = create_test_service(&db, "Cleaning", 500.0).await?;

        // Duplicates written around the insert-if-absent path
        for _ in 0..2 {
            service_branch::ActiveModel {
                service_id: Set(service.id),
                branch_id: Set(branch.id),
                ..Default::default()
            }
            .insert(&db)
            .await?;
        }

        assert_eq!(list_branches_for_service(&db, service.id).await?.len(), 1);
        assert_eq!(list_services_for_branch(&db, branch.id).await?.len(), 1);

        assert_eq!(unlink_service_branch(&db, service.id, branch.id).await?, 2);
        assert!(list_branches_for_service(&db, service.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_service_branches() -> Result<()> {
        let db = setup_test_db().await?;
        let main = create_test_branch(&db, "Main Branch").await?;
        let santo = create_test_branch(&db, "Santo Nino").await?;
        let ayala = create_test_branch(&db, "Ayala Center").await?;
        let service = create_test_service(&db, "Braces", 25000.0).await?;
        link_service_branch(&db, service.id, main.id).await?;
        link_service_branch(&db, service.id, santo.id).await?;

        let (added, removed) =
            replace_service_branches(&db, service.id, &[santo.id, ayala.id]).await?;
        assert_eq!(added, vec![ayala.id]);
        assert_eq!(removed, vec![main.id]);

        let offered: Vec<i64> = list_branches_for_service(&db, service.id)
            .await?
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(offered, vec![santo.id, ayala.id]);

        let offerings = list_service_offerings(&db).await?;
        assert_eq!(offerings.len(), 1);
        assert_eq!(offerings[0].branches.len(), 2);
        Ok(())
    }
}
