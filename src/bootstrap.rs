//! Reference data bootstrap.
//!
//! Writes the services, branches, slots, dentists and staff accounts of a
//! [`SeedConfig`] into an empty store. A store that already holds services or
//! branches is left alone.

use crate::{
    config::seed::SeedConfig,
    core::schedule::parse_slot_datetime,
    entities::{
        Branch, Service, SlotStatus, branch, dentist, schedule, service, user, user_profile,
    },
    errors::{Error, Result},
};
use sea_orm::{ActiveModelTrait, PaginatorTrait, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

/// Result of [`seed_reference_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The store was empty and has been filled
    Seeded {
        /// Services written
        services: usize,
        /// Branches written
        branches: usize,
        /// Slots written
        slots: usize,
        /// Dentists written
        dentists: usize,
        /// Staff accounts written
        accounts: usize,
    },
    /// The store already held reference data
    Skipped,
}

/// Maps a 1-based seed position onto the id inserted for it.
fn resolve_position(ids: &[i64], position: usize, what: &str) -> Result<i64> {
    position
        .checked_sub(1)
        .and_then(|index| ids.get(index))
        .copied()
        .ok_or_else(|| Error::Config {
            message: format!(
                "{what} position {position} is out of range (1..={})",
                ids.len()
            ),
        })
}

/// Seeds `config` into the store unless it already holds services or branches.
///
/// Everything is written in one transaction; a bad reference in the config leaves
/// the store untouched.
///
/// # Errors
/// - [`Error::Config`] if a slot, dentist or account refers to a missing position
/// - [`Error::InvalidInput`] if a slot date-time cannot be parsed
#[instrument(skip(db, config))]
pub async fn seed_reference_data(db: &DatabaseConnection, config: &SeedConfig) -> Result<SeedOutcome> {
    let existing = Service::find().count(db).await? + Branch::find().count(db).await?;
    if existing > 0 {
        info!(existing, "Reference data present, skipping seed");
        return Ok(SeedOutcome::Skipped);
    }

    let txn = db.begin().await?;

    let mut branch_ids = Vec::with_capacity(config.branches.len());
    for seed in &config.branches {
        let inserted = branch::ActiveModel {
            location: Set(seed.location.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        branch_ids.push(inserted.id);
    }

    for seed in &config.services {
        service::ActiveModel {
            name: Set(seed.name.clone()),
            description: Set(seed.description.clone()),
            price: Set(seed.price),
            image_path: Set(seed.image.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    for seed in &config.slots {
        let branch_id = resolve_position(&branch_ids, seed.branch, "slot branch")?;
        schedule::ActiveModel {
            slot_number: Set(seed.slot_number),
            date_time: Set(parse_slot_datetime(&seed.date_time)?),
            branch_id: Set(branch_id),
            status: Set(SlotStatus::Active),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    let mut dentist_ids = Vec::with_capacity(config.dentists.len());
    for seed in &config.dentists {
        let branch_id = resolve_position(&branch_ids, seed.branch, "dentist branch")?;
        let inserted = dentist::ActiveModel {
            full_name: Set(seed.full_name.clone()),
            email: Set(seed.email.clone()),
            branch_id: Set(branch_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        dentist_ids.push(inserted.id);
    }

    for seed in &config.accounts {
        let dentist_id = seed
            .dentist
            .map(|position| resolve_position(&dentist_ids, position, "account dentist"))
            .transpose()?;
        let profile = user_profile::ActiveModel {
            first_name: Set(seed.first_name.clone()),
            last_name: Set(seed.last_name.clone()),
            role: Set(seed.role.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        user::ActiveModel {
            username: Set(seed.username.clone()),
            password: Set(seed.password.clone()),
            profile_id: Set(profile.id),
            dentist_id: Set(dentist_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        debug!(username = %seed.username, "Seeded account");
    }

    txn.commit().await?;

    let outcome = SeedOutcome::Seeded {
        services: config.services.len(),
        branches: config.branches.len(),
        slots: config.slots.len(),
        dentists: config.dentists.len(),
        accounts: config.accounts.len(),
    };
    info!(?outcome, "Reference data seeded");
    Ok(outcome)
}
