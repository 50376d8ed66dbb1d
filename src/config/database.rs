//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. Creation is idempotent: existing tables
//! are left untouched, which lets the bootstrap binary run against an existing store.

use crate::entities::{
    Appointment, Branch, Customer, Dentist, Schedule, Service, ServiceBranch, User, UserProfile,
    schedule,
};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info, instrument};

/// Connection string used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://healteeth.db?mode=rwc";

/// Gets the database URL from environment variable or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database at `database_url`.
#[instrument]
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Opening database connection");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Establishes a connection using the `DATABASE_URL` environment variable.
///
/// Falls back to [`DEFAULT_DATABASE_URL`] if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    connect(&get_database_url()).await
}

async fn create_table_for<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all clinic tables (if missing) plus the schedule slot-number index.
///
/// Referenced tables are created before the tables that point at them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table_for(db, &schema, Customer).await?;
    create_table_for(db, &schema, Service).await?;
    create_table_for(db, &schema, Branch).await?;
    create_table_for(db, &schema, ServiceBranch).await?;
    create_table_for(db, &schema, Schedule).await?;
    create_table_for(db, &schema, Dentist).await?;
    create_table_for(db, &schema, UserProfile).await?;
    create_table_for(db, &schema, User).await?;
    create_table_for(db, &schema, Appointment).await?;

    // A slot number is unique within its branch.
    let slot_number_index = Index::create()
        .name("idx_schedule_branch_slot_number")
        .table(Schedule)
        .col(schedule::Column::BranchId)
        .col(schedule::Column::SlotNumber)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&slot_number_index)).await?;

    info!("Database tables ensured.");
    Ok(())
}
