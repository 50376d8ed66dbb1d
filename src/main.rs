use healteeth::{
    bootstrap::{SeedOutcome, seed_reference_data},
    config::{database, seed},
    core::{directory, schedule},
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    // 3. Connect and make sure every table exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed reference data into an empty store
    let seed_config = seed::load_default_seed_config()
        .inspect_err(|e| error!("Failed to load seed configuration: {}", e))?;
    match seed_reference_data(&db, &seed_config).await? {
        SeedOutcome::Seeded { slots, .. } => info!(slots, "Store seeded."),
        SeedOutcome::Skipped => info!("Store already seeded."),
    }

    // 5. Report what customers can book right now
    for branch in directory::list_branches(&db).await? {
        let open = schedule::list_open_slots(&db, branch.id).await?;
        info!(branch = %branch.location, open_slots = open.len(), "Branch availability");
        for slot in open {
            info!(
                "  #{} {} {}",
                slot.slot_number, slot.date_label, slot.time_label
            );
        }
    }

    Ok(())
}
