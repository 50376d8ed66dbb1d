//! Seed configuration loading.
//!
//! The reference data written into an empty store (services, branches, slots,
//! dentists and staff accounts) comes from a TOML file. The shipped `config.toml`
//! is also compiled in, so a fresh store can be bootstrapped without the file.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Built-in copy of the shipped seed file.
const BUILTIN_SEED: &str = include_str!("../../config.toml");

/// Configuration structure representing the entire seed file
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    /// Services offered by the clinic
    #[serde(default)]
    pub services: Vec<ServiceSeed>,
    /// Clinic locations
    #[serde(default)]
    pub branches: Vec<BranchSeed>,
    /// Initially open schedule slots
    #[serde(default)]
    pub slots: Vec<SlotSeed>,
    /// Dentist directory
    #[serde(default)]
    pub dentists: Vec<DentistSeed>,
    /// Staff login accounts, each with its own profile
    #[serde(default)]
    pub accounts: Vec<AccountSeed>,
}

/// A service row to seed
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSeed {
    /// Unique service name
    pub name: String,
    /// Description shown to customers
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Path of the service image
    pub image: String,
}

/// A branch row to seed
#[derive(Debug, Clone, Deserialize)]
pub struct BranchSeed {
    /// Location label
    pub location: String,
}

/// A schedule slot to seed
#[derive(Debug, Clone, Deserialize)]
pub struct SlotSeed {
    /// Slot number within the branch
    pub slot_number: i32,
    /// Slot start in any format accepted by [`crate::core::schedule::parse_slot_datetime`]
    pub date_time: String,
    /// 1-based position in `branches`
    pub branch: usize,
}

/// A dentist row to seed
#[derive(Debug, Clone, Deserialize)]
pub struct DentistSeed {
    /// Dentist's display name
    pub full_name: String,
    /// Contact email
    pub email: String,
    /// 1-based position in `branches`
    pub branch: usize,
}

/// A staff account (user plus profile) to seed
#[derive(Debug, Clone, Deserialize)]
pub struct AccountSeed {
    /// Login name
    pub username: String,
    /// Clear-text password
    pub password: String,
    /// Profile first name
    pub first_name: String,
    /// Profile last name
    pub last_name: String,
    /// Profile role
    pub role: String,
    /// 1-based position in `dentists`
    #[serde(default)]
    pub dentist: Option<usize>,
}

/// Parses seed configuration from TOML text.
pub fn parse_seed_config(contents: &str) -> Result<SeedConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed configuration: {e}"),
    })
}

/// Loads seed configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_seed_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let path_ref = path.as_ref();
    debug!("Loading seed configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read seed file {}: {e}", path_ref.display()),
    })?;
    parse_seed_config(&contents)
}

/// The seed data compiled into the binary.
pub fn builtin_seed_config() -> Result<SeedConfig> {
    parse_seed_config(BUILTIN_SEED)
}

/// Loads the seed from `SEED_CONFIG` (default `./config.toml`), falling back to
/// the built-in seed when that file does not exist.
pub fn load_default_seed_config() -> Result<SeedConfig> {
    let path = std::env::var("SEED_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        load_seed_config(&path)
    } else {
        info!("Seed file {path} not found, using built-in seed data.");
        builtin_seed_config()
    }
}
