/// Database configuration and connection management
pub mod database;

/// Bootstrap reference data loaded from config.toml
pub mod seed;
