/// Database configuration and connection management
pub mod database;

/// Booking policy settings and the config.toml loader
pub mod settings;

/// Show catalog seeding from config.toml
pub mod catalog;
