/// Database connection, schema creation, and transient-error retry
pub mod database;

/// Class group seeding from config.toml
pub mod class_groups;
