//! Class group seeding from config.toml.
//!
//! Staff describe the weekly class grid in a TOML file; on startup the
//! groups that are not in the database yet are created. Seeding is keyed by
//! group name and idempotent, so restarting never duplicates a group.

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use serde::Deserialize;
use tracing::info;

use crate::entities::{ClassGroup, class_group};
use crate::errors::{Error, Result};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// List of class groups to seed
    #[serde(default)]
    pub class_groups: Vec<ClassGroupConfig>,
}

/// Configuration for a single class group
#[derive(Debug, Deserialize, Clone)]
pub struct ClassGroupConfig {
    /// Display name; also the idempotency key for seeding
    pub name: String,
    /// Weekday of the slot, 0 = Monday through 6 = Sunday
    pub weekday: i32,
    /// Time of day the class starts, `"HH:MM"`
    pub start_time: String,
    /// Maximum number of simultaneously enrolled students
    pub max_capacity: i32,
    /// Teacher responsible for the group
    pub teacher: String,
    /// Room the class meets in
    pub room: Option<String>,
    /// Cognitive/age-profile tag
    pub cognitive_profile: Option<String>,
}

impl ClassGroupConfig {
    /// Validates the entry and parses its start time.
    fn parsed_start_time(&self) -> Result<NaiveTime> {
        if !(0..=6).contains(&self.weekday) {
            return Err(Error::Config {
                message: format!(
                    "class group '{}' has weekday {}, expected 0-6",
                    self.name, self.weekday
                ),
            });
        }
        if self.max_capacity < 0 {
            return Err(Error::Config {
                message: format!(
                    "class group '{}' has negative max_capacity {}",
                    self.name, self.max_capacity
                ),
            });
        }
        NaiveTime::from_str(&self.start_time).map_err(|e| Error::Config {
            message: format!(
                "class group '{}' has unparseable start_time '{}': {e}",
                self.name, self.start_time
            ),
        })
    }
}

/// Loads class group configuration from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads class group configuration from the default location (./config.toml).
pub fn load_default_config() -> Result<Config> {
    load_config("config.toml")
}

/// Creates every configured class group that does not exist yet (matched by
/// name among active groups). Returns how many were created.
pub async fn seed_class_groups(db: &DatabaseConnection, config: &Config) -> Result<usize> {
    let mut created = 0;

    for entry in &config.class_groups {
        let start_time = entry.parsed_start_time()?;

        let existing = ClassGroup::find()
            .filter(class_group::Column::Name.eq(&entry.name))
            .filter(class_group::Column::DeactivatedAt.is_null())
            .count(db)
            .await?;
        if existing > 0 {
            continue;
        }

        class_group::ActiveModel {
            name: Set(entry.name.clone()),
            weekday: Set(entry.weekday),
            start_time: Set(start_time),
            max_capacity: Set(entry.max_capacity),
            room: Set(entry.room.clone()),
            teacher: Set(entry.teacher.clone()),
            cognitive_profile: Set(entry.cognitive_profile.clone()),
            deactivated_at: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(name = %entry.name, "Seeded class group");
        created += 1;
    }

    Ok(created)
}
