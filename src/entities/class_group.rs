//! Class group entity - A recurring weekly class (turma).
//!
//! A class group owns a weekday/time slot, a room, a teacher, and a seat
//! limit. Enrollment intervals reference it; lesson events may reference it.
//! Groups are deactivated, never hard-deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Class group database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "class_groups")]
pub struct Model {
    /// Unique identifier for the class group
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Tuesday intermediate")
    pub name: String,
    /// Weekday of the recurring slot, 0 = Monday through 6 = Sunday
    pub weekday: i32,
    /// Time of day the class starts
    pub start_time: Time,
    /// Maximum number of simultaneously enrolled students
    pub max_capacity: i32,
    /// Room the class meets in, if assigned
    pub room: Option<String>,
    /// Name of the teacher responsible for the group
    pub teacher: String,
    /// Cognitive/age-profile tag, classification metadata only
    pub cognitive_profile: Option<String>,
    /// When the group was discontinued; None while active
    pub deactivated_at: Option<DateTimeUtc>,
}

/// Defines relationships between ClassGroup and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One class group has many enrollment intervals
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollments,
    /// One class group has many scheduled events
    #[sea_orm(has_many = "super::event::Entity")]
    Events,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
