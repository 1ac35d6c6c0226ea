//! Event entity - A single scheduled lesson occurrence (evento).
//!
//! An event may be the replacement of an earlier event; `rescheduled_from`
//! carries the back-reference, forming a chain that `core::event` keeps a
//! strict forest (no cycles, one predecessor, one successor). Finalized and
//! rescheduled are mutually exclusive terminal states.

use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Event database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    /// Unique identifier for the event
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Class group this lesson belongs to; None for standalone occurrences
    pub class_group_id: Option<i64>,
    /// What kind of occurrence this is, one of [`EventKind`]
    pub kind: String,
    /// When the lesson starts
    pub starts_at: DateTimeUtc,
    /// Lesson length in minutes
    pub duration_min: i32,
    /// Room the lesson takes place in, if assigned
    pub room: Option<String>,
    /// Maximum number of seats on the roster
    pub capacity: i32,
    /// Whether attendance has been recorded and locked
    pub finalized: bool,
    /// Event this one replaces, when created by a reschedule
    pub rescheduled_from: Option<i64>,
    /// Acting account that created the event, stamped by the caller
    pub created_by: Option<String>,
    /// When the event was deactivated (e.g., superseded by a reschedule)
    pub deactivated_at: Option<DateTimeUtc>,
}

impl Model {
    /// Whether the event is still live: not deactivated and not finalized.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.deactivated_at.is_none() && !self.finalized
    }
}

/// Defines relationships between Event and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each event may belong to one class group
    #[sea_orm(
        belongs_to = "super::class_group::Entity",
        from = "Column::ClassGroupId",
        to = "super::class_group::Column::Id"
    )]
    ClassGroup,
    /// Each event may replace one earlier event
    #[sea_orm(belongs_to = "Entity", from = "Column::RescheduledFrom", to = "Column::Id")]
    ReplacedEvent,
    /// One event has many participations
    #[sea_orm(has_many = "super::participation::Entity")]
    Participations,
}

impl Related<super::class_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassGroup.def()
    }
}

impl Related<super::participation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// The kind of lesson occurrence, stored as a string in the `kind` column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Ordinary weekly lesson of a class group
    Regular,
    /// Make-up lesson (reposição) for students who missed an occurrence
    Makeup,
    /// Introductory "lesson zero" for new students
    ZeroLesson,
    /// Workshop outside the weekly rhythm
    Workshop,
    /// Staff or parent meeting
    Meeting,
    /// Anything else on the calendar
    Extra,
}

impl EventKind {
    /// The column representation of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Makeup => "makeup",
            Self::ZeroLesson => "zero_lesson",
            Self::Workshop => "workshop",
            Self::Meeting => "meeting",
            Self::Extra => "extra",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(Self::Regular),
            "makeup" => Ok(Self::Makeup),
            "zero_lesson" => Ok(Self::ZeroLesson),
            "workshop" => Ok(Self::Workshop),
            "meeting" => Ok(Self::Meeting),
            "extra" => Ok(Self::Extra),
            other => Err(Error::InvalidArgument {
                details: format!("Unknown event kind: {other}"),
            }),
        }
    }
}
