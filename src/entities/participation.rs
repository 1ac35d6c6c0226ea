//! Participation entity - One student's seat in one event, plus the
//! missed-lesson contact workflow.
//!
//! Attendance starts out unrecorded (`attended = None`). When a student
//! misses a lesson the contact workflow walks the [`ContactStatus`] state
//! machine; only `MakeupScheduled` may spawn a replacement participation,
//! which points back here through `rescheduled_from`.

use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Participation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "participations")]
pub struct Model {
    /// Unique identifier for the participation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Event this seat belongs to
    pub event_id: i64,
    /// Student occupying the seat
    pub student_id: i64,
    /// Whether the student attended; None until attendance is recorded
    pub attended: Option<bool>,
    /// Free-form note recorded with attendance
    pub observation: Option<String>,
    /// Workbook (apostila) the student is following
    pub workbook: Option<String>,
    /// Page the student reached in the workbook
    pub page: Option<i32>,
    /// Participation this one replaces (reschedule mirror or make-up booking)
    pub rescheduled_from: Option<i64>,
    /// When the student was last contacted about a missed lesson
    pub contacted_at: Option<DateTimeUtc>,
    /// Current contact workflow status, one of [`ContactStatus`]
    pub contact_status: Option<String>,
    /// Free-form note from the contact workflow
    pub contact_note: Option<String>,
    /// Acting account that performed the contact, stamped by the caller
    pub contacted_by: Option<String>,
    /// When the row was deactivated (e.g., superseded by a reschedule)
    pub deactivated_at: Option<DateTimeUtc>,
}

/// Defines relationships between Participation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each participation belongs to one event
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id"
    )]
    Event,
    /// Each participation belongs to one student
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
    /// Each participation may replace one earlier participation
    #[sea_orm(belongs_to = "Entity", from = "Column::RescheduledFrom", to = "Column::Id")]
    ReplacedParticipation,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Contact workflow status for a missed lesson, stored as a string in the
/// `contact_status` column.
///
/// The legal edges are exactly:
///
/// ```text
/// NotAttended      -> AwaitingResponse
/// AwaitingResponse -> OptedNotToMakeup | ClassCanceled | MakeupScheduled | Other
/// MakeupScheduled  -> MakeupAttended | MakeupNoShow | MakeupCanceled
/// ```
///
/// Every other status is terminal. Any requested edge outside this table is
/// rejected by the core with `Error::InvalidTransition`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    /// Student missed the lesson; nobody reached out yet
    NotAttended,
    /// Student was contacted, response pending
    AwaitingResponse,
    /// Student declined a make-up lesson
    OptedNotToMakeup,
    /// The lesson itself was canceled, nothing to make up
    ClassCanceled,
    /// A make-up lesson has been booked
    MakeupScheduled,
    /// Student attended the booked make-up lesson
    MakeupAttended,
    /// Student missed the booked make-up lesson too
    MakeupNoShow,
    /// The booked make-up lesson was called off
    MakeupCanceled,
    /// Outcome outside the usual workflow, see the contact note
    Other,
}

impl ContactStatus {
    /// The column representation of this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotAttended => "not_attended",
            Self::AwaitingResponse => "awaiting_response",
            Self::OptedNotToMakeup => "opted_not_to_makeup",
            Self::ClassCanceled => "class_canceled",
            Self::MakeupScheduled => "makeup_scheduled",
            Self::MakeupAttended => "makeup_attended",
            Self::MakeupNoShow => "makeup_no_show",
            Self::MakeupCanceled => "makeup_canceled",
            Self::Other => "other",
        }
    }

    /// Whether `next` is a legal direct successor of `self`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::NotAttended, Self::AwaitingResponse)
                | (
                    Self::AwaitingResponse,
                    Self::OptedNotToMakeup
                        | Self::ClassCanceled
                        | Self::MakeupScheduled
                        | Self::Other,
                )
                | (
                    Self::MakeupScheduled,
                    Self::MakeupAttended | Self::MakeupNoShow | Self::MakeupCanceled,
                )
        )
    }

    /// Whether no further transition is possible from this status.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::OptedNotToMakeup
                | Self::ClassCanceled
                | Self::Other
                | Self::MakeupAttended
                | Self::MakeupNoShow
                | Self::MakeupCanceled
        )
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_attended" => Ok(Self::NotAttended),
            "awaiting_response" => Ok(Self::AwaitingResponse),
            "opted_not_to_makeup" => Ok(Self::OptedNotToMakeup),
            "class_canceled" => Ok(Self::ClassCanceled),
            "makeup_scheduled" => Ok(Self::MakeupScheduled),
            "makeup_attended" => Ok(Self::MakeupAttended),
            "makeup_no_show" => Ok(Self::MakeupNoShow),
            "makeup_canceled" => Ok(Self::MakeupCanceled),
            "other" => Ok(Self::Other),
            other => Err(Error::InvalidArgument {
                details: format!("Unknown contact status: {other}"),
            }),
        }
    }
}
