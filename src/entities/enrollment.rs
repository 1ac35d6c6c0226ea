//! Enrollment entity - A validity interval (vigência) tying a student to a
//! class group.
//!
//! `ends_on = None` means the enrollment is open-ended. A student who leaves
//! and later rejoins gets a fresh row; intervals for the same (student,
//! class) pair never overlap, which `core::enrollment` enforces on write.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Enrollment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    /// Unique identifier for the enrollment interval
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Student this interval belongs to
    pub student_id: i64,
    /// Class group this interval belongs to
    pub class_group_id: i64,
    /// First day the enrollment is valid
    pub starts_on: Date,
    /// Last day the enrollment is valid (inclusive); None while open-ended
    pub ends_on: Option<Date>,
}

impl Model {
    /// Whether this interval covers the given date.
    #[must_use]
    pub fn covers(&self, on: Date) -> bool {
        self.starts_on <= on && self.ends_on.is_none_or(|end| end >= on)
    }

    /// Whether this interval is still open-ended.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.ends_on.is_none()
    }
}

/// Defines relationships between Enrollment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each enrollment belongs to one student
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
    /// Each enrollment belongs to one class group
    #[sea_orm(
        belongs_to = "super::class_group::Entity",
        from = "Column::ClassGroupId",
        to = "super::class_group::Column::Id"
    )]
    ClassGroup,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::class_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassGroup.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> Date {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_covers_closed_interval() {
        let row = Model {
            id: 1,
            student_id: 1,
            class_group_id: 1,
            starts_on: day(5),
            ends_on: Some(day(10)),
        };

        assert!(!row.covers(day(4)));
        assert!(row.covers(day(5)));
        assert!(row.covers(day(10)));
        assert!(!row.covers(day(11)));
        assert!(!row.is_open());
    }

    #[test]
    fn test_covers_open_interval() {
        let row = Model {
            id: 1,
            student_id: 1,
            class_group_id: 1,
            starts_on: day(5),
            ends_on: None,
        };

        assert!(!row.covers(day(4)));
        assert!(row.covers(day(5)));
        assert!(row.covers(day(28)));
        assert!(row.is_open());
    }
}
