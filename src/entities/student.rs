//! Student entity - A person enrolled with the studio.
//!
//! Students relate to classes through enrollment validity intervals and to
//! individual lessons through participations. Rows are soft-deleted via
//! `deactivated_at`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Student database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    /// Unique identifier for the student
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full name
    pub name: String,
    /// Contact e-mail, if known
    pub email: Option<String>,
    /// When the student record was deactivated; None while active
    pub deactivated_at: Option<DateTimeUtc>,
}

/// Defines relationships between Student and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One student has many enrollment intervals
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollments,
    /// One student has many event participations
    #[sea_orm(has_many = "super::participation::Entity")]
    Participations,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl Related<super::participation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
