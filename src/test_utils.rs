//! Shared test utilities.
//!
//! Helper functions for setting up an in-memory `SQLite` database and
//! creating test entities with sensible defaults.

#![allow(clippy::unwrap_used)]

use chrono::{NaiveTime, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use crate::{
    core::{event, participation},
    entities::{self, EventKind},
    errors::Result,
};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test student with no e-mail.
pub async fn create_test_student(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::student::Model> {
    entities::student::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a test class group with capacity 5 on Monday 14:00.
pub async fn create_test_class_group(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::class_group::Model> {
    create_test_class_group_with_capacity(db, name, 5).await
}

/// Creates a test class group with a custom seat limit.
pub async fn create_test_class_group_with_capacity(
    db: &DatabaseConnection,
    name: &str,
    max_capacity: i32,
) -> Result<entities::class_group::Model> {
    entities::class_group::ActiveModel {
        name: Set(name.to_string()),
        weekday: Set(0),
        start_time: Set(NaiveTime::from_hms_opt(14, 0, 0).unwrap()),
        max_capacity: Set(max_capacity),
        teacher: Set("Test Teacher".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a standalone regular test event on 2026-03-10 10:00, one hour
/// long, with the given capacity.
pub async fn create_test_event(
    db: &DatabaseConnection,
    capacity: i32,
) -> Result<entities::event::Model> {
    event::create_event(
        db,
        None,
        EventKind::Regular,
        Utc.with_ymd_and_hms(2026, 3, 10, 10, 0, 0).unwrap(),
        60,
        None,
        capacity,
        None,
    )
    .await
}

/// Soft-deletes a participation directly, bypassing the core flows.
pub async fn deactivate_participation(db: &DatabaseConnection, participation_id: i64) -> Result<()> {
    let seat = entities::participation::ActiveModel {
        id: sea_orm::Unchanged(participation_id),
        deactivated_at: Set(Some(Utc::now())),
        ..Default::default()
    };
    seat.update(db).await?;
    Ok(())
}

/// Sets up a database with one class group and one student.
/// Returns (db, class group, student) for enrollment tests.
pub async fn setup_with_class_and_student() -> Result<(
    DatabaseConnection,
    entities::class_group::Model,
    entities::student::Model,
)> {
    let db = setup_test_db().await?;
    let group = create_test_class_group(&db, "Test Class").await?;
    let student = create_test_student(&db, "Test Student").await?;
    Ok((db, group, student))
}

/// Sets up a lesson one student has already missed: attendance recorded as
/// absent, contact workflow seeded at `NotAttended`.
/// Returns (db, event, participation).
pub async fn setup_with_missed_lesson() -> Result<(
    DatabaseConnection,
    entities::event::Model,
    entities::participation::Model,
)> {
    let db = setup_test_db().await?;
    let event = create_test_event(&db, 5).await?;
    let student = create_test_student(&db, "Test Student").await?;
    let seat = participation::add_participation(&db, event.id, student.id).await?;
    let seat = participation::record_attendance(&db, seat.id, false, None, None, None).await?;
    Ok((db, event, seat))
}
