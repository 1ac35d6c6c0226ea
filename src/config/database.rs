//! Database configuration module.
//!
//! Handles `SQLite` connection and table creation using `SeaORM`'s
//! `Schema::create_table_from_entity`, so the schema always matches the
//! entity definitions without manual SQL. Also provides `retry_transient`,
//! the bounded-retry wrapper for transient connection failures; scheduling
//! rule violations are deterministic and are never retried.

use std::time::Duration;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};
use tracing::warn;

use crate::entities::{ClassGroup, Enrollment, Event, Participation, Student};
use crate::errors::{Error, Result};

/// Retry policy for transient database errors.
const MAX_ATTEMPTS: u32 = 3;
const BACKOFF: Duration = Duration::from_millis(50);

/// Gets the database URL from the environment or falls back to the default
/// local `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/studio_scheduler.sqlite".to_string())
}

/// Establishes a connection using [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url())
        .await
        .map_err(Into::into)
}

/// Creates all tables from the entity definitions.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let student_table = schema.create_table_from_entity(Student);
    let class_group_table = schema.create_table_from_entity(ClassGroup);
    let enrollment_table = schema.create_table_from_entity(Enrollment);
    let event_table = schema.create_table_from_entity(Event);
    let participation_table = schema.create_table_from_entity(Participation);

    db.execute(builder.build(&student_table)).await?;
    db.execute(builder.build(&class_group_table)).await?;
    db.execute(builder.build(&enrollment_table)).await?;
    db.execute(builder.build(&event_table)).await?;
    db.execute(builder.build(&participation_table)).await?;

    Ok(())
}

/// Runs `op`, retrying up to [`MAX_ATTEMPTS`] times with linear backoff when
/// it fails with a transient connection-level error.
///
/// Business-rule errors pass straight through: they are deterministic, so a
/// retry can only reproduce them.
pub async fn retry_transient<T, F, Fut>(op_name: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(Error::Database(err)) if attempt < MAX_ATTEMPTS && is_transient(&err) => {
                warn!(
                    op = op_name,
                    attempt,
                    error = %err,
                    "Transient database error, retrying"
                );
                tokio::time::sleep(BACKOFF * attempt).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// Connection-level failures worth retrying; everything else is not.
fn is_transient(err: &DbErr) -> bool {
    matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
}
