//! Capacity checking - Pure seat arithmetic plus live occupancy recomputes.
//!
//! `has_capacity` is the single decision point for "does another seat fit".
//! Occupancy is always recomputed from current rows immediately before the
//! check, never read from a cached counter; concurrent enrollment changes
//! would otherwise leak seats past the limit.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, prelude::Date};

use crate::{
    core::enrollment,
    entities::{Participation, participation},
    errors::{Error, Result},
};

/// Whether `requested` additional seats fit next to `occupied` seats under
/// `max_capacity`, i.e. `(max_capacity - occupied) >= requested`.
///
/// Zero requested seats trivially fit. Negative `requested` is rejected with
/// `Error::InvalidArgument`.
pub fn has_capacity(max_capacity: i64, occupied: i64, requested: i64) -> Result<bool> {
    if requested < 0 {
        return Err(Error::InvalidArgument {
            details: format!("requested seats must be non-negative, got {requested}"),
        });
    }

    Ok(max_capacity - occupied >= requested)
}

/// Number of active (non-deactivated) participations on the event roster.
pub async fn event_seats_taken<C>(db: &C, event_id: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    let count = Participation::find()
        .filter(participation::Column::EventId.eq(event_id))
        .filter(participation::Column::DeactivatedAt.is_null())
        .count(db)
        .await?;

    Ok(count as i64)
}

/// Number of enrollment seats taken in the class group on the given date.
pub async fn class_seats_taken<C>(db: &C, class_group_id: i64, on: Date) -> Result<i64>
where
    C: ConnectionTrait,
{
    enrollment::active_enrollment_count(db, class_group_id, on).await
}
