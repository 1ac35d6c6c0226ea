//! Event lifecycle - Creation, rescheduling, chain traversal, finalization.
//!
//! Rescheduling deactivates the source event and creates a replacement that
//! carries a back-reference in `rescheduled_from`. The relation is kept a
//! strict forest: one predecessor, one successor, no cycles, enforced at
//! write time and re-checked defensively during traversal. A finalized event
//! (attendance locked) can never be rescheduled, and a rescheduled event can
//! never be finalized.

use std::collections::HashSet;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait, prelude::DateTimeUtc,
};
use tracing::info;

use crate::{
    entities::{Event, EventKind, Participation, event, participation},
    errors::{Error, Result},
    notify::Notifier,
};

/// Creates a new event.
///
/// Validates that `capacity` is non-negative and `duration_min` positive;
/// both fail with `Error::InvalidArgument`.
pub async fn create_event<C>(
    db: &C,
    class_group_id: Option<i64>,
    kind: EventKind,
    starts_at: DateTimeUtc,
    duration_min: i32,
    room: Option<String>,
    capacity: i32,
    created_by: Option<String>,
) -> Result<event::Model>
where
    C: ConnectionTrait,
{
    if capacity < 0 {
        return Err(Error::InvalidArgument {
            details: format!("event capacity must be non-negative, got {capacity}"),
        });
    }
    if duration_min <= 0 {
        return Err(Error::InvalidArgument {
            details: format!("event duration must be positive, got {duration_min} minutes"),
        });
    }

    event::ActiveModel {
        class_group_id: Set(class_group_id),
        kind: Set(kind.to_string()),
        starts_at: Set(starts_at),
        duration_min: Set(duration_min),
        room: Set(room),
        capacity: Set(capacity),
        finalized: Set(false),
        rescheduled_from: Set(None),
        created_by: Set(created_by),
        deactivated_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// The direct reschedule successor of an event, if one exists.
///
/// More than one successor means the forest invariant was violated outside
/// this module; that is reported as `Error::CycleDetected`.
pub async fn find_successor<C>(db: &C, event_id: i64) -> Result<Option<event::Model>>
where
    C: ConnectionTrait,
{
    let successors = Event::find()
        .filter(event::Column::RescheduledFrom.eq(event_id))
        .all(db)
        .await?;

    if successors.len() > 1 {
        return Err(Error::CycleDetected { event_id });
    }
    Ok(successors.into_iter().next())
}

/// Reschedules an event to a new date (and optionally a new room).
///
/// Fails with `Error::SourceFinalized` when attendance on the source is
/// already locked, and `Error::SourceAlreadyRescheduled` when the source
/// is deactivated or already has a successor. In one transaction the source
/// is deactivated, a replacement event is inserted with the back-reference,
/// and every active participation is mirrored onto the replacement (student,
/// workbook, and page carried over) while the originals are deactivated.
/// Notification is fire-and-forget after commit.
pub async fn reschedule_event(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    source_event_id: i64,
    new_starts_at: DateTimeUtc,
    new_room: Option<String>,
    created_by: Option<String>,
) -> Result<event::Model> {
    let txn = db.begin().await?;

    let source = Event::find_by_id(source_event_id)
        .one(&txn)
        .await?
        .ok_or(Error::EventNotFound {
            id: source_event_id,
        })?;

    if source.finalized {
        return Err(Error::SourceFinalized {
            event_id: source.id,
        });
    }
    if source.deactivated_at.is_some() || find_successor(&txn, source.id).await?.is_some() {
        return Err(Error::SourceAlreadyRescheduled {
            event_id: source.id,
        });
    }

    let now = chrono::Utc::now();

    let replacement = event::ActiveModel {
        class_group_id: Set(source.class_group_id),
        kind: Set(source.kind.clone()),
        starts_at: Set(new_starts_at),
        duration_min: Set(source.duration_min),
        room: Set(new_room.or_else(|| source.room.clone())),
        capacity: Set(source.capacity),
        finalized: Set(false),
        rescheduled_from: Set(Some(source.id)),
        created_by: Set(created_by),
        deactivated_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut deactivated_source: event::ActiveModel = source.clone().into();
    deactivated_source.deactivated_at = Set(Some(now));
    deactivated_source.update(&txn).await?;

    // Mirror the roster: the replacement inherits every active seat with its
    // workbook progress; the source seats are closed out.
    let roster = Participation::find()
        .filter(participation::Column::EventId.eq(source.id))
        .filter(participation::Column::DeactivatedAt.is_null())
        .all(&txn)
        .await?;

    for seat in &roster {
        participation::ActiveModel {
            event_id: Set(replacement.id),
            student_id: Set(seat.student_id),
            attended: Set(None),
            workbook: Set(seat.workbook.clone()),
            page: Set(seat.page),
            rescheduled_from: Set(Some(seat.id)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut closed: participation::ActiveModel = seat.clone().into();
        closed.deactivated_at = Set(Some(now));
        closed.update(&txn).await?;
    }

    txn.commit().await?;

    info!(
        source_event = source.id,
        replacement_event = replacement.id,
        moved_seats = roster.len(),
        "Event rescheduled"
    );
    notifier.event_rescheduled(&source, &replacement, roster.len());

    Ok(replacement)
}

/// The full reschedule chain containing `event_id`, ordered earliest to
/// latest.
///
/// Walks `rescheduled_from` back to the root, then forward through the
/// reverse index to the newest descendant. Any revisited node (or a node
/// with two successors) fails with `Error::CycleDetected`; with
/// [`reschedule_event`] enforcing single successors this is a defensive
/// check only.
pub async fn resolve_chain<C>(db: &C, event_id: i64) -> Result<Vec<event::Model>>
where
    C: ConnectionTrait,
{
    let mut root = Event::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or(Error::EventNotFound { id: event_id })?;

    let mut seen_backward = HashSet::from([root.id]);
    while let Some(prev_id) = root.rescheduled_from {
        if !seen_backward.insert(prev_id) {
            return Err(Error::CycleDetected { event_id: prev_id });
        }
        root = Event::find_by_id(prev_id)
            .one(db)
            .await?
            .ok_or(Error::EventNotFound { id: prev_id })?;
    }

    let mut seen_forward = HashSet::from([root.id]);
    let mut cursor_id = root.id;
    let mut chain = vec![root];
    while let Some(next) = find_successor(db, cursor_id).await? {
        if !seen_forward.insert(next.id) {
            return Err(Error::CycleDetected { event_id: next.id });
        }
        cursor_id = next.id;
        chain.push(next);
    }

    Ok(chain)
}

/// Marks an event finalized, locking its attendance.
///
/// Fails with `Error::EventNotFinalizable` when the event is deactivated
/// (rescheduled), already finalized, or still has active seats with
/// unrecorded attendance.
pub async fn finalize_event(db: &DatabaseConnection, event_id: i64) -> Result<event::Model> {
    let txn = db.begin().await?;

    let event = Event::find_by_id(event_id)
        .one(&txn)
        .await?
        .ok_or(Error::EventNotFound { id: event_id })?;

    if event.deactivated_at.is_some() {
        return Err(Error::EventNotFinalizable {
            event_id,
            reason: "event was rescheduled".to_string(),
        });
    }
    if event.finalized {
        return Err(Error::EventNotFinalizable {
            event_id,
            reason: "event is already finalized".to_string(),
        });
    }

    let unrecorded = Participation::find()
        .filter(participation::Column::EventId.eq(event_id))
        .filter(participation::Column::DeactivatedAt.is_null())
        .filter(participation::Column::Attended.is_null())
        .count(&txn)
        .await?;
    if unrecorded > 0 {
        return Err(Error::EventNotFinalizable {
            event_id,
            reason: format!("{unrecorded} seat(s) have unrecorded attendance"),
        });
    }

    let mut active: event::ActiveModel = event.into();
    active.finalized = Set(true);
    let finalized = active.update(&txn).await?;

    txn.commit().await?;
    info!(event = event_id, "Event finalized");

    Ok(finalized)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::participation::{add_participation, record_attendance};
    use crate::notify::NullNotifier;
    use crate::test_utils::*;
    use chrono::{TimeZone, Utc};
    use sea_orm::Unchanged;

    #[tokio::test]
    async fn test_create_event_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let starts_at = Utc.with_ymd_and_hms(2026, 3, 10, 10, 0, 0).unwrap();

        let result =
            create_event(&db, None, EventKind::Regular, starts_at, 60, None, -1, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidArgument { details: _ }
        ));

        let result =
            create_event(&db, None, EventKind::Regular, starts_at, 0, None, 5, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidArgument { details: _ }
        ));

        let event =
            create_event(&db, None, EventKind::Regular, starts_at, 60, None, 5, None).await?;
        assert!(event.is_scheduled());
        assert_eq!(event.kind, "regular");

        Ok(())
    }

    #[tokio::test]
    async fn test_reschedule_moves_roster() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, 5).await?;
        let ana = create_test_student(&db, "Ana").await?;
        let bia = create_test_student(&db, "Bia").await?;
        let seat_ana = add_participation(&db, event.id, ana.id).await?;
        add_participation(&db, event.id, bia.id).await?;
        record_attendance(&db, seat_ana.id, true, Some("Book 2".to_string()), Some(14), None)
            .await?;

        let new_start = Utc.with_ymd_and_hms(2026, 3, 17, 10, 0, 0).unwrap();
        let replacement = reschedule_event(
            &db,
            &NullNotifier,
            event.id,
            new_start,
            Some("Room B".to_string()),
            Some("coordinator".to_string()),
        )
        .await?;

        assert_eq!(replacement.rescheduled_from, Some(event.id));
        assert_eq!(replacement.room.as_deref(), Some("Room B"));
        assert_eq!(replacement.capacity, event.capacity);

        // Source is deactivated, its seats closed out
        let source = Event::find_by_id(event.id).one(&db).await?.unwrap();
        assert!(source.deactivated_at.is_some());
        assert_eq!(crate::core::capacity::event_seats_taken(&db, event.id).await?, 0);

        // The replacement roster mirrors students and workbook progress
        let mirrored = Participation::find()
            .filter(participation::Column::EventId.eq(replacement.id))
            .all(&db)
            .await?;
        assert_eq!(mirrored.len(), 2);
        let ana_seat = mirrored.iter().find(|p| p.student_id == ana.id).unwrap();
        assert_eq!(ana_seat.workbook.as_deref(), Some("Book 2"));
        assert_eq!(ana_seat.page, Some(14));
        assert_eq!(ana_seat.attended, None);
        assert_eq!(ana_seat.rescheduled_from, Some(seat_ana.id));

        Ok(())
    }

    #[tokio::test]
    async fn test_double_reschedule_fails() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, 5).await?;
        let new_start = Utc.with_ymd_and_hms(2026, 3, 17, 10, 0, 0).unwrap();

        reschedule_event(&db, &NullNotifier, event.id, new_start, None, None).await?;

        let result =
            reschedule_event(&db, &NullNotifier, event.id, new_start, None, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::SourceAlreadyRescheduled { event_id } if event_id == event.id
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_reschedule_finalized_fails() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, 5).await?;
        finalize_event(&db, event.id).await?;

        let new_start = Utc.with_ymd_and_hms(2026, 3, 17, 10, 0, 0).unwrap();
        let result =
            reschedule_event(&db, &NullNotifier, event.id, new_start, None, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::SourceFinalized { event_id } if event_id == event.id
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_chain_from_any_node() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_event(&db, 5).await?;
        let b = reschedule_event(
            &db,
            &NullNotifier,
            a.id,
            Utc.with_ymd_and_hms(2026, 3, 17, 10, 0, 0).unwrap(),
            None,
            None,
        )
        .await?;
        let c = reschedule_event(
            &db,
            &NullNotifier,
            b.id,
            Utc.with_ymd_and_hms(2026, 3, 24, 10, 0, 0).unwrap(),
            None,
            None,
        )
        .await?;

        for queried in [a.id, b.id, c.id] {
            let chain = resolve_chain(&db, queried).await?;
            let ids: Vec<i64> = chain.iter().map(|e| e.id).collect();
            assert_eq!(ids, vec![a.id, b.id, c.id]);
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_chain_single_event() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, 5).await?;

        let chain = resolve_chain(&db, event.id).await?;
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].id, event.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_chain_detects_cycle() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_event(&db, 5).await?;
        let b = reschedule_event(
            &db,
            &NullNotifier,
            a.id,
            Utc.with_ymd_and_hms(2026, 3, 17, 10, 0, 0).unwrap(),
            None,
            None,
        )
        .await?;

        // Corrupt the forest behind the engine's back: point A back at B
        let corrupted = event::ActiveModel {
            id: Unchanged(a.id),
            rescheduled_from: Set(Some(b.id)),
            ..Default::default()
        };
        corrupted.update(&db).await?;

        let result = resolve_chain(&db, a.id).await;
        assert!(matches!(result.unwrap_err(), Error::CycleDetected { event_id: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_finalize_requires_recorded_attendance() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, 5).await?;
        let ana = create_test_student(&db, "Ana").await?;
        let seat = add_participation(&db, event.id, ana.id).await?;

        let result = finalize_event(&db, event.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::EventNotFinalizable { event_id: _, reason: _ }
        ));

        record_attendance(&db, seat.id, true, None, None, None).await?;
        let finalized = finalize_event(&db, event.id).await?;
        assert!(finalized.finalized);

        // Terminal: a second finalize fails too
        let result = finalize_event(&db, event.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::EventNotFinalizable { event_id: _, reason: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_finalize_rescheduled_fails() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, 5).await?;
        reschedule_event(
            &db,
            &NullNotifier,
            event.id,
            Utc.with_ymd_and_hms(2026, 3, 17, 10, 0, 0).unwrap(),
            None,
            None,
        )
        .await?;

        let result = finalize_event(&db, event.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::EventNotFinalizable { event_id: _, reason: _ }
        ));

        Ok(())
    }
}
