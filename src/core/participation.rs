//! Participation handling - Roster seats, attendance recording, and the
//! missed-lesson contact workflow.
//!
//! The contact workflow is a strict state machine over
//! [`ContactStatus`](crate::entities::ContactStatus); every requested edge is
//! checked against the transition table and anything else is rejected. A
//! make-up booking is the only transition allowed to create a replacement
//! participation, and it re-checks destination capacity inside the same
//! transaction that writes both rows.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use tracing::info;

use crate::{
    core::capacity,
    entities::{ContactStatus, Event, Participation, participation},
    errors::{Error, Result},
    notify::Notifier,
};

/// Adds a student to an event's roster.
///
/// The event must be live (not deactivated, not finalized), the student must
/// not already hold an active seat, and a seat must fit under the event's
/// capacity; occupancy is recomputed inside the transaction.
pub async fn add_participation(
    db: &DatabaseConnection,
    event_id: i64,
    student_id: i64,
) -> Result<participation::Model> {
    let txn = db.begin().await?;

    let event = Event::find_by_id(event_id)
        .one(&txn)
        .await?
        .ok_or(Error::EventNotFound { id: event_id })?;
    if !event.is_scheduled() {
        return Err(Error::InvalidArgument {
            details: format!("event {event_id} is finalized or deactivated"),
        });
    }

    let duplicate = Participation::find()
        .filter(participation::Column::EventId.eq(event_id))
        .filter(participation::Column::StudentId.eq(student_id))
        .filter(participation::Column::DeactivatedAt.is_null())
        .count(&txn)
        .await?;
    if duplicate > 0 {
        return Err(Error::InvalidArgument {
            details: format!("student {student_id} is already on the roster of event {event_id}"),
        });
    }

    let occupied = capacity::event_seats_taken(&txn, event_id).await?;
    if !capacity::has_capacity(i64::from(event.capacity), occupied, 1)? {
        return Err(Error::DestCapacityExceeded { event_id });
    }

    let seat = participation::ActiveModel {
        event_id: Set(event_id),
        student_id: Set(student_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(seat)
}

/// Records attendance (and workbook progress) on a participation.
///
/// Fails with `Error::EventNotFinalizable` when the participation or its
/// event was superseded by a reschedule, or when the event is already
/// finalized (attendance locked). Marking a student absent seeds the contact
/// workflow at `NotAttended`; marking attendance on a make-up seat writes
/// the outcome (`MakeupAttended` / `MakeupNoShow`) back onto the original
/// participation in the same transaction.
pub async fn record_attendance(
    db: &DatabaseConnection,
    participation_id: i64,
    attended: bool,
    workbook: Option<String>,
    page: Option<i32>,
    observation: Option<String>,
) -> Result<participation::Model> {
    let txn = db.begin().await?;

    let seat = Participation::find_by_id(participation_id)
        .one(&txn)
        .await?
        .ok_or(Error::ParticipationNotFound {
            id: participation_id,
        })?;

    let event = Event::find_by_id(seat.event_id)
        .one(&txn)
        .await?
        .ok_or(Error::EventNotFound { id: seat.event_id })?;
    if seat.deactivated_at.is_some() || event.deactivated_at.is_some() {
        return Err(Error::EventNotFinalizable {
            event_id: event.id,
            reason: "participation was superseded by a reschedule".to_string(),
        });
    }
    if event.finalized {
        return Err(Error::EventNotFinalizable {
            event_id: event.id,
            reason: "attendance is locked".to_string(),
        });
    }

    let mut active: participation::ActiveModel = seat.clone().into();
    active.attended = Set(Some(attended));
    if workbook.is_some() {
        active.workbook = Set(workbook);
    }
    if page.is_some() {
        active.page = Set(page);
    }
    if observation.is_some() {
        active.observation = Set(observation);
    }
    if !attended && seat.contact_status.is_none() {
        active.contact_status = Set(Some(ContactStatus::NotAttended.to_string()));
    }
    let updated = active.update(&txn).await?;

    // A make-up seat resolves the original's workflow: attended closes it as
    // MakeupAttended, another miss as MakeupNoShow.
    if let Some(original_id) = seat.rescheduled_from
        && let Some(original) = Participation::find_by_id(original_id).one(&txn).await?
        && original.deactivated_at.is_none()
        && original.contact_status.as_deref() == Some(ContactStatus::MakeupScheduled.as_str())
    {
        let outcome = if attended {
            ContactStatus::MakeupAttended
        } else {
            ContactStatus::MakeupNoShow
        };
        let mut original: participation::ActiveModel = original.into();
        original.contact_status = Set(Some(outcome.to_string()));
        original.update(&txn).await?;
    }

    txn.commit().await?;
    Ok(updated)
}

/// Advances the contact workflow of a missed lesson to `new_status`.
///
/// Fails with `Error::AlreadyAttended` when the student attended (the
/// workflow is closed for good) and `Error::InvalidTransition` when the
/// participation is deactivated, has no current status, or the requested
/// edge is not in the transition table. Stamps `contacted_at` and the acting
/// account on success.
pub async fn advance_contact_status(
    db: &DatabaseConnection,
    participation_id: i64,
    new_status: ContactStatus,
    note: Option<String>,
    contacted_by: Option<String>,
) -> Result<participation::Model> {
    let txn = db.begin().await?;

    let seat = Participation::find_by_id(participation_id)
        .one(&txn)
        .await?
        .ok_or(Error::ParticipationNotFound {
            id: participation_id,
        })?;

    let current = validate_transition(&seat, new_status)?;

    let mut active: participation::ActiveModel = seat.into();
    active.contact_status = Set(Some(new_status.to_string()));
    active.contacted_at = Set(Some(chrono::Utc::now()));
    if note.is_some() {
        active.contact_note = Set(note);
    }
    if contacted_by.is_some() {
        active.contacted_by = Set(contacted_by);
    }
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    info!(
        participation = participation_id,
        from = current.as_str(),
        to = new_status.as_str(),
        "Contact status advanced"
    );

    Ok(updated)
}

/// Books a make-up lesson for a missed participation.
///
/// The original must be able to transition into `MakeupScheduled` (same
/// rules as [`advance_contact_status`]) and the destination event must be
/// live with a free seat; occupancy is recomputed inside the transaction and
/// a full destination fails with `Error::DestCapacityExceeded`. On success
/// the original moves to `MakeupScheduled` and a new participation on the
/// destination is created with `rescheduled_from` pointing back at it.
/// Notification is fire-and-forget after commit.
pub async fn schedule_makeup(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    participation_id: i64,
    dest_event_id: i64,
    note: Option<String>,
    contacted_by: Option<String>,
) -> Result<participation::Model> {
    let txn = db.begin().await?;

    let original = Participation::find_by_id(participation_id)
        .one(&txn)
        .await?
        .ok_or(Error::ParticipationNotFound {
            id: participation_id,
        })?;

    validate_transition(&original, ContactStatus::MakeupScheduled)?;

    let dest = Event::find_by_id(dest_event_id)
        .one(&txn)
        .await?
        .ok_or(Error::EventNotFound { id: dest_event_id })?;
    if !dest.is_scheduled() {
        return Err(Error::InvalidArgument {
            details: format!("destination event {dest_event_id} is finalized or deactivated"),
        });
    }

    let occupied = capacity::event_seats_taken(&txn, dest_event_id).await?;
    if !capacity::has_capacity(i64::from(dest.capacity), occupied, 1)? {
        return Err(Error::DestCapacityExceeded {
            event_id: dest_event_id,
        });
    }

    let mut updated_original: participation::ActiveModel = original.clone().into();
    updated_original.contact_status = Set(Some(ContactStatus::MakeupScheduled.to_string()));
    updated_original.contacted_at = Set(Some(chrono::Utc::now()));
    if note.is_some() {
        updated_original.contact_note = Set(note);
    }
    if contacted_by.is_some() {
        updated_original.contacted_by = Set(contacted_by);
    }
    updated_original.update(&txn).await?;

    let makeup_seat = participation::ActiveModel {
        event_id: Set(dest_event_id),
        student_id: Set(original.student_id),
        workbook: Set(original.workbook.clone()),
        page: Set(original.page),
        rescheduled_from: Set(Some(original.id)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        original_participation = original.id,
        makeup_participation = makeup_seat.id,
        dest_event = dest_event_id,
        "Make-up lesson booked"
    );
    notifier.makeup_scheduled(&original, &makeup_seat, &dest);

    Ok(makeup_seat)
}

/// Checks that `seat` may move to `new_status`; returns the current status.
fn validate_transition(
    seat: &participation::Model,
    new_status: ContactStatus,
) -> Result<ContactStatus> {
    if seat.attended == Some(true) {
        return Err(Error::AlreadyAttended {
            participation_id: seat.id,
        });
    }
    if seat.deactivated_at.is_some() {
        return Err(Error::InvalidTransition {
            from: "deactivated participation".to_string(),
            to: new_status.to_string(),
        });
    }
    let current = match &seat.contact_status {
        Some(raw) => raw.parse::<ContactStatus>()?,
        None => {
            return Err(Error::InvalidTransition {
                from: "unset".to_string(),
                to: new_status.to_string(),
            });
        }
    };
    if !current.can_transition_to(new_status) {
        return Err(Error::InvalidTransition {
            from: current.to_string(),
            to: new_status.to_string(),
        });
    }
    Ok(current)
}
