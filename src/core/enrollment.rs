//! Enrollment validity tracking - Opens, closes, and queries the intervals
//! during which a student's enrollment in a class group is active.
//!
//! The invariant maintained here: for one (student, class) pair the
//! intervals never overlap and at most one is open-ended. A new interval is
//! always open-ended, so it conflicts with any interval that has no end date
//! or whose end date falls on or after the new start. Capacity bookkeeping
//! is deliberately not done here; callers recompute occupancy through
//! `core::capacity` right before allocating seats.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait, prelude::Date,
};

use crate::{
    entities::{Enrollment, enrollment},
    errors::{Error, Result},
};

/// Whether a new open-ended interval starting at `candidate_start` would
/// overlap any of the `existing` `(starts_on, ends_on)` intervals.
///
/// Open-ended existing intervals always conflict; closed ones conflict when
/// they end on or after the candidate start (dates are inclusive on both
/// ends).
#[must_use]
pub fn interval_conflicts(existing: &[(Date, Option<Date>)], candidate_start: Date) -> bool {
    existing
        .iter()
        .any(|(_, ends_on)| ends_on.is_none_or(|end| end >= candidate_start))
}

/// Opens a new enrollment interval for a student in a class group.
///
/// The interval starts open-ended; it is closed later by
/// [`close_enrollment`] when the student leaves or transfers. Fails with
/// `Error::OverlapViolation` when the pair already has an open interval or
/// any existing interval would overlap the new one. The check and the insert
/// run in one transaction so concurrent joins cannot both pass.
pub async fn open_enrollment(
    db: &DatabaseConnection,
    student_id: i64,
    class_group_id: i64,
    starts_on: Date,
) -> Result<enrollment::Model> {
    let txn = db.begin().await?;

    let existing = Enrollment::find()
        .filter(enrollment::Column::StudentId.eq(student_id))
        .filter(enrollment::Column::ClassGroupId.eq(class_group_id))
        .all(&txn)
        .await?;

    let intervals: Vec<(Date, Option<Date>)> =
        existing.iter().map(|e| (e.starts_on, e.ends_on)).collect();
    if interval_conflicts(&intervals, starts_on) {
        return Err(Error::OverlapViolation {
            details: format!(
                "student {student_id} already has a validity interval reaching {starts_on} \
                 in class group {class_group_id}"
            ),
        });
    }

    let created = enrollment::ActiveModel {
        student_id: Set(student_id),
        class_group_id: Set(class_group_id),
        starts_on: Set(starts_on),
        ends_on: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(created)
}

/// Closes an open enrollment interval on the given end date (inclusive).
///
/// Fails with `Error::InvalidRange` when `ends_on` precedes the interval's
/// start or the interval is already closed; re-closing would rewrite history
/// and could reintroduce overlaps with later intervals.
pub async fn close_enrollment(
    db: &DatabaseConnection,
    enrollment_id: i64,
    ends_on: Date,
) -> Result<enrollment::Model> {
    let txn = db.begin().await?;

    let interval = Enrollment::find_by_id(enrollment_id)
        .one(&txn)
        .await?
        .ok_or(Error::EnrollmentNotFound { id: enrollment_id })?;

    if interval.ends_on.is_some() {
        return Err(Error::InvalidRange {
            details: format!("enrollment {enrollment_id} is already closed"),
        });
    }
    if ends_on < interval.starts_on {
        return Err(Error::InvalidRange {
            details: format!(
                "end date {ends_on} precedes start date {} of enrollment {enrollment_id}",
                interval.starts_on
            ),
        });
    }

    let mut active: enrollment::ActiveModel = interval.into();
    active.ends_on = Set(Some(ends_on));
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Whether the student's enrollment in the class group is active on `on`.
pub async fn is_enrolled_at<C>(
    db: &C,
    student_id: i64,
    class_group_id: i64,
    on: Date,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    let intervals = Enrollment::find()
        .filter(enrollment::Column::StudentId.eq(student_id))
        .filter(enrollment::Column::ClassGroupId.eq(class_group_id))
        .all(db)
        .await?;

    Ok(intervals.iter().any(|i| i.covers(on)))
}

/// Number of students with an enrollment interval covering `on` in the
/// class group. This is the live occupancy figure the capacity checker
/// consumes; it is never cached.
pub async fn active_enrollment_count<C>(db: &C, class_group_id: i64, on: Date) -> Result<i64>
where
    C: ConnectionTrait,
{
    let count = Enrollment::find()
        .filter(enrollment::Column::ClassGroupId.eq(class_group_id))
        .filter(enrollment::Column::StartsOn.lte(on))
        .filter(
            Condition::any()
                .add(enrollment::Column::EndsOn.is_null())
                .add(enrollment::Column::EndsOn.gte(on)),
        )
        .count(db)
        .await?;

    Ok(count as i64)
}

/// All enrollment intervals for a student in a class group, oldest first.
pub async fn intervals_for<C>(
    db: &C,
    student_id: i64,
    class_group_id: i64,
) -> Result<Vec<enrollment::Model>>
where
    C: ConnectionTrait,
{
    use sea_orm::QueryOrder;

    Enrollment::find()
        .filter(enrollment::Column::StudentId.eq(student_id))
        .filter(enrollment::Column::ClassGroupId.eq(class_group_id))
        .order_by_asc(enrollment::Column::StartsOn)
        .all(db)
        .await
        .map_err(Into::into)
}
