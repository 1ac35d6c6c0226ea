//! Notification seam - Tells the outside world about scheduling changes.
//!
//! Notification is best-effort and fire-and-forget: implementations are
//! called only after the scheduling transaction has committed, must not
//! block, and must swallow their own failures. A delivery problem never
//! rolls a booking back.

use tracing::info;

use crate::entities::{event, participation};

/// Receiver for post-commit scheduling notifications.
pub trait Notifier: Send + Sync {
    /// An event was rescheduled; `moved_seats` participations were carried
    /// over to the replacement.
    fn event_rescheduled(
        &self,
        source: &event::Model,
        replacement: &event::Model,
        moved_seats: usize,
    );

    /// A make-up lesson was booked on `dest` for the student behind
    /// `original`.
    fn makeup_scheduled(
        &self,
        original: &participation::Model,
        makeup: &participation::Model,
        dest: &event::Model,
    );
}

/// Default notifier: writes structured log lines. Deployments hook a real
/// delivery channel (e-mail, messaging) in behind the same trait.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn event_rescheduled(
        &self,
        source: &event::Model,
        replacement: &event::Model,
        moved_seats: usize,
    ) {
        info!(
            source_event = source.id,
            replacement_event = replacement.id,
            new_start = %replacement.starts_at,
            moved_seats,
            "Notify: event rescheduled"
        );
    }

    fn makeup_scheduled(
        &self,
        original: &participation::Model,
        makeup: &participation::Model,
        dest: &event::Model,
    ) {
        info!(
            student = original.student_id,
            original_participation = original.id,
            makeup_participation = makeup.id,
            dest_event = dest.id,
            dest_start = %dest.starts_at,
            "Notify: make-up lesson booked"
        );
    }
}

/// Notifier that does nothing. Used by tests and embedders that handle
/// notification elsewhere.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn event_rescheduled(&self, _: &event::Model, _: &event::Model, _: usize) {}

    fn makeup_scheduled(
        &self,
        _: &participation::Model,
        _: &participation::Model,
        _: &event::Model,
    ) {
    }
}
