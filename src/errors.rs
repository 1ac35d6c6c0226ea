//! Unified error types and result handling.
//!
//! Scheduling-rule violations are deterministic and map to their own variants
//! so callers can react to a stable identity rather than parsing messages.
//! Infrastructure failures (database, I/O) are wrapped via `#[from]`.

use thiserror::Error;

/// All errors the scheduling engine can return.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or environment problem
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong while loading configuration
        message: String,
    },

    /// Underlying SeaORM / database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure (config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Referenced student does not exist
    #[error("Student not found: {id}")]
    StudentNotFound {
        /// Student primary key
        id: i64,
    },

    /// Referenced class group does not exist
    #[error("Class group not found: {id}")]
    ClassGroupNotFound {
        /// Class group primary key
        id: i64,
    },

    /// Referenced enrollment interval does not exist
    #[error("Enrollment not found: {id}")]
    EnrollmentNotFound {
        /// Enrollment primary key
        id: i64,
    },

    /// Referenced event does not exist
    #[error("Event not found: {id}")]
    EventNotFound {
        /// Event primary key
        id: i64,
    },

    /// Referenced participation does not exist
    #[error("Participation not found: {id}")]
    ParticipationNotFound {
        /// Participation primary key
        id: i64,
    },

    /// A new enrollment interval would overlap an existing one for the same
    /// (student, class) pair
    #[error("Enrollment interval overlap: {details}")]
    OverlapViolation {
        /// Which interval conflicted and why
        details: String,
    },

    /// An interval end date precedes its start date, or the interval cannot
    /// be closed in its current state
    #[error("Invalid interval range: {details}")]
    InvalidRange {
        /// What made the range invalid
        details: String,
    },

    /// A caller-supplied value is out of the accepted domain
    #[error("Invalid argument: {details}")]
    InvalidArgument {
        /// Which argument and why
        details: String,
    },

    /// The source event already has a reschedule successor
    #[error("Event {event_id} has already been rescheduled")]
    SourceAlreadyRescheduled {
        /// The event that was the reschedule source
        event_id: i64,
    },

    /// The source event is finalized; its attendance is locked
    #[error("Event {event_id} is finalized and cannot be rescheduled")]
    SourceFinalized {
        /// The event that was the reschedule source
        event_id: i64,
    },

    /// Chain traversal revisited a node, or a node has more than one
    /// successor; the reschedule forest is structurally broken
    #[error("Reschedule chain cycle detected at event {event_id}")]
    CycleDetected {
        /// The event at which the traversal broke down
        event_id: i64,
    },

    /// The event cannot accept attendance writes or be finalized
    #[error("Event {event_id} is not finalizable: {reason}")]
    EventNotFinalizable {
        /// The event being finalized or written to
        event_id: i64,
        /// Why finalization is refused
        reason: String,
    },

    /// The requested contact-status edge is not in the transition table
    #[error("Invalid contact-status transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status (or why no transition is possible)
        from: String,
        /// Requested status
        to: String,
    },

    /// Contact workflow is closed because the student attended
    #[error("Participation {participation_id} is already marked attended")]
    AlreadyAttended {
        /// The participation whose workflow is closed
        participation_id: i64,
    },

    /// The destination event has no free seat
    #[error("Destination event {event_id} is at capacity")]
    DestCapacityExceeded {
        /// The event that was full
        event_id: i64,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
