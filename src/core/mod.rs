//! Core business logic - framework-agnostic scheduling operations.
//!
//! Each submodule owns one slice of the engine: enrollment validity
//! intervals, seat capacity, the event reschedule chain, and the
//! participation/contact state machine. Multi-step mutations run inside a
//! single database transaction and re-validate their preconditions there.

/// Seat arithmetic and live occupancy recomputation
pub mod capacity;
/// Enrollment validity intervals (vigências)
pub mod enrollment;
/// Event lifecycle and reschedule chains
pub mod event;
/// Attendance recording and the contact-status workflow
pub mod participation;
