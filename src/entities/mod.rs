//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Relations are plain foreign-key columns; the core modules query them
//! explicitly by id instead of navigating live object graphs.

pub mod class_group;
pub mod enrollment;
pub mod event;
pub mod participation;
pub mod student;

// Re-export specific types to avoid conflicts
pub use class_group::{Column as ClassGroupColumn, Entity as ClassGroup, Model as ClassGroupModel};
pub use enrollment::{Column as EnrollmentColumn, Entity as Enrollment, Model as EnrollmentModel};
pub use event::{Column as EventColumn, Entity as Event, EventKind, Model as EventModel};
pub use participation::{
    Column as ParticipationColumn, ContactStatus, Entity as Participation,
    Model as ParticipationModel,
};
pub use student::{Column as StudentColumn, Entity as Student, Model as StudentModel};
