//! Data models for neighborhood entities.
//!
//! - `Resident`: household roster with active/inactive status
//! - `ScheduleEntry`, `Shift`: security shift rota
//! - `Announcement`, `Priority`: notices from the RT/RW
//! - `Feedback`: resident feedback with optional reply
//! - `Report`: incident reports filed by security
//!
//! Every model implements `store::Entity`, which ties it to its form schema
//! and the permissions that gate it.

pub mod announcement;
pub mod feedback;
pub mod report;
pub mod resident;
pub mod schedule;
pub mod seed;

pub use announcement::{Announcement, Priority};
pub use feedback::Feedback;
pub use report::Report;
pub use resident::{Resident, Status};
pub use schedule::{ScheduleEntry, Shift};
