//! In-memory entity storage and gated services.
//!
//! This module provides:
//! - `EntityStore`: async collection with atomic id assignment
//! - `EntityForm` / `FormSchema`: one generic create/edit form for all entities
//! - `EntityService` / `Neighborhood`: permission-checked CRUD over the stores
//! - `Notifier`: where success and access-denied notices go

pub mod entity;
pub mod error;
pub mod form;
pub mod notice;
pub mod service;

pub use entity::{next_id, Entity, EntityStore, Placement};
pub use error::{Action, ActionError};
pub use form::{EntityForm, FieldKind, FieldSpec, FormSchema};
pub use notice::{Notice, NoticeLevel, Notifier, RecordingNotifier};
pub use service::{EntityService, Neighborhood, ResidentStats};
