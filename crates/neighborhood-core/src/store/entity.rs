use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;

use crate::auth::SessionContext;
use crate::permissions::Permissions;

use super::{ActionError, EntityForm, FormSchema};

/// Where a newly created item lands in its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Appended at the end (residents, schedule)
    Append,
    /// Inserted at the front, newest first (announcements, feedback, reports)
    Prepend,
}

/// An item type managed through the generic entity services.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Plural collection name, used in notices and errors
    const KIND: &'static str;
    const PLACEMENT: Placement;

    fn schema() -> &'static FormSchema;

    fn can_view(permissions: &Permissions) -> bool;
    fn can_create(permissions: &Permissions) -> bool;
    fn can_manage(permissions: &Permissions) -> bool;

    fn id(&self) -> u64;

    /// Build a new item from a validated form.
    fn build(
        id: u64,
        form: &EntityForm,
        ctx: &SessionContext,
        today: NaiveDate,
    ) -> Result<Self, ActionError>;

    /// Replace this item's editable fields from a validated form.
    fn apply(&mut self, form: &EntityForm, today: NaiveDate) -> Result<(), ActionError>;

    /// Current values, as pre-filled into an edit form.
    fn to_form(&self) -> EntityForm;

    /// Short human label ("Budi Santoso", "Pengumuman ...")
    fn summary(&self) -> String;
}

/// Async in-memory collection for one entity type.
///
/// Clone is cheap and shares the underlying collection.
pub struct EntityStore<T: Entity> {
    items: Arc<RwLock<Vec<T>>>,
}

impl<T: Entity> EntityStore<T> {
    pub fn new(seed: Vec<T>) -> Self {
        Self {
            items: Arc::new(RwLock::new(seed)),
        }
    }

    pub async fn list(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    pub async fn get(&self, id: u64) -> Option<T> {
        self.items.read().await.iter().find(|i| i.id() == id).cloned()
    }

    /// Insert an item built with the next free id. Id assignment and
    /// insertion happen under one write lock.
    pub async fn insert_with<F>(&self, build: F) -> Result<T, ActionError>
    where
        F: FnOnce(u64) -> Result<T, ActionError>,
    {
        let mut items = self.items.write().await;
        let id = next_id(&items);
        let item = build(id)?;
        match T::PLACEMENT {
            Placement::Append => items.push(item.clone()),
            Placement::Prepend => items.insert(0, item.clone()),
        }
        debug!(kind = T::KIND, id, "Inserted item");
        Ok(item)
    }

    /// Mutate the item with `id` in place. The closure's error leaves the
    /// item untouched.
    pub async fn update_with<F>(&self, id: u64, update: F) -> Result<T, ActionError>
    where
        F: FnOnce(&mut T) -> Result<(), ActionError>,
    {
        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|i| i.id() == id)
            .ok_or(ActionError::NotFound { entity: T::KIND, id })?;
        let mut updated = item.clone();
        update(&mut updated)?;
        *item = updated.clone();
        debug!(kind = T::KIND, id, "Updated item");
        Ok(updated)
    }

    pub async fn remove(&self, id: u64) -> Result<T, ActionError> {
        let mut items = self.items.write().await;
        let index = items
            .iter()
            .position(|i| i.id() == id)
            .ok_or(ActionError::NotFound { entity: T::KIND, id })?;
        debug!(kind = T::KIND, id, "Removed item");
        Ok(items.remove(index))
    }
}

impl<T: Entity> Clone for EntityStore<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

/// One past the highest existing id; 1 for an empty collection.
pub fn next_id<T: Entity>(items: &[T]) -> u64 {
    items.iter().map(Entity::id).max().unwrap_or(0) + 1
}
