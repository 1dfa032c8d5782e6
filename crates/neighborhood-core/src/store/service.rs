//! Permission-checked entity services.
//!
//! Every mutating call resolves the caller's capability set from the
//! injected `SessionContext` and refuses with exactly one access-denied
//! notice when the flag is false. This check does not depend on whether a
//! front-end hid the control.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::SessionContext;
use crate::models::{seed, Announcement, Feedback, Report, Resident, ScheduleEntry};
use crate::utils::today;

use super::{Action, ActionError, Entity, EntityForm, EntityStore, Notice, Notifier};

/// Gated CRUD over one entity collection.
pub struct EntityService<T: Entity> {
    store: EntityStore<T>,
    notifier: Arc<dyn Notifier>,
}

impl<T: Entity> EntityService<T> {
    pub fn new(seed: Vec<T>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store: EntityStore::new(seed),
            notifier,
        }
    }

    /// Refuse an action: one notice, one error, no state change.
    fn deny(&self, ctx: &SessionContext, action: Action) -> ActionError {
        warn!(
            identifier = %ctx.identifier(),
            role = %ctx.role(),
            %action,
            kind = T::KIND,
            "Action denied"
        );
        self.notifier.notify(Notice::access_denied(format!(
            "You do not have permission to {} {}",
            action,
            T::KIND
        )));
        ActionError::AccessDenied {
            action,
            entity: T::KIND,
        }
    }

    fn check(&self, ctx: &SessionContext, action: Action, allowed: bool) -> Result<(), ActionError> {
        if allowed {
            Ok(())
        } else {
            Err(self.deny(ctx, action))
        }
    }

    pub async fn list(&self, ctx: &SessionContext) -> Result<Vec<T>, ActionError> {
        self.check(ctx, Action::View, T::can_view(ctx.permissions()))?;
        Ok(self.store.list().await)
    }

    pub async fn get(&self, ctx: &SessionContext, id: u64) -> Result<T, ActionError> {
        self.check(ctx, Action::View, T::can_view(ctx.permissions()))?;
        self.store
            .get(id)
            .await
            .ok_or(ActionError::NotFound { entity: T::KIND, id })
    }

    /// Number of items, without a permission check (dashboard counters).
    pub async fn count(&self) -> usize {
        self.store.len().await
    }

    /// Empty form with defaults, for "add new".
    pub fn blank_form(&self, ctx: &SessionContext) -> Result<EntityForm, ActionError> {
        self.check(ctx, Action::Create, T::can_create(ctx.permissions()))?;
        Ok(T::schema().blank())
    }

    /// Current values of an item, for "edit".
    pub async fn edit_form(&self, ctx: &SessionContext, id: u64) -> Result<EntityForm, ActionError> {
        self.check(ctx, Action::Update, T::can_manage(ctx.permissions()))?;
        self.store
            .get(id)
            .await
            .map(|item| item.to_form())
            .ok_or(ActionError::NotFound { entity: T::KIND, id })
    }

    pub async fn create(&self, ctx: &SessionContext, form: &EntityForm) -> Result<T, ActionError> {
        self.check(ctx, Action::Create, T::can_create(ctx.permissions()))?;
        // Omitted fields take the defaults shown on the blank form
        let mut filled = T::schema().blank();
        filled.merge(form);
        T::schema().validate(&filled)?;

        let date = today();
        let item = self
            .store
            .insert_with(|id| T::build(id, &filled, ctx, date))
            .await?;

        debug!(kind = T::KIND, id = item.id(), "Created");
        self.notifier
            .notify(Notice::success(format!("{} added", item.summary())));
        Ok(item)
    }

    /// Replace an item's fields. Values missing from `form` keep their
    /// current value.
    pub async fn update(&self, ctx: &SessionContext, id: u64, form: &EntityForm) -> Result<T, ActionError> {
        self.check(ctx, Action::Update, T::can_manage(ctx.permissions()))?;

        let date = today();
        let item = self
            .store
            .update_with(id, |item| {
                let mut merged = item.to_form();
                merged.merge(form);
                T::schema().validate(&merged)?;
                item.apply(&merged, date)
            })
            .await?;

        self.notifier
            .notify(Notice::success(format!("{} updated", item.summary())));
        Ok(item)
    }

    pub async fn delete(&self, ctx: &SessionContext, id: u64) -> Result<T, ActionError> {
        self.check(ctx, Action::Delete, T::can_manage(ctx.permissions()))?;
        let item = self.store.remove(id).await?;
        self.notifier
            .notify(Notice::success(format!("{} removed", item.summary())));
        Ok(item)
    }
}

/// Resident counters shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResidentStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

/// All neighborhood collections behind one handle.
pub struct Neighborhood {
    pub residents: EntityService<Resident>,
    pub schedule: EntityService<ScheduleEntry>,
    pub announcements: EntityService<Announcement>,
    pub feedback: EntityService<Feedback>,
    pub reports: EntityService<Report>,
}

impl Neighborhood {
    /// Fresh collections loaded with the seed data.
    pub fn seeded(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            residents: EntityService::new(seed::residents(), Arc::clone(&notifier)),
            schedule: EntityService::new(seed::schedule(), Arc::clone(&notifier)),
            announcements: EntityService::new(seed::announcements(), Arc::clone(&notifier)),
            feedback: EntityService::new(seed::feedback(), Arc::clone(&notifier)),
            reports: EntityService::new(Vec::new(), notifier),
        }
    }

    /// Residents whose name or address contains `query`, ignoring case.
    pub async fn search_residents(
        &self,
        ctx: &SessionContext,
        query: &str,
    ) -> Result<Vec<Resident>, ActionError> {
        let residents = self.residents.list(ctx).await?;
        Ok(residents.into_iter().filter(|r| r.matches(query)).collect())
    }

    pub async fn resident_stats(&self) -> ResidentStats {
        let residents = self.residents.store.list().await;
        let active = residents.iter().filter(|r| r.is_active()).count();
        ResidentStats {
            total: residents.len(),
            active,
            inactive: residents.len() - active,
        }
    }

    /// Answer a feedback item. Requires the manage-feedback capability.
    pub async fn reply_feedback(
        &self,
        ctx: &SessionContext,
        id: u64,
        reply: &str,
    ) -> Result<Feedback, ActionError> {
        let service = &self.feedback;
        service.check(ctx, Action::Reply, Feedback::can_manage(ctx.permissions()))?;

        let reply = reply.trim();
        if reply.is_empty() {
            return Err(ActionError::MissingField("reply"));
        }

        let item = service
            .store
            .update_with(id, |item| {
                item.reply = Some(reply.to_string());
                Ok(())
            })
            .await?;

        service
            .notifier
            .notify(Notice::success(format!("Reply sent to {}", item.author)));
        Ok(item)
    }
}
