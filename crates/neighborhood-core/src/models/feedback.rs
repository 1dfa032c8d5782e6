use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::SessionContext;
use crate::permissions::Permissions;
use crate::store::{ActionError, Entity, EntityForm, FieldKind, FieldSpec, FormSchema, Placement};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
const DEFAULT_RATING: u8 = 3;

/// Resident feedback, optionally answered by the RT/RW.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: u64,
    pub author: String,
    pub title: String,
    pub content: String,
    pub date: NaiveDate,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
}

impl Feedback {
    /// Star rendering, e.g. `★★★☆☆`
    pub fn stars(&self) -> String {
        let filled = self.rating.min(MAX_RATING) as usize;
        format!(
            "{}{}",
            "★".repeat(filled),
            "☆".repeat(MAX_RATING as usize - filled)
        )
    }
}

fn parse_rating(form: &EntityForm, default: u8) -> Result<u8, ActionError> {
    let rating = form.parse_or("rating", default)?;
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(rating)
    } else {
        Err(ActionError::InvalidValue {
            field: "rating",
            value: rating.to_string(),
        })
    }
}

const FEEDBACK_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("title", "Title", FieldKind::Text),
    FieldSpec::required("content", "Details", FieldKind::LongText),
    FieldSpec::optional("rating", "Rating", FieldKind::Rating).with_default("3"),
];

static FEEDBACK_SCHEMA: FormSchema = FormSchema {
    entity: "feedback",
    fields: FEEDBACK_FIELDS,
};

impl Entity for Feedback {
    const KIND: &'static str = "feedback";
    const PLACEMENT: Placement = Placement::Prepend;

    fn schema() -> &'static FormSchema {
        &FEEDBACK_SCHEMA
    }

    /// Residents see the list they submit into.
    fn can_view(permissions: &Permissions) -> bool {
        permissions.can_view_feedback || permissions.can_submit_feedback
    }

    fn can_create(permissions: &Permissions) -> bool {
        permissions.can_submit_feedback
    }

    fn can_manage(permissions: &Permissions) -> bool {
        permissions.can_manage_feedback
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn build(
        id: u64,
        form: &EntityForm,
        ctx: &SessionContext,
        today: NaiveDate,
    ) -> Result<Self, ActionError> {
        Ok(Self {
            id,
            author: ctx.display_name(),
            title: form.require("title")?,
            content: form.require("content")?,
            date: today,
            rating: parse_rating(form, DEFAULT_RATING)?,
            reply: None,
        })
    }

    fn apply(&mut self, form: &EntityForm, _today: NaiveDate) -> Result<(), ActionError> {
        self.rating = parse_rating(form, self.rating)?;
        self.title = form.require("title")?;
        self.content = form.require("content")?;
        Ok(())
    }

    fn to_form(&self) -> EntityForm {
        EntityForm::new()
            .with("title", &self.title)
            .with("content", &self.content)
            .with("rating", self.rating.to_string())
    }

    fn summary(&self) -> String {
        format!("{} ({})", self.title, self.author)
    }
}
