use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::SessionContext;
use crate::permissions::Permissions;
use crate::store::{ActionError, Entity, EntityForm, FieldKind, FieldSpec, FormSchema, Placement};

/// Incident report filed by security staff and reviewed by the RT/RW.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: u64,
    pub author: String,
    pub title: String,
    pub content: String,
    pub date: NaiveDate,
}

const REPORT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("title", "Incident", FieldKind::Text),
    FieldSpec::required("content", "Details", FieldKind::LongText),
];

static REPORT_SCHEMA: FormSchema = FormSchema {
    entity: "report",
    fields: REPORT_FIELDS,
};

impl Entity for Report {
    const KIND: &'static str = "reports";
    const PLACEMENT: Placement = Placement::Prepend;

    fn schema() -> &'static FormSchema {
        &REPORT_SCHEMA
    }

    fn can_view(permissions: &Permissions) -> bool {
        permissions.can_view_reports
    }

    fn can_create(permissions: &Permissions) -> bool {
        permissions.can_submit_reports
    }

    /// The reviewer archives reports.
    fn can_manage(permissions: &Permissions) -> bool {
        permissions.can_view_reports
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
        })
    }

    fn apply(&mut self, form: &EntityForm, _today: NaiveDate) -> Result<(), ActionError> {
        self.title = form.require("title")?;
        self.content = form.require("content")?;
        Ok(())
    }

    fn to_form(&self) -> EntityForm {
        EntityForm::new()
            .with("title", &self.title)
            .with("content", &self.content)
    }

    fn summary(&self) -> String {
        self.title.clone()
    }
}
