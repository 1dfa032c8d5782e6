use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::SessionContext;
use crate::permissions::Permissions;
use crate::store::{ActionError, Entity, EntityForm, FieldKind, FieldSpec, FormSchema, Placement};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const CHOICES: &'static [&'static str] = &["low", "medium", "high"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Priority::High => "🔴",
            Priority::Medium => "🟡",
            Priority::Low => "🟢",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "normal" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub priority: Priority,
}

const ANNOUNCEMENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("title", "Title", FieldKind::Text),
    FieldSpec::required("content", "Content", FieldKind::LongText),
    FieldSpec::optional("priority", "Priority", FieldKind::Choice(Priority::CHOICES))
        .with_default("medium"),
];

static ANNOUNCEMENT_SCHEMA: FormSchema = FormSchema {
    entity: "announcement",
    fields: ANNOUNCEMENT_FIELDS,
};

impl Entity for Announcement {
    const KIND: &'static str = "announcements";
    const PLACEMENT: Placement = Placement::Prepend;

    fn schema() -> &'static FormSchema {
        &ANNOUNCEMENT_SCHEMA
    }

    fn can_view(permissions: &Permissions) -> bool {
        permissions.can_view_announcements
    }

    fn can_create(permissions: &Permissions) -> bool {
        permissions.can_manage_announcements
    }

    fn can_manage(permissions: &Permissions) -> bool {
        permissions.can_manage_announcements
    }

    fn id(&self) -> u64 {
        self.id
    }

    /// Author comes from the session, date is today.
    fn build(
        id: u64,
        form: &EntityForm,
        ctx: &SessionContext,
        today: NaiveDate,
    ) -> Result<Self, ActionError> {
        Ok(Self {
            id,
            title: form.require("title")?,
            content: form.require("content")?,
            author: ctx.display_name(),
            date: today,
            priority: form.parse_or("priority", Priority::Medium)?,
        })
    }

    /// Editing re-dates the announcement.
    fn apply(&mut self, form: &EntityForm, today: NaiveDate) -> Result<(), ActionError> {
        self.priority = form.parse_or("priority", self.priority)?;
        self.title = form.require("title")?;
        self.content = form.require("content")?;
        self.date = today;
        Ok(())
    }

    fn to_form(&self) -> EntityForm {
        EntityForm::new()
            .with("title", &self.title)
            .with("content", &self.content)
            .with("priority", self.priority.as_str())
    }

    fn summary(&self) -> String {
        self.title.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::Role;

    #[test]
    fn test_priority_parsing() {
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert_eq!("normal".parse::<Priority>(), Ok(Priority::Medium));
        assert!("urgent".parse::<Priority>().is_err());
        assert!(Priority::High > Priority::Low);
    }

    #[test]
    fn test_build_takes_author_and_date_from_context() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let ctx = SessionContext::new("pakrt@contoh.com", Role::Admin);
        let form = Announcement::schema()
            .blank()
            .with("title", "Kerja bakti")
            .with("content", "Minggu pagi");
        let ann = Announcement::build(5, &form, &ctx, today).unwrap();
        assert_eq!(ann.author, "pakrt");
        assert_eq!(ann.date, today);
        assert_eq!(ann.priority, Priority::Medium);
    }

    #[test]
    fn test_apply_refreshes_date() {
        let ctx = SessionContext::new("pakrt", Role::Admin);
        let created = NaiveDate::from_ymd_opt(2024, 1, 19).unwrap();
        let edited = NaiveDate::from_ymd_opt(2024, 1, 25).unwrap();
        let form = EntityForm::new().with("title", "A").with("content", "B");
        let mut ann = Announcement::build(1, &form, &ctx, created).unwrap();

        ann.apply(&form.clone().with("priority", "high"), edited).unwrap();
        assert_eq!(ann.date, edited);
        assert_eq!(ann.priority, Priority::High);
        assert_eq!(ann.author, "pakrt");
    }
}
