use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::SessionContext;
use crate::permissions::Permissions;
use crate::store::{ActionError, Entity, EntityForm, FieldKind, FieldSpec, FormSchema, Placement};

use super::Status;

/// Security shift. Serialized with the rota's own names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shift {
    #[default]
    #[serde(rename = "Pagi")]
    Morning,
    #[serde(rename = "Siang")]
    Afternoon,
    #[serde(rename = "Malam")]
    Night,
}

impl Shift {
    pub const CHOICES: &'static [&'static str] = &["Pagi", "Siang", "Malam"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Morning => "Pagi",
            Shift::Afternoon => "Siang",
            Shift::Night => "Malam",
        }
    }

    /// Standard time window for the shift.
    pub fn default_time(&self) -> &'static str {
        match self {
            Shift::Morning => "06:00 - 12:00",
            Shift::Afternoon => "12:00 - 18:00",
            Shift::Night => "18:00 - 06:00",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shift {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pagi" | "morning" => Ok(Shift::Morning),
            "siang" | "afternoon" => Ok(Shift::Afternoon),
            "malam" | "night" => Ok(Shift::Night),
            _ => Err(()),
        }
    }
}

/// One guard's shift on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: u64,
    pub name: String,
    pub shift: Shift,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default)]
    pub status: Status,
}

const SCHEDULE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", "Guard name", FieldKind::Text),
    FieldSpec::required("shift", "Shift", FieldKind::Choice(Shift::CHOICES)).with_default("Pagi"),
    FieldSpec::required("date", "Date", FieldKind::Date),
    FieldSpec::optional("status", "Status", FieldKind::Choice(Status::CHOICES)).with_default("aktif"),
    // Left blank, the time follows the shift's window
    FieldSpec::optional("time", "Time", FieldKind::Text),
];

static SCHEDULE_SCHEMA: FormSchema = FormSchema {
    entity: "schedule entry",
    fields: SCHEDULE_FIELDS,
};

impl Entity for ScheduleEntry {
    const KIND: &'static str = "schedule";
    const PLACEMENT: Placement = Placement::Append;

    fn schema() -> &'static FormSchema {
        &SCHEDULE_SCHEMA
    }

    fn can_view(permissions: &Permissions) -> bool {
        permissions.can_view_schedule
    }

    fn can_create(permissions: &Permissions) -> bool {
        permissions.can_manage_schedule
    }

    fn can_manage(permissions: &Permissions) -> bool {
        permissions.can_manage_schedule
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn build(
        id: u64,
        form: &EntityForm,
        _ctx: &SessionContext,
        _today: NaiveDate,
    ) -> Result<Self, ActionError> {
        let shift: Shift = form.parse("shift")?;
        let time = match form.text("time") {
            t if t.trim().is_empty() => shift.default_time().to_string(),
            t => t,
        };
        Ok(Self {
            id,
            name: form.require("name")?,
            shift,
            date: form.parse("date")?,
            time,
            status: form.parse_or("status", Status::Active)?,
        })
    }

    fn apply(&mut self, form: &EntityForm, _today: NaiveDate) -> Result<(), ActionError> {
        self.shift = form.parse("shift")?;
        self.date = form.parse("date")?;
        self.status = form.parse_or("status", self.status)?;
        self.name = form.require("name")?;
        self.time = match form.text("time") {
            t if t.trim().is_empty() => self.shift.default_time().to_string(),
            t => t,
        };
        Ok(())
    }

    fn to_form(&self) -> EntityForm {
        EntityForm::new()
            .with("name", &self.name)
            .with("shift", self.shift.as_str())
            .with("date", self.date.to_string())
            .with("time", &self.time)
            .with("status", self.status.as_str())
    }

    fn summary(&self) -> String {
        format!("{} ({} {})", self.name, self.shift, self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::Role;

    fn ctx() -> SessionContext {
        SessionContext::new("rt01@contoh.com", Role::Admin)
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
    }

    #[test]
    fn test_shift_names_and_windows() {
        assert_eq!("Malam".parse::<Shift>(), Ok(Shift::Night));
        assert_eq!("morning".parse::<Shift>(), Ok(Shift::Morning));
        assert!("subuh".parse::<Shift>().is_err());
        assert_eq!(Shift::Afternoon.default_time(), "12:00 - 18:00");
        assert_eq!(serde_json::to_string(&Shift::Night).unwrap(), "\"Malam\"");
    }

    #[test]
    fn test_build_uses_shift_window_when_time_blank() {
        let form = EntityForm::new()
            .with("name", "Riyanto")
            .with("shift", "Malam")
            .with("date", "2024-01-22");
        let entry = ScheduleEntry::build(6, &form, &ctx(), day()).unwrap();
        assert_eq!(entry.time, "18:00 - 06:00");
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 1, 22).unwrap());
        assert_eq!(entry.status, Status::Active);
    }

    #[test]
    fn test_build_rejects_bad_date() {
        let form = EntityForm::new()
            .with("name", "Riyanto")
            .with("shift", "Pagi")
            .with("date", "22/01/2024");
        assert!(matches!(
            ScheduleEntry::build(1, &form, &ctx(), day()),
            Err(ActionError::InvalidValue { field: "date", .. })
        ));
    }

    #[test]
    fn test_serializes_date_as_iso() {
        let form = EntityForm::new()
            .with("name", "Budi Santoso")
            .with("shift", "Pagi")
            .with("date", "2024-01-20")
            .with("time", "06:00 - 12:00");
        let entry = ScheduleEntry::build(1, &form, &ctx(), day()).unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["date"], "2024-01-20");
        assert_eq!(json["shift"], "Pagi");
        assert_eq!(json["status"], "aktif");
    }
}
