use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::SessionContext;
use crate::permissions::Permissions;
use crate::store::{ActionError, Entity, EntityForm, FieldKind, FieldSpec, FormSchema, Placement};
use crate::utils::contains_ignore_case;

/// Active flag shared by residents and schedule entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "aktif")]
    Active,
    #[serde(rename = "tidak aktif")]
    Inactive,
}

impl Status {
    pub const CHOICES: &'static [&'static str] = &["aktif", "tidak aktif"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "aktif",
            Status::Inactive => "tidak aktif",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aktif" | "active" => Ok(Status::Active),
            "tidak aktif" | "inactive" => Ok(Status::Inactive),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resident {
    pub id: u64,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub status: Status,
}

impl Resident {
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    /// Case-insensitive match on name or address. An empty query matches.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty()
            || contains_ignore_case(&self.name, query)
            || contains_ignore_case(&self.address, query)
    }
}

const RESIDENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", "Full name", FieldKind::Text),
    FieldSpec::required("email", "Email", FieldKind::Email),
    FieldSpec::required("phone", "Phone", FieldKind::Phone),
    FieldSpec::optional("status", "Status", FieldKind::Choice(Status::CHOICES)).with_default("aktif"),
    FieldSpec::required("address", "Address", FieldKind::Text),
];

static RESIDENT_SCHEMA: FormSchema = FormSchema {
    entity: "resident",
    fields: RESIDENT_FIELDS,
};

impl Entity for Resident {
    const KIND: &'static str = "residents";
    const PLACEMENT: Placement = Placement::Append;

    fn schema() -> &'static FormSchema {
        &RESIDENT_SCHEMA
    }

    fn can_view(permissions: &Permissions) -> bool {
        permissions.can_view_residents
    }

    fn can_create(permissions: &Permissions) -> bool {
        permissions.can_manage_residents
    }

    fn can_manage(permissions: &Permissions) -> bool {
        permissions.can_manage_residents
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
        Ok(Self {
            id,
            name: form.require("name")?,
            address: form.require("address")?,
            phone: form.require("phone")?,
            email: form.require("email")?,
            status: form.parse_or("status", Status::Active)?,
        })
    }

    fn apply(&mut self, form: &EntityForm, _today: NaiveDate) -> Result<(), ActionError> {
        let status = form.parse_or("status", self.status)?;
        self.name = form.require("name")?;
        self.address = form.require("address")?;
        self.phone = form.require("phone")?;
        self.email = form.require("email")?;
        self.status = status;
        Ok(())
    }

    fn to_form(&self) -> EntityForm {
        EntityForm::new()
            .with("name", &self.name)
            .with("address", &self.address)
            .with("phone", &self.phone)
            .with("email", &self.email)
            .with("status", self.status.as_str())
    }

    fn summary(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resident() -> Resident {
        Resident {
            id: 1,
            name: "Budi Santoso".to_string(),
            address: "Jl. Mawar No. 10".to_string(),
            phone: "08123456789".to_string(),
            email: "budi@contoh.com".to_string(),
            status: Status::Active,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
    }

    #[test]
    fn test_status_serde_values() {
        assert_eq!(serde_json::to_string(&Status::Inactive).unwrap(), "\"tidak aktif\"");
        let status: Status = serde_json::from_str("\"aktif\"").unwrap();
        assert_eq!(status, Status::Active);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("Aktif".parse::<Status>(), Ok(Status::Active));
        assert_eq!("inactive".parse::<Status>(), Ok(Status::Inactive));
        assert!("pindah".parse::<Status>().is_err());
    }

    #[test]
    fn test_matches_name_or_address() {
        let r = resident();
        assert!(r.matches("budi"));
        assert!(r.matches("MAWAR"));
        assert!(r.matches(""));
        assert!(!r.matches("melati"));
    }

    #[test]
    fn test_form_roundtrip_keeps_fields() {
        let r = resident();
        let form = r.to_form();
        assert!(Resident::schema().validate(&form).is_ok());

        let mut edited = r.clone();
        edited
            .apply(&form.with("status", "tidak aktif"), day())
            .unwrap();
        assert_eq!(edited.name, r.name);
        assert_eq!(edited.status, Status::Inactive);
    }

    #[test]
    fn test_apply_rejects_bad_status_without_change() {
        let mut r = resident();
        let form = r.to_form().with("status", "moved");
        assert!(matches!(
            r.apply(&form, day()),
            Err(ActionError::InvalidValue { field: "status", .. })
        ));
        assert_eq!(r, resident());
    }
}
