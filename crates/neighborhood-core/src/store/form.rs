//! Generic entity form.
//!
//! Every entity type is edited through the same `EntityForm`, a bag of named
//! string values, checked against the entity's `FormSchema`. The only
//! validation is "required field present"; typed parsing happens when the
//! entity is built from the form.

use std::collections::BTreeMap;
use std::str::FromStr;

use super::ActionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    LongText,
    Email,
    Phone,
    Date,
    Choice(&'static [&'static str]),
    Rating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Pre-filled value for a blank form
    pub default: Option<&'static str>,
}

impl FieldSpec {
    pub const fn required(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            default: None,
        }
    }

    pub const fn optional(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            default: None,
        }
    }

    pub const fn with_default(self, value: &'static str) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }
}

/// Field layout for one entity type.
#[derive(Debug)]
pub struct FormSchema {
    pub entity: &'static str,
    pub fields: &'static [FieldSpec],
}

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// A form with every default pre-filled, as shown for "add new".
    pub fn blank(&self) -> EntityForm {
        let mut form = EntityForm::new();
        for field in self.fields {
            if let Some(default) = field.default {
                form.set(field.name, default);
            }
        }
        form
    }

    /// Check that every required field has a non-blank value.
    pub fn validate(&self, form: &EntityForm) -> Result<(), ActionError> {
        for field in self.fields.iter().filter(|f| f.required) {
            let present = form
                .get(field.name)
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false);
            if !present {
                return Err(ActionError::MissingField(field.name));
            }
        }
        Ok(())
    }
}

/// Submitted form values keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityForm {
    values: BTreeMap<String, String>,
}

impl EntityForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Overlay every value of `other` onto this form.
    pub fn merge(&mut self, other: &EntityForm) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Trimmed value, or empty when absent.
    pub fn text(&self, name: &str) -> String {
        self.get(name).map(|v| v.trim().to_string()).unwrap_or_default()
    }

    /// Trimmed value of a field that must be present.
    pub fn require(&self, name: &'static str) -> Result<String, ActionError> {
        let value = self.text(name);
        if value.is_empty() {
            Err(ActionError::MissingField(name))
        } else {
            Ok(value)
        }
    }

    /// Parse a field, falling back to `default` when it is blank.
    pub fn parse_or<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ActionError> {
        let value = self.text(name);
        if value.is_empty() {
            return Ok(default);
        }
        value.parse().map_err(|_| ActionError::InvalidValue {
            field: name,
            value,
        })
    }

    /// Parse a field that must be present.
    pub fn parse<T: FromStr>(&self, name: &'static str) -> Result<T, ActionError> {
        let value = self.require(name)?;
        value.parse().map_err(|_| ActionError::InvalidValue {
            field: name,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[FieldSpec] = &[
        FieldSpec::required("name", "Name", FieldKind::Text),
        FieldSpec::optional("status", "Status", FieldKind::Choice(&["aktif", "tidak aktif"]))
            .with_default("aktif"),
    ];

    const SCHEMA: FormSchema = FormSchema {
        entity: "test",
        fields: FIELDS,
    };

    #[test]
    fn test_blank_form_has_defaults() {
        let form = SCHEMA.blank();
        assert_eq!(form.get("status"), Some("aktif"));
        assert_eq!(form.get("name"), None);
    }

    #[test]
    fn test_validate_required() {
        assert_eq!(
            SCHEMA.validate(&SCHEMA.blank()),
            Err(ActionError::MissingField("name"))
        );
        assert_eq!(
            SCHEMA.validate(&EntityForm::new().with("name", "   ")),
            Err(ActionError::MissingField("name"))
        );
        assert!(SCHEMA.validate(&EntityForm::new().with("name", "Budi")).is_ok());
    }

    #[test]
    fn test_parse_helpers() {
        let form = EntityForm::new().with("rating", " 4 ").with("bad", "x");
        assert_eq!(form.parse::<u8>("rating"), Ok(4));
        assert_eq!(form.parse_or::<u8>("missing", 3), Ok(3));
        assert_eq!(
            form.parse::<u8>("bad"),
            Err(ActionError::InvalidValue {
                field: "bad",
                value: "x".to_string()
            })
        );
        assert_eq!(form.parse::<u8>("missing"), Err(ActionError::MissingField("missing")));
    }

    #[test]
    fn test_merge_overlays_values() {
        let mut form = EntityForm::new().with("name", "Budi").with("status", "aktif");
        form.merge(&EntityForm::new().with("status", "tidak aktif"));
        assert_eq!(form.get("name"), Some("Budi"));
        assert_eq!(form.get("status"), Some("tidak aktif"));
        assert_eq!(form.iter().count(), 2);
    }

    #[test]
    fn test_field_lookup() {
        assert_eq!(SCHEMA.field("status").map(|f| f.required), Some(false));
        assert!(SCHEMA.field("email").is_none());
    }
}
