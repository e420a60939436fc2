//! Field model shared by forms and tables.
//!
//! A [`Field`] is one labelled input definition. The same type describes a
//! table column (only the placeholder is used there), so there is a single
//! validation contract for both screens.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::error::XtuiError;

/// Pure validation function attached to a field.
pub type Validator = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// Closed set of input kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Password,
    Numeric,
    Bool,
    Date,
}

/// Typed value produced from a field's raw text
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    Int(i64),
    Date(NaiveDate),
}

/// Built-in named validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationRule {
    Email,
    Url,
    Ip,
    Port,
}

/// A single failed check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Clone, Default)]
pub struct Field {
    placeholder: String,
    kind: FieldKind,
    value: String,
    required: bool,
    min_length: usize,
    max_length: usize,
    error_message: String,
    validator: Option<Validator>,
}

impl Field {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = min;
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = max;
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_rule(self, rule: ValidationRule) -> Self {
        self.with_validator(move |value| rule.check(value))
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn min(&self) -> usize {
        self.min_length
    }

    pub fn max(&self) -> usize {
        self.max_length
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn is_masked(&self) -> bool {
        self.kind == FieldKind::Password
    }

    /// Whether the length bounds can be satisfied at all
    pub fn is_consistent(&self) -> bool {
        self.min_length == 0 || self.max_length == 0 || self.min_length <= self.max_length
    }

    /// Run required, min, max, validator and kind checks in that order.
    pub fn check(&self, value: &str) -> Result<(), FieldError> {
        let length = value.chars().count();

        if self.required && value.is_empty() {
            return Err(self.fail_with_default("This field is required".to_string()));
        }
        if self.min_length > 0 && length < self.min_length {
            return Err(self.fail_with_default(format!(
                "This field must be a minimum length of {}",
                self.min_length
            )));
        }
        if self.max_length > 0 && length > self.max_length {
            return Err(self.fail_with_default(format!(
                "This field must be a maximum length of {}",
                self.max_length
            )));
        }
        if let Some(validator) = &self.validator {
            validator(value).map_err(|message| self.fail(message))?;
        }
        if !value.is_empty() {
            self.typed_value(value)?;
        }
        Ok(())
    }

    /// Convert raw text into the value kind this field holds.
    pub fn typed_value(&self, raw: &str) -> Result<FieldValue, FieldError> {
        match self.kind {
            FieldKind::Text | FieldKind::Password => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Numeric => raw
                .trim()
                .parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|_| self.fail("This field must be a number".to_string())),
            FieldKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" => Ok(FieldValue::Bool(true)),
                "false" | "no" | "n" | "0" => Ok(FieldValue::Bool(false)),
                _ => Err(self.fail("This field must be yes or no".to_string())),
            },
            FieldKind::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(FieldValue::Date)
                .map_err(|_| self.fail("This field must be a date (YYYY-MM-DD)".to_string())),
        }
    }

    fn fail(&self, message: String) -> FieldError {
        FieldError {
            field: self.placeholder.clone(),
            message,
        }
    }

    fn fail_with_default(&self, default: String) -> FieldError {
        if self.error_message.is_empty() {
            self.fail(default)
        } else {
            self.fail(self.error_message.clone())
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("placeholder", &self.placeholder)
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("required", &self.required)
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("error_message", &self.error_message)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl ValidationRule {
    pub fn check(&self, value: &str) -> Result<(), String> {
        if value.is_empty() {
            return Ok(());
        }
        let valid = match self {
            ValidationRule::Email => match value.split_once('@') {
                Some((local, domain)) => {
                    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
                }
                None => false,
            },
            ValidationRule::Url => {
                let rest = value
                    .strip_prefix("https://")
                    .or_else(|| value.strip_prefix("http://"));
                matches!(rest, Some(host) if !host.is_empty())
            }
            ValidationRule::Ip => IpAddr::from_str(value).is_ok(),
            ValidationRule::Port => matches!(value.parse::<u16>(), Ok(port) if port > 0),
        };
        if valid {
            Ok(())
        } else {
            Err(self.message().to_string())
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ValidationRule::Email => "This field must be a valid email address",
            ValidationRule::Url => "This field must be a valid URL",
            ValidationRule::Ip => "This field must be a valid IP address",
            ValidationRule::Port => "This field must be a valid Port number",
        }
    }
}

impl FromStr for ValidationRule {
    type Err = XtuiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "url" => Ok(Self::Url),
            "ip" => Ok(Self::Ip),
            "port" => Ok(Self::Port),
            other => Err(XtuiError::InvalidInput(format!("unknown validation rule: {}", other))),
        }
    }
}

impl FromStr for FieldKind {
    type Err = XtuiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "password" => Ok(Self::Password),
            "numeric" | "number" | "int" => Ok(Self::Numeric),
            "bool" => Ok(Self::Bool),
            "date" => Ok(Self::Date),
            other => Err(XtuiError::InvalidInput(format!("unknown field kind: {}", other))),
        }
    }
}

/// Ordered, titled group of fields. Order is render order and tab order.
#[derive(Debug, Clone, Default)]
pub struct FieldCollection {
    title: String,
    fields: Vec<Field>,
}

impl FieldCollection {
    pub fn new(title: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            title: title.into(),
            fields,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Column headers when the collection describes a table.
    pub fn headers(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.placeholder.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a FieldCollection {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Serializable field description used by form definition files and the CLI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub placeholder: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub min: usize,
    #[serde(default)]
    pub max: usize,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub rule: Option<ValidationRule>,
}

impl FieldSpec {
    /// A min length above a non-zero max length can never be satisfied.
    pub fn check_bounds(&self) -> Result<(), XtuiError> {
        if self.min > 0 && self.max > 0 && self.min > self.max {
            return Err(XtuiError::InvalidInput(format!(
                "field '{}': min length {} exceeds max length {}",
                self.placeholder, self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn into_field(self) -> Field {
        let field = Field::new(self.placeholder)
            .with_kind(self.kind)
            .with_value(self.value)
            .required(self.required)
            .min_length(self.min)
            .max_length(self.max)
            .with_error_message(self.error);
        match self.rule {
            Some(rule) => field.with_rule(rule),
            None => field,
        }
    }
}

/// Compact form: `label[:kind][:required][:min=N][:max=N][:rule=R][:error=MSG]`
impl FromStr for FieldSpec {
    type Err = XtuiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let placeholder = parts.next().unwrap_or_default().trim();
        if placeholder.is_empty() {
            return Err(XtuiError::InvalidInput(format!("field spec '{}' has no label", s)));
        }

        let mut spec = FieldSpec {
            placeholder: placeholder.to_string(),
            ..FieldSpec::default()
        };

        for part in parts {
            let part = part.trim();
            let parse_len = |v: &str| {
                v.parse::<usize>()
                    .map_err(|_| XtuiError::InvalidInput(format!("invalid length '{}' in field spec '{}'", v, s)))
            };
            match part.split_once('=') {
                Some(("min", v)) => spec.min = parse_len(v)?,
                Some(("max", v)) => spec.max = parse_len(v)?,
                Some(("rule", v)) => spec.rule = Some(v.parse()?),
                Some(("error", v)) => spec.error = v.to_string(),
                Some(("value", v)) => spec.value = v.to_string(),
                Some((key, _)) => {
                    return Err(XtuiError::InvalidInput(format!("unknown option '{}' in field spec '{}'", key, s)))
                }
                None if part == "required" => spec.required = true,
                None if part.is_empty() => {}
                None => spec.kind = part.parse()?,
            }
        }

        spec.check_bounds()?;
        Ok(spec)
    }
}

/// A form definition file: a title plus `[[fields]]` tables (TOML) or a `fields` array (JSON).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl FormDefinition {
    /// Parse `text` as JSON when `json` is set, TOML otherwise.
    pub fn parse(text: &str, json: bool) -> Result<Self, XtuiError> {
        let definition: Self = if json {
            serde_json::from_str(text).map_err(|e| XtuiError::InvalidInput(format!("invalid form definition: {}", e)))?
        } else {
            toml::from_str(text).map_err(|e| XtuiError::InvalidInput(format!("invalid form definition: {}", e)))?
        };
        for spec in &definition.fields {
            spec.check_bounds()?;
        }
        Ok(definition)
    }

    pub fn into_collection(self) -> FieldCollection {
        FieldCollection::new(self.title, self.fields.into_iter().map(FieldSpec::into_field).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn username() -> Field {
        Field::new("Username")
            .required(true)
            .min_length(3)
            .max_length(20)
            .with_error_message("Username must be 3-20 characters")
    }

    #[test]
    fn test_check_order_and_messages() {
        let field = username();
        assert_eq!(field.check("").unwrap_err().message, "Username must be 3-20 characters");
        assert_eq!(field.check("ab").unwrap_err().message, "Username must be 3-20 characters");
        assert!(field.check("alice").is_ok());
        assert!(field.check(&"x".repeat(21)).is_err());
    }

    #[test]
    fn test_default_messages() {
        let field = Field::new("Name").required(true).min_length(2);
        assert_eq!(field.check("").unwrap_err().message, "This field is required");
        assert_eq!(
            field.check("a").unwrap_err().message,
            "This field must be a minimum length of 2"
        );
    }

    #[test]
    fn test_lengths_count_characters() {
        let field = Field::new("City").max_length(4);
        assert!(field.check("Åre").is_ok());
        assert!(field.check("São Paulo").is_err());
    }

    #[test]
    fn test_validator_message_is_used() {
        let field = Field::new("Code")
            .with_error_message("ignored for validators")
            .with_validator(|v| if v.starts_with('X') { Ok(()) } else { Err("must start with X".into()) });
        assert_eq!(field.check("abc").unwrap_err().message, "must start with X");
        assert!(field.check("Xyz").is_ok());
    }

    #[test]
    fn test_typed_values() {
        let port = Field::new("Port").with_kind(FieldKind::Numeric);
        assert_eq!(port.typed_value("8080").unwrap(), FieldValue::Int(8080));
        assert!(port.check("eighty").is_err());
        assert!(port.check("").is_ok());

        let flag = Field::new("Enabled").with_kind(FieldKind::Bool);
        assert_eq!(flag.typed_value("Yes").unwrap(), FieldValue::Bool(true));

        let date = Field::new("Since").with_kind(FieldKind::Date);
        assert_eq!(
            date.typed_value("2024-02-29").unwrap(),
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert!(date.check("2023-02-29").is_err());
    }

    #[test]
    fn test_validation_rules() {
        assert!(ValidationRule::Email.check("dev@example.com").is_ok());
        assert!(ValidationRule::Email.check("dev@example").is_err());
        assert!(ValidationRule::Url.check("https://example.com").is_ok());
        assert!(ValidationRule::Url.check("ftp://example.com").is_err());
        assert!(ValidationRule::Ip.check("10.0.0.1").is_ok());
        assert!(ValidationRule::Ip.check("10.0.0.300").is_err());
        assert!(ValidationRule::Port.check("0").is_err());
        assert!(ValidationRule::Port.check("65535").is_ok());
    }

    #[test]
    fn test_field_spec_compact_form() {
        let spec: FieldSpec = "Password:password:required:min=6:max=20".parse().unwrap();
        assert_eq!(spec.placeholder, "Password");
        assert_eq!(spec.kind, FieldKind::Password);
        assert!(spec.required);
        assert_eq!((spec.min, spec.max), (6, 20));

        let spec: FieldSpec = "Email:rule=email".parse().unwrap();
        assert_eq!(spec.rule, Some(ValidationRule::Email));
        assert!(spec.into_field().check("nope").is_err());
    }

    #[test]
    fn test_field_spec_rejects_bad_input() {
        assert!("".parse::<FieldSpec>().is_err());
        assert!("Name:min=10:max=2".parse::<FieldSpec>().is_err());
        assert!("Name:color=red".parse::<FieldSpec>().is_err());
        assert!("Name:min=abc".parse::<FieldSpec>().is_err());
    }

    #[test]
    fn test_form_definition_from_toml_and_json() {
        let toml_text = r#"
title = "Login"

[[fields]]
placeholder = "Username"
required = true
min = 3

[[fields]]
placeholder = "Password"
kind = "password"
"#;
        let collection = FormDefinition::parse(toml_text, false).unwrap().into_collection();
        assert_eq!(collection.title(), "Login");
        assert_eq!(collection.len(), 2);
        assert!(collection.get(1).unwrap().is_masked());

        let json_text = r#"{"title": "Server", "fields": [{"placeholder": "Port", "rule": "port"}]}"#;
        let definition = FormDefinition::parse(json_text, true).unwrap();
        assert_eq!(definition.fields[0].rule, Some(ValidationRule::Port));

        let bad = r#"{"fields": [{"placeholder": "Code", "min": 5, "max": 2}]}"#;
        assert!(FormDefinition::parse(bad, true).is_err());
    }

    #[test]
    fn test_collection_headers() {
        let collection = FieldCollection::new("Apps", vec![Field::new("Name"), Field::new("Status")]);
        assert_eq!(collection.headers(), vec!["Name", "Status"]);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.title(), "Apps");
    }
}
