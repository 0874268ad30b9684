//! Declarative field schema and the generic validator that evaluates it

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)+(:\d{1,5})?(/\S*)?$")
        .expect("url pattern is valid")
});

static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9][0-9 \-/()]{4,22}[0-9]$").expect("phone pattern is valid")
});

/// Value formats checked by [`Constraint::Format`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// e-mail address
    Email,
    /// http or https URL
    Url,
    /// phone number with optional leading `+`
    Phone,
    /// strict ISO-8601 calendar date or RFC 3339 date-time
    IsoDate,
}

impl Format {
    fn matches(self, value: &str) -> bool {
        match self {
            Self::Email => EMAIL.is_match(value),
            Self::Url => URL.is_match(value),
            Self::Phone => PHONE.is_match(value),
            Self::IsoDate => parse_iso_date(value).is_some(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Email => "must be a valid e-mail address",
            Self::Url => "must be a valid http(s) URL",
            Self::Phone => "must be a valid phone number",
            Self::IsoDate => "must be an ISO-8601 date",
        }
    }
}

/// Parse a strict ISO-8601 date (`2025-01-01`) or date-time
/// (`2025-01-01T00:00:00Z`, `2025-01-01T00:00:00`) into its calendar date.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        // chrono accepts unpadded fields, ISO does not
        return (value.len() == 10).then_some(date);
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return Some(date_time.date_naive());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// Declared type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
}

/// A single rule attached to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Text must contain a non-whitespace character
    NotBlank,
    /// Text length in characters
    MaxLength(usize),
    /// Inclusive lower bound for integers
    Min(i64),
    /// Inclusive upper bound for integers
    Max(i64),
    /// Text must match a known format
    Format(Format),
    /// Text must be one of the listed literals
    OneOf(&'static [&'static str]),
}

/// Schema entry for one field
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub field_type: FieldType,
    pub required: bool,
    pub constraints: &'static [Constraint],
}

impl FieldRule {
    pub const fn text(name: &'static str, required: bool, constraints: &'static [Constraint]) -> Self {
        Self {
            name,
            field_type: FieldType::Text,
            required,
            constraints,
        }
    }

    pub const fn integer(
        name: &'static str,
        required: bool,
        constraints: &'static [Constraint],
    ) -> Self {
        Self {
            name,
            field_type: FieldType::Integer,
            required,
            constraints,
        }
    }
}

/// A field value handed to the validator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Integer(i64),
    Absent,
}

impl<'a> From<Option<&'a str>> for FieldValue<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(Self::Absent, Self::Text)
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl From<Option<i64>> for FieldValue<'_> {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Self::Absent, Self::Integer)
    }
}

impl From<i64> for FieldValue<'_> {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// One violated rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Path of the offending field, e.g. `players[1].age`
    pub field: String,
    pub message: String,
}

/// All violations found in one input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<Violation>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single violation
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(Violation {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    /// Whether any violation concerns the given field path
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }

    /// `Ok(())` if nothing was collected
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for violation in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", violation.field, violation.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// A named table of field rules
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub rules: &'static [FieldRule],
}

impl Schema {
    pub const fn new(rules: &'static [FieldRule]) -> Self {
        Self { rules }
    }

    /// Evaluate every rule against the supplied values
    ///
    /// Fields missing from `values` count as absent. Every violation is
    /// appended to `errors`; evaluation never stops at the first one.
    pub fn check(&self, prefix: &str, values: &[(&str, FieldValue<'_>)], errors: &mut ValidationErrors) {
        for rule in self.rules {
            let value = values
                .iter()
                .find(|(name, _)| *name == rule.name)
                .map_or(FieldValue::Absent, |(_, value)| *value);
            check_rule(&field_path(prefix, rule.name), rule, value, errors);
        }

        for (name, _) in values {
            if !self.rules.iter().any(|rule| rule.name == *name) {
                errors.push(field_path(prefix, name), "is not a known field");
            }
        }
    }
}

/// Join a parent path and a field name
pub fn field_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn check_rule(path: &str, rule: &FieldRule, value: FieldValue<'_>, errors: &mut ValidationErrors) {
    match (rule.field_type, value) {
        (_, FieldValue::Absent) => {
            if rule.required {
                errors.push(path, "is required");
            }
        }
        (FieldType::Text, FieldValue::Text(text)) => check_text(path, rule.constraints, text, errors),
        (FieldType::Integer, FieldValue::Integer(number)) => {
            check_integer(path, rule.constraints, number, errors)
        }
        (FieldType::Text, FieldValue::Integer(_)) => errors.push(path, "must be text"),
        (FieldType::Integer, FieldValue::Text(_)) => errors.push(path, "must be an integer"),
    }
}

fn check_text(path: &str, constraints: &[Constraint], text: &str, errors: &mut ValidationErrors) {
    // free text is stored trimmed; enumerations are matched as sent
    let trimmed = text.trim();
    for constraint in constraints {
        match *constraint {
            Constraint::NotBlank if trimmed.is_empty() => {
                errors.push(path, "must not be empty");
            }
            Constraint::MaxLength(max) if trimmed.chars().count() > max => {
                errors.push(path, format!("must be at most {max} characters"));
            }
            Constraint::Format(format) if !trimmed.is_empty() && !format.matches(trimmed) => {
                errors.push(path, format.describe());
            }
            Constraint::OneOf(allowed) if !allowed.contains(&text) => {
                errors.push(path, format!("must be one of {}", allowed.join(", ")));
            }
            _ => {}
        }
    }
}

fn check_integer(path: &str, constraints: &[Constraint], number: i64, errors: &mut ValidationErrors) {
    for constraint in constraints {
        match *constraint {
            Constraint::Min(min) if number < min => {
                errors.push(path, format!("must be at least {min}"));
            }
            Constraint::Max(max) if number > max => {
                errors.push(path, format!("must be at most {max}"));
            }
            _ => {}
        }
    }
}
