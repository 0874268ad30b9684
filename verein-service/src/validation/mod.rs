//! Input validation
//!
//! Each write input declares a static [`Schema`] (field name → type, required
//! flag, constraints). One generic validator walks the table and collects
//! every violation, so callers receive a single aggregated
//! [`ValidationErrors`] instead of the first failure only.

mod schema;

pub use schema::{
    field_path, parse_iso_date, Constraint, FieldRule, FieldType, FieldValue, Format, Schema,
    ValidationErrors, Violation,
};

/// Types that can check themselves against a [`Schema`]
pub trait Validate {
    /// Append every violation to `errors`, prefixing field names with `path`
    fn validate_into(&self, path: &str, errors: &mut ValidationErrors);

    /// Validate and return all violations at once
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.validate_into("", &mut errors);
        errors.into_result()
    }
}
