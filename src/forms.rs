//! Posted form values with field-level validation errors

use std::collections::{BTreeMap, HashMap};

use validator::ValidateEmail;

/// Error messages per field, in insertion order for each field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// First error for a field
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(|m| m.first()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Submitted form values plus the errors found while checking them
#[derive(Debug, Clone, Default)]
pub struct Form {
    values: HashMap<String, String>,
    pub errors: FormErrors,
}

impl Form {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self {
            values,
            errors: FormErrors::default(),
        }
    }

    /// Raw value of a field, empty when absent
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    /// Field present and non-empty
    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn required(&mut self, fields: &[&str]) {
        for field in fields {
            if self.get(field).trim().is_empty() {
                self.errors.add(field, "This field cannot be blank");
            }
        }
    }

    /// Check that a field is at least `length` characters long
    pub fn min_length(&mut self, field: &str, length: usize) -> bool {
        if self.get(field).chars().count() < length {
            self.errors.add(
                field,
                format!("This field must be at least {} characters long", length),
            );
            return false;
        }
        true
    }

    pub fn is_email(&mut self, field: &str) {
        let value = self.get(field).to_string();
        if !value.validate_email() {
            self.errors.add(field, "Invalid email address");
        }
    }
}
