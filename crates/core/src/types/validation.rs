//! Field-level validation errors for the site's forms.

use std::collections::BTreeMap;

/// Validation messages keyed by form field name.
///
/// Rendered inline next to each input; a non-empty set blocks submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field`. The first message for a field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Record `message` when `value` is blank.
    pub fn require(&mut self, field: &'static str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.add(field, message);
        }
    }

    /// Record `message` when `value` is blank, or a phone-format error
    /// when it contains characters other than digits, `+`, `-`, spaces and
    /// parentheses.
    pub fn require_phone(&mut self, field: &'static str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.add(field, message);
        } else if !is_valid_phone(value) {
            self.add(field, "Please enter a valid phone number");
        }
    }

    /// Message for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Message for `field`, or an empty string (template convenience).
    #[must_use]
    pub fn message(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    /// Whether `field` has an error.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Whether no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok(value)` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the collected errors when at least one field failed.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

/// Phone numbers may contain digits, `+`, `-`, spaces and parentheses, and
/// must contain at least one digit.
#[must_use]
pub fn is_valid_phone(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
        && value.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_pattern() {
        assert!(is_valid_phone("+234 (803) 000-1111"));
        assert!(is_valid_phone("08030001111"));
        assert!(!is_valid_phone("0803-CALL-ME"));
        assert!(!is_valid_phone("()"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn test_first_message_wins() {
        let mut errors = FieldErrors::new();
        errors.require("full_name", "  ", "Full name is required");
        errors.add("full_name", "something else");
        errors.require_phone("phone_number", "abc", "Phone number is required");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.message("full_name"), "Full name is required");
        assert_eq!(
            errors.get("phone_number"),
            Some("Please enter a valid phone number")
        );
        assert_eq!(errors.message("church"), "");
        assert!(errors.into_result(|| ()).is_err());
    }
}
