//! Validation engine.
//!
//! Rules run in a fixed order and the first failing rule is the field's
//! error:
//!
//! 1. required
//! 2. email shape (email fields)
//! 3. character length
//! 4. numeric bounds (number fields whose value parses)
//! 5. pattern
//!
//! Only `required` looks at an empty value. Every other rule applies to
//! text answers that are present.

use crate::error::FieldError;
use crate::types::{FieldId, FieldType, FormField};
use crate::value::FieldValue;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

/// Address shape: something, `@`, something, `.`, something, no whitespace.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

#[allow(clippy::expect_used)] // Literal pattern
static EMAIL: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"));

/// Compiled field patterns, keyed by source text
static PATTERNS: LazyLock<Mutex<HashMap<String, Arc<fancy_regex::Regex>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Per-field errors of one form, keyed by field id
pub type FieldErrors = BTreeMap<FieldId, FieldError>;

/// Compile a field pattern, reusing earlier compilations
///
/// Patterns are authored for browsers, so lookaround and backreferences are
/// supported.
///
/// # Errors
///
/// Returns the compiler's error for a pattern that is not a valid regex.
pub fn compile_pattern(pattern: &str) -> Result<Arc<fancy_regex::Regex>, fancy_regex::Error> {
    let mut cache = PATTERNS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(regex) = cache.get(pattern) {
        return Ok(Arc::clone(regex));
    }

    let regex = Arc::new(fancy_regex::Regex::new(pattern)?);
    cache.insert(pattern.to_string(), Arc::clone(&regex));
    Ok(regex)
}

/// Fields whose `pattern` does not compile, in schema order
#[must_use]
pub fn invalid_pattern_ids(fields: &[FormField]) -> Vec<FieldId> {
    fields
        .iter()
        .filter(|field| {
            field
                .validation
                .as_ref()
                .and_then(|rules| rules.pattern.as_deref())
                .is_some_and(|pattern| compile_pattern(pattern).is_err())
        })
        .map(|field| field.id.clone())
        .collect()
}

/// Check one answer against its field definition
///
/// # Errors
///
/// Returns the first rule the value breaks.
pub fn validate_field(field: &FormField, value: Option<&FieldValue>) -> Result<(), FieldError> {
    let present = value.filter(|v| !v.is_empty());

    let Some(value) = present else {
        if field.required {
            return Err(FieldError::Required {
                label: field.label.clone(),
            });
        }
        return Ok(());
    };

    let Some(text) = value.as_text() else {
        return Ok(());
    };

    if field.field_type == FieldType::Email && !EMAIL.is_match(text) {
        return Err(FieldError::InvalidEmail);
    }

    let Some(rules) = &field.validation else {
        return Ok(());
    };

    let length = text.chars().count();
    if let Some(min) = rules.min_length {
        if length < min {
            return Err(FieldError::TooShort {
                label: field.label.clone(),
                min,
            });
        }
    }
    if let Some(max) = rules.max_length {
        if length > max {
            return Err(FieldError::TooLong {
                label: field.label.clone(),
                max,
            });
        }
    }

    if field.field_type == FieldType::Number {
        if let Ok(number) = text.trim().parse::<f64>() {
            if let Some(min) = rules.min {
                if number < min {
                    return Err(FieldError::BelowMinimum {
                        label: field.label.clone(),
                        min,
                    });
                }
            }
            if let Some(max) = rules.max {
                if number > max {
                    return Err(FieldError::AboveMaximum {
                        label: field.label.clone(),
                        max,
                    });
                }
            }
        }
    }

    if let Some(pattern) = &rules.pattern {
        let matched = compile_pattern(pattern)
            .map_err(|error| error.to_string())
            .and_then(|regex| regex.is_match(text).map_err(|error| error.to_string()));
        match matched {
            Ok(false) => {
                return Err(FieldError::InvalidFormat {
                    label: field.label.clone(),
                });
            },
            Ok(true) => {},
            Err(error) => {
                tracing::warn!(
                    field_id = %field.id,
                    %pattern,
                    %error,
                    "Skipping unusable validation pattern"
                );
            },
        }
    }

    Ok(())
}

/// Check every field of a form
///
/// The form is valid iff the returned map is empty.
#[must_use]
pub fn validate_form(fields: &[FormField], values: &HashMap<FieldId, FieldValue>) -> FieldErrors {
    fields
        .iter()
        .filter_map(|field| {
            validate_field(field, values.get(&field.id))
                .err()
                .map(|error| (field.id.clone(), error))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::FieldValidation;
    use crate::value::FileBlob;
    use uuid::Uuid;

    fn field(n: u128, label: &str, field_type: FieldType) -> FormField {
        let mut field = FormField::new(FieldId::from_uuid(Uuid::from_u128(n)), field_type, 0);
        field.label = label.to_string();
        field
    }

    fn with_rules(mut field: FormField, rules: FieldValidation) -> FormField {
        field.validation = Some(rules);
        field
    }

    fn check(field: &FormField, value: &str) -> Result<(), String> {
        validate_field(field, Some(&FieldValue::from(value))).map_err(|e| e.to_string())
    }

    #[test]
    fn required_rejects_missing_and_empty() {
        let mut name = field(1, "Full name", FieldType::Text);
        name.required = true;

        assert_eq!(
            validate_field(&name, None).unwrap_err().to_string(),
            "Full name is required"
        );
        assert_eq!(check(&name, "").unwrap_err(), "Full name is required");
        assert!(check(&name, "Ada").is_ok());
    }

    #[test]
    fn required_checkbox_must_be_ticked() {
        let mut terms = field(1, "Terms", FieldType::Checkbox);
        terms.required = true;

        assert!(validate_field(&terms, Some(&FieldValue::Bool(false))).is_err());
        assert!(validate_field(&terms, Some(&FieldValue::Bool(true))).is_ok());
    }

    #[test]
    fn required_file_accepts_named_blob() {
        let mut cv = field(1, "CV", FieldType::File);
        cv.required = true;
        cv.validation = Some(FieldValidation {
            max_length: Some(1),
            ..FieldValidation::default()
        });

        let blob = FieldValue::from(FileBlob::new("resume.pdf", "application/pdf", vec![1, 2]));
        assert!(validate_field(&cv, Some(&blob)).is_ok());
    }

    #[test]
    fn optional_empty_value_skips_other_rules() {
        let email = with_rules(
            field(1, "Email", FieldType::Email),
            FieldValidation {
                min_length: Some(5),
                ..FieldValidation::default()
            },
        );

        assert!(check(&email, "").is_ok());
        assert!(validate_field(&email, None).is_ok());
    }

    #[test]
    fn email_shape() {
        let email = field(1, "Email", FieldType::Email);

        assert_eq!(
            check(&email, "a@b").unwrap_err(),
            "Please enter a valid email address"
        );
        assert!(check(&email, "a b@c.d").is_err());
        assert!(check(&email, "a@b.co").is_ok());
    }

    #[test]
    fn length_counts_characters() {
        let city = with_rules(
            field(1, "City", FieldType::Text),
            FieldValidation {
                min_length: Some(3),
                max_length: Some(5),
                ..FieldValidation::default()
            },
        );

        assert_eq!(check(&city, "Ab").unwrap_err(), "City must be at least 3 characters");
        assert_eq!(
            check(&city, "Abcdef").unwrap_err(),
            "City must be no more than 5 characters"
        );
        // Five characters, ten bytes
        assert!(check(&city, "Zürïç").is_ok());
    }

    #[test]
    fn numeric_bounds() {
        let age = with_rules(
            field(1, "Age", FieldType::Number),
            FieldValidation {
                min: Some(18.0),
                max: Some(99.0),
                ..FieldValidation::default()
            },
        );

        assert_eq!(check(&age, "17").unwrap_err(), "Age must be at least 18");
        assert_eq!(check(&age, "100").unwrap_err(), "Age must be no more than 99");
        assert!(check(&age, "18").is_ok());
        assert!(check(&age, "42.5").is_ok());
    }

    #[test]
    fn unparseable_number_skips_numeric_rule() {
        let age = with_rules(
            field(1, "Age", FieldType::Number),
            FieldValidation {
                min: Some(18.0),
                ..FieldValidation::default()
            },
        );

        assert!(check(&age, "eighteen").is_ok());
    }

    #[test]
    fn numeric_bounds_ignore_text_fields() {
        let code = with_rules(
            field(1, "Code", FieldType::Text),
            FieldValidation {
                min: Some(100.0),
                ..FieldValidation::default()
            },
        );

        assert!(check(&code, "5").is_ok());
    }

    #[test]
    fn pattern_must_match() {
        let zip = with_rules(
            field(1, "Postcode", FieldType::Text),
            FieldValidation {
                pattern: Some(r"^\d{5}$".to_string()),
                ..FieldValidation::default()
            },
        );

        assert_eq!(check(&zip, "12a45").unwrap_err(), "Postcode has an invalid format");
        assert!(check(&zip, "12345").is_ok());
    }

    #[test]
    fn lookahead_patterns_are_enforced() {
        let password = with_rules(
            field(1, "Password", FieldType::Text),
            FieldValidation {
                pattern: Some(r"^(?=.*\d).{8,}$".to_string()),
                ..FieldValidation::default()
            },
        );

        assert_eq!(check(&password, "x").unwrap_err(), "Password has an invalid format");
        assert!(check(&password, "abcdefgh").is_err());
        assert!(check(&password, "abcdefg1").is_ok());
    }

    #[test]
    fn backreference_patterns_are_enforced() {
        let code = with_rules(
            field(1, "Code", FieldType::Text),
            FieldValidation {
                pattern: Some(r"^(\w)\1$".to_string()),
                ..FieldValidation::default()
            },
        );

        assert!(check(&code, "aa").is_ok());
        assert!(check(&code, "ab").is_err());
    }

    #[test]
    fn compiled_patterns_are_reused() {
        let first = compile_pattern(r"^[A-Z]{2}\d+$").unwrap();
        let second = compile_pattern(r"^[A-Z]{2}\d+$").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(compile_pattern("([a-z").is_err());
    }

    #[test]
    fn uncompilable_patterns_are_reported_by_field() {
        let good = with_rules(
            field(1, "Good", FieldType::Text),
            FieldValidation {
                pattern: Some(r"^(?!admin).*$".to_string()),
                ..FieldValidation::default()
            },
        );
        let broken = with_rules(
            field(2, "Broken", FieldType::Text),
            FieldValidation {
                pattern: Some("([a-z".to_string()),
                ..FieldValidation::default()
            },
        );
        let plain = field(3, "Plain", FieldType::Text);

        assert_eq!(
            invalid_pattern_ids(&[good, broken.clone(), plain]),
            vec![broken.id]
        );
    }

    #[test]
    fn invalid_pattern_is_not_applicable() {
        let broken = with_rules(
            field(1, "Broken", FieldType::Text),
            FieldValidation {
                pattern: Some("([a-z".to_string()),
                ..FieldValidation::default()
            },
        );

        assert!(check(&broken, "anything").is_ok());
    }

    #[test]
    fn first_failing_rule_wins() {
        let email = with_rules(
            field(1, "Email", FieldType::Email),
            FieldValidation {
                min_length: Some(20),
                pattern: Some("^x".to_string()),
                ..FieldValidation::default()
            },
        );

        assert_eq!(
            check(&email, "nope").unwrap_err(),
            "Please enter a valid email address"
        );
        assert_eq!(
            check(&email, "a@b.co").unwrap_err(),
            "Email must be at least 20 characters"
        );
    }

    #[test]
    fn form_validation_collects_every_failure() {
        let mut a = field(1, "A", FieldType::Text);
        a.required = true;
        let mut b = field(2, "B", FieldType::Email);
        b.required = true;
        let c = field(3, "C", FieldType::Text);
        let fields = vec![a.clone(), b.clone(), c];

        let mut values = HashMap::new();
        values.insert(b.id.clone(), FieldValue::from("not-an-email"));

        let errors = validate_form(&fields, &values);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[&a.id].to_string(), "A is required");
        assert_eq!(errors[&b.id], FieldError::InvalidEmail);

        values.insert(a.id.clone(), FieldValue::from("x"));
        values.insert(b.id.clone(), FieldValue::from("b@example.org"));
        assert!(validate_form(&fields, &values).is_empty());
    }
}
