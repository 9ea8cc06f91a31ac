//! Field rule tables checked by the services before rows are written.
//!
//! Each resource declares a `const` table of [`FieldRule`]s and hands its
//! field values to [`validate`]. Request DTOs still derive
//! `validator::Validate` for payload shape; these tables carry the domain
//! rules (allowed statuses, key formats, version strings).

use crate::error::{AppError, AppResult};
use validator::ValidateLength;

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Value must be present and not blank.
    Required,
    /// Character count bounds, inclusive.
    Length { min: u64, max: u64 },
    OneOf(&'static [&'static str]),
    Pattern {
        check: fn(&str) -> bool,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

/// Check `values` against `table`. Absent optional fields skip every rule
/// except [`Rule::Required`].
pub fn validate(table: &[FieldRule], values: &[(&str, Option<&str>)]) -> AppResult<()> {
    let mut violations = Vec::new();

    for field_rule in table {
        let value = values
            .iter()
            .find(|(name, _)| *name == field_rule.field)
            .and_then(|(_, value)| *value);

        for rule in field_rule.rules {
            if let Some(message) = check(field_rule.field, rule, value) {
                violations.push(message);
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(violations.join("; ")))
    }
}

fn check(field: &str, rule: &Rule, value: Option<&str>) -> Option<String> {
    match (rule, value) {
        (Rule::Required, None) => Some(format!("{field} is required")),
        (Rule::Required, Some(v)) if v.trim().is_empty() => Some(format!("{field} is required")),
        (_, None) | (Rule::Required, Some(_)) => None,
        (Rule::Length { min, max }, Some(v)) => (!v.validate_length(Some(*min), Some(*max), None))
            .then(|| format!("{field} must be between {min} and {max} characters")),
        (Rule::OneOf(allowed), Some(v)) => (!allowed.iter().any(|a| *a == v))
            .then(|| format!("{field} must be one of: {}", allowed.join(", "))),
        (Rule::Pattern { check, expected }, Some(v)) => {
            (!check(v)).then(|| format!("{field} must be {expected}"))
        }
    }
}

/// `[a-z0-9_.-]+`, e.g. `payments.currency`.
pub fn is_config_key(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-'))
}

/// Dotted numeric version such as `1`, `1.0` or `2.10.3`.
pub fn is_version(value: &str) -> bool {
    !value.is_empty()
        && value
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

/// `#rgb` or `#rrggbb`.
pub fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &[FieldRule] = &[
        FieldRule {
            field: "title",
            rules: &[Rule::Required, Rule::Length { min: 3, max: 10 }],
        },
        FieldRule {
            field: "status",
            rules: &[Rule::OneOf(&["draft", "published"])],
        },
        FieldRule {
            field: "key",
            rules: &[Rule::Pattern {
                check: is_config_key,
                expected: "lowercase letters, digits, '.', '_' or '-'",
            }],
        },
    ];

    #[test]
    fn accepts_valid_record() {
        assert!(validate(
            RULES,
            &[
                ("title", Some("Hello")),
                ("status", Some("draft")),
                ("key", Some("site.name"))
            ]
        )
        .is_ok());
    }

    #[test]
    fn optional_fields_may_be_absent() {
        assert!(validate(RULES, &[("title", Some("Hello"))]).is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let err = validate(
            RULES,
            &[
                ("title", Some("  ")),
                ("status", Some("deleted")),
                ("key", Some("Site Name")),
            ],
        )
        .unwrap_err();
        let AppError::Validation(message) = err else {
            panic!("expected validation error");
        };
        assert!(message.contains("title is required"));
        assert!(message.contains("status must be one of: draft, published"));
        assert!(message.contains("key must be lowercase"));
    }

    #[test]
    fn length_counts_characters() {
        assert!(validate(RULES, &[("title", Some("ñññ"))]).is_ok());
        assert!(validate(RULES, &[("title", Some("abcdefghijk"))]).is_err());
    }

    #[test]
    fn format_helpers() {
        assert!(is_version("1.0"));
        assert!(is_version("2.10.3"));
        assert!(!is_version("1..0"));
        assert!(!is_version("v1"));
        assert!(is_hex_color("#0af"));
        assert!(is_hex_color("#00AAFF"));
        assert!(!is_hex_color("00aaff"));
        assert!(!is_config_key(""));
    }
}
