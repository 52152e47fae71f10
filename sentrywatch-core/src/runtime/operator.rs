// sentrywatch-core/src/runtime/operator.rs
// ============================================================================
// Module: Sentrywatch Operator
// Description: Four comparison primitives over accessor-read values.
// Purpose: Apply case-insensitive, string-coerced comparisons for conditions.
// Dependencies: crate::core::rule, serde_json
// ============================================================================

//! ## Overview
//! Operators never throw; an unrecognized value pairing degrades to `false`
//! rather than erroring. `notEquals` against an absent actual
//! value is a deliberate fixed boundary case: an absent value
//! matches no concrete expectation negatively, so it returns `false` rather
//! than `true`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::rule::Operator;

// ============================================================================
// SECTION: Stringification
// ============================================================================

/// Renders an actual (possibly absent) value to its comparison text.
///
/// Scalars use their natural textual representation; collections use
/// their default JSON rendering. An absent value stringifies to
/// `"undefined"`, matching no ordinary rule-authored expected value.
#[must_use]
pub fn stringify_actual(value: Option<&Value>) -> String {
    match value {
        Some(value) => stringify_value(value),
        None => "undefined".to_string(),
    }
}

/// Renders a present JSON value to its comparison text.
#[must_use]
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

// ============================================================================
// SECTION: Operator Evaluation
// ============================================================================

/// Applies `operator` to an actual (accessor-read) value and an already
/// interpolated expected string.
#[must_use]
pub fn apply(operator: Operator, actual: Option<&Value>, expected: Option<&str>) -> bool {
    match operator {
        Operator::Exists => exists(actual),
        Operator::Equals => equals(actual, expected),
        Operator::NotEquals => not_equals(actual, expected),
        Operator::Contains => contains(actual, expected),
    }
}

/// `exists`: true iff the actual value is neither absent nor null.
#[must_use]
pub fn exists(actual: Option<&Value>) -> bool {
    actual.is_some_and(|value| !value.is_null())
}

/// `equals`: lowercase string comparison of actual vs expected.
#[must_use]
pub fn equals(actual: Option<&Value>, expected: Option<&str>) -> bool {
    let Some(expected) = expected else {
        return false;
    };
    stringify_actual(actual).to_lowercase() == expected.to_lowercase()
}

/// `notEquals`: negation of `equals`, except an absent actual is always
/// `false`.
#[must_use]
pub fn not_equals(actual: Option<&Value>, expected: Option<&str>) -> bool {
    if actual.is_none() {
        return false;
    }
    !equals(actual, expected)
}

/// `contains`: lowercase substring containment of actual within expected? No
/// — expected is the needle, actual is the haystack.
#[must_use]
pub fn contains(actual: Option<&Value>, expected: Option<&str>) -> bool {
    let Some(expected) = expected else {
        return false;
    };
    stringify_actual(actual).to_lowercase().contains(&expected.to_lowercase())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::apply;
    use super::contains;
    use super::equals;
    use super::exists;
    use super::not_equals;
    use crate::core::rule::Operator;

    #[test]
    fn exists_is_false_for_null_and_absent() {
        assert!(!exists(None));
        assert!(!exists(Some(&json!(null))));
        assert!(exists(Some(&json!(""))));
        assert!(exists(Some(&json!(0))));
    }

    #[test]
    fn equals_is_case_insensitive() {
        let actual = json!("Add Member To Role");
        assert!(equals(Some(&actual), Some("add member to role")));
    }

    #[test]
    fn not_equals_against_absent_is_false() {
        assert!(!not_equals(None, Some("anything")));
    }

    #[test]
    fn not_equals_negates_equals_when_present() {
        let actual = json!("foo");
        assert!(not_equals(Some(&actual), Some("bar")));
        assert!(!not_equals(Some(&actual), Some("foo")));
    }

    #[test]
    fn contains_is_case_insensitive_substring() {
        let actual = json!("User promoted to Global Admin role");
        assert!(contains(Some(&actual), Some("global admin")));
        assert!(!contains(Some(&actual), Some("not present")));
    }

    #[test]
    fn apply_dispatches_to_the_right_primitive() {
        let actual = json!("value");
        assert!(apply(Operator::Equals, Some(&actual), Some("VALUE")));
        assert!(!apply(Operator::NotEquals, Some(&actual), Some("VALUE")));
        assert!(apply(Operator::Exists, Some(&actual), None));
        assert!(apply(Operator::Contains, Some(&actual), Some("val")));
    }
}
