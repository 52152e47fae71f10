// sentrywatch-core/src/runtime/interpolator.rs
// ============================================================================
// Module: Sentrywatch Interpolator
// Description: Template substitution of `{{path}}` tokens in condition values.
// Purpose: Let conditions reference another field of the same event.
// Dependencies: crate::{core::event, runtime::accessor, runtime::operator}
// ============================================================================

//! ## Overview
//! Before operator application, expected values are scanned for `{{path}}`
//! tokens. Each token is replaced with the stringified accessor read of
//! `path` against the same event, or the empty string when absent or null.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::event::EventTree;
use crate::runtime::accessor;
use crate::runtime::operator::stringify_value;

// ============================================================================
// SECTION: Interpolation
// ============================================================================

/// Interpolates every `{{path}}` token in `template` against `event`.
///
/// Matching is non-greedy: a token's path contains no `}` character. A
/// token whose path resolves to absent or null is replaced with the empty
/// string.
#[must_use]
pub fn interpolate(template: &str, event: &EventTree) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            // No closing token; emit the rest verbatim and stop.
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let path = after_open[..end].trim();
        let replacement = accessor::get(event, path)
            .filter(|value| !value.is_null())
            .map(stringify_value)
            .unwrap_or_default();
        out.push_str(&replacement);
        rest = &after_open[end + 2..];
    }
    out.push_str(rest);
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::interpolate;

    #[test]
    fn substitutes_a_single_token() {
        let event = json!({"ModifiedProperties": [{"NewValue": "Global Admin"}]});
        let rendered = interpolate("{{ModifiedProperties.0.NewValue}}", &event);
        assert_eq!(rendered, "Global Admin");
    }

    #[test]
    fn trims_whitespace_inside_the_token() {
        let event = json!({"a": "value"});
        assert_eq!(interpolate("{{ a }}", &event), "value");
    }

    #[test]
    fn absent_path_yields_empty_string() {
        let event = json!({"a": 1});
        assert_eq!(interpolate("prefix-{{missing}}-suffix", &event), "prefix--suffix");
    }

    #[test]
    fn null_path_yields_empty_string() {
        let event = json!({"a": null});
        assert_eq!(interpolate("{{a}}", &event), "");
    }

    #[test]
    fn template_without_tokens_is_unchanged() {
        let event = json!({});
        assert_eq!(interpolate("static value", &event), "static value");
    }

    #[test]
    fn multiple_tokens_in_one_template() {
        let event = json!({"a": "x", "b": "y"});
        assert_eq!(interpolate("{{a}}-{{b}}", &event), "x-y");
    }

    #[test]
    fn unclosed_token_is_emitted_verbatim() {
        let event = json!({"a": "x"});
        assert_eq!(interpolate("prefix {{a", &event), "prefix {{a");
    }
}
