// sentrywatch-core/src/runtime/accessor.rs
// ============================================================================
// Module: Sentrywatch Accessor
// Description: Dotted-path read of nested event data with array indexing.
// Purpose: Let rule conditions address arbitrary fields of an event tree.
// Dependencies: crate::core::event, serde_json
// ============================================================================

//! ## Overview
//! `get` walks a dotted path through an [`EventTree`] one segment at a time.
//! Mappings are indexed by key; sequences are indexed by a base-10
//! non-negative integer segment. Any other combination, or a null/absent
//! intermediate, short-circuits to absent. This function never panics and
//! never returns an error — "absent" is `None`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::event::EventTree;

// ============================================================================
// SECTION: Accessor
// ============================================================================

/// Reads `path` (dot-separated segments) out of `tree`.
///
/// Returns `None` when any segment cannot be resolved: a missing mapping
/// key, an out-of-range or non-numeric sequence index, an attempt to index
/// a scalar, or a null/absent intermediate node.
#[must_use]
pub fn get<'a>(tree: &'a EventTree, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }

    let mut current = tree;
    for segment in path.split('.') {
        current = step(current, segment)?;
    }
    Some(current)
}

/// Resolves a single path segment against the current node.
fn step<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => {
            let index: usize = segment.parse().ok()?;
            items.get(index)
        }
        _ => None,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::get;

    #[test]
    fn reads_nested_mapping_field() {
        let event = json!({"a": {"b": {"c": "value"}}});
        assert_eq!(get(&event, "a.b.c"), Some(&json!("value")));
    }

    #[test]
    fn indexes_into_array_by_numeric_segment() {
        let event = json!({"items": [{"v": 1}, {"v": 2}]});
        assert_eq!(get(&event, "items.1.v"), Some(&json!(2)));
    }

    #[test]
    fn non_numeric_segment_against_array_is_absent() {
        let event = json!({"items": [1, 2, 3]});
        assert_eq!(get(&event, "items.first"), None);
    }

    #[test]
    fn integer_segment_against_mapping_is_absent() {
        let event = json!({"a": {"b": 1}});
        assert_eq!(get(&event, "a.0"), None);
    }

    #[test]
    fn null_intermediate_short_circuits() {
        let event = json!({"a": null});
        assert_eq!(get(&event, "a.b"), None);
    }

    #[test]
    fn missing_key_is_absent() {
        let event = json!({"a": 1});
        assert_eq!(get(&event, "missing"), None);
    }

    #[test]
    fn out_of_range_index_is_absent() {
        let event = json!({"items": [1]});
        assert_eq!(get(&event, "items.5"), None);
    }

    #[test]
    fn empty_path_is_absent() {
        let event = json!({"a": 1});
        assert_eq!(get(&event, ""), None);
    }

    #[test]
    fn scalar_node_cannot_be_indexed_further() {
        let event = json!({"a": "scalar"});
        assert_eq!(get(&event, "a.b"), None);
    }
}
