// sentrywatch-core/src/runtime/rule_loader.rs
// ============================================================================
// Module: Sentrywatch Rule Loader
// Description: Parses and validates a single catalog rule document.
// Purpose: Convert raw catalog bytes into a validated Rule or a skip warning.
// Dependencies: crate::core::{identifiers, rule}, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! Catalog discovery (walking the configured directory, deriving each
//! document's stable id from its relative path) is an I/O concern owned by
//! the config store; this module only parses and validates the bytes of a
//! single already-discovered document. A malformed document
//! produces [`RuleLoadError`] so the caller can log a warning and continue
//! with the rest of the catalog — it is never fatal to the overall load.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identifiers::RuleId;
use crate::core::rule::Rule;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Reasons a catalog document was skipped rather than loaded.
#[derive(Debug, Error)]
pub enum RuleLoadError {
    /// The document could not be parsed as a rule (missing or mistyped
    /// `name`, `description`, `source`, `enabled`, or `conditions`).
    #[error("malformed rule document: {0}")]
    Malformed(String),
    /// The document parsed but omitted the required `severity` field.
    #[error("rule document is missing the required `severity` field")]
    MissingSeverity,
}

// ============================================================================
// SECTION: Document Id Derivation
// ============================================================================

/// Derives a rule's stable id from its catalog-relative path: separators
/// normalized to `/`, any file extension stripped.
#[must_use]
pub fn derive_rule_id(catalog_relative_path: &str) -> RuleId {
    let normalized = catalog_relative_path.replace('\\', "/");
    let without_extension = match normalized.rsplit_once('.') {
        Some((stem, _extension)) if !stem.is_empty() => stem.to_string(),
        _ => normalized,
    };
    RuleId::new(without_extension)
}

// ============================================================================
// SECTION: Document Parsing
// ============================================================================

/// Parses and validates one rule document's bytes.
///
/// # Errors
///
/// Returns [`RuleLoadError`] when the document is malformed or omits a
/// required field. This is never fatal to the overall catalog load —
/// callers should log and continue.
pub fn parse_rule_document(id: RuleId, raw: &str) -> Result<Rule, RuleLoadError> {
    let mut rule: Rule =
        serde_yaml::from_str(raw).map_err(|err| RuleLoadError::Malformed(err.to_string()))?;
    if rule.severity.is_none() {
        return Err(RuleLoadError::MissingSeverity);
    }
    rule.id = id;
    Ok(rule)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]
mod tests {
    use super::derive_rule_id;
    use super::parse_rule_document;
    use crate::core::identifiers::RuleId;

    #[test]
    fn derives_id_from_relative_path() {
        assert_eq!(
            derive_rule_id("audit/impossible-travel.yaml").as_str(),
            "audit/impossible-travel"
        );
        assert_eq!(
            derive_rule_id("audit\\impossible-travel.yaml").as_str(),
            "audit/impossible-travel"
        );
    }

    #[test]
    fn parses_a_valid_document() {
        let doc = r#"
name: Impossible Travel
description: Sign-in from two distant locations in a short window.
severity: High
enabled: true
source: SignIn
conditions:
  match: all
  rules:
    - field: riskLevel
      operator: equals
      value: high
"#;
        let rule = parse_rule_document(RuleId::new("signin/impossible-travel"), doc).unwrap();
        assert_eq!(rule.name, "Impossible Travel");
        assert_eq!(rule.id.as_str(), "signin/impossible-travel");
    }

    #[test]
    fn rejects_a_document_missing_severity() {
        let doc = r#"
name: No Severity
description: missing severity field
enabled: true
source: SignIn
conditions:
  match: all
  rules: []
"#;
        assert!(parse_rule_document(RuleId::new("x"), doc).is_err());
    }

    #[test]
    fn rejects_a_document_missing_source() {
        let doc = r#"
name: No Source
description: missing source field
severity: Low
enabled: true
conditions:
  match: all
  rules: []
"#;
        assert!(parse_rule_document(RuleId::new("x"), doc).is_err());
    }
}
