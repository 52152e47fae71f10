// sentrywatch-core/src/core/rule.rs
// ============================================================================
// Module: Sentrywatch Rule
// Description: Declarative detection rule schema.
// Purpose: Canonical shape for catalog-loaded rules and their conditions.
// Dependencies: crate::core::{identifiers, severity, source}, serde
// ============================================================================

//! ## Overview
//! A `Rule` is read-only to the engine and reloaded from the catalog each
//! run. Loading validates shape; evaluation never mutates a rule.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::RuleId;
use crate::core::identifiers::TenantId;
use crate::core::severity::Severity;
use crate::core::source::SourceType;

// ============================================================================
// SECTION: Operator
// ============================================================================

/// Comparison primitive applied by a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    /// True iff the field is present and non-null.
    Exists,
    /// Case-insensitive, string-coerced equality.
    Equals,
    /// Negation of `equals`.
    NotEquals,
    /// Case-insensitive, string-coerced substring containment.
    Contains,
}

// ============================================================================
// SECTION: Match Mode
// ============================================================================

/// Combinator applied across a rule's conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchMode {
    /// Every condition must evaluate to true.
    All,
    /// At least one condition must evaluate to true.
    Any,
}

// ============================================================================
// SECTION: Condition
// ============================================================================

/// A single `{field, operator, value}` triple evaluated against an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Dotted path read from the event via the Accessor.
    pub field: String,
    /// Comparison primitive to apply.
    pub operator: Operator,
    /// Expected value; interpolated against the event before comparison.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

// ============================================================================
// SECTION: Condition Set
// ============================================================================

/// A rule's `conditions` block: a match mode plus its member conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSet {
    /// Combinator applied across `rules`.
    #[serde(rename = "match")]
    pub match_mode: MatchMode,
    /// Member conditions.
    pub rules: Vec<Condition>,
}

// ============================================================================
// SECTION: Authoring Metadata
// ============================================================================

/// Optional informational metadata carried by a rule document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMetadata {
    /// Free-form author or team name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// External detection-framework tags (e.g. MITRE ATT&CK technique ids).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

// ============================================================================
// SECTION: Rule
// ============================================================================

/// A declarative detection rule loaded from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Stable id derived from the rule's catalog location.
    #[serde(skip)]
    pub id: RuleId,
    /// Display name.
    pub name: String,
    /// Human-readable description, echoed onto emitted alerts.
    pub description: String,
    /// Optional severity; absent rules are treated as `Low` for ordering
    /// purposes but are not coerced in the stored value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Whether this rule is active for evaluation.
    pub enabled: bool,
    /// Upstream feed this rule applies to.
    pub source: SourceType,
    /// Match conditions.
    pub conditions: ConditionSet,
    /// Conditions that veto an otherwise-matching rule.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<Condition>,
    /// Non-empty tenant scope; absent/empty means "all tenants".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_ids: Option<BTreeSet<TenantId>>,
    /// Optional informational metadata.
    #[serde(default)]
    pub metadata: RuleMetadata,
}

impl Rule {
    /// Returns the rule's effective severity, defaulting to `Low`.
    #[must_use]
    pub fn effective_severity(&self) -> Severity {
        self.severity.unwrap_or(Severity::Low)
    }

    /// Returns true when this rule is in scope for the given tenant.
    ///
    /// A rule with no (or empty) `tenant_ids` applies regardless of the
    /// caller-supplied tenant, including when none is provided. A rule with
    /// a non-empty `tenant_ids` but no caller-supplied tenant is out of
    /// scope.
    #[must_use]
    pub fn in_tenant_scope(&self, tenant_id: Option<&TenantId>) -> bool {
        match &self.tenant_ids {
            None => true,
            Some(scope) if scope.is_empty() => true,
            Some(scope) => match tenant_id {
                Some(tenant_id) => scope.contains(tenant_id),
                None => false,
            },
        }
    }
}
