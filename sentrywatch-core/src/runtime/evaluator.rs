// sentrywatch-core/src/runtime/evaluator.rs
// ============================================================================
// Module: Sentrywatch Rule Evaluator
// Description: Filters and evaluates rules against a single event.
// Purpose: Return the first matching, unexcepted, in-scope rule for an event.
// Dependencies: crate::{core, runtime::accessor, runtime::interpolator, runtime::operator}
// ============================================================================

//! ## Overview
//! `evaluate` filters by `enabled`, `source`,
//! and tenant scope; evaluate the condition set under its match mode;
//! veto on any matching exception; return the first rule (in catalog
//! order) that survives all three gates. An event produces at most one
//! match per run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::event::EventTree;
use crate::core::identifiers::TenantId;
use crate::core::rule::Condition;
use crate::core::rule::ConditionSet;
use crate::core::rule::MatchMode;
use crate::core::rule::Rule;
use crate::core::source::SourceType;
use crate::runtime::accessor;
use crate::runtime::interpolator::interpolate;
use crate::runtime::operator;

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Evaluates `event` (fetched from `source`) against `rules`, returning the
/// first matching, in-scope, unexcepted rule.
///
/// Rules are considered in the order given (the order returned by the rule
/// loader). A rule with a non-empty `tenant_ids` but no caller-supplied
/// `tenant_id` is skipped.
#[must_use]
pub fn evaluate<'a>(
    event: &EventTree,
    source: SourceType,
    rules: &'a [Rule],
    tenant_id: Option<&TenantId>,
) -> Option<&'a Rule> {
    rules
        .iter()
        .filter(|rule| rule.enabled)
        .filter(|rule| rule.source == source)
        .filter(|rule| rule.in_tenant_scope(tenant_id))
        .find(|rule| rule_matches(rule, event))
}

/// Returns true iff `rule`'s conditions match `event` and no exception does.
fn rule_matches(rule: &Rule, event: &EventTree) -> bool {
    if !evaluate_condition_set(&rule.conditions, event) {
        return false;
    }
    !rule.exceptions.iter().any(|exception| evaluate_condition(exception, event))
}

/// Evaluates a condition set under its match mode.
///
/// A condition set with no member conditions never matches, regardless of
/// match mode.
fn evaluate_condition_set(set: &ConditionSet, event: &EventTree) -> bool {
    if set.rules.is_empty() {
        return false;
    }
    match set.match_mode {
        MatchMode::All => set.rules.iter().all(|condition| evaluate_condition(condition, event)),
        MatchMode::Any => set.rules.iter().any(|condition| evaluate_condition(condition, event)),
    }
}

/// Evaluates a single condition: read the field, interpolate the expected
/// value, apply the operator.
fn evaluate_condition(condition: &Condition, event: &EventTree) -> bool {
    let actual = accessor::get(event, &condition.field);
    let expected = condition.value.as_deref().map(|template| interpolate(template, event));
    operator::apply(condition.operator, actual, expected.as_deref())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
