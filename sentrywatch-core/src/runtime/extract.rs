// sentrywatch-core/src/runtime/extract.rs
// ============================================================================
// Module: Sentrywatch Field Extraction
// Description: Per-source acting-user, timestamp, id, and summary extraction.
// Purpose: Normalize heterogeneous event shapes into Alert fields.
// Dependencies: crate::{core::{event, source}, runtime::accessor}, time
// ============================================================================

//! ## Overview
//! Each upstream source shapes its payload differently; these functions
//! encode the fixed per-source field mapping so the
//! orchestrator never special-cases a source type beyond calling into here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::event::EventTree;
use crate::core::source::SourceType;
use crate::runtime::accessor;
use crate::runtime::operator::stringify_value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a rendered raw-event summary.
pub const MAX_RAW_SUMMARY_LEN: usize = 500;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure extracting the event timestamp.
#[derive(Debug, Error)]
pub enum TimestampExtractError {
    /// The timestamp field was absent or null.
    #[error("event is missing its timestamp field")]
    Missing,
    /// The timestamp field was present but not a valid RFC 3339 string.
    #[error("event timestamp is not valid RFC 3339: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Acting User
// ============================================================================

/// Extracts the acting user for a source.
///
/// `SecurityAlert` has no acting-user concept and always yields the empty
/// string, which is itself a valid alert-state key component.
#[must_use]
pub fn acting_user(source: SourceType, event: &EventTree) -> String {
    let field = match source {
        SourceType::SignIn => "userPrincipalName",
        SourceType::AuditLog => "UserId",
        SourceType::SecurityAlert => return String::new(),
    };
    accessor::get(event, field)
        .filter(|value| !value.is_null())
        .map(stringify_value)
        .unwrap_or_default()
}

// ============================================================================
// SECTION: Event Timestamp
// ============================================================================

/// Extracts and parses the event timestamp for a source.
///
/// # Errors
///
/// Returns [`TimestampExtractError`] when the field is absent or not a
/// valid RFC 3339 timestamp string.
pub fn event_time(source: SourceType, event: &EventTree) -> Result<OffsetDateTime, TimestampExtractError> {
    let field = match source {
        SourceType::SignIn | SourceType::SecurityAlert => "createdDateTime",
        SourceType::AuditLog => "CreationTime",
    };
    let value = accessor::get(event, field)
        .filter(|value| !value.is_null())
        .ok_or(TimestampExtractError::Missing)?;
    let text = value.as_str().ok_or_else(|| {
        TimestampExtractError::Invalid("timestamp field is not a string".to_string())
    })?;
    OffsetDateTime::parse(text, &Rfc3339)
        .map_err(|err| TimestampExtractError::Invalid(err.to_string()))
}

// ============================================================================
// SECTION: Event Id
// ============================================================================

/// Extracts the upstream event id for a source.
#[must_use]
pub fn event_id(source: SourceType, event: &EventTree) -> String {
    let field = match source {
        SourceType::AuditLog => "Id",
        SourceType::SignIn | SourceType::SecurityAlert => "id",
    };
    accessor::get(event, field)
        .filter(|value| !value.is_null())
        .map(stringify_value)
        .unwrap_or_default()
}

// ============================================================================
// SECTION: Raw Summary
// ============================================================================

/// Renders a concise, source-specific summary line, truncated to
/// [`MAX_RAW_SUMMARY_LEN`] characters.
#[must_use]
pub fn raw_summary(source: SourceType, event: &EventTree) -> String {
    let rendered = match source {
        SourceType::SignIn => signin_summary(event),
        SourceType::SecurityAlert => security_alert_summary(event),
        SourceType::AuditLog => audit_log_summary(event),
    };
    truncate_chars(&rendered, MAX_RAW_SUMMARY_LEN)
}

/// Renders a sign-in summary line.
fn signin_summary(event: &EventTree) -> String {
    let user = field_or_unknown(event, "userPrincipalName");
    let app = field_or_unknown(event, "appDisplayName");
    let risk = field_or_unknown(event, "riskLevel");
    format!("sign-in: user={user} app={app} risk={risk}")
}

/// Renders a security-alert summary line.
fn security_alert_summary(event: &EventTree) -> String {
    let title = field_or_unknown(event, "title");
    let category = field_or_unknown(event, "category");
    let severity = field_or_unknown(event, "severity");
    format!("security-alert: title={title} category={category} severity={severity}")
}

/// Renders an audit-log summary line.
fn audit_log_summary(event: &EventTree) -> String {
    let operation = field_or_unknown(event, "Operation");
    let user = field_or_unknown(event, "UserId");
    let workload = field_or_unknown(event, "Workload");
    format!("audit-log: operation={operation} user={user} workload={workload}")
}

/// Reads a field for summary rendering, substituting `"unknown"` when absent.
fn field_or_unknown(event: &EventTree, field: &str) -> String {
    accessor::get(event, field)
        .filter(|value| !value.is_null())
        .map(stringify_value)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Truncates `text` to at most `max_chars` Unicode scalar values.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]
mod tests {
    use serde_json::json;

    use super::acting_user;
    use super::event_id;
    use super::event_time;
    use super::raw_summary;
    use crate::core::source::SourceType;

    #[test]
    fn signin_acting_user_is_user_principal_name() {
        let event = json!({"userPrincipalName": "alice@example.com"});
        assert_eq!(acting_user(SourceType::SignIn, &event), "alice@example.com");
    }

    #[test]
    fn audit_log_acting_user_is_user_id() {
        let event = json!({"UserId": "alice@example.com"});
        assert_eq!(acting_user(SourceType::AuditLog, &event), "alice@example.com");
    }

    #[test]
    fn security_alert_acting_user_is_always_empty() {
        let event = json!({"userPrincipalName": "alice@example.com"});
        assert_eq!(acting_user(SourceType::SecurityAlert, &event), "");
    }

    #[test]
    fn event_time_parses_rfc3339() {
        let event = json!({"createdDateTime": "2026-07-29T12:00:00Z"});
        let parsed = event_time(SourceType::SignIn, &event).unwrap();
        assert_eq!(parsed.unix_timestamp(), 1_785_326_400);
    }

    #[test]
    fn event_time_missing_field_is_an_error() {
        let event = json!({});
        assert!(event_time(SourceType::SignIn, &event).is_err());
    }

    #[test]
    fn audit_log_event_id_is_capital_id() {
        let event = json!({"Id": "abc-123"});
        assert_eq!(event_id(SourceType::AuditLog, &event), "abc-123");
    }

    #[test]
    fn signin_event_id_is_lowercase_id() {
        let event = json!({"id": "abc-123"});
        assert_eq!(event_id(SourceType::SignIn, &event), "abc-123");
    }

    #[test]
    fn raw_summary_never_exceeds_max_length() {
        let long_value = "x".repeat(2_000);
        let event = json!({"Operation": long_value, "UserId": "u", "Workload": "w"});
        let summary = raw_summary(SourceType::AuditLog, &event);
        assert!(summary.chars().count() <= super::MAX_RAW_SUMMARY_LEN);
    }
}
