// sentrywatch-broker/src/notifier.rs
// ============================================================================
// Module: Notifier
// Description: Filters, groups, and renders alerts into a single chat card.
// Purpose: Post one throttle-aware notification card per run.
// Dependencies: sentrywatch-core, serde_json, tracing
// ============================================================================

//! ## Overview
//! The Notifier never touches the alert-state store: `should_notify` was
//! already decided per-event during the orchestrator's alert-state pass
//! (§4.6). This module only filters by delivery configuration and minimum
//! severity, groups the survivors by tenant, renders one card, and posts it
//! through an injected [`NotifierTransport`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;
use serde_json::json;
use time::format_description::well_known::Rfc3339;

use sentrywatch_core::Alert;
use sentrywatch_core::AlertDeliveryConfig;
use sentrywatch_core::NotifierTransport;
use sentrywatch_core::NotifierTransportError;

// ============================================================================
// SECTION: Notifier
// ============================================================================

/// Filters `alerts` per `config` and posts a single rendered card through
/// `transport`. Returns `Ok(0)` without posting when nothing passes the
/// filter, when delivery is disabled, or when no webhook URL is configured.
///
/// # Errors
///
/// Returns [`NotifierTransportError`] when the transport reports a non-2xx
/// response or a transport-level failure. The card is not retried within
/// the run.
pub async fn notify(
    transport: &dyn NotifierTransport,
    config: &AlertDeliveryConfig,
    alerts: &[Alert],
) -> Result<usize, NotifierTransportError> {
    let Some(webhook_url) = config.delivery_active().then(|| config.webhook_url.as_deref()).flatten() else {
        tracing::debug!("notifier delivery inactive, skipping card");
        return Ok(0);
    };

    let filtered = filter_for_notification(config, alerts);
    if filtered.is_empty() {
        tracing::debug!("no alerts survived notifier filtering, skipping card");
        return Ok(0);
    }

    let card = render_card(&filtered);
    transport.post_card(webhook_url, &card).await?;
    Ok(filtered.len())
}

/// Keeps alerts at or above `config.minimum_severity` whose `should_notify`
/// flag is not `false`.
fn filter_for_notification<'a>(config: &AlertDeliveryConfig, alerts: &'a [Alert]) -> Vec<&'a Alert> {
    alerts
        .iter()
        .filter(|alert| alert.severity >= config.minimum_severity)
        .filter(|alert| alert.should_notify)
        .collect()
}

/// Groups `alerts` by tenant name and renders one card with one block per
/// tenant.
fn render_card(alerts: &[&Alert]) -> Value {
    let mut by_tenant: BTreeMap<&str, Vec<&Alert>> = BTreeMap::new();
    for alert in alerts {
        by_tenant.entry(alert.tenant_name.as_str()).or_default().push(alert);
    }

    let blocks: Vec<Value> = by_tenant
        .into_iter()
        .map(|(tenant_name, tenant_alerts)| {
            json!({
                "tenant": tenant_name,
                "alerts": tenant_alerts.iter().map(|alert| render_alert_line(alert)).collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({ "blocks": blocks })
}

/// Renders one alert as a card line: severity, rule name, description,
/// user (when present), source, and an RFC 3339 timestamp.
fn render_alert_line(alert: &Alert) -> Value {
    let timestamp = alert
        .time_generated
        .format(&Rfc3339)
        .unwrap_or_else(|_| alert.time_generated.to_string());
    json!({
        "severity": alert.severity,
        "ruleName": alert.rule_name,
        "description": alert.description,
        "user": (!alert.user.is_empty()).then(|| alert.user.clone()),
        "source": alert.source,
        "timestamp": timestamp,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use time::OffsetDateTime;

    use sentrywatch_core::Alert;
    use sentrywatch_core::AlertDeliveryConfig;
    use sentrywatch_core::NotifierTransport;
    use sentrywatch_core::NotifierTransportError;
    use sentrywatch_core::Severity;
    use sentrywatch_core::SourceType;
    use sentrywatch_core::TenantId;

    use super::notify;

    struct RecordingTransport {
        posted: Mutex<Vec<serde_json::Value>>,
    }

    impl RecordingTransport {
        fn new() -> Self {
            Self { posted: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl NotifierTransport for RecordingTransport {
        async fn post_card(&self, _webhook_url: &str, payload: &serde_json::Value) -> Result<(), NotifierTransportError> {
            self.posted.lock().expect("lock").push(payload.clone());
            Ok(())
        }
    }

    fn alert(tenant_name: &str, severity: Severity, should_notify: bool) -> Alert {
        let now = OffsetDateTime::now_utc();
        Alert {
            time_generated: now,
            time_processed: now,
            tenant_id: TenantId::new("t1"),
            tenant_name: tenant_name.to_string(),
            user: "alice".to_string(),
            rule_name: "Rule".to_string(),
            severity,
            description: "desc".to_string(),
            source: SourceType::AuditLog,
            source_event_id: "evt-1".to_string(),
            raw_summary: "summary".to_string(),
            should_notify,
        }
    }

    #[tokio::test]
    async fn disabled_config_sends_nothing() {
        let transport = RecordingTransport::new();
        let config = AlertDeliveryConfig { enabled: false, webhook_url: Some("https://example.com".to_string()), minimum_severity: Severity::Low };
        let sent = notify(&transport, &config, &[alert("T", Severity::Critical, true)]).await.expect("no error");
        assert_eq!(sent, 0);
        assert!(transport.posted.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn missing_webhook_url_sends_nothing() {
        let transport = RecordingTransport::new();
        let config = AlertDeliveryConfig { enabled: true, webhook_url: None, minimum_severity: Severity::Low };
        let sent = notify(&transport, &config, &[alert("T", Severity::Critical, true)]).await.expect("no error");
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn filters_below_minimum_severity_and_should_notify_false() {
        let transport = RecordingTransport::new();
        let config = AlertDeliveryConfig { enabled: true, webhook_url: Some("https://example.com".to_string()), minimum_severity: Severity::High };
        let alerts = vec![
            alert("A", Severity::Low, true),
            alert("A", Severity::High, false),
            alert("A", Severity::Critical, true),
        ];
        let sent = notify(&transport, &config, &alerts).await.expect("no error");
        assert_eq!(sent, 1);
    }

    #[tokio::test]
    async fn groups_survivors_by_tenant_into_one_card() {
        let transport = RecordingTransport::new();
        let config = AlertDeliveryConfig { enabled: true, webhook_url: Some("https://example.com".to_string()), minimum_severity: Severity::Low };
        let alerts = vec![alert("TenantA", Severity::High, true), alert("TenantB", Severity::High, true)];
        notify(&transport, &config, &alerts).await.expect("no error");
        let posted = transport.posted.lock().expect("lock");
        assert_eq!(posted.len(), 1);
        let blocks = posted[0].get("blocks").and_then(|blocks| blocks.as_array()).expect("blocks array");
        assert_eq!(blocks.len(), 2);
    }
}
