// sentrywatch-core/src/core/delivery.rs
// ============================================================================
// Module: Sentrywatch Delivery Configuration
// Description: Notifier delivery configuration shape.
// Purpose: Gate whether and at what severity alerts reach the chat webhook.
// Dependencies: crate::core::severity, serde
// ============================================================================

//! ## Overview
//! `AlertDeliveryConfig` is read from the configuration store once per run.
//! A disabled or unconfigured webhook silences the Notifier without
//! affecting sink ingestion.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::severity::Severity;

// ============================================================================
// SECTION: Delivery Configuration
// ============================================================================

/// Notification delivery configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDeliveryConfig {
    /// Whether notification delivery is enabled at all.
    pub enabled: bool,
    /// Chat webhook URL; `None` silences the Notifier even if `enabled`.
    pub webhook_url: Option<String>,
    /// Minimum severity an alert must carry to be included in a card.
    pub minimum_severity: Severity,
}

impl AlertDeliveryConfig {
    /// Returns true iff the Notifier should attempt delivery at all.
    #[must_use]
    pub fn delivery_active(&self) -> bool {
        self.enabled && self.webhook_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}
