// sentrywatch-core/src/core/event.rs
// ============================================================================
// Module: Sentrywatch Event
// Description: Open-shaped event record representation.
// Purpose: Represent heterogeneous upstream payloads as a dynamic tree.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Events are semi-structured trees: a sum of scalar, mapping,
//! sequence, or null. Rather than inventing a parallel dynamic-value type,
//! this reuses `serde_json::Value`, which already models exactly that shape
//! and is how the upstream providers deserialize their payloads.

// ============================================================================
// SECTION: Event Tree
// ============================================================================

/// An event as a dynamic, semi-structured tree. No schema is enforced beyond
/// the field lookups individual rules request.
pub type EventTree = serde_json::Value;
