//! Audit module - the append-only log of state-changing operations

use std::fmt;

/// Unique identifier for an audit event based on UUIDv7
///
/// UUIDv7 provides:
/// - Chronological sortability for temporal queries
/// - 128-bit uniqueness
/// - No coordination required across concurrent invocations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(u128);

impl EventId {
    /// Generate a new UUIDv7-based EventId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an EventId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// The state-changing operations that produce audit events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditAction {
    /// A source assertion (record created or chain appended)
    MarkSource,

    /// Content isolated
    Quarantine,

    /// Policy rule created or updated
    PolicyAdd,

    /// Policy rule removed
    PolicyRemove,
}

impl AuditAction {
    /// Get the action name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::MarkSource => "mark-source",
            AuditAction::Quarantine => "quarantine",
            AuditAction::PolicyAdd => "policy-add",
            AuditAction::PolicyRemove => "policy-remove",
        }
    }

    /// Parse an action from a string (internal use)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mark-source" => Some(AuditAction::MarkSource),
            "quarantine" => Some(AuditAction::Quarantine),
            "policy-add" => Some(AuditAction::PolicyAdd),
            "policy-remove" => Some(AuditAction::PolicyRemove),
            _ => None,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry in the audit log
///
/// Events are append-only: never mutated, never deleted. Each state-changing
/// operation emits exactly one event, written in the same transaction as the
/// state change itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Unique event identifier
    pub id: EventId,

    /// Which operation produced this event
    pub action: AuditAction,

    /// The affected content id, when the operation targets one
    pub content_id: Option<String>,

    /// Human-readable operation detail
    pub details: String,

    /// When the operation ran (seconds since Unix epoch)
    pub timestamp: u64,
}

impl AuditEvent {
    /// Create a new audit event with a fresh id
    pub fn new(
        action: AuditAction,
        content_id: Option<String>,
        details: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        Self {
            id: EventId::new(),
            action,
            content_id,
            details: details.into(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id_ordering() {
        let id1 = EventId::from_value(1000);
        let id2 = EventId::from_value(2000);

        assert!(id1 < id2);
        assert!(id2 > id1);
    }

    #[test]
    fn test_event_ids_unique() {
        let a = EventId::new();
        let b = EventId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_action_round_trip() {
        for action in [
            AuditAction::MarkSource,
            AuditAction::Quarantine,
            AuditAction::PolicyAdd,
            AuditAction::PolicyRemove,
        ] {
            assert_eq!(AuditAction::parse(action.as_str()), Some(action));
        }
    }

    #[test]
    fn test_action_parse_invalid() {
        assert!(AuditAction::parse("delete").is_none());
    }
}
