//! Quarantine module - forced-untrusted isolation for content

/// Placeholder recorded when a caller gives no quarantine reason
pub const DEFAULT_REASON: &str = "no reason given";

/// An active quarantine for one content id
///
/// At most one entry exists per content id, and content must have a
/// provenance record before it can be quarantined. While an entry exists,
/// trust verification fails regardless of the record's stored trust level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantineEntry {
    /// The quarantined content id
    pub content_id: String,

    /// Why the content was isolated
    pub reason: String,

    /// Timestamp of isolation (seconds since Unix epoch)
    pub quarantined_at: u64,
}

impl QuarantineEntry {
    /// Create a new quarantine entry; an omitted reason gets the placeholder
    pub fn new(content_id: impl Into<String>, reason: Option<String>, quarantined_at: u64) -> Self {
        Self {
            content_id: content_id.into(),
            reason: reason.unwrap_or_else(|| DEFAULT_REASON.to_string()),
            quarantined_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_placeholder() {
        let entry = QuarantineEntry::new("m1", None, 1000);
        assert_eq!(entry.reason, DEFAULT_REASON);
    }

    #[test]
    fn test_explicit_reason() {
        let entry = QuarantineEntry::new("m1", Some("prompt injection".to_string()), 1000);
        assert_eq!(entry.reason, "prompt injection");
    }
}
