//! Provenance record module - the fundamental unit of Custodian's bookkeeping

use crate::trust::TrustLevel;

/// One entry in a custody chain
///
/// Records a single source/trust assertion. The trust level stored here is
/// the level the caller asked for, which may differ from the record's
/// effective level when a policy rule fired on the same assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustodyEntry {
    /// Source identifier asserted (e.g. "agent:researcher", "web:fetch")
    pub source: String,

    /// Trust level requested by the caller for this assertion
    pub trust: TrustLevel,

    /// Timestamp of the assertion (seconds since Unix epoch)
    pub at: u64,
}

impl CustodyEntry {
    /// Create a new custody entry
    pub fn new(source: impl Into<String>, trust: TrustLevel, at: u64) -> Self {
        Self {
            source: source.into(),
            trust,
            at,
        }
    }
}

/// The current and historical trust state for one content identifier
///
/// Records are created on first assertion and never deleted ("quarantine,
/// don't delete"). The custody chain is the source of truth; the flat
/// `source`/`trust_level` fields cache the effective current state, which
/// tracks the chain's last entry except where a policy override or a
/// quarantine has adjusted the trust level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceRecord {
    /// Caller-supplied identity for the content
    pub id: String,

    /// Current source identifier
    pub source: String,

    /// Effective trust level (post-policy, post-quarantine)
    pub trust_level: TrustLevel,

    /// Timestamp of the most recent assertion (seconds since Unix epoch)
    pub marked_at: u64,

    /// Every assertion ever made for this id, oldest first
    pub custody_chain: Vec<CustodyEntry>,
}

impl ProvenanceRecord {
    /// Create a record from its first assertion
    pub fn new(id: impl Into<String>, source: impl Into<String>, trust: TrustLevel, at: u64) -> Self {
        let source = source.into();
        Self {
            id: id.into(),
            source: source.clone(),
            trust_level: trust,
            marked_at: at,
            custody_chain: vec![CustodyEntry::new(source, trust, at)],
        }
    }

    /// Append an assertion to the chain and update the flat fields
    ///
    /// Prior entries are preserved verbatim. The effective trust level is
    /// set separately when a policy fires (see the store's mark operation).
    pub fn assert_source(&mut self, source: impl Into<String>, trust: TrustLevel, at: u64) {
        let source = source.into();
        self.custody_chain.push(CustodyEntry::new(source.clone(), trust, at));
        self.source = source;
        self.trust_level = trust;
        self.marked_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_one_chain_entry() {
        let record = ProvenanceRecord::new("m1", "agent:writer", TrustLevel::Unknown, 1000);
        assert_eq!(record.custody_chain.len(), 1);
        assert_eq!(record.custody_chain[0].source, "agent:writer");
        assert_eq!(record.custody_chain[0].trust, TrustLevel::Unknown);
        assert_eq!(record.source, "agent:writer");
    }

    #[test]
    fn test_assert_preserves_history() {
        let mut record = ProvenanceRecord::new("m1", "agent:writer", TrustLevel::Unknown, 1000);
        record.assert_source("web:fetch", TrustLevel::Untrusted, 2000);
        record.assert_source("agent:reviewer", TrustLevel::Trusted, 3000);

        assert_eq!(record.custody_chain.len(), 3);
        assert_eq!(record.custody_chain[0].source, "agent:writer");
        assert_eq!(record.custody_chain[1].source, "web:fetch");
        assert_eq!(record.custody_chain[2].source, "agent:reviewer");
        assert_eq!(record.source, "agent:reviewer");
        assert_eq!(record.trust_level, TrustLevel::Trusted);
        assert_eq!(record.marked_at, 3000);
    }

    #[test]
    fn test_flat_fields_track_last_entry() {
        let mut record = ProvenanceRecord::new("m1", "a:x", TrustLevel::Unknown, 1);
        record.assert_source("b:y", TrustLevel::Trusted, 2);

        let last = record.custody_chain.last().unwrap();
        assert_eq!(last.source, record.source);
        assert_eq!(last.trust, record.trust_level);
        assert_eq!(last.at, record.marked_at);
    }
}
