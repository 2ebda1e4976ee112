//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and
//! infrastructure. Infrastructure implementations live in other crates.

use crate::audit::AuditEvent;
use crate::policy::PolicyRule;
use crate::quarantine::QuarantineEntry;
use crate::record::ProvenanceRecord;
use crate::trust::TrustLevel;
use crate::verdict::TrustDecision;

/// Outcome of a mark-source operation
///
/// `policy` is the rule that fired, when one did - policy application can
/// silently change the effective trust level away from what the caller
/// requested, and that override must stay observable to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkOutcome {
    /// The record as persisted, chain included
    pub record: ProvenanceRecord,

    /// True when this assertion created the record
    pub created: bool,

    /// The trust level the caller asked for
    pub requested_level: TrustLevel,

    /// The policy rule that overrode the requested level, if any
    pub policy: Option<PolicyRule>,
}

/// Outcome of a policy upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyOutcome {
    /// A new rule was created
    Created,

    /// An existing rule's trust level was replaced in place
    Updated,
}

/// Aggregate counts for reporting
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreStats {
    /// Records currently marked trusted
    pub trusted: u64,

    /// Records currently marked untrusted
    pub untrusted: u64,

    /// Records currently marked unknown
    pub unknown: u64,

    /// Active quarantine entries
    pub quarantined: u64,

    /// Policy rules
    pub policies: u64,

    /// Most recent audit events, newest first
    pub recent: Vec<AuditEvent>,
}

/// Trait for storing and resolving provenance state
///
/// Implemented by the infrastructure layer (custodian-store). Every mutating
/// operation is a single atomic unit: record update, policy application, and
/// audit write commit together or not at all.
pub trait ProvenanceStore {
    /// Error type for store operations
    type Error;

    /// Assert a source for a content id, creating or extending its record
    fn mark_source(
        &mut self,
        id: &str,
        source: &str,
        level: TrustLevel,
        at: u64,
    ) -> Result<MarkOutcome, Self::Error>;

    /// Get a record with its full custody chain
    fn record(&self, id: &str) -> Result<Option<ProvenanceRecord>, Self::Error>;

    /// Resolve the verdict for a content id; pure read, no side effects
    fn verify(&self, id: &str) -> Result<TrustDecision, Self::Error>;

    /// Isolate a content id, forcing its trust level to untrusted
    fn quarantine(
        &mut self,
        id: &str,
        reason: Option<String>,
        at: u64,
    ) -> Result<QuarantineEntry, Self::Error>;

    /// Get the active quarantine entry for a content id
    fn quarantine_entry(&self, id: &str) -> Result<Option<QuarantineEntry>, Self::Error>;

    /// List all active quarantine entries
    fn list_quarantined(&self) -> Result<Vec<QuarantineEntry>, Self::Error>;

    /// Create or update a policy rule by pattern
    fn add_policy(
        &mut self,
        pattern: &str,
        level: TrustLevel,
        at: u64,
    ) -> Result<PolicyOutcome, Self::Error>;

    /// Remove a policy rule by pattern
    fn remove_policy(&mut self, pattern: &str, at: u64) -> Result<(), Self::Error>;

    /// List policy rules in display order (creation time)
    fn list_policies(&self) -> Result<Vec<PolicyRule>, Self::Error>;

    /// Aggregate counts plus the most recent audit events
    fn stats(&self) -> Result<StoreStats, Self::Error>;
}
