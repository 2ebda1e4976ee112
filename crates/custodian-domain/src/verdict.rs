//! Verdict module - the trust-resolution state machine
//!
//! Combines a record's stored trust level and its quarantine status into a
//! single verdict. Resolution order is strict: missing record, then
//! quarantine, then stored level. Quarantine always overrides a trusted
//! marking - it is a safety valve that a stale trust assertion must not be
//! able to bypass.

use crate::quarantine::QuarantineEntry;
use crate::record::ProvenanceRecord;
use crate::trust::TrustLevel;

/// The outcome of trust verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Content may be acted upon
    Pass,

    /// Content must not be acted upon
    Fail,

    /// No determination possible
    Unknown,
}

impl Verdict {
    /// Get the verdict name as an uppercase string for reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a verdict was reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// No provenance record exists for the id
    NoRecord,

    /// An active quarantine forced the failure
    Quarantined {
        /// The reason recorded when the content was isolated
        reason: String,
    },

    /// The record's stored trust level decided the verdict
    StoredLevel(TrustLevel),
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reason::NoRecord => write!(f, "no provenance record"),
            Reason::Quarantined { reason } => write!(f, "quarantined: {}", reason),
            Reason::StoredLevel(level) => write!(f, "marked {}", level),
        }
    }
}

/// A verdict together with the reason it was reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustDecision {
    /// The verdict
    pub verdict: Verdict,

    /// What decided it: quarantine, stored level, or a missing record
    pub reason: Reason,
}

/// Resolve a verdict for a record and its quarantine status
///
/// Pure function, no side effects. Evaluation order:
/// 1. no record -> Unknown
/// 2. active quarantine -> Fail, regardless of stored trust level
/// 3. stored trust level: trusted -> Pass, untrusted -> Fail,
///    unknown -> Unknown
pub fn decide(record: Option<&ProvenanceRecord>, quarantine: Option<&QuarantineEntry>) -> TrustDecision {
    let Some(record) = record else {
        return TrustDecision {
            verdict: Verdict::Unknown,
            reason: Reason::NoRecord,
        };
    };

    if let Some(entry) = quarantine {
        return TrustDecision {
            verdict: Verdict::Fail,
            reason: Reason::Quarantined {
                reason: entry.reason.clone(),
            },
        };
    }

    let verdict = match record.trust_level {
        TrustLevel::Trusted => Verdict::Pass,
        TrustLevel::Untrusted => Verdict::Fail,
        TrustLevel::Unknown => Verdict::Unknown,
    };

    TrustDecision {
        verdict,
        reason: Reason::StoredLevel(record.trust_level),
    }
}
