//! Integration tests for custodian-store
//!
//! These tests verify the full provenance lifecycle: assertion, policy
//! application, quarantine, verification, and the audit trail.

use custodian_domain::traits::{PolicyOutcome, ProvenanceStore};
use custodian_domain::{AuditAction, Reason, TrustLevel, Verdict};
use custodian_store::{SqliteStore, StoreError};

fn memory_store() -> SqliteStore {
    SqliteStore::new(":memory:").unwrap()
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_open_dir_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("state").join("custodian");

    let store = SqliteStore::open_dir(&nested);
    assert!(store.is_ok(), "Should create the storage directory");
    assert!(nested.join("custodian.db").exists());
}

#[test]
fn test_verify_unknown_before_any_mark() {
    let store = memory_store();

    let decision = store.verify("never-seen").unwrap();
    assert_eq!(decision.verdict, Verdict::Unknown);
    assert_eq!(decision.reason, Reason::NoRecord);
}

#[test]
fn test_mark_creates_record() {
    let mut store = memory_store();

    let outcome = store
        .mark_source("m1", "agent:writer", TrustLevel::Unknown, 1000)
        .unwrap();
    assert!(outcome.created);
    assert!(outcome.policy.is_none());
    assert_eq!(outcome.record.source, "agent:writer");
    assert_eq!(outcome.record.trust_level, TrustLevel::Unknown);
    assert_eq!(outcome.record.custody_chain.len(), 1);

    let record = store.record("m1").unwrap().unwrap();
    assert_eq!(record, outcome.record);
}

#[test]
fn test_custody_chain_grows_in_call_order() {
    let mut store = memory_store();

    let calls = [
        ("agent:writer", TrustLevel::Unknown),
        ("web:fetch", TrustLevel::Untrusted),
        ("agent:reviewer", TrustLevel::Trusted),
        ("agent:writer", TrustLevel::Unknown),
    ];
    for (i, (source, level)) in calls.iter().enumerate() {
        store.mark_source("m1", source, *level, 1000 + i as u64).unwrap();
    }

    let record = store.record("m1").unwrap().unwrap();
    assert_eq!(record.custody_chain.len(), calls.len());
    for (entry, (source, level)) in record.custody_chain.iter().zip(calls.iter()) {
        assert_eq!(&entry.source, source);
        assert_eq!(&entry.trust, level);
    }
    // Flat fields mirror the last entry when no policy fired
    assert_eq!(record.source, "agent:writer");
    assert_eq!(record.trust_level, TrustLevel::Unknown);
    assert_eq!(record.marked_at, 1003);
}

#[test]
fn test_verify_reflects_stored_level() {
    let mut store = memory_store();

    store.mark_source("good", "a:b", TrustLevel::Trusted, 1).unwrap();
    store.mark_source("bad", "a:b", TrustLevel::Untrusted, 2).unwrap();
    store.mark_source("meh", "a:b", TrustLevel::Unknown, 3).unwrap();

    assert_eq!(store.verify("good").unwrap().verdict, Verdict::Pass);
    assert_eq!(store.verify("bad").unwrap().verdict, Verdict::Fail);
    assert_eq!(store.verify("meh").unwrap().verdict, Verdict::Unknown);
}

#[test]
fn test_policy_overrides_requested_level() {
    let mut store = memory_store();

    store.add_policy("web:*", TrustLevel::Untrusted, 100).unwrap();
    let outcome = store
        .mark_source("m1", "web:scraper", TrustLevel::Trusted, 200)
        .unwrap();

    // The override is surfaced, the chain keeps the requested level, the
    // flat field carries the effective one.
    let policy = outcome.policy.expect("policy should have fired");
    assert_eq!(policy.pattern, "web:*");
    assert_eq!(outcome.requested_level, TrustLevel::Trusted);
    assert_eq!(outcome.record.trust_level, TrustLevel::Untrusted);
    assert_eq!(outcome.record.custody_chain[0].trust, TrustLevel::Trusted);

    assert_eq!(store.verify("m1").unwrap().verdict, Verdict::Fail);
}

#[test]
fn test_policy_first_match_by_creation_order() {
    let mut store = memory_store();

    store.add_policy("a:*", TrustLevel::Trusted, 100).unwrap();
    store.add_policy("a:b*", TrustLevel::Untrusted, 200).unwrap();

    let outcome = store
        .mark_source("m1", "a:b1", TrustLevel::Unknown, 300)
        .unwrap();

    // The earlier, less specific rule wins
    assert_eq!(outcome.policy.unwrap().pattern, "a:*");
    assert_eq!(outcome.record.trust_level, TrustLevel::Trusted);
}

#[test]
fn test_policies_not_retroactive() {
    let mut store = memory_store();

    store.mark_source("m1", "internal:bot", TrustLevel::Unknown, 100).unwrap();
    store.add_policy("internal:*", TrustLevel::Trusted, 200).unwrap();

    // Policies are evaluated at assertion time, not retroactively
    assert_eq!(store.verify("m1").unwrap().verdict, Verdict::Unknown);
}

#[test]
fn test_policy_upsert_keeps_resolution_order() {
    let mut store = memory_store();

    assert_eq!(
        store.add_policy("a:*", TrustLevel::Trusted, 100).unwrap(),
        PolicyOutcome::Created
    );
    store.add_policy("b:*", TrustLevel::Untrusted, 200).unwrap();
    assert_eq!(
        store.add_policy("a:*", TrustLevel::Untrusted, 300).unwrap(),
        PolicyOutcome::Updated
    );

    let rules = store.policies_in_resolution_order().unwrap();
    assert_eq!(rules.len(), 2, "Upsert must not duplicate the pattern");
    assert_eq!(rules[0].pattern, "a:*", "Update must keep creation order");
    assert_eq!(rules[0].trust_level, TrustLevel::Untrusted);
    assert_eq!(rules[0].created_at, 100, "Update must keep created_at");
}

#[test]
fn test_remove_policy_not_found() {
    let mut store = memory_store();
    store.add_policy("a:*", TrustLevel::Trusted, 100).unwrap();

    let result = store.remove_policy("b:*", 200);
    assert!(matches!(result, Err(StoreError::NotFound(_))));

    // The policy set is unchanged
    let rules = store.list_policies().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].pattern, "a:*");
}

#[test]
fn test_remove_policy() {
    let mut store = memory_store();
    store.add_policy("a:*", TrustLevel::Trusted, 100).unwrap();
    store.remove_policy("a:*", 200).unwrap();
    assert!(store.list_policies().unwrap().is_empty());
}

#[test]
fn test_quarantine_overrides_trusted() {
    let mut store = memory_store();

    store.mark_source("m1", "agent:writer", TrustLevel::Trusted, 100).unwrap();
    assert_eq!(store.verify("m1").unwrap().verdict, Verdict::Pass);

    store.quarantine("m1", Some("tampering suspected".to_string()), 200).unwrap();

    let decision = store.verify("m1").unwrap();
    assert_eq!(decision.verdict, Verdict::Fail);
    assert_eq!(
        decision.reason,
        Reason::Quarantined {
            reason: "tampering suspected".to_string()
        }
    );

    // The forced level is a direct mutation, not a chain entry
    let record = store.record("m1").unwrap().unwrap();
    assert_eq!(record.trust_level, TrustLevel::Untrusted);
    assert_eq!(record.custody_chain.len(), 1);
    assert_eq!(record.custody_chain[0].trust, TrustLevel::Trusted);
}

#[test]
fn test_quarantine_requires_record() {
    let mut store = memory_store();
    let result = store.quarantine("ghost", None, 100);
    assert!(matches!(result, Err(StoreError::NotFound(_))));
    assert!(store.list_quarantined().unwrap().is_empty());
}

#[test]
fn test_quarantine_is_idempotent_conflict() {
    let mut store = memory_store();
    store.mark_source("m1", "a:b", TrustLevel::Unknown, 100).unwrap();

    store.quarantine("m1", Some("first".to_string()), 200).unwrap();
    let second = store.quarantine("m1", Some("second".to_string()), 300);
    assert!(matches!(second, Err(StoreError::AlreadyQuarantined(_))));

    // Exactly one entry remains, and it is the first one
    let entries = store.list_quarantined().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].reason, "first");
    assert_eq!(entries[0].quarantined_at, 200);
}

#[test]
fn test_quarantine_default_reason() {
    let mut store = memory_store();
    store.mark_source("m1", "a:b", TrustLevel::Unknown, 100).unwrap();

    let entry = store.quarantine("m1", None, 200).unwrap();
    assert_eq!(entry.reason, "no reason given");
}

#[test]
fn test_end_to_end_policy_scenario() {
    let mut store = memory_store();

    store.mark_source("m1", "internal:bot", TrustLevel::Unknown, 100).unwrap();
    assert_eq!(store.verify("m1").unwrap().verdict, Verdict::Unknown);

    store.add_policy("internal:*", TrustLevel::Trusted, 200).unwrap();
    let outcome = store
        .mark_source("m1", "internal:bot", TrustLevel::Unknown, 300)
        .unwrap();
    assert_eq!(outcome.policy.unwrap().pattern, "internal:*");

    assert_eq!(store.verify("m1").unwrap().verdict, Verdict::Pass);
}

#[test]
fn test_audit_trail() {
    let mut store = memory_store();

    store.mark_source("m1", "a:b", TrustLevel::Unknown, 100).unwrap();
    store.add_policy("a:*", TrustLevel::Trusted, 200).unwrap();
    store.quarantine("m1", None, 300).unwrap();
    store.remove_policy("a:*", 400).unwrap();

    let events = store.recent_audit_events(10).unwrap();
    assert_eq!(events.len(), 4);

    // Newest first
    let actions: Vec<_> = events.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::PolicyRemove,
            AuditAction::Quarantine,
            AuditAction::PolicyAdd,
            AuditAction::MarkSource,
        ]
    );
    assert_eq!(events[1].content_id.as_deref(), Some("m1"));
    assert_eq!(events[3].content_id.as_deref(), Some("m1"));
    assert!(events[3].details.contains("a:b"));
}

#[test]
fn test_failed_operations_leave_no_audit() {
    let mut store = memory_store();

    assert!(store.quarantine("ghost", None, 100).is_err());
    assert!(store.remove_policy("nope", 200).is_err());

    assert!(store.recent_audit_events(10).unwrap().is_empty());
}

#[test]
fn test_stats() {
    let mut store = memory_store();

    store.mark_source("t1", "a:b", TrustLevel::Trusted, 1).unwrap();
    store.mark_source("t2", "a:b", TrustLevel::Trusted, 2).unwrap();
    store.mark_source("u1", "a:b", TrustLevel::Untrusted, 3).unwrap();
    store.mark_source("k1", "a:b", TrustLevel::Unknown, 4).unwrap();
    store.quarantine("t2", None, 5).unwrap();
    store.add_policy("web:*", TrustLevel::Untrusted, 6).unwrap();

    let stats = store.stats().unwrap();
    assert_eq!(stats.trusted, 1, "Quarantine moved t2 to untrusted");
    assert_eq!(stats.untrusted, 2);
    assert_eq!(stats.unknown, 1);
    assert_eq!(stats.quarantined, 1);
    assert_eq!(stats.policies, 1);
    assert_eq!(stats.recent.len(), 5);
}

#[test]
fn test_persistence_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("custodian.db");

    {
        let mut store = SqliteStore::new(&db_path).unwrap();
        store.mark_source("m1", "agent:writer", TrustLevel::Trusted, 100).unwrap();
        store.mark_source("m1", "web:fetch", TrustLevel::Unknown, 200).unwrap();
        store.quarantine("m1", Some("stale".to_string()), 300).unwrap();
    }

    let store = SqliteStore::new(&db_path).unwrap();
    let record = store.record("m1").unwrap().unwrap();
    assert_eq!(record.custody_chain.len(), 2);
    assert_eq!(record.trust_level, TrustLevel::Untrusted);

    let decision = store.verify("m1").unwrap();
    assert_eq!(decision.verdict, Verdict::Fail);
    assert_eq!(
        decision.reason,
        Reason::Quarantined {
            reason: "stale".to_string()
        }
    );
}
