//! Custodian Storage Layer
//!
//! Implements the `ProvenanceStore` trait on top of SQLite.
//!
//! # Architecture
//!
//! - One SQLite file holds all four logical tables (content, custody chain,
//!   policies, quarantine) plus the audit log
//! - Every mutating command runs inside a single write transaction: record
//!   update, policy application, and audit write commit together or not at
//!   all
//! - Concurrent invocations against the same file serialize through SQLite's
//!   locking; momentary lock contention is retried a bounded number of times
//!   with backoff before surfacing as `StoreError::Busy`
//!
//! Policy reads take no isolation beyond SQLite's native consistency: a rule
//! committed after an assertion's transaction began applies only to later
//! assertions.
//!
//! # Examples
//!
//! ```no_run
//! use custodian_store::SqliteStore;
//!
//! let store = SqliteStore::new("custodian.db").unwrap();
//! // Store is now ready for provenance operations
//! ```

#![warn(missing_docs)]

use std::path::Path;
use std::time::Duration;

use custodian_domain::traits::{MarkOutcome, PolicyOutcome, ProvenanceStore, StoreStats};
use custodian_domain::{
    policy, AuditAction, AuditEvent, CustodyEntry, EventId, PolicyRule, ProvenanceRecord,
    QuarantineEntry, TrustDecision, TrustLevel,
};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Transaction, TransactionBehavior};
use thiserror::Error;
use tracing::{debug, info};

/// How long SQLite itself waits on a locked database before erroring
const BUSY_TIMEOUT: Duration = Duration::from_millis(250);

/// Write-transaction attempts before giving up with `StoreError::Busy`
const BUSY_RETRIES: u32 = 5;

/// Backoff between write-transaction attempts, scaled linearly
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Database file name used when opening a storage directory
pub const DB_FILE: &str = "custodian.db";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error creating the storage directory
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Content id or policy pattern not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Content is already quarantined
    #[error("Already quarantined: {0}")]
    AlreadyQuarantined(String),

    /// Invalid data format in the database
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The database stayed locked by a concurrent writer
    #[error("Database busy after {attempts} attempts")]
    Busy {
        /// Write-transaction attempts made before giving up
        attempts: u32,
    },
}

/// SQLite-based implementation of `ProvenanceStore`
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread (and each CLI
/// invocation) should have its own `SqliteStore` instance; cross-process
/// races serialize through SQLite's file locking.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use custodian_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("custodian.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open (creating on first use) a storage directory and its database
    ///
    /// The directory is created if absent; the database file inside it is
    /// named [`DB_FILE`].
    pub fn open_dir<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&dir)?;
        Self::new(dir.as_ref().join(DB_FILE))
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Policy rules in resolution order (storage/creation order)
    ///
    /// Kept distinct from [`ProvenanceStore::list_policies`], which is
    /// display order; the two coincide today but are separate concerns.
    pub fn policies_in_resolution_order(&self) -> Result<Vec<PolicyRule>, StoreError> {
        load_policies(&self.conn, "ORDER BY rowid")
    }

    /// The `limit` most recent audit events, newest first
    pub fn recent_audit_events(&self, limit: u32) -> Result<Vec<AuditEvent>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, action, content_id, details, timestamp FROM audit_log
             ORDER BY timestamp DESC, rowid DESC LIMIT ?1",
        )?;
        let events = stmt
            .query_map(params![limit], row_to_audit_event)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }

    /// Run `op` inside a write transaction, retrying on lock contention
    ///
    /// The transaction takes the write lock up front (IMMEDIATE) so two
    /// concurrent mark operations on the same id serialize instead of
    /// interleaving. Busy errors retry up to `BUSY_RETRIES` times with
    /// linear backoff; anything else aborts the invocation.
    fn with_write_txn<T, F>(&mut self, mut op: F) -> Result<T, StoreError>
    where
        F: FnMut(&Transaction<'_>) -> Result<T, StoreError>,
    {
        for attempt in 1..=BUSY_RETRIES {
            let txn = match self
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
            {
                Ok(txn) => txn,
                Err(e) if is_busy(&e) && attempt < BUSY_RETRIES => {
                    backoff(attempt);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            match op(&txn) {
                Ok(value) => match txn.commit() {
                    Ok(()) => return Ok(value),
                    Err(e) if is_busy(&e) && attempt < BUSY_RETRIES => {
                        backoff(attempt);
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                },
                Err(StoreError::Database(e)) if is_busy(&e) && attempt < BUSY_RETRIES => {
                    backoff(attempt);
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        Err(StoreError::Busy {
            attempts: BUSY_RETRIES,
        })
    }
}

fn is_busy(e: &rusqlite::Error) -> bool {
    matches!(
        e.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}

fn backoff(attempt: u32) {
    std::thread::sleep(RETRY_BACKOFF * attempt);
}

/// Convert EventId to bytes for storage
fn event_id_to_bytes(id: EventId) -> Vec<u8> {
    id.value().to_be_bytes().to_vec()
}

/// Convert bytes to EventId
fn bytes_to_event_id(bytes: &[u8]) -> Result<EventId, StoreError> {
    if bytes.len() != 16 {
        return Err(StoreError::InvalidData(format!(
            "Expected 16 bytes for EventId, got {}",
            bytes.len()
        )));
    }
    let mut arr = [0u8; 16];
    arr.copy_from_slice(bytes);
    Ok(EventId::from_value(u128::from_be_bytes(arr)))
}

fn parse_trust_level(s: &str) -> Result<TrustLevel, StoreError> {
    TrustLevel::parse(s)
        .ok_or_else(|| StoreError::InvalidData(format!("Unknown trust level: {}", s)))
}

fn parse_action(s: &str) -> Result<AuditAction, StoreError> {
    AuditAction::parse(s)
        .ok_or_else(|| StoreError::InvalidData(format!("Unknown audit action: {}", s)))
}

fn row_to_audit_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuditEvent> {
    let id_bytes: Vec<u8> = row.get(0)?;
    let id = bytes_to_event_id(&id_bytes).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Blob, Box::new(e))
    })?;
    let action_str: String = row.get(1)?;
    let action = parse_action(&action_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(AuditEvent {
        id,
        action,
        content_id: row.get(2)?,
        details: row.get(3)?,
        timestamp: row.get::<_, i64>(4)? as u64,
    })
}

/// Load a record with its full custody chain, oldest entry first
fn load_record(conn: &Connection, id: &str) -> Result<Option<ProvenanceRecord>, StoreError> {
    let flat = conn
        .query_row(
            "SELECT source, trust_level, marked_at FROM content WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)? as u64,
                ))
            },
        )
        .optional()?;

    let Some((source, level_str, marked_at)) = flat else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT source, trust_level, marked_at FROM custody_chain
         WHERE content_id = ?1 ORDER BY seq",
    )?;
    let chain = stmt
        .query_map(params![id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)? as u64,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|(source, level_str, at)| {
            Ok(CustodyEntry {
                source,
                trust: parse_trust_level(&level_str)?,
                at,
            })
        })
        .collect::<Result<Vec<_>, StoreError>>()?;

    Ok(Some(ProvenanceRecord {
        id: id.to_string(),
        source,
        trust_level: parse_trust_level(&level_str)?,
        marked_at,
        custody_chain: chain,
    }))
}

fn load_quarantine(conn: &Connection, id: &str) -> Result<Option<QuarantineEntry>, StoreError> {
    let entry = conn
        .query_row(
            "SELECT content_id, reason, quarantined_at FROM quarantine WHERE content_id = ?1",
            params![id],
            |row| {
                Ok(QuarantineEntry {
                    content_id: row.get(0)?,
                    reason: row.get(1)?,
                    quarantined_at: row.get::<_, i64>(2)? as u64,
                })
            },
        )
        .optional()?;
    Ok(entry)
}

fn load_policies(conn: &Connection, order_clause: &str) -> Result<Vec<PolicyRule>, StoreError> {
    let sql = format!(
        "SELECT pattern, trust_level, created_at FROM policies {}",
        order_clause
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)? as u64,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(pattern, level_str, created_at)| {
            Ok(PolicyRule {
                pattern,
                trust_level: parse_trust_level(&level_str)?,
                created_at,
            })
        })
        .collect()
}

/// Append an audit event; always the last write of an operation's transaction
fn insert_audit(conn: &Connection, event: &AuditEvent) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO audit_log (id, action, content_id, details, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            event_id_to_bytes(event.id),
            event.action.as_str(),
            event.content_id,
            event.details,
            event.timestamp as i64,
        ],
    )?;
    Ok(())
}

impl ProvenanceStore for SqliteStore {
    type Error = StoreError;

    fn mark_source(
        &mut self,
        id: &str,
        source: &str,
        level: TrustLevel,
        at: u64,
    ) -> Result<MarkOutcome, Self::Error> {
        debug!(id, source, level = level.as_str(), "marking source");

        let outcome = self.with_write_txn(|txn| {
            let next_seq: i64 = txn.query_row(
                "SELECT COALESCE(MAX(seq) + 1, 0) FROM custody_chain WHERE content_id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            let created = next_seq == 0;

            let rules = load_policies(txn, "ORDER BY rowid")?;
            let matched = policy::resolve(&rules, source).cloned();
            let effective = matched.as_ref().map(|r| r.trust_level).unwrap_or(level);

            // Flat fields carry the policy-adjusted level; the record row
            // must exist before its chain rows.
            txn.execute(
                "INSERT INTO content (id, source, trust_level, marked_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                 source = excluded.source,
                 trust_level = excluded.trust_level,
                 marked_at = excluded.marked_at",
                params![id, source, effective.as_str(), at as i64],
            )?;

            // The chain records the caller-requested level verbatim, even
            // when a policy adjusted the effective level above.
            txn.execute(
                "INSERT INTO custody_chain (content_id, seq, source, trust_level, marked_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, next_seq, source, level.as_str(), at as i64],
            )?;

            let details = match &matched {
                Some(rule) => format!(
                    "source '{}' asserted as {}; policy '{}' set trust level to {}",
                    source, level, rule.pattern, rule.trust_level
                ),
                None => format!("source '{}' asserted as {}", source, level),
            };
            insert_audit(
                txn,
                &AuditEvent::new(AuditAction::MarkSource, Some(id.to_string()), details, at),
            )?;

            let record = load_record(txn, id)?.ok_or_else(|| {
                StoreError::InvalidData(format!("record '{}' vanished mid-transaction", id))
            })?;

            Ok(MarkOutcome {
                record,
                created,
                requested_level: level,
                policy: matched,
            })
        })?;

        info!(
            id,
            created = outcome.created,
            effective = outcome.record.trust_level.as_str(),
            policy = outcome.policy.as_ref().map(|r| r.pattern.as_str()),
            "source marked"
        );
        Ok(outcome)
    }

    fn record(&self, id: &str) -> Result<Option<ProvenanceRecord>, Self::Error> {
        load_record(&self.conn, id)
    }

    fn verify(&self, id: &str) -> Result<TrustDecision, Self::Error> {
        let record = load_record(&self.conn, id)?;
        let quarantine = load_quarantine(&self.conn, id)?;
        Ok(custodian_domain::verdict::decide(
            record.as_ref(),
            quarantine.as_ref(),
        ))
    }

    fn quarantine(
        &mut self,
        id: &str,
        reason: Option<String>,
        at: u64,
    ) -> Result<QuarantineEntry, Self::Error> {
        debug!(id, "quarantining content");

        self.with_write_txn(|txn| {
            let exists: bool = txn
                .query_row("SELECT 1 FROM content WHERE id = ?1", params![id], |_| {
                    Ok(true)
                })
                .optional()?
                .unwrap_or(false);
            if !exists {
                return Err(StoreError::NotFound(format!(
                    "no provenance record for '{}'",
                    id
                )));
            }

            if load_quarantine(txn, id)?.is_some() {
                return Err(StoreError::AlreadyQuarantined(id.to_string()));
            }

            let entry = QuarantineEntry::new(id, reason.clone(), at);
            txn.execute(
                "INSERT INTO quarantine (content_id, reason, quarantined_at)
                 VALUES (?1, ?2, ?3)",
                params![entry.content_id, entry.reason, at as i64],
            )?;

            // Direct mutation of the effective level; quarantine does not
            // get its own chain entry.
            txn.execute(
                "UPDATE content SET trust_level = ?1 WHERE id = ?2",
                params![TrustLevel::Untrusted.as_str(), id],
            )?;

            insert_audit(
                txn,
                &AuditEvent::new(
                    AuditAction::Quarantine,
                    Some(id.to_string()),
                    format!("quarantined: {}", entry.reason),
                    at,
                ),
            )?;

            Ok(entry)
        })
    }

    fn quarantine_entry(&self, id: &str) -> Result<Option<QuarantineEntry>, Self::Error> {
        load_quarantine(&self.conn, id)
    }

    fn list_quarantined(&self) -> Result<Vec<QuarantineEntry>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT content_id, reason, quarantined_at FROM quarantine ORDER BY quarantined_at",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(QuarantineEntry {
                    content_id: row.get(0)?,
                    reason: row.get(1)?,
                    quarantined_at: row.get::<_, i64>(2)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn add_policy(
        &mut self,
        pattern: &str,
        level: TrustLevel,
        at: u64,
    ) -> Result<PolicyOutcome, Self::Error> {
        debug!(pattern, level = level.as_str(), "adding policy");

        self.with_write_txn(|txn| {
            let exists: bool = txn
                .query_row(
                    "SELECT 1 FROM policies WHERE pattern = ?1",
                    params![pattern],
                    |_| Ok(true),
                )
                .optional()?
                .unwrap_or(false);

            // Upsert keeps rowid and created_at, so both resolution order
            // and display order are stable across updates.
            let outcome = if exists {
                txn.execute(
                    "UPDATE policies SET trust_level = ?1 WHERE pattern = ?2",
                    params![level.as_str(), pattern],
                )?;
                PolicyOutcome::Updated
            } else {
                txn.execute(
                    "INSERT INTO policies (pattern, trust_level, created_at)
                     VALUES (?1, ?2, ?3)",
                    params![pattern, level.as_str(), at as i64],
                )?;
                PolicyOutcome::Created
            };

            insert_audit(
                txn,
                &AuditEvent::new(
                    AuditAction::PolicyAdd,
                    None,
                    format!("policy '{}' -> {}", pattern, level),
                    at,
                ),
            )?;

            Ok(outcome)
        })
    }

    fn remove_policy(&mut self, pattern: &str, at: u64) -> Result<(), Self::Error> {
        debug!(pattern, "removing policy");

        self.with_write_txn(|txn| {
            let removed = txn.execute("DELETE FROM policies WHERE pattern = ?1", params![pattern])?;
            if removed == 0 {
                return Err(StoreError::NotFound(format!(
                    "no policy with pattern '{}'",
                    pattern
                )));
            }

            insert_audit(
                txn,
                &AuditEvent::new(
                    AuditAction::PolicyRemove,
                    None,
                    format!("policy '{}' removed", pattern),
                    at,
                ),
            )?;

            Ok(())
        })
    }

    fn list_policies(&self) -> Result<Vec<PolicyRule>, Self::Error> {
        load_policies(&self.conn, "ORDER BY created_at, rowid")
    }

    fn stats(&self) -> Result<StoreStats, Self::Error> {
        let count_level = |level: TrustLevel| -> Result<u64, StoreError> {
            let n: i64 = self.conn.query_row(
                "SELECT COUNT(*) FROM content WHERE trust_level = ?1",
                params![level.as_str()],
                |row| row.get(0),
            )?;
            Ok(n as u64)
        };
        let count_table = |sql: &str| -> Result<u64, StoreError> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as u64)
        };

        Ok(StoreStats {
            trusted: count_level(TrustLevel::Trusted)?,
            untrusted: count_level(TrustLevel::Untrusted)?,
            unknown: count_level(TrustLevel::Unknown)?,
            quarantined: count_table("SELECT COUNT(*) FROM quarantine")?,
            policies: count_table("SELECT COUNT(*) FROM policies")?,
            recent: self.recent_audit_events(5)?,
        })
    }
}
