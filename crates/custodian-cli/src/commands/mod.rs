//! Command implementations.

pub mod check;
pub mod mark;
pub mod policy;
pub mod quarantine;
pub mod stats;
pub mod verify;

pub use self::check::execute_check_provenance;
pub use self::mark::execute_mark_source;
pub use self::policy::execute_trust_policy;
pub use self::quarantine::{execute_quarantine, execute_quarantine_list};
pub use self::stats::execute_stats;
pub use self::verify::execute_verify_trust;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current timestamp in seconds since Unix epoch
pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
