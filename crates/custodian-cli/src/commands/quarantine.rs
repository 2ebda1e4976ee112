//! Quarantine command implementations.

use custodian_domain::traits::ProvenanceStore;
use custodian_store::SqliteStore;

use crate::cli::QuarantineArgs;
use crate::error::Result;
use crate::output::Formatter;

use super::now_secs;

/// Execute the quarantine command.
pub fn execute_quarantine(
    args: QuarantineArgs,
    store: &mut SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let entry = store.quarantine(&args.id, args.reason, now_secs())?;
    println!(
        "{}",
        formatter.success(&format!(
            "'{}' quarantined: {}",
            entry.content_id, entry.reason
        ))
    );
    Ok(())
}

/// Execute the quarantine-list command.
pub fn execute_quarantine_list(store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    let entries = store.list_quarantined()?;
    println!("{}", formatter.format_quarantine_list(&entries)?);
    Ok(())
}
