//! Check-provenance command implementation.

use custodian_domain::traits::ProvenanceStore;
use custodian_store::{SqliteStore, StoreError};

use crate::cli::CheckProvenanceArgs;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the check-provenance command.
pub fn execute_check_provenance(
    args: CheckProvenanceArgs,
    store: &SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let record = store.record(&args.id)?.ok_or_else(|| {
        StoreError::NotFound(format!("no provenance record for '{}'", args.id))
    })?;
    let quarantine = store.quarantine_entry(&args.id)?;

    println!("{}", formatter.format_record(&record, quarantine.as_ref())?);
    Ok(())
}
