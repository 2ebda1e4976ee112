//! Stats command implementation.

use custodian_domain::traits::ProvenanceStore;
use custodian_store::SqliteStore;

use crate::error::Result;
use crate::output::Formatter;

/// Execute the stats command.
pub fn execute_stats(store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    let stats = store.stats()?;
    println!("{}", formatter.format_stats(&stats)?);
    Ok(())
}
