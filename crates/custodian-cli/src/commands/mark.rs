//! Mark-source command implementation.

use custodian_domain::traits::ProvenanceStore;
use custodian_store::SqliteStore;

use crate::cli::MarkSourceArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;

use super::now_secs;

/// Execute the mark-source command.
pub fn execute_mark_source(
    args: MarkSourceArgs,
    store: &mut SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    if args.id.is_empty() {
        return Err(CliError::InvalidInput("Content id must not be empty".to_string()));
    }
    if args.source.is_empty() {
        return Err(CliError::InvalidInput("Source must not be empty".to_string()));
    }

    let outcome = store.mark_source(&args.id, &args.source, args.trust_level.into(), now_secs())?;
    println!("{}", formatter.format_mark(&outcome)?);
    Ok(())
}
