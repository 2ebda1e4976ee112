//! Verify-trust command implementation.

use custodian_domain::traits::ProvenanceStore;
use custodian_domain::Verdict;
use custodian_store::SqliteStore;

use crate::cli::VerifyTrustArgs;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the verify-trust command.
///
/// Returns the process exit code: 0 for Pass, 1 otherwise. Fail and Unknown
/// are both failures to exit-code callers; the printed message tells them
/// apart.
pub fn execute_verify_trust(
    args: VerifyTrustArgs,
    store: &SqliteStore,
    formatter: &Formatter,
) -> Result<i32> {
    let decision = store.verify(&args.id)?;
    println!("{}", formatter.format_decision(&args.id, &decision)?);

    Ok(match decision.verdict {
        Verdict::Pass => 0,
        Verdict::Fail | Verdict::Unknown => 1,
    })
}
