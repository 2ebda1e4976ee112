//! Trust-policy command implementation.

use custodian_domain::traits::{PolicyOutcome, ProvenanceStore};
use custodian_store::SqliteStore;

use crate::cli::{TrustPolicyAction, TrustPolicyArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;

use super::now_secs;

/// Execute the trust-policy command.
pub fn execute_trust_policy(
    args: TrustPolicyArgs,
    store: &mut SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        TrustPolicyAction::Add {
            pattern,
            trust_level,
        } => {
            if pattern.is_empty() {
                return Err(CliError::InvalidInput("Pattern must not be empty".to_string()));
            }
            let level = trust_level.into();
            let outcome = store.add_policy(&pattern, level, now_secs())?;
            let verb = match outcome {
                PolicyOutcome::Created => "added",
                PolicyOutcome::Updated => "updated",
            };
            println!(
                "{}",
                formatter.success(&format!("policy '{}' {} -> {}", pattern, verb, level))
            );
        }
        TrustPolicyAction::Remove { pattern } => {
            store.remove_policy(&pattern, now_secs())?;
            println!("{}", formatter.success(&format!("policy '{}' removed", pattern)));
        }
        TrustPolicyAction::List => {
            let rules = store.list_policies()?;
            println!("{}", formatter.format_policies(&rules)?);
        }
    }
    Ok(())
}
