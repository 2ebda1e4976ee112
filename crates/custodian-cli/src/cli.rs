//! CLI command definitions and argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Custodian CLI - Track the origin and trust state of content.
#[derive(Debug, Parser)]
#[command(name = "custodian")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Storage directory (created on first use)
    #[arg(short, long, global = true, env = "CUSTODIAN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (minimal)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Assert a source for a content id
    MarkSource(MarkSourceArgs),

    /// Show a record's trust state and full custody chain
    CheckProvenance(CheckProvenanceArgs),

    /// Manage trust policy rules
    TrustPolicy(TrustPolicyArgs),

    /// Isolate a content id, forcing it untrusted
    Quarantine(QuarantineArgs),

    /// List active quarantine entries
    QuarantineList,

    /// Resolve the trust verdict for a content id
    VerifyTrust(VerifyTrustArgs),

    /// Show counts by trust level and recent audit activity
    Stats,
}

/// Arguments for the mark-source command.
#[derive(Debug, Parser)]
pub struct MarkSourceArgs {
    /// Content id
    pub id: String,

    /// Source identifier (convention: namespace:identifier)
    pub source: String,

    /// Trust level to assert
    #[arg(value_enum, default_value = "unknown")]
    pub trust_level: TrustLevelArg,
}

/// Arguments for the check-provenance command.
#[derive(Debug, Parser)]
pub struct CheckProvenanceArgs {
    /// Content id
    pub id: String,
}

/// Arguments for trust-policy management.
#[derive(Debug, Parser)]
pub struct TrustPolicyArgs {
    #[command(subcommand)]
    pub action: TrustPolicyAction,
}

/// Trust-policy management actions.
#[derive(Debug, Subcommand)]
pub enum TrustPolicyAction {
    /// Create or update a rule (upsert by pattern)
    Add {
        /// Glob pattern matched against source strings (* and ?)
        pattern: String,
        /// Trust level the rule assigns
        #[arg(value_enum)]
        trust_level: TrustLevelArg,
    },

    /// Remove a rule
    Remove {
        /// Pattern of the rule to remove
        pattern: String,
    },

    /// List rules in creation order
    List,
}

/// Arguments for the quarantine command.
#[derive(Debug, Parser)]
pub struct QuarantineArgs {
    /// Content id
    pub id: String,

    /// Why the content is being isolated
    pub reason: Option<String>,
}

/// Arguments for the verify-trust command.
#[derive(Debug, Parser)]
pub struct VerifyTrustArgs {
    /// Content id
    pub id: String,
}

/// Trust level argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum TrustLevelArg {
    /// Content may be acted upon
    Trusted,
    /// Content must not be acted upon
    Untrusted,
    /// No determination made
    Unknown,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<TrustLevelArg> for custodian_domain::TrustLevel {
    fn from(level: TrustLevelArg) -> Self {
        match level {
            TrustLevelArg::Trusted => custodian_domain::TrustLevel::Trusted,
            TrustLevelArg::Untrusted => custodian_domain::TrustLevel::Untrusted,
            TrustLevelArg::Unknown => custodian_domain::TrustLevel::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_source_defaults_to_unknown() {
        let cli = Cli::parse_from(["custodian", "mark-source", "m1", "agent:writer"]);
        match cli.command {
            Command::MarkSource(args) => {
                assert_eq!(args.id, "m1");
                assert_eq!(args.source, "agent:writer");
                assert!(matches!(args.trust_level, TrustLevelArg::Unknown));
            }
            _ => panic!("Expected MarkSource command"),
        }
    }

    #[test]
    fn test_mark_source_explicit_level() {
        let cli = Cli::parse_from(["custodian", "mark-source", "m1", "agent:writer", "trusted"]);
        match cli.command {
            Command::MarkSource(args) => {
                assert!(matches!(args.trust_level, TrustLevelArg::Trusted))
            }
            _ => panic!("Expected MarkSource command"),
        }
    }

    #[test]
    fn test_bad_trust_level_rejected() {
        let result =
            Cli::try_parse_from(["custodian", "mark-source", "m1", "agent:writer", "verified"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_policy_add_requires_trust_level() {
        let result = Cli::try_parse_from(["custodian", "trust-policy", "add", "web:*"]);
        assert!(result.is_err());

        let cli =
            Cli::parse_from(["custodian", "trust-policy", "add", "web:*", "untrusted"]);
        match cli.command {
            Command::TrustPolicy(args) => {
                assert!(matches!(args.action, TrustPolicyAction::Add { .. }))
            }
            _ => panic!("Expected TrustPolicy command"),
        }
    }

    #[test]
    fn test_quarantine_reason_optional() {
        let cli = Cli::parse_from(["custodian", "quarantine", "m1"]);
        match cli.command {
            Command::Quarantine(args) => assert!(args.reason.is_none()),
            _ => panic!("Expected Quarantine command"),
        }
    }

    #[test]
    fn test_data_dir_flag() {
        let cli = Cli::parse_from(["custodian", "--data-dir", "/tmp/state", "stats"]);
        assert_eq!(cli.data_dir.as_deref(), Some(std::path::Path::new("/tmp/state")));
    }

    #[test]
    fn test_trust_level_conversion() {
        let level: custodian_domain::TrustLevel = TrustLevelArg::Trusted.into();
        assert!(matches!(level, custodian_domain::TrustLevel::Trusted));
    }
}
