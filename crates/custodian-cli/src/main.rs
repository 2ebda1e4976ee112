//! Custodian CLI - command-line interface for content provenance tracking.

use clap::Parser;
use custodian_cli::commands;
use custodian_cli::{Cli, Command, Config, Formatter};
use custodian_store::SqliteStore;

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };
    std::process::exit(code);
}

fn run() -> custodian_cli::Result<i32> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Diagnostics go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Load or create config
    let config = Config::load().unwrap_or_else(|_| {
        let cfg = Config::default();
        cfg.save().ok();
        cfg
    });

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    // Open the store (flag > CUSTODIAN_DATA_DIR > platform default)
    let data_dir = custodian_cli::config::resolve_data_dir(cli.data_dir)?;
    let mut store = SqliteStore::open_dir(&data_dir)?;

    match cli.command {
        Command::MarkSource(args) => {
            commands::execute_mark_source(args, &mut store, &formatter)?;
            Ok(0)
        }
        Command::CheckProvenance(args) => {
            commands::execute_check_provenance(args, &store, &formatter)?;
            Ok(0)
        }
        Command::TrustPolicy(args) => {
            commands::execute_trust_policy(args, &mut store, &formatter)?;
            Ok(0)
        }
        Command::Quarantine(args) => {
            commands::execute_quarantine(args, &mut store, &formatter)?;
            Ok(0)
        }
        Command::QuarantineList => {
            commands::execute_quarantine_list(&store, &formatter)?;
            Ok(0)
        }
        Command::VerifyTrust(args) => commands::execute_verify_trust(args, &store, &formatter),
        Command::Stats => {
            commands::execute_stats(&store, &formatter)?;
            Ok(0)
        }
    }
}
