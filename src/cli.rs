//! Command-line interface definition.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use mailvet_core::VerificationMode;

/// Verify email deliverability in bulk: syntax checks, MX resolution,
/// and SMTP or API mailbox probing.
#[derive(Debug, Parser)]
#[command(name = "mailvet", version, about)]
pub(crate) struct Cli {
    /// Input file: a CSV (first field of each line) or any text or
    /// message file to scan for addresses.
    pub(crate) input: PathBuf,

    /// Verification strategy used after DNS resolution.
    #[arg(long, value_enum, default_value_t = ModeArg::Smtp)]
    pub(crate) mode: ModeArg,

    /// Token for the verification API (api mode only).
    #[arg(long, env = "MAILVET_API_TOKEN", hide_env_values = true)]
    pub(crate) api_token: Option<String>,

    /// Path to a TOML configuration file.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Number of candidates verified concurrently.
    #[arg(short = 'c', long)]
    pub(crate) concurrency: Option<usize>,

    /// Directory receiving valid_emails.csv and the reports.
    #[arg(long, default_value = ".")]
    pub(crate) output_dir: PathBuf,

    /// Which report files to write.
    #[arg(long, value_enum, default_value_t = ReportArg::Both)]
    pub(crate) report: ReportArg,

    /// Disable the progress bar.
    #[arg(long)]
    pub(crate) no_progress: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub(crate) verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ModeArg {
    Smtp,
    Api,
}

impl From<ModeArg> for VerificationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Smtp => VerificationMode::Smtp,
            ModeArg::Api => VerificationMode::Api,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReportArg {
    Text,
    Json,
    Both,
    None,
}
