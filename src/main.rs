//! The mailvet command-line binary.

mod cli;

use anyhow::{bail, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use mailvet_core::{
    discover_config_file, read_candidates, write_valid_emails, ConfigBuilder, MailVet, Report,
    VerificationMode,
};

use crate::cli::{Cli, ReportArg};

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let mut builder = ConfigBuilder::new();
    let config_path = args.config.clone().or_else(discover_config_file);
    if let Some(path) = &config_path {
        builder = builder
            .with_config_file(path)
            .with_context(|| format!("failed to load config file {}", path.display()))?;
    }
    builder = builder.mode(VerificationMode::from(args.mode));
    if let Some(token) = &args.api_token {
        builder = builder.api_token(token.clone());
    }
    if let Some(concurrency) = args.concurrency {
        builder = builder.max_concurrency(concurrency);
    }
    let config = builder.build().context("invalid configuration")?;
    let mode = config.mode;

    let candidates = read_candidates(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    if candidates.is_empty() {
        bail!("no candidate addresses found in {}", args.input.display());
    }

    let vet = MailVet::new(config).context("failed to initialize the pipeline")?;

    let bar = if args.no_progress {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(candidates.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:30}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    };

    let run = vet
        .run_with_observer(&candidates, |result| {
            bar.set_message(format!(
                "{} {}",
                result.candidate.normalized(),
                result.status
            ));
            bar.inc(1);
        })
        .await;
    bar.finish_and_clear();

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create {}", args.output_dir.display()))?;

    let valid_path = args.output_dir.join("valid_emails.csv");
    write_valid_emails(&valid_path, &run.results)
        .context("failed to write valid_emails.csv")?;

    let report = Report::new(mode, &run);
    if matches!(args.report, ReportArg::Text | ReportArg::Both) {
        report.write_text(&args.output_dir.join("mailvet_report.txt"))?;
    }
    if matches!(args.report, ReportArg::Json | ReportArg::Both) {
        report.write_json(&args.output_dir.join("mailvet_report.json"))?;
    }

    print!("{}", report.summary_text());
    println!("\nDeliverable addresses written to {}", valid_path.display());

    Ok(())
}
