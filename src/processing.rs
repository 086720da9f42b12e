//! Reading candidate addresses from input files and writing run
//! artifacts: the deliverable-address CSV and the text/JSON reports.

use std::fs::{self, File};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::core::error::Result;
use crate::core::models::{Status, VerificationMode, VerificationResult};
use crate::core::stats::Stats;
use crate::vetter::RunReport;

static EXTRACT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("Address extraction pattern failed to compile. This is a bug.")
});

/// Reads candidate addresses from `path`.
///
/// `.csv` files contribute the first field of every line, skipping
/// blanks and `#` comments. Any other file (message dumps, plain text)
/// is scanned for address-shaped tokens, duplicates included.
pub fn read_candidates(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)?;
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let candidates = if is_csv {
        candidates_from_csv(&raw)
    } else {
        candidates_from_text(&raw)
    };
    debug!(
        target: "pipeline",
        "read {} candidate(s) from {}",
        candidates.len(),
        path.display()
    );
    Ok(candidates)
}

fn candidates_from_csv(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| line.split(',').next().unwrap_or_default().trim())
        .filter(|field| !field.is_empty() && !field.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn candidates_from_text(raw: &str) -> Vec<String> {
    EXTRACT_RE
        .find_iter(raw)
        .map(|found| found.as_str().to_string())
        .collect()
}

/// Writes the deliverable addresses, one per line under an `Email`
/// header.
pub fn write_valid_emails(path: &Path, results: &[VerificationResult]) -> Result<()> {
    let mut out = String::from("Email\n");
    for result in results {
        if result.status == Status::Valid {
            out.push_str(result.candidate.normalized());
            out.push('\n');
        }
    }
    fs::write(path, out)?;
    Ok(())
}

/// Snapshot of one finished run, renderable as text and JSON.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub generated_at: String,
    pub tool_version: &'static str,
    pub mode: VerificationMode,
    pub elapsed_seconds: f64,
    pub stats: &'a Stats,
    pub deliverability_rate: f64,
    pub results: &'a [VerificationResult],
}

impl<'a> Report<'a> {
    pub fn new(mode: VerificationMode, run: &'a RunReport) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            tool_version: env!("CARGO_PKG_VERSION"),
            mode,
            elapsed_seconds: run.elapsed.as_secs_f64(),
            stats: &run.stats,
            deliverability_rate: run.stats.deliverability_rate(),
            results: &run.results,
        }
    }

    /// The counts block shown on stdout and at the top of the text
    /// report.
    pub fn summary_text(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(out, "Verification summary ({} mode)", self.mode);
        for status in Status::ALL {
            let _ = writeln!(out, "  {:<17} {}", status.label(), self.stats.count(status));
        }
        let _ = writeln!(out, "  {:<17} {}", "total", self.stats.total);
        let _ = writeln!(
            out,
            "  {:<17} {:.1}%",
            "deliverability",
            self.deliverability_rate * 100.0
        );
        out
    }

    /// Full text report: summary block plus one line per result.
    pub fn to_text(&self) -> String {
        use std::fmt::Write;

        let mut out = self.summary_text();
        out.push('\n');
        let _ = writeln!(
            out,
            "Generated {} by mailvet {} in {:.1}s",
            self.generated_at, self.tool_version, self.elapsed_seconds
        );
        out.push('\n');
        for result in self.results {
            let _ = writeln!(
                out,
                "{:<40} {:<17} {:>6}ms  {}",
                result.candidate.raw().trim(),
                result.status.label(),
                result.elapsed.as_millis(),
                result.reason.as_deref().unwrap_or("-")
            );
        }
        out
    }

    pub fn write_text(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_text())?;
        Ok(())
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
