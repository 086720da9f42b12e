//! Aggregate counters for a verification run.
//!
//! Workers record outcomes concurrently through [`StatsRecorder`]; a
//! [`Stats`] snapshot is taken once the run drains. The recorder never
//! blocks a worker.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use crate::core::models::Status;

/// Lock-free tally of terminal statuses, one slot per [`Status`] variant.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    counts: [AtomicUsize; Status::ALL.len()],
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one emitted result. Called once per result, including
    /// replicas of deduplicated candidates.
    pub fn record(&self, status: Status) {
        self.counts[status.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// Folds the live counters into an immutable snapshot.
    pub fn snapshot(&self) -> Stats {
        let mut stats = Stats::default();
        for status in Status::ALL {
            let count = self.counts[status.index()].load(Ordering::Relaxed);
            *stats.slot(status) = count;
            stats.total += count;
        }
        stats
    }
}

/// Final counts for a run. `total` always equals the sum of the
/// per-status fields, which in turn equals the number of input
/// candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub valid: usize,
    pub invalid_syntax: usize,
    pub no_mx_record: usize,
    pub mailbox_rejected: usize,
    pub ambiguous: usize,
    pub timeout: usize,
    pub api_error: usize,
    pub unknown: usize,
    pub total: usize,
}

impl Stats {
    /// Count for a single status.
    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::Valid => self.valid,
            Status::InvalidSyntax => self.invalid_syntax,
            Status::NoMxRecord => self.no_mx_record,
            Status::MailboxRejected => self.mailbox_rejected,
            Status::Ambiguous => self.ambiguous,
            Status::Timeout => self.timeout,
            Status::ApiError => self.api_error,
            Status::Unknown => self.unknown,
        }
    }

    fn slot(&mut self, status: Status) -> &mut usize {
        match status {
            Status::Valid => &mut self.valid,
            Status::InvalidSyntax => &mut self.invalid_syntax,
            Status::NoMxRecord => &mut self.no_mx_record,
            Status::MailboxRejected => &mut self.mailbox_rejected,
            Status::Ambiguous => &mut self.ambiguous,
            Status::Timeout => &mut self.timeout,
            Status::ApiError => &mut self.api_error,
            Status::Unknown => &mut self.unknown,
        }
    }

    /// Fraction of candidates that verified as deliverable, in `[0, 1]`.
    /// Ambiguous outcomes count against the rate rather than being
    /// excluded from the denominator.
    pub fn deliverability_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.valid as f64 / self.total as f64
        }
    }
}
