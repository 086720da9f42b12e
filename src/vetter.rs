//! The verification pipeline: pre-flight checks, deduplication, the
//! bounded worker pool, and result fan-out.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::core::config::{get_random_sleep_duration, validation, Config};
use crate::core::error::Result;
use crate::core::models::{Candidate, Status, Verdict, VerificationResult};
use crate::core::stats::{Stats, StatsRecorder};
use crate::utils::dns::DomainResolver;
use crate::utils::syntax::is_valid_email;
use crate::verification::VerificationStrategy;

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunReport {
    /// One result per input candidate, in completion order.
    pub results: Vec<VerificationResult>,
    pub stats: Stats,
    pub elapsed: Duration,
}

/// The pipeline front door. Owns the shared resolver, the verification
/// strategy, and the worker pool settings.
pub struct MailVet {
    config: Arc<Config>,
    resolver: Arc<DomainResolver>,
    strategy: Arc<VerificationStrategy>,
}

impl MailVet {
    /// Builds the pipeline, running every pre-flight check. A failure
    /// here aborts the run before any candidate is touched, with zero
    /// results emitted.
    pub fn new(config: Config) -> Result<Self> {
        validation::validate_config(&config)?;
        let config = Arc::new(config);
        let resolver = Arc::new(DomainResolver::new(&config)?);
        let strategy = Arc::new(VerificationStrategy::from_config(&config)?);
        Ok(Self {
            config,
            resolver,
            strategy,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_parts(
        config: Config,
        resolver: DomainResolver,
        strategy: VerificationStrategy,
    ) -> Self {
        Self {
            config: Arc::new(config),
            resolver: Arc::new(resolver),
            strategy: Arc::new(strategy),
        }
    }

    /// Verifies a batch and returns the full report at the end.
    pub async fn run(&self, inputs: &[String]) -> RunReport {
        self.run_with_observer(inputs, |_| {}).await
    }

    /// Verifies a batch, invoking `observer` once per emitted result,
    /// in completion order. Every input occurrence gets exactly one
    /// result; duplicates of a normalized address share one probe and
    /// receive identical outcomes.
    pub async fn run_with_observer<F>(&self, inputs: &[String], mut observer: F) -> RunReport
    where
        F: FnMut(&VerificationResult),
    {
        let started = Instant::now();
        let recorder = StatsRecorder::new();

        // First occurrence claims the work slot; all occurrences are
        // remembered so each can be answered.
        let mut occurrences: HashMap<String, Vec<Candidate>> = HashMap::new();
        let mut unique = Vec::new();
        for input in inputs {
            let candidate = Candidate::new(input.as_str());
            let copies = occurrences
                .entry(candidate.normalized().to_string())
                .or_default();
            if copies.is_empty() {
                unique.push(candidate.clone());
            }
            copies.push(candidate);
        }

        info!(
            target: "pipeline",
            "verifying {} candidate(s) ({} unique) with {} worker(s), {} mode",
            inputs.len(),
            unique.len(),
            self.config.max_concurrency.max(1),
            self.config.mode
        );

        let mut results = Vec::with_capacity(inputs.len());
        let mut outcomes = stream::iter(unique)
            .map(|candidate| self.verify_candidate(candidate))
            .buffer_unordered(self.config.max_concurrency.max(1));
        while let Some(result) = outcomes.next().await {
            let copies = occurrences
                .remove(result.candidate.normalized())
                .unwrap_or_default();
            for candidate in copies {
                let replica = result.replicate_for(candidate);
                recorder.record(replica.status);
                observer(&replica);
                results.push(replica);
            }
        }

        let stats = recorder.snapshot();
        let elapsed = started.elapsed();
        info!(
            target: "pipeline",
            "run complete: {}/{} valid in {:.1?}",
            stats.valid, stats.total, elapsed
        );
        RunReport {
            results,
            stats,
            elapsed,
        }
    }

    /// Carries one unique candidate through syntax, DNS, and probing.
    /// Always produces a result; per-candidate failures never escape.
    async fn verify_candidate(&self, candidate: Candidate) -> VerificationResult {
        let started = Instant::now();

        if !is_valid_email(candidate.normalized()) {
            let verdict =
                Verdict::with_reason(Status::InvalidSyntax, "address failed syntax validation");
            return VerificationResult::from_verdict(candidate, verdict, started.elapsed());
        }
        let Some(domain) = candidate.domain().map(str::to_string) else {
            let verdict =
                Verdict::with_reason(Status::InvalidSyntax, "address has no domain part");
            return VerificationResult::from_verdict(candidate, verdict, started.elapsed());
        };

        let (verdict, touched_network) = match self.resolver.resolve(&domain).await {
            Ok(hosts) => (self.strategy.verify(&candidate, &hosts).await, true),
            Err(failure) => (
                Verdict::with_reason(failure.status(), failure.to_string()),
                false,
            ),
        };
        let elapsed = started.elapsed();

        // Politeness pause after network contact, outside the measured
        // latency.
        if touched_network {
            let pause = get_random_sleep_duration(&self.config);
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        debug!(
            target: "pipeline",
            "[{}] {} in {:.1?}",
            candidate.normalized(),
            verdict.status,
            elapsed
        );
        VerificationResult::from_verdict(candidate, verdict, elapsed)
    }
}
