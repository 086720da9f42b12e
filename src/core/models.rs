//! Core data types flowing through the verification pipeline.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One input address: the raw string as extracted, plus the normalized
/// form used for deduplication and probing. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Candidate {
    raw: String,
    normalized: String,
}

impl Candidate {
    /// Builds a candidate from a raw input string.
    ///
    /// Normalization trims surrounding whitespace and lower-cases the
    /// domain part. The local part is preserved as written, since it is
    /// case-significant in principle.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim();
        let normalized = match trimmed.rsplit_once('@') {
            Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
            None => trimmed.to_string(),
        };
        Self { raw, normalized }
    }

    /// The input string exactly as extracted.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Trimmed form with a lower-cased domain part; the deduplication key.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Domain part of the normalized address, if one is present.
    pub fn domain(&self) -> Option<&str> {
        self.normalized
            .rsplit_once('@')
            .map(|(_, domain)| domain)
            .filter(|domain| !domain.is_empty())
    }
}

/// Terminal classification assigned to one candidate. Never revised
/// after the pipeline emits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Valid,
    InvalidSyntax,
    NoMxRecord,
    MailboxRejected,
    Ambiguous,
    Timeout,
    ApiError,
    Unknown,
}

impl Status {
    /// All variants, in reporting order.
    pub const ALL: [Status; 8] = [
        Status::Valid,
        Status::InvalidSyntax,
        Status::NoMxRecord,
        Status::MailboxRejected,
        Status::Ambiguous,
        Status::Timeout,
        Status::ApiError,
        Status::Unknown,
    ];

    /// Stable position inside [`Status::ALL`], used for counter slots.
    pub(crate) fn index(self) -> usize {
        match self {
            Status::Valid => 0,
            Status::InvalidSyntax => 1,
            Status::NoMxRecord => 2,
            Status::MailboxRejected => 3,
            Status::Ambiguous => 4,
            Status::Timeout => 5,
            Status::ApiError => 6,
            Status::Unknown => 7,
        }
    }

    /// Short lower-case label used in reports and logs.
    pub fn label(self) -> &'static str {
        match self {
            Status::Valid => "valid",
            Status::InvalidSyntax => "invalid-syntax",
            Status::NoMxRecord => "no-mx-record",
            Status::MailboxRejected => "mailbox-rejected",
            Status::Ambiguous => "ambiguous",
            Status::Timeout => "timeout",
            Status::ApiError => "api-error",
            Status::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which verification strategy a run uses once a candidate's domain
/// has resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMode {
    /// Live SMTP handshake probe against the domain's mail exchangers.
    #[default]
    Smtp,
    /// Remote verification API lookup.
    Api,
}

impl fmt::Display for VerificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationMode::Smtp => f.write_str("smtp"),
            VerificationMode::Api => f.write_str("api"),
        }
    }
}

/// What a verification step concluded for one candidate: the status it
/// settles on, with an optional human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: Status,
    pub reason: Option<String>,
}

impl Verdict {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            reason: None,
        }
    }

    pub fn with_reason(status: Status, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: Some(reason.into()),
        }
    }
}

/// One candidate's terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub candidate: Candidate,
    pub status: Status,
    pub reason: Option<String>,
    /// Wall-clock time from pipeline start to terminal status for this
    /// candidate. Replicas of a deduplicated candidate share the value.
    #[serde(rename = "latency_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl VerificationResult {
    pub(crate) fn from_verdict(candidate: Candidate, verdict: Verdict, elapsed: Duration) -> Self {
        Self {
            candidate,
            status: verdict.status,
            reason: verdict.reason,
            elapsed,
        }
    }

    /// The same outcome attributed to another occurrence of the
    /// normalized address.
    pub(crate) fn replicate_for(&self, candidate: Candidate) -> Self {
        Self {
            candidate,
            status: self.status,
            reason: self.reason.clone(),
            elapsed: self.elapsed,
        }
    }
}

fn serialize_millis<S>(elapsed: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(elapsed.as_millis() as u64)
}
