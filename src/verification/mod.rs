//! Verification strategies and their construction-time selection.

pub mod api;

pub use api::ApiVerifier;

use std::sync::Arc;

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::models::{Candidate, Verdict, VerificationMode};
use crate::utils::dns::MailHost;
use crate::utils::smtp::SmtpProber;

/// The probing capability a run uses once a candidate's domain has
/// resolved.
///
/// Picked exactly once, from configuration, before any candidate is
/// processed. The pipeline calls [`verify`](Self::verify) and never
/// branches on the mode again.
pub enum VerificationStrategy {
    Smtp(SmtpProber),
    Api(ApiVerifier),
}

impl VerificationStrategy {
    pub fn from_config(config: &Arc<Config>) -> Result<Self> {
        match config.mode {
            VerificationMode::Smtp => Ok(Self::Smtp(SmtpProber::new(Arc::clone(config)))),
            VerificationMode::Api => Ok(Self::Api(ApiVerifier::from_config(config)?)),
        }
    }

    /// Judges one candidate whose domain resolved to `hosts`.
    pub async fn verify(&self, candidate: &Candidate, hosts: &[MailHost]) -> Verdict {
        match self {
            Self::Smtp(prober) => prober.probe(candidate, hosts).await,
            Self::Api(verifier) => verifier.verify(candidate).await,
        }
    }
}
