//! # mailvet
//!
//! Email deliverability verification: offline syntax validation, cached
//! MX resolution, and live SMTP or API-backed mailbox probing, folded
//! into one terminal result per input address plus run statistics.
//!
//! The [`MailVet`] pipeline is the main entry point:
//!
//! ```no_run
//! use mailvet_core::{Config, MailVet};
//!
//! # async fn demo() -> mailvet_core::Result<()> {
//! let vet = MailVet::new(Config::default())?;
//! let report = vet.run(&["someone@example.com".to_string()]).await;
//! println!("{} of {} deliverable", report.stats.valid, report.stats.total);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod processing;
pub mod utils;
pub mod verification;
pub mod vetter;

pub use crate::core::config::{
    discover_config_file, get_random_sleep_duration, Config, ConfigBuilder, ConfigFile,
};
pub use crate::core::error::{AppError, Result};
pub use crate::core::models::{
    Candidate, Status, Verdict, VerificationMode, VerificationResult,
};
pub use crate::core::stats::{Stats, StatsRecorder};
pub use crate::processing::{read_candidates, write_valid_emails, Report};
pub use crate::utils::dns::{DnsFailure, DomainResolver, MailHost};
pub use crate::utils::smtp::SmtpProber;
pub use crate::utils::syntax::is_valid_email;
pub use crate::verification::{ApiVerifier, VerificationStrategy};
pub use crate::vetter::{MailVet, RunReport};
