//! Live SMTP mailbox probing.
//!
//! The probe walks a domain's mail exchangers in priority order and
//! runs the verification handshake (banner, EHLO or HELO, MAIL FROM,
//! RCPT TO, QUIT) against each until one yields a verdict. DATA is
//! never sent; no message is ever delivered.

mod session;

use std::sync::Arc;

use tracing::debug;

use crate::core::config::Config;
use crate::core::models::{Candidate, Status, Verdict};
use crate::utils::dns::MailHost;

use session::{SessionError, SmtpReply, SmtpSession};

/// Why one mail exchanger produced no verdict.
struct HostFailure {
    /// The host spoke SMTP to us at some point.
    answered: bool,
    /// An operation hit its deadline.
    timed_out: bool,
    detail: String,
}

impl HostFailure {
    fn answered(detail: impl Into<String>) -> Self {
        Self {
            answered: true,
            timed_out: false,
            detail: detail.into(),
        }
    }

    fn from_session(error: SessionError, answered: bool) -> Self {
        Self {
            answered,
            timed_out: matches!(error, SessionError::Timeout(_)),
            detail: error.to_string(),
        }
    }
}

/// Probes mailboxes by asking the domain's own mail exchangers.
pub struct SmtpProber {
    config: Arc<Config>,
}

impl SmtpProber {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Runs the handshake against `hosts` in the order given and
    /// returns the first verdict reached.
    ///
    /// Hosts that cannot produce a verdict are skipped. If every host
    /// fails, the fold is `Timeout` when any attempt timed out or no
    /// host ever answered, and `Unknown` when at least one host
    /// answered without timing out.
    pub async fn probe(&self, candidate: &Candidate, hosts: &[MailHost]) -> Verdict {
        let address = candidate.normalized();
        let mut answered = false;
        let mut timed_out = false;
        let mut last_detail: Option<String> = None;

        for host in hosts {
            debug!(
                target: "verification_smtp",
                "[{address}] probing {} (priority {})",
                host.exchange, host.priority
            );
            match self.attempt_host(address, &host.exchange).await {
                Ok(verdict) => {
                    debug!(
                        target: "verification_smtp",
                        "[{address}] {} answered: {}",
                        host.exchange, verdict.status
                    );
                    return verdict;
                }
                Err(failure) => {
                    debug!(
                        target: "verification_smtp",
                        "[{address}] {} gave no verdict: {}",
                        host.exchange, failure.detail
                    );
                    answered |= failure.answered;
                    timed_out |= failure.timed_out;
                    last_detail = Some(format!("{}: {}", host.exchange, failure.detail));
                }
            }
        }

        let detail = last_detail
            .unwrap_or_else(|| format!("no mail exchanger reachable for {address}"));
        if timed_out || !answered {
            Verdict::with_reason(Status::Timeout, detail)
        } else {
            Verdict::with_reason(Status::Unknown, detail)
        }
    }

    /// One full handshake against one exchanger. `Ok` is a verdict for
    /// the candidate; `Err` means this host could not judge it.
    async fn attempt_host(
        &self,
        address: &str,
        exchange: &str,
    ) -> Result<Verdict, HostFailure> {
        let mut session = match SmtpSession::connect(
            exchange,
            self.config.smtp_port,
            self.config.smtp_connect_timeout,
            self.config.smtp_timeout,
        )
        .await
        {
            Ok(session) => session,
            Err(error) => return Err(HostFailure::from_session(error, false)),
        };

        // Once connected, QUIT is sent on every exit path, verdict or
        // not; a half-open connection is never left behind.
        let outcome = self.dialogue(&mut session, address).await;
        session.quit().await;
        outcome
    }

    async fn dialogue(
        &self,
        session: &mut SmtpSession,
        address: &str,
    ) -> Result<Verdict, HostFailure> {
        let banner = session
            .banner()
            .await
            .map_err(|error| HostFailure::from_session(error, false))?;
        if !banner.is_positive() {
            return Err(HostFailure::answered(format!(
                "banner rejected: {}",
                banner.summary()
            )));
        }

        // EHLO first; fall back to HELO for servers that refuse it.
        let ehlo = format!("EHLO {}", self.config.smtp_helo_name);
        match session.command(&ehlo, "ehlo").await {
            Ok(reply) if reply.is_positive() => {}
            Ok(_) => {
                let helo = format!("HELO {}", self.config.smtp_helo_name);
                match session.command(&helo, "helo").await {
                    Ok(reply) if reply.is_positive() => {}
                    Ok(reply) => {
                        return Err(HostFailure::answered(format!(
                            "greeting rejected: {}",
                            reply.summary()
                        )));
                    }
                    Err(error) => return Err(HostFailure::from_session(error, true)),
                }
            }
            Err(error) => return Err(HostFailure::from_session(error, true)),
        }

        let mail_from = format!("MAIL FROM:<{}>", self.config.smtp_sender_email);
        let reply = session
            .command(&mail_from, "mail-from")
            .await
            .map_err(|error| HostFailure::from_session(error, true))?;
        if !reply.is_positive() {
            // The server is refusing the probe itself, not judging the mailbox.
            return Ok(Verdict::with_reason(
                Status::Ambiguous,
                format!("sender refused: {}", reply.summary()),
            ));
        }

        let rcpt_to = format!("RCPT TO:<{address}>");
        let reply = session
            .command(&rcpt_to, "rcpt-to")
            .await
            .map_err(|error| HostFailure::from_session(error, true))?;
        classify_rcpt(&reply).ok_or_else(|| {
            HostFailure::answered(format!("unexpected RCPT reply: {}", reply.summary()))
        })
    }
}

/// Maps the RCPT TO reply to a verdict: 2xx accepts the mailbox, 5xx
/// rejects it, 4xx declines to say. Anything else is no verdict.
fn classify_rcpt(reply: &SmtpReply) -> Option<Verdict> {
    let summary = reply.summary();
    if reply.is_positive() {
        Some(Verdict::with_reason(Status::Valid, summary))
    } else if reply.is_permanent() {
        Some(Verdict::with_reason(Status::MailboxRejected, summary))
    } else if reply.is_transient() {
        Some(Verdict::with_reason(Status::Ambiguous, summary))
    } else {
        None
    }
}
