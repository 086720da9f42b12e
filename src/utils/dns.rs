//! MX resolution with a per-run, single-flight domain cache.
//!
//! Every candidate sharing a domain funnels through [`DomainResolver::resolve`],
//! which guarantees at most one upstream lookup per domain per run: the
//! first caller performs the query while concurrent callers await the
//! same in-flight future, and later callers replay the cached outcome,
//! failures included.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

use futures::future::BoxFuture;
use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, trace};
use trust_dns_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::op::ResponseCode;
use trust_dns_resolver::TokioAsyncResolver;

use crate::core::config::Config;
use crate::core::error::AppError;
use crate::core::models::Status;

/// One mail exchanger for a domain. Lower `priority` is preferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailHost {
    pub exchange: String,
    pub priority: u16,
}

/// Why a domain could not be resolved to usable mail exchangers.
///
/// Cached and replayed verbatim for every candidate sharing the domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DnsFailure {
    #[error("no mail-exchanger records for {0}")]
    NoMxRecord(String),
    #[error("DNS resolution failed for {0}: {1}")]
    Timeout(String, String),
}

impl DnsFailure {
    /// The terminal status this failure maps the candidate to.
    pub fn status(&self) -> Status {
        match self {
            DnsFailure::NoMxRecord(_) => Status::NoMxRecord,
            DnsFailure::Timeout(_, _) => Status::Timeout,
        }
    }
}

/// Source of MX answers. The production implementation is the
/// trust-dns resolver; tests substitute a scripted stub.
pub(crate) trait MxLookup: Send + Sync {
    fn lookup_mx<'a>(
        &'a self,
        domain: &'a str,
    ) -> BoxFuture<'a, Result<Vec<MailHost>, DnsFailure>>;
}

impl MxLookup for TokioAsyncResolver {
    fn lookup_mx<'a>(
        &'a self,
        domain: &'a str,
    ) -> BoxFuture<'a, Result<Vec<MailHost>, DnsFailure>> {
        Box::pin(async move {
            match self.mx_lookup(domain).await {
                Ok(lookup) => Ok(lookup
                    .iter()
                    .map(|mx| MailHost {
                        exchange: mx.exchange().to_utf8().trim_end_matches('.').to_string(),
                        priority: mx.preference(),
                    })
                    .collect()),
                Err(error) => Err(classify_resolve_error(domain, &error)),
            }
        })
    }
}

/// NXDOMAIN and empty answers mean the domain cannot receive mail;
/// SERVFAIL and timeouts mean we could not find out. The two classes
/// map to different terminal statuses.
fn classify_resolve_error(domain: &str, error: &ResolveError) -> DnsFailure {
    match error.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            if *response_code == ResponseCode::ServFail {
                DnsFailure::Timeout(
                    domain.to_string(),
                    "upstream resolver returned SERVFAIL".to_string(),
                )
            } else {
                DnsFailure::NoMxRecord(domain.to_string())
            }
        }
        ResolveErrorKind::Timeout => {
            DnsFailure::Timeout(domain.to_string(), "resolution timed out".to_string())
        }
        _ => DnsFailure::Timeout(domain.to_string(), error.to_string()),
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    outcome: Result<Arc<Vec<MailHost>>, DnsFailure>,
    resolved_at: Instant,
}

/// Cached MX resolution front-end shared by all workers of a run.
///
/// Keys are caller-normalized (lower-case) domains. The cache never
/// expires within a run; a run is short-lived relative to MX TTLs.
pub struct DomainResolver {
    lookup: Arc<dyn MxLookup>,
    cache: RwLock<HashMap<String, Arc<OnceCell<CacheEntry>>>>,
}

impl DomainResolver {
    /// Builds a resolver querying the configured DNS servers over UDP/TCP
    /// port 53, with the configured per-query timeout and a single attempt.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let mut ips = Vec::with_capacity(config.dns_servers.len());
        for server in &config.dns_servers {
            let ip: IpAddr = server.parse().map_err(|_| {
                AppError::Initialization(format!("invalid DNS server address '{server}'"))
            })?;
            ips.push(ip);
        }

        let group = NameServerConfigGroup::from_ips_clear(&ips, 53, true);
        let resolver_config = ResolverConfig::from_parts(None, vec![], group);
        let mut opts = ResolverOpts::default();
        opts.timeout = config.dns_timeout;
        opts.attempts = 1;

        let resolver = TokioAsyncResolver::tokio(resolver_config, opts);
        Ok(Self {
            lookup: Arc::new(resolver),
            cache: RwLock::new(HashMap::new()),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_lookup(lookup: Arc<dyn MxLookup>) -> Self {
        Self {
            lookup,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolves `domain` to its mail exchangers, sorted by ascending
    /// priority, consulting the cache first.
    ///
    /// Concurrent calls for the same domain coalesce onto one upstream
    /// query; its outcome, success or failure, is what every caller sees.
    pub async fn resolve(&self, domain: &str) -> Result<Arc<Vec<MailHost>>, DnsFailure> {
        let cell = {
            let cache = self.cache.read();
            cache.get(domain).cloned()
        };
        let cell = match cell {
            Some(cell) => cell,
            None => {
                let mut cache = self.cache.write();
                Arc::clone(cache.entry(domain.to_string()).or_default())
            }
        };

        // Lock guards are gone by now; only the cell is awaited.
        let already_resolved = cell.initialized();
        let entry = cell.get_or_init(|| self.resolve_uncached(domain)).await;
        if already_resolved {
            trace!(
                target: "dns_resolver",
                "cache hit for {domain} (resolved {:.1?} ago)",
                entry.resolved_at.elapsed()
            );
        }
        entry.outcome.clone()
    }

    async fn resolve_uncached(&self, domain: &str) -> CacheEntry {
        debug!(target: "dns_resolver", "resolving mail exchangers for {domain}");
        let outcome = match self.lookup.lookup_mx(domain).await {
            Ok(hosts) if hosts.is_empty() => Err(DnsFailure::NoMxRecord(domain.to_string())),
            Ok(mut hosts) => {
                hosts.sort_by_key(|host| host.priority);
                debug!(
                    target: "dns_resolver",
                    "{domain}: {} mail exchanger(s), preferring {}",
                    hosts.len(),
                    hosts[0].exchange
                );
                Ok(Arc::new(hosts))
            }
            Err(failure) => {
                debug!(target: "dns_resolver", "{domain}: {failure}");
                Err(failure)
            }
        };
        CacheEntry {
            outcome,
            resolved_at: Instant::now(),
        }
    }
}
