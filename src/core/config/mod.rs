//! Defines the core runtime `Config` struct, its defaults, and related utilities.
//! Submodules handle loading, building, and validation.

pub(crate) mod builder;
pub(crate) mod file;
pub(crate) mod loading;
pub(crate) mod validation;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;
pub use loading::discover_config_file;

use std::time::Duration;

use crate::core::models::VerificationMode;

/// Runtime configuration settings used by the mailvet core logic.
#[derive(Clone)]
pub struct Config {
    pub request_timeout: Duration,
    pub sleep_between_requests: (f32, f32),
    pub user_agent: String,

    pub dns_timeout: Duration,
    pub dns_servers: Vec<String>,

    pub smtp_timeout: Duration,
    pub smtp_connect_timeout: Duration,
    pub smtp_port: u16,
    pub smtp_sender_email: String,
    pub smtp_helo_name: String,

    pub max_concurrency: usize,
    pub mode: VerificationMode,

    pub api_base_url: String,
    pub api_token: Option<String>,

    pub loaded_config_path: Option<String>,
}

impl Config {
    fn build_default() -> Self {
        let dns_servers = vec![
            "8.8.8.8".to_string(),
            "8.8.4.4".to_string(),
            "1.1.1.1".to_string(),
            "1.0.0.1".to_string(),
        ];

        Config {
            request_timeout: Duration::from_secs(10),
            sleep_between_requests: (0.1, 0.5),
            user_agent: format!("mailvet/{}", env!("CARGO_PKG_VERSION")),
            dns_timeout: Duration::from_secs(5),
            dns_servers,
            smtp_timeout: Duration::from_secs(5),
            smtp_connect_timeout: Duration::from_secs(10),
            smtp_port: 25,
            smtp_sender_email: "verify-probe@example.com".to_string(),
            smtp_helo_name: "verifier.local".to_string(),
            max_concurrency: 10,
            mode: VerificationMode::Smtp,
            api_base_url: "https://verifyright.co/verify/".to_string(),
            api_token: None,
            loaded_config_path: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::build_default()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("request_timeout", &self.request_timeout)
            .field("sleep_between_requests", &self.sleep_between_requests)
            .field("user_agent", &self.user_agent)
            .field("dns_timeout", &self.dns_timeout)
            .field("dns_servers_count", &self.dns_servers.len())
            .field("smtp_timeout", &self.smtp_timeout)
            .field("smtp_connect_timeout", &self.smtp_connect_timeout)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_sender_email", &self.smtp_sender_email)
            .field("smtp_helo_name", &self.smtp_helo_name)
            .field("max_concurrency", &self.max_concurrency)
            .field("mode", &self.mode)
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("loaded_config_path", &self.loaded_config_path)
            .finish()
    }
}

/// Utility function to get a random sleep duration based on [`Config`].
///
/// Uses the `sleep_between_requests` setting from the provided configuration.
pub fn get_random_sleep_duration(config: &Config) -> Duration {
    use rand::Rng;
    let (min, max) = config.sleep_between_requests;
    if min >= max {
        return Duration::from_secs_f32(min.max(0.0));
    }
    let duration_secs = rand::thread_rng().gen_range(min..max);
    Duration::from_secs_f32(duration_secs)
}
