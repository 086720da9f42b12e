//! Fluent builder assembling a validated [`Config`].
//!
//! Layering order is defaults, then an optional TOML file, then explicit
//! setter calls (typically CLI flags). Later layers win.

use std::path::Path;
use std::time::Duration;

use crate::core::config::{loading, validation, Config};
use crate::core::error::Result;
use crate::core::models::VerificationMode;

#[derive(Debug, Default, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Reads `path` as TOML and overlays its values onto the current
    /// configuration.
    pub fn with_config_file(mut self, path: &Path) -> Result<Self> {
        let file = loading::read_config_file(path)?;
        loading::apply_config_file(&mut self.config, &file);
        self.config.loaded_config_path = Some(path.display().to_string());
        Ok(self)
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn sleep_between_requests(mut self, min: f32, max: f32) -> Self {
        self.config.sleep_between_requests = (min, max);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    pub fn dns_timeout(mut self, timeout: Duration) -> Self {
        self.config.dns_timeout = timeout;
        self
    }

    pub fn dns_servers(mut self, servers: Vec<String>) -> Self {
        self.config.dns_servers = servers;
        self
    }

    pub fn smtp_timeout(mut self, timeout: Duration) -> Self {
        self.config.smtp_timeout = timeout;
        self
    }

    pub fn smtp_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.smtp_connect_timeout = timeout;
        self
    }

    pub fn smtp_port(mut self, port: u16) -> Self {
        self.config.smtp_port = port;
        self
    }

    pub fn smtp_sender_email(mut self, sender: impl Into<String>) -> Self {
        self.config.smtp_sender_email = sender.into();
        self
    }

    pub fn smtp_helo_name(mut self, helo: impl Into<String>) -> Self {
        self.config.smtp_helo_name = helo.into();
        self
    }

    pub fn max_concurrency(mut self, concurrency: usize) -> Self {
        self.config.max_concurrency = concurrency;
        self
    }

    pub fn mode(mut self, mode: VerificationMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn api_base_url(mut self, base: impl Into<String>) -> Self {
        self.config.api_base_url = base.into();
        self
    }

    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.config.api_token = Some(token.into());
        self
    }

    /// Validates the assembled configuration and hands it over.
    pub fn build(self) -> Result<Config> {
        validation::validate_config(&self.config)?;
        Ok(self.config)
    }
}
