//! Locating, reading, and applying TOML configuration files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::core::config::file::ConfigFile;
use crate::core::config::Config;
use crate::core::error::{AppError, Result};

/// File names probed, in order, when no explicit config path is given.
const DEFAULT_CONFIG_FILES: [&str; 2] = ["mailvet.toml", ".mailvet.toml"];

/// Looks for a configuration file in the current working directory.
pub fn discover_config_file() -> Option<PathBuf> {
    DEFAULT_CONFIG_FILES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

/// Reads and parses a TOML configuration file.
pub(crate) fn read_config_file(path: &Path) -> Result<ConfigFile> {
    debug!(target: "config", "reading configuration file {}", path.display());
    let raw = fs::read_to_string(path)?;
    toml::from_str(&raw).map_err(|e| {
        AppError::Config(format!(
            "failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })
}

/// Overlays the values present in `file` onto `config`. Absent fields
/// leave the existing value untouched.
pub(crate) fn apply_config_file(config: &mut Config, file: &ConfigFile) {
    if let Some(secs) = file.network.request_timeout {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(min) = file.network.min_sleep {
        config.sleep_between_requests.0 = min;
    }
    if let Some(max) = file.network.max_sleep {
        config.sleep_between_requests.1 = max;
    }
    if let Some(agent) = &file.network.user_agent {
        config.user_agent = agent.clone();
    }

    if let Some(secs) = file.dns.dns_timeout {
        config.dns_timeout = Duration::from_secs(secs);
    }
    if let Some(servers) = &file.dns.dns_servers {
        config.dns_servers = servers.clone();
    }

    if let Some(secs) = file.smtp.smtp_timeout {
        config.smtp_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.smtp.smtp_connect_timeout {
        config.smtp_connect_timeout = Duration::from_secs(secs);
    }
    if let Some(port) = file.smtp.smtp_port {
        config.smtp_port = port;
    }
    if let Some(sender) = &file.smtp.smtp_sender_email {
        config.smtp_sender_email = sender.clone();
    }
    if let Some(helo) = &file.smtp.smtp_helo_name {
        config.smtp_helo_name = helo.clone();
    }

    if let Some(mode) = file.verification.mode {
        config.mode = mode;
    }
    if let Some(concurrency) = file.verification.max_concurrency {
        config.max_concurrency = concurrency;
    }

    if let Some(base) = &file.api.api_base_url {
        config.api_base_url = base.clone();
    }
    if let Some(token) = &file.api.api_token {
        config.api_token = Some(token.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::VerificationMode;

    #[test]
    fn applies_only_present_fields() {
        let file: ConfigFile = toml::from_str(
            r#"
            [smtp]
            smtp_port = 2525

            [verification]
            mode = "api"
            "#,
        )
        .unwrap();

        let mut config = Config::default();
        let default_timeout = config.smtp_timeout;
        apply_config_file(&mut config, &file);

        assert_eq!(config.smtp_port, 2525);
        assert_eq!(config.mode, VerificationMode::Api);
        assert_eq!(config.smtp_timeout, default_timeout);
        assert_eq!(config.api_token, None);
    }

    #[test]
    fn timeouts_are_read_as_whole_seconds() {
        let file: ConfigFile = toml::from_str(
            r#"
            [network]
            request_timeout = 30

            [dns]
            dns_timeout = 2
            "#,
        )
        .unwrap();

        let mut config = Config::default();
        apply_config_file(&mut config, &file);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.dns_timeout, Duration::from_secs(2));
    }
}
