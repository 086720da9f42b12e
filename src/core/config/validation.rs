//! Pre-flight validation of an assembled [`Config`].
//!
//! Runs once, before any candidate is processed. A failure here aborts
//! the whole run with zero results emitted.

use std::net::IpAddr;

use url::Url;

use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::core::models::VerificationMode;

pub(crate) fn validate_config(config: &Config) -> Result<()> {
    if config.max_concurrency == 0 {
        return Err(AppError::Config(
            "max_concurrency must be at least 1".to_string(),
        ));
    }

    if config.request_timeout.is_zero()
        || config.dns_timeout.is_zero()
        || config.smtp_timeout.is_zero()
        || config.smtp_connect_timeout.is_zero()
    {
        return Err(AppError::Config(
            "timeouts must be greater than zero".to_string(),
        ));
    }

    let (min_sleep, max_sleep) = config.sleep_between_requests;
    if min_sleep < 0.0 || max_sleep < 0.0 {
        return Err(AppError::Config(
            "sleep_between_requests values must not be negative".to_string(),
        ));
    }

    if config.smtp_sender_email.is_empty() || !config.smtp_sender_email.contains('@') {
        return Err(AppError::Config(format!(
            "smtp_sender_email '{}' is not a plausible address",
            config.smtp_sender_email
        )));
    }
    if config.smtp_helo_name.is_empty() {
        return Err(AppError::Config(
            "smtp_helo_name must not be empty".to_string(),
        ));
    }

    if config.dns_servers.is_empty() {
        return Err(AppError::Config(
            "at least one DNS server is required".to_string(),
        ));
    }
    for server in &config.dns_servers {
        server.parse::<IpAddr>().map_err(|_| {
            AppError::Config(format!("invalid DNS server address '{server}'"))
        })?;
    }

    Url::parse(&config.api_base_url)?;

    if config.mode == VerificationMode::Api {
        let has_token = config
            .api_token
            .as_deref()
            .is_some_and(|token| !token.is_empty());
        if !has_token {
            return Err(AppError::Config(
                "API verification mode requires an API token".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_config_error(result: Result<()>, fragment: &str) {
        match result {
            Err(AppError::Config(message)) => {
                assert!(
                    message.contains(fragment),
                    "expected '{fragment}' in '{message}'"
                );
            }
            other => panic!("expected a Config error, got {other:?}"),
        }
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config = Config {
            max_concurrency: 0,
            ..Config::default()
        };
        assert_config_error(validate_config(&config), "max_concurrency");
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        let config = Config {
            dns_timeout: std::time::Duration::ZERO,
            ..Config::default()
        };
        assert_config_error(validate_config(&config), "timeouts");
    }

    #[test]
    fn implausible_sender_is_rejected() {
        let config = Config {
            smtp_sender_email: "not-an-address".to_string(),
            ..Config::default()
        };
        assert_config_error(validate_config(&config), "smtp_sender_email");
    }

    #[test]
    fn unparsable_dns_server_is_rejected() {
        let config = Config {
            dns_servers: vec!["8.8.8.8".to_string(), "not-an-ip".to_string()],
            ..Config::default()
        };
        assert_config_error(validate_config(&config), "not-an-ip");
    }

    #[test]
    fn malformed_api_base_url_is_rejected() {
        let config = Config {
            api_base_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(AppError::UrlParse(_))
        ));
    }

    #[test]
    fn api_mode_without_a_token_is_rejected() {
        let config = Config {
            mode: VerificationMode::Api,
            api_token: None,
            ..Config::default()
        };
        assert_config_error(validate_config(&config), "API token");

        let config = Config {
            mode: VerificationMode::Api,
            api_token: Some(String::new()),
            ..Config::default()
        };
        assert_config_error(validate_config(&config), "API token");
    }

    #[test]
    fn api_mode_with_a_token_validates() {
        let config = Config {
            mode: VerificationMode::Api,
            api_token: Some("token".to_string()),
            ..Config::default()
        };
        assert!(validate_config(&config).is_ok());
    }
}
