//! Defines the structure mirroring the TOML configuration file format.

use serde::Deserialize;

use crate::core::models::VerificationMode;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub(crate) network: NetworkConfig,
    #[serde(default)]
    pub(crate) dns: DnsConfig,
    #[serde(default)]
    pub(crate) smtp: SmtpConfig,
    #[serde(default)]
    pub(crate) verification: VerificationConfig,
    #[serde(default)]
    pub(crate) api: ApiConfig,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct NetworkConfig {
    pub(crate) request_timeout: Option<u64>,
    pub(crate) min_sleep: Option<f32>,
    pub(crate) max_sleep: Option<f32>,
    pub(crate) user_agent: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct DnsConfig {
    pub(crate) dns_timeout: Option<u64>,
    pub(crate) dns_servers: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct SmtpConfig {
    pub(crate) smtp_timeout: Option<u64>,
    pub(crate) smtp_connect_timeout: Option<u64>,
    pub(crate) smtp_port: Option<u16>,
    pub(crate) smtp_sender_email: Option<String>,
    pub(crate) smtp_helo_name: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct VerificationConfig {
    pub(crate) mode: Option<VerificationMode>,
    pub(crate) max_concurrency: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ApiConfig {
    pub(crate) api_base_url: Option<String>,
    pub(crate) api_token: Option<String>,
}
