//! Mailbox verification through a remote HTTP API.
//!
//! One GET per candidate against `{base}/{address}?token={token}`. The
//! service's boolean `status` field carries the validity judgement;
//! its absence is an explicit "could not tell".

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::core::models::{Candidate, Status, Verdict};

/// Body shape returned by the verification service.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    status: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

/// Queries a remote verification service instead of talking SMTP.
pub struct ApiVerifier {
    client: Client,
    endpoint: Url,
    token: String,
}

impl ApiVerifier {
    /// Builds the verifier, failing fast when the token is missing or
    /// the base URL is unusable. Runs before any candidate is touched.
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = config
            .api_token
            .clone()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                AppError::Config("API verification mode requires an API token".to_string())
            })?;
        let endpoint = Url::parse(&config.api_base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Initialization(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint,
            token,
        })
    }

    /// Asks the service about one candidate. All failures, transport or
    /// service side, fold into an `ApiError` verdict for this candidate
    /// alone.
    pub async fn verify(&self, candidate: &Candidate) -> Verdict {
        let address = candidate.normalized();
        let mut url = self.endpoint.clone();
        match url.path_segments_mut() {
            Ok(mut segments) => {
                segments.pop_if_empty().push(address);
            }
            Err(()) => {
                return Verdict::with_reason(
                    Status::ApiError,
                    format!("cannot append to API base URL {}", self.endpoint),
                );
            }
        }

        debug!(target: "verification_api", "[{address}] querying verification service");
        let response = match self
            .client
            .get(url)
            .query(&[("token", self.token.as_str())])
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) if error.is_timeout() => {
                return Verdict::with_reason(Status::ApiError, "request timed out");
            }
            Err(error) => {
                return Verdict::with_reason(Status::ApiError, format!("request failed: {error}"));
            }
        };

        match response.status() {
            status if status.is_success() => match response.json::<ApiResponse>().await {
                Ok(body) => interpret_validity(&body),
                Err(error) => Verdict::with_reason(
                    Status::ApiError,
                    format!("malformed response body: {error}"),
                ),
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Verdict::with_reason(Status::ApiError, "token rejected by verification service")
            }
            status => {
                Verdict::with_reason(Status::ApiError, format!("service returned HTTP {status}"))
            }
        }
    }
}

fn interpret_validity(body: &ApiResponse) -> Verdict {
    let status = match body.status {
        Some(true) => Status::Valid,
        Some(false) => Status::MailboxRejected,
        None => Status::Ambiguous,
    };
    match &body.message {
        Some(message) if !message.is_empty() => Verdict::with_reason(status, message.clone()),
        _ if status == Status::Ambiguous => {
            Verdict::with_reason(status, "service did not state validity")
        }
        _ => Verdict::new(status),
    }
}
