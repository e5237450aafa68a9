//! Remote confirmation of callback assertions.
//!
//! The signed parameter set is posted back to Steam as a
//! `check_authentication` request. Steam answers with a key-value text body
//! that contains `is_valid:true` when the assertion is genuine and unused.

use crate::error::{SteamAuthError, SteamAuthResult};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::{debug, error, warn};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const VALID_LINE: &str = "is_valid:true";

/// Raw response to a `check_authentication` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationResponse {
    pub status: u16,
    pub body: String,
}

impl ConfirmationResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True when some line of the body is exactly `is_valid:true`.
    pub fn is_valid(&self) -> bool {
        self.body
            .replace("\r\n", "\n")
            .split('\n')
            .any(|line| line == VALID_LINE)
    }

    /// Interpret the response: anything but a 200 carrying `is_valid:true`
    /// is a failure.
    pub fn into_result(self) -> SteamAuthResult<()> {
        if self.status != 200 {
            return Err(SteamAuthError::RemoteHttpError(self.status));
        }

        if !self.is_valid() {
            debug!(body = %self.body, "Steam did not validate the assertion");
            return Err(SteamAuthError::RemoteValidationFailed);
        }

        Ok(())
    }
}

/// Sends the confirmation request to the provider.
///
/// Implementations report connection-level failures as
/// [`SteamAuthError::NetworkError`] and return every completed HTTP exchange
/// as a [`ConfirmationResponse`], whatever its status.
#[async_trait]
pub trait ConfirmationTransport: Send + Sync {
    /// POST a form-encoded `body` to `endpoint`.
    async fn post_form(
        &self,
        endpoint: &str,
        body: String,
    ) -> SteamAuthResult<ConfirmationResponse>;
}

/// HTTPS transport backed by reqwest.
#[derive(Clone)]
pub struct HttpConfirmationTransport {
    http_client: Client,
}

impl HttpConfirmationTransport {
    pub fn new(http_timeout_seconds: u64) -> SteamAuthResult<Self> {
        // A redirect must surface as a non-200, never be followed.
        let http_client = Client::builder()
            .timeout(Duration::from_secs(http_timeout_seconds))
            .redirect(Policy::none())
            .build()
            .map_err(|e| SteamAuthError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl ConfirmationTransport for HttpConfirmationTransport {
    async fn post_form(
        &self,
        endpoint: &str,
        body: String,
    ) -> SteamAuthResult<ConfirmationResponse> {
        let response = self
            .http_client
            .post(endpoint)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!("Confirmation request failed: {}", e);
                SteamAuthError::from(e)
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status, "Confirmation request returned an error: {}", error_text);
            return Ok(ConfirmationResponse::new(status, error_text));
        }

        let body = response.text().await?;
        Ok(ConfirmationResponse::new(status, body))
    }
}
