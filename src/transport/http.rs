//! `reqwest`-backed transport adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::FlowConfig;
use crate::protocol::{DeviceCodeRequest, DeviceCodes, TokenRequest, TokenResponse};

use super::{Transport, TransportFailure};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP transport posting form-encoded bodies and decoding JSON replies.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use device_flow::transport::HttpTransport;
///
/// let transport = HttpTransport::new().with_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn post_form<B, T>(&self, url: &str, body: &B) -> Result<T, TransportFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .client
            .post(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .timeout(self.timeout)
            .form(body)
            .build()
            .map_err(|e| TransportFailure::BadUrl(e.to_string()))?;

        tracing::debug!(url = %request.url(), "posting form request");

        let resp = self.client.execute(request).await.map_err(map_send_error)?;
        let status = resp.status();
        let text = resp.text().await.map_err(map_send_error)?;

        if !status.is_success() {
            return Err(TransportFailure::BadStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| TransportFailure::BadPayload(e.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request_device_code(
        &self,
        config: &FlowConfig,
    ) -> Result<DeviceCodes, TransportFailure> {
        let body = DeviceCodeRequest::from_config(config);
        self.post_form(&config.device_code_url(), &body).await
    }

    async fn request_token(
        &self,
        config: &FlowConfig,
        device_code: &str,
    ) -> Result<TokenResponse, TransportFailure> {
        let body = TokenRequest::from_config(config, device_code);
        self.post_form(&config.token_url(), &body).await
    }
}

fn map_send_error(error: reqwest::Error) -> TransportFailure {
    if error.is_timeout() {
        TransportFailure::Timeout
    } else if error.is_builder() {
        TransportFailure::BadUrl(error.to_string())
    } else if error.is_decode() {
        TransportFailure::BadPayload(error.to_string())
    } else {
        TransportFailure::NetworkError(error.to_string())
    }
}

