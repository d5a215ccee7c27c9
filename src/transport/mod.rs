//! Transport adapter contract and the failure taxonomy at its boundary.

pub mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::FlowConfig;
use crate::protocol::{DeviceCodes, TokenResponse};

/// Why an HTTP exchange did not produce the expected payload.
///
/// Transports deliver these as values; they never escape as panics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    #[error("BadUrl: {0}")]
    BadUrl(String),

    #[error("Timeout")]
    Timeout,

    #[error("NetworkError: {0}")]
    NetworkError(String),

    #[error("BadStatus ({status})")]
    BadStatus { status: u16, body: String },

    #[error("BadPayload: {0}")]
    BadPayload(String),
}

impl TransportFailure {
    /// Stable tag for the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadUrl(_) => "BadUrl",
            Self::Timeout => "Timeout",
            Self::NetworkError(_) => "NetworkError",
            Self::BadStatus { .. } => "BadStatus",
            Self::BadPayload(_) => "BadPayload",
        }
    }
}

/// Performs the two calls of the device authorization grant.
///
/// Implementations read the endpoints and credentials from the config
/// snapshot they are handed; the snapshot is taken when the request is
/// issued.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request_device_code(
        &self,
        config: &FlowConfig,
    ) -> Result<DeviceCodes, TransportFailure>;

    async fn request_token(
        &self,
        config: &FlowConfig,
        device_code: &str,
    ) -> Result<TokenResponse, TransportFailure>;
}
