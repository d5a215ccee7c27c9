//! Wire shapes for the device-code and token endpoints.
//!
//! Field names on the wire are fixed by the authorization server and must not
//! be renamed; Rust-side names are mapped with `serde(rename)`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::FlowConfig;

/// `grant_type` value sent with every token request.
pub const DEVICE_CODE_GRANT: &str = "device_code";

/// Form body of the device authorization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceCodeRequest {
    pub client_id: String,
}

impl DeviceCodeRequest {
    pub fn from_config(config: &FlowConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
        }
    }
}

/// Form body of the token exchange request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRequest {
    pub grant_type: &'static str,
    pub client_id: String,
    pub client_secret: String,
    pub code: String,
}

impl TokenRequest {
    pub fn from_config(config: &FlowConfig, device_code: &str) -> Self {
        Self {
            grant_type: DEVICE_CODE_GRANT,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            code: device_code.to_string(),
        }
    }
}

/// Codes issued by the device authorization endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCodes {
    pub device_code: String,
    pub user_code: String,
    pub verification_url: String,
    #[serde(rename = "expires_in")]
    pub expires_in_secs: i64,
    /// Server-suggested polling interval; adopted when positive.
    #[serde(rename = "interval", default)]
    pub interval_secs: Option<i64>,
    /// Local receipt time, used to derive the expiry instant.
    #[serde(skip, default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl DeviceCodes {
    /// Expiry instant, or `None` when `expires_in` lies beyond the
    /// representable calendar.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Duration::try_seconds(self.expires_in_secs)
            .and_then(|lifetime| self.received_at.checked_add_signed(lifetime))
    }

    /// Codes whose expiry cannot be represented never expire locally.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires_at| now >= expires_at)
    }

    /// The server interval, if it is usable as a polling period.
    pub fn suggested_interval(&self) -> Option<u64> {
        self.interval_secs
            .filter(|secs| *secs > 0)
            .and_then(|secs| u64::try_from(secs).ok())
    }
}

/// Successful token exchange payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(rename = "expires_in")]
    pub expires_in_secs: i64,
    pub token_type: String,
}

/// OAuth error body (`{"error": ..., "error_description": ...}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(rename = "error_description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub fn decode_codes(body: &str) -> Result<DeviceCodes, serde_json::Error> {
    serde_json::from_str(body)
}

pub fn decode_token(body: &str) -> Result<TokenResponse, serde_json::Error> {
    serde_json::from_str(body)
}

pub fn decode_error(body: &str) -> Result<ErrorPayload, serde_json::Error> {
    serde_json::from_str(body)
}
