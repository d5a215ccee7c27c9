//! Inputs to the state machine and the requests it asks the host to issue.

use crate::config::{ConfigUpdate, FlowConfig};
use crate::error::TokenError;
use crate::protocol::{DeviceCodes, TokenResponse};
use crate::transport::TransportFailure;

/// Flow generation tag. Advances on every `TryAgain`.
pub type Generation = u64;

/// User and timer intents raised by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Connect,
    /// Timer-driven token attempt; honors the polling switch.
    PollTick,
    /// Manual token attempt; ignores the polling switch.
    GetToken,
    TryAgain,
    UpdateClientId(String),
    UpdateClientSecret(String),
    UpdateBaseUrl(String),
    UpdatePollingInterval(u64),
    TogglePolling,
}

impl Intent {
    pub(crate) fn config_update(&self) -> Option<ConfigUpdate> {
        match self {
            Self::UpdateClientId(id) => Some(ConfigUpdate::ClientId(id.clone())),
            Self::UpdateClientSecret(secret) => Some(ConfigUpdate::ClientSecret(secret.clone())),
            Self::UpdateBaseUrl(url) => Some(ConfigUpdate::BaseUrl(url.clone())),
            Self::UpdatePollingInterval(secs) => Some(ConfigUpdate::PollingInterval(*secs)),
            _ => None,
        }
    }
}

impl From<ConfigUpdate> for Intent {
    fn from(update: ConfigUpdate) -> Self {
        match update {
            ConfigUpdate::BaseUrl(url) => Self::UpdateBaseUrl(url),
            ConfigUpdate::ClientId(id) => Self::UpdateClientId(id),
            ConfigUpdate::ClientSecret(secret) => Self::UpdateClientSecret(secret),
            ConfigUpdate::PollingInterval(secs) => Self::UpdatePollingInterval(secs),
        }
    }
}

/// Everything the machine consumes, in arrival order.
#[derive(Debug, Clone)]
pub enum FlowEvent {
    Intent(Intent),
    DeviceCodeReceived {
        generation: Generation,
        result: Result<DeviceCodes, TransportFailure>,
    },
    TokenReceived {
        generation: Generation,
        result: Result<TokenResponse, TokenError>,
    },
}

impl From<Intent> for FlowEvent {
    fn from(intent: Intent) -> Self {
        Self::Intent(intent)
    }
}

/// A request the host must perform. Carries the config as it was when the
/// request was decided, so later edits never reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RequestDeviceCode {
        generation: Generation,
        config: FlowConfig,
    },
    RequestToken {
        generation: Generation,
        config: FlowConfig,
        device_code: String,
    },
}

impl Command {
    pub fn generation(&self) -> Generation {
        match self {
            Self::RequestDeviceCode { generation, .. } | Self::RequestToken { generation, .. } => {
                *generation
            }
        }
    }
}
