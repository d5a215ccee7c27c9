//! Flow state and the model snapshot handed to presentation layers.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::config::FlowConfig;
use crate::protocol::{DeviceCodes, TokenResponse};

/// The state machine's variant field. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
pub enum FlowState {
    Welcome,
    Connecting,
    WaitingAuthorization,
    Authorized,
    Denied,
    Failed,
}

impl FlowState {
    /// Terminal states only leave through `TryAgain`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Authorized | Self::Denied | Self::Failed)
    }
}

/// Aggregate flow state. Presentation layers only ever see clones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub state: FlowState,
    pub token: Option<TokenResponse>,
    pub codes: Option<DeviceCodes>,
    pub last_error: Option<String>,
    pub config: FlowConfig,
}

impl Model {
    pub fn new(config: FlowConfig) -> Self {
        Self {
            state: FlowState::Welcome,
            token: None,
            codes: None,
            last_error: None,
            config,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.state = FlowState::Welcome;
        self.token = None;
        self.codes = None;
        self.last_error = None;
    }
}
