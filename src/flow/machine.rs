//! The device authorization state machine.

use std::time::Duration;

use crate::config::FlowConfig;
use crate::error::{describe_device_code_failure, TokenError};
use crate::protocol::{DeviceCodes, TokenResponse};
use crate::transport::TransportFailure;

use super::event::{Command, FlowEvent, Generation, Intent};
use super::state::{FlowState, Model};
use super::transition::{Transition, TransitionDetail};

/// Result of applying one event.
#[derive(Debug, Clone)]
pub struct Update {
    /// Snapshot after the event.
    pub model: Model,
    /// Transitions taken, in order. Empty for no-op events.
    pub transitions: Vec<Transition>,
    /// Request the host must issue, if any.
    pub command: Option<Command>,
}

/// Pure device-flow state machine.
///
/// Owns the [`Model`] exclusively. Performs no I/O and reads no clock;
/// events must be applied one at a time, in arrival order.
///
/// # Example
/// ```
/// use device_flow::config::FlowConfig;
/// use device_flow::flow::{Command, DeviceFlow, FlowState, Intent};
///
/// let mut flow = DeviceFlow::new(FlowConfig::default());
/// let update = flow.apply(Intent::Connect.into());
/// assert_eq!(update.model.state, FlowState::Connecting);
/// assert!(matches!(update.command, Some(Command::RequestDeviceCode { .. })));
/// ```
#[derive(Debug, Clone)]
pub struct DeviceFlow {
    model: Model,
    generation: Generation,
}

impl DeviceFlow {
    pub fn new(config: FlowConfig) -> Self {
        Self {
            model: Model::new(config),
            generation: 0,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn state(&self) -> FlowState {
        self.model.state
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Polling period while the clock should run: waiting for authorization
    /// with polling enabled.
    pub fn poll_subscription(&self) -> Option<Duration> {
        (self.model.state == FlowState::WaitingAuthorization && self.model.config.polling_enabled)
            .then(|| self.model.config.polling_interval())
    }

    pub fn apply(&mut self, event: FlowEvent) -> Update {
        let mut step = Step::new(self.model.state);
        let command = match event {
            FlowEvent::Intent(intent) => self.on_intent(intent, &mut step),
            FlowEvent::DeviceCodeReceived { generation, result } => {
                if self.is_current(generation, "device code") {
                    self.on_device_code(result, &mut step);
                }
                None
            }
            FlowEvent::TokenReceived { generation, result } => {
                if self.is_current(generation, "token") {
                    self.on_token(result, &mut step);
                }
                None
            }
        };
        Update {
            model: self.model.clone(),
            transitions: step.transitions,
            command,
        }
    }

    fn on_intent(&mut self, intent: Intent, step: &mut Step) -> Option<Command> {
        if let Some(update) = intent.config_update() {
            let field = update.to_string();
            if self.model.config.apply(update) {
                step.record(&self.model, TransitionDetail::ConfigUpdated { field });
            } else {
                tracing::warn!(field = %field, "rejected configuration value");
            }
            return None;
        }

        match intent {
            Intent::Connect => self.connect(step),
            Intent::PollTick => {
                if self.model.config.polling_enabled {
                    self.request_token(step)
                } else {
                    None
                }
            }
            Intent::GetToken => self.request_token(step),
            Intent::TryAgain => {
                self.generation += 1;
                self.model.reset();
                step.record(&self.model, TransitionDetail::Reset);
                None
            }
            Intent::TogglePolling => {
                self.model.config.polling_enabled = !self.model.config.polling_enabled;
                step.record(
                    &self.model,
                    TransitionDetail::PollingToggled {
                        enabled: self.model.config.polling_enabled,
                    },
                );
                None
            }
            Intent::UpdateClientId(_)
            | Intent::UpdateClientSecret(_)
            | Intent::UpdateBaseUrl(_)
            | Intent::UpdatePollingInterval(_) => None,
        }
    }

    fn connect(&mut self, step: &mut Step) -> Option<Command> {
        if self.model.state != FlowState::Welcome {
            return None;
        }
        self.model.state = FlowState::Connecting;
        let config = self.model.config.clone();
        tracing::debug!(generation = self.generation, url = %config.device_code_url(), "requesting device code");
        step.record(
            &self.model,
            TransitionDetail::ConnectRequested {
                url: config.device_code_url(),
            },
        );
        Some(Command::RequestDeviceCode {
            generation: self.generation,
            config,
        })
    }

    fn request_token(&mut self, step: &mut Step) -> Option<Command> {
        if self.model.state != FlowState::WaitingAuthorization {
            return None;
        }
        let device_code = self.model.codes.as_ref()?.device_code.clone();
        let config = self.model.config.clone();
        tracing::debug!(generation = self.generation, url = %config.token_url(), "requesting token");
        step.record(
            &self.model,
            TransitionDetail::TokenRequested {
                url: config.token_url(),
            },
        );
        Some(Command::RequestToken {
            generation: self.generation,
            config,
            device_code,
        })
    }

    fn on_device_code(&mut self, result: Result<DeviceCodes, TransportFailure>, step: &mut Step) {
        if self.model.state != FlowState::Connecting {
            return;
        }
        match result {
            Ok(codes) => {
                let adopted = codes.suggested_interval();
                if let Some(secs) = adopted {
                    self.model.config.polling_interval_secs = secs;
                }
                let detail = TransitionDetail::DeviceCodeIssued {
                    user_code: codes.user_code.clone(),
                    verification_url: codes.verification_url.clone(),
                    adopted_interval_secs: adopted,
                };
                self.model.codes = Some(codes);
                self.model.state = FlowState::WaitingAuthorization;
                step.record(&self.model, detail);
            }
            Err(failure) => {
                let message = describe_device_code_failure(&failure);
                tracing::warn!(error = %failure, "device code request failed");
                self.model.last_error = Some(message.clone());
                self.model.state = FlowState::Failed;
                step.record(&self.model, TransitionDetail::DeviceCodeFailed { message });
            }
        }
    }

    fn on_token(&mut self, result: Result<TokenResponse, TokenError>, step: &mut Step) {
        if self.model.state != FlowState::WaitingAuthorization {
            return;
        }
        match result {
            Ok(token) => {
                let token_type = token.token_type.clone();
                self.model.token = Some(token);
                self.model.state = FlowState::Authorized;
                step.record(&self.model, TransitionDetail::Authorized { token_type });
            }
            Err(TokenError::Soft { code, description }) => {
                step.record(&self.model, TransitionDetail::Pending { code, description });
            }
            Err(err) if err.is_access_denied() => {
                self.model.state = FlowState::Denied;
                step.record(&self.model, TransitionDetail::AccessDenied);
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(code = err.code(), error = %message, "token request failed");
                self.model.last_error = Some(message.clone());
                self.model.state = FlowState::Failed;
                step.record(&self.model, TransitionDetail::TokenFailed { message });
            }
        }
    }

    fn is_current(&self, generation: Generation, what: &str) -> bool {
        if generation == self.generation {
            return true;
        }
        tracing::debug!(
            response_generation = generation,
            generation = self.generation,
            "dropping stale {what} response"
        );
        false
    }
}

/// Transitions accumulated while applying one event.
struct Step {
    from: FlowState,
    transitions: Vec<Transition>,
}

impl Step {
    fn new(from: FlowState) -> Self {
        Self {
            from,
            transitions: Vec::new(),
        }
    }

    fn record(&mut self, model: &Model, detail: TransitionDetail) {
        if self.from != model.state {
            tracing::info!(from = %self.from, to = %model.state, "flow transition");
        }
        self.transitions.push(Transition {
            from: self.from,
            to: model.state,
            detail,
        });
        self.from = model.state;
    }
}
