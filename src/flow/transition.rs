//! Descriptions of the transitions a processed event produced.

use serde::{Deserialize, Serialize};

use super::state::FlowState;

/// One transition, as reported to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: FlowState,
    pub to: FlowState,
    pub detail: TransitionDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransitionDetail {
    ConnectRequested {
        url: String,
    },
    DeviceCodeIssued {
        user_code: String,
        verification_url: String,
        adopted_interval_secs: Option<u64>,
    },
    DeviceCodeFailed {
        message: String,
    },
    TokenRequested {
        url: String,
    },
    /// Soft error: keep waiting.
    Pending {
        code: String,
        description: Option<String>,
    },
    Authorized {
        token_type: String,
    },
    AccessDenied,
    TokenFailed {
        message: String,
    },
    Reset,
    ConfigUpdated {
        field: String,
    },
    PollingToggled {
        enabled: bool,
    },
}

impl Transition {
    /// One-line rendering for logs.
    pub fn summary(&self) -> String {
        let what = match &self.detail {
            TransitionDetail::ConnectRequested { url } => format!("requesting device code from {url}"),
            TransitionDetail::DeviceCodeIssued {
                user_code,
                verification_url,
                adopted_interval_secs,
            } => match adopted_interval_secs {
                Some(secs) => format!(
                    "received user code {user_code} for {verification_url} (polling every {secs}s)"
                ),
                None => format!("received user code {user_code} for {verification_url}"),
            },
            TransitionDetail::DeviceCodeFailed { message } => {
                format!("device code request failed: {message}")
            }
            TransitionDetail::TokenRequested { url } => format!("requesting token from {url}"),
            TransitionDetail::Pending { code, description } => match description {
                Some(description) => format!("still waiting ({code}: {description})"),
                None => format!("still waiting ({code})"),
            },
            TransitionDetail::Authorized { token_type } => {
                format!("authorized with {token_type} token")
            }
            TransitionDetail::AccessDenied => "access denied".to_string(),
            TransitionDetail::TokenFailed { message } => format!("token request failed: {message}"),
            TransitionDetail::Reset => "flow reset".to_string(),
            TransitionDetail::ConfigUpdated { field } => format!("updated {field}"),
            TransitionDetail::PollingToggled { enabled } => {
                format!("polling {}", if *enabled { "enabled" } else { "disabled" })
            }
        };
        if self.from == self.to {
            format!("[{}] {what}", self.to)
        } else {
            format!("[{} -> {}] {what}", self.from, self.to)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_shows_state_change() {
        let transition = Transition {
            from: FlowState::WaitingAuthorization,
            to: FlowState::Denied,
            detail: TransitionDetail::AccessDenied,
        };
        assert_eq!(
            transition.summary(),
            "[WaitingAuthorization -> Denied] access denied"
        );
    }

    #[test]
    fn summary_collapses_self_transition() {
        let transition = Transition {
            from: FlowState::Welcome,
            to: FlowState::Welcome,
            detail: TransitionDetail::PollingToggled { enabled: false },
        };
        assert_eq!(transition.summary(), "[Welcome] polling disabled");
    }

    #[test]
    fn detail_serializes_with_type_tag() {
        let value = serde_json::to_value(TransitionDetail::Pending {
            code: "slow_down".to_string(),
            description: None,
        })
        .unwrap();
        assert_eq!(value["type"], "pending");
        assert_eq!(value["code"], "slow_down");
    }
}
