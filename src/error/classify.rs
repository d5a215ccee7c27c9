//! Token-endpoint error taxonomy and the classifier that produces it.

use thiserror::Error;

use crate::protocol::decode_error;
use crate::transport::TransportFailure;

pub const AUTHORIZATION_PENDING: &str = "authorization_pending";
pub const SLOW_DOWN: &str = "slow_down";
pub const ACCESS_DENIED: &str = "access_denied";

/// Code used when an error status carried a body that is not an OAuth error.
pub const BAD_TOKEN_ERROR: &str = "BadTokenError";
/// Code used when a success status carried an undecodable body.
pub const BAD_PAYLOAD: &str = "BadPayload";

/// Outcome of a failed token exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The client should keep polling.
    #[error("{}", render(.code, .description.as_deref()))]
    Soft {
        code: String,
        description: Option<String>,
    },

    /// The flow must be restarted.
    #[error("{}", render(.code, .description.as_deref()))]
    Hard {
        code: String,
        description: Option<String>,
        #[source]
        cause: TransportFailure,
    },
}

impl TokenError {
    pub fn code(&self) -> &str {
        match self {
            Self::Soft { code, .. } | Self::Hard { code, .. } => code,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Soft { description, .. } | Self::Hard { description, .. } => {
                description.as_deref()
            }
        }
    }

    pub fn is_soft(&self) -> bool {
        matches!(self, Self::Soft { .. })
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::Hard { code, .. } if code == ACCESS_DENIED)
    }
}

fn render(code: &str, description: Option<&str>) -> String {
    match description {
        Some(description) => format!("{code}: {description}"),
        None => code.to_string(),
    }
}

/// Map a token-endpoint transport failure into a [`TokenError`].
pub fn classify(failure: TransportFailure) -> TokenError {
    match &failure {
        TransportFailure::BadStatus { body, .. } => match decode_error(body) {
            Ok(payload) if is_soft_code(&payload.error) => TokenError::Soft {
                code: payload.error,
                description: payload.description,
            },
            Ok(payload) => TokenError::Hard {
                code: payload.error,
                description: payload.description,
                cause: failure,
            },
            Err(reason) => TokenError::Hard {
                code: BAD_TOKEN_ERROR.to_string(),
                description: Some(reason.to_string()),
                cause: failure,
            },
        },
        TransportFailure::BadPayload(reason) => TokenError::Hard {
            code: BAD_PAYLOAD.to_string(),
            description: Some(reason.clone()),
            cause: failure,
        },
        other => TokenError::Hard {
            code: other.kind().to_string(),
            description: None,
            cause: failure,
        },
    }
}

fn is_soft_code(code: &str) -> bool {
    code == AUTHORIZATION_PENDING || code == SLOW_DOWN
}

/// Human-readable message for a failed device-code request.
///
/// Status and payload failures collapse to their tag; the remaining kinds
/// keep their detail.
pub fn describe_device_code_failure(failure: &TransportFailure) -> String {
    match failure {
        TransportFailure::BadStatus { .. } | TransportFailure::BadPayload(_) => {
            failure.kind().to_string()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bad_status(body: &str) -> TransportFailure {
        TransportFailure::BadStatus {
            status: 400,
            body: body.to_string(),
        }
    }

    #[test]
    fn authorization_pending_is_soft() {
        let err = classify(bad_status(r#"{"error":"authorization_pending"}"#));
        assert_eq!(
            err,
            TokenError::Soft {
                code: AUTHORIZATION_PENDING.to_string(),
                description: None,
            }
        );
    }

    #[test]
    fn slow_down_keeps_description() {
        let err = classify(bad_status(
            r#"{"error":"slow_down","error_description":"easy there"}"#,
        ));
        assert!(err.is_soft());
        assert_eq!(err.code(), SLOW_DOWN);
        assert_eq!(err.description(), Some("easy there"));
    }

    #[test]
    fn access_denied_is_hard_and_flagged() {
        let failure = bad_status(r#"{"error":"access_denied"}"#);
        let err = classify(failure.clone());
        assert!(err.is_access_denied());
        match err {
            TokenError::Hard { code, cause, .. } => {
                assert_eq!(code, ACCESS_DENIED);
                assert_eq!(cause, failure);
            }
            other => panic!("expected Hard, got {other:?}"),
        }
    }

    #[test]
    fn other_oauth_codes_are_hard() {
        let err = classify(bad_status(
            r#"{"error":"expired_token","error_description":"too late"}"#,
        ));
        assert!(!err.is_soft());
        assert!(!err.is_access_denied());
        assert_eq!(err.to_string(), "expired_token: too late");
    }

    #[test]
    fn undecodable_error_body_is_bad_token_error() {
        let err = classify(bad_status("<html>502</html>"));
        assert_eq!(err.code(), BAD_TOKEN_ERROR);
        assert!(err.description().is_some());
        assert!(!err.is_soft());
    }

    #[test]
    fn bad_payload_keeps_reason() {
        let err = classify(TransportFailure::BadPayload("missing field".to_string()));
        assert_eq!(err.code(), BAD_PAYLOAD);
        assert_eq!(err.description(), Some("missing field"));
    }

    #[test]
    fn other_transport_failures_use_kind_without_description() {
        for (failure, kind) in [
            (TransportFailure::Timeout, "Timeout"),
            (TransportFailure::BadUrl("nope".into()), "BadUrl"),
            (TransportFailure::NetworkError("refused".into()), "NetworkError"),
        ] {
            let err = classify(failure);
            assert_eq!(err.code(), kind);
            assert_eq!(err.description(), None);
            assert!(!err.is_soft());
        }
    }

    #[test]
    fn hard_error_exposes_transport_cause_as_source() {
        use std::error::Error as _;
        let err = classify(TransportFailure::Timeout);
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("Timeout"));
    }

    #[test]
    fn device_code_failures_collapse_status_and_payload() {
        assert_eq!(describe_device_code_failure(&bad_status("{}")), "BadStatus");
        assert_eq!(
            describe_device_code_failure(&TransportFailure::BadPayload("x".into())),
            "BadPayload"
        );
        assert_eq!(
            describe_device_code_failure(&TransportFailure::Timeout),
            "Timeout"
        );
        assert_eq!(
            describe_device_code_failure(&TransportFailure::NetworkError("refused".into())),
            "NetworkError: refused"
        );
    }
}
