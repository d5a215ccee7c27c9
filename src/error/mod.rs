//! Error types for the device flow.

pub mod classify;

pub use classify::{classify, describe_device_code_failure, TokenError};

use thiserror::Error;

/// Host-side errors: configuration loading and driver plumbing.
///
/// Protocol failures never surface here; they are delivered to the state
/// machine as values (see [`TokenError`] and
/// [`crate::transport::TransportFailure`]).
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Flow driver has shut down")]
    DriverClosed,
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, FlowError>;
