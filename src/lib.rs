//! Client-side OAuth 2.0 Device Authorization Grant (RFC 8628).
//!
//! A state machine drives a device through code issuance, user-code display,
//! polling-based token exchange and terminal outcomes, classifying every
//! transport and protocol failure into recoverable and terminal errors.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use device_flow::prelude::*;
//!
//! # async fn example() -> device_flow::error::Result<()> {
//! let config = FlowConfig::from_env()?;
//! let handle = FlowDriver::new(config, Arc::new(HttpTransport::new())).spawn();
//! handle.send(Intent::Connect)?;
//!
//! let waiting = handle
//!     .wait_for(|m| m.state != FlowState::Welcome && m.state != FlowState::Connecting)
//!     .await?;
//! if let Some(codes) = &waiting.codes {
//!     println!("Visit {} and enter {}", codes.verification_url, codes.user_code);
//! }
//! let done = handle.wait_for(|m| m.state.is_terminal()).await?;
//! println!("{}", done.state);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod flow;
pub mod prelude;
pub mod protocol;
pub mod transport;

#[cfg(feature = "cli")]
pub mod cli;
