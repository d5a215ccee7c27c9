//! Convenience re-exports for common use.

pub use crate::config::{ConfigUpdate, FlowConfig};
pub use crate::error::{classify, FlowError, Result, TokenError};
pub use crate::flow::{
    ActivityEntry, ActivityLog, DeviceFlow, FlowDriver, FlowEvent, FlowHandle, FlowState, Intent,
    Model, TracingObserver, Transition, TransitionObserver,
};
pub use crate::protocol::{DeviceCodes, TokenResponse};
pub use crate::transport::{HttpTransport, Transport, TransportFailure};
