//! Device authorization state machine and its runtime.
//!
//! [`DeviceFlow`] is the pure core: it applies one [`FlowEvent`] at a time and
//! reports the resulting snapshot, the transitions taken and the request (if
//! any) the host must issue. [`FlowDriver`] hosts it on a tokio task with a
//! single-writer event queue, a [`PollingClock`] and a transport.

pub mod clock;
pub mod driver;
pub mod event;
pub mod machine;
pub mod observer;
pub mod state;
pub mod transition;

pub use clock::PollingClock;
pub use driver::{FlowDriver, FlowHandle, IntentSender};
pub use event::{Command, FlowEvent, Generation, Intent};
pub use machine::{DeviceFlow, Update};
pub use observer::{ActivityEntry, ActivityLog, TracingObserver, TransitionObserver};
pub use state::{FlowState, Model};
pub use transition::{Transition, TransitionDetail};
