//! Async host for the state machine: one worker task, one event queue.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::config::FlowConfig;
use crate::error::{classify, FlowError, Result};
use crate::transport::Transport;

use super::clock::PollingClock;
use super::event::{Command, FlowEvent, Intent};
use super::machine::DeviceFlow;
use super::observer::{ActivityEmitter, TransitionObserver};
use super::state::Model;

/// Builder for a running flow.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use device_flow::config::FlowConfig;
/// use device_flow::flow::{FlowDriver, FlowState, Intent, TracingObserver};
/// use device_flow::transport::HttpTransport;
///
/// # async fn example() -> device_flow::error::Result<()> {
/// let handle = FlowDriver::new(FlowConfig::default(), Arc::new(HttpTransport::new()))
///     .with_observer(Arc::new(TracingObserver))
///     .spawn();
/// handle.send(Intent::Connect)?;
/// let model = handle.wait_for(|m| m.state.is_terminal()).await?;
/// assert_ne!(model.state, FlowState::Welcome);
/// # Ok(())
/// # }
/// ```
pub struct FlowDriver {
    config: FlowConfig,
    transport: Arc<dyn Transport>,
    observers: Vec<Arc<dyn TransitionObserver>>,
}

impl FlowDriver {
    pub fn new(config: FlowConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            observers: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn TransitionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Start the worker task. Must be called inside a tokio runtime.
    pub fn spawn(self) -> FlowHandle {
        let machine = DeviceFlow::new(self.config);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(machine.model().clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let worker = Worker {
            machine,
            transport: self.transport,
            emitter: ActivityEmitter::new(self.observers),
            clock: PollingClock::new(),
            events_tx: events_tx.clone(),
            snapshot_tx,
        };
        let task = tokio::spawn(worker.run(events_rx, shutdown_rx));

        FlowHandle {
            events: events_tx,
            snapshots: snapshot_rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Handle to a running flow. Dropping it stops the worker.
#[derive(Debug)]
pub struct FlowHandle {
    events: mpsc::UnboundedSender<FlowEvent>,
    snapshots: watch::Receiver<Model>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl FlowHandle {
    /// Enqueue a user intent.
    pub fn send(&self, intent: Intent) -> Result<()> {
        self.events
            .send(FlowEvent::Intent(intent))
            .map_err(|_| FlowError::DriverClosed)
    }

    /// Cloneable sender for tasks that raise intents on their own.
    pub fn sender(&self) -> IntentSender {
        IntentSender {
            events: self.events.clone(),
        }
    }

    /// Receiver of model snapshots, updated after every processed event.
    pub fn subscribe(&self) -> watch::Receiver<Model> {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> Model {
        self.snapshots.borrow().clone()
    }

    /// Wait until a snapshot satisfies `predicate` (checked immediately too).
    pub async fn wait_for<F>(&self, mut predicate: F) -> Result<Model>
    where
        F: FnMut(&Model) -> bool,
    {
        let mut rx = self.snapshots.clone();
        let model = rx
            .wait_for(|model| predicate(model))
            .await
            .map_err(|_| FlowError::DriverClosed)?;
        Ok(model.clone())
    }

    /// Stop the worker and wait for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

/// Cloneable intent sender detached from the [`FlowHandle`].
#[derive(Debug, Clone)]
pub struct IntentSender {
    events: mpsc::UnboundedSender<FlowEvent>,
}

impl IntentSender {
    pub fn send(&self, intent: Intent) -> Result<()> {
        self.events
            .send(FlowEvent::Intent(intent))
            .map_err(|_| FlowError::DriverClosed)
    }
}

struct Worker {
    machine: DeviceFlow,
    transport: Arc<dyn Transport>,
    emitter: ActivityEmitter,
    clock: PollingClock,
    events_tx: mpsc::UnboundedSender<FlowEvent>,
    snapshot_tx: watch::Sender<Model>,
}

impl Worker {
    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<FlowEvent>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        tracing::debug!("flow driver started");
        loop {
            let deadline = self.clock.deadline();
            let event = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                event = events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
                _ = tick(deadline) => {
                    if !self.clock.fire(Instant::now()) {
                        continue;
                    }
                    FlowEvent::Intent(Intent::PollTick)
                }
            };
            self.process(event);
        }
        tracing::debug!("flow driver stopped");
    }

    fn process(&mut self, event: FlowEvent) {
        let update = self.machine.apply(event);
        self.emitter.emit(update.transitions);
        if let Some(command) = update.command {
            self.dispatch(command);
        }
        self.clock
            .sync(self.machine.poll_subscription(), Instant::now());
        self.snapshot_tx.send_replace(update.model);
    }

    /// Run a request off the worker; its outcome comes back as an event.
    fn dispatch(&self, command: Command) {
        let transport = self.transport.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let event = match command {
                Command::RequestDeviceCode { generation, config } => FlowEvent::DeviceCodeReceived {
                    generation,
                    result: transport.request_device_code(&config).await,
                },
                Command::RequestToken {
                    generation,
                    config,
                    device_code,
                } => FlowEvent::TokenReceived {
                    generation,
                    result: transport
                        .request_token(&config, &device_code)
                        .await
                        .map_err(classify),
                },
            };
            if events.send(event).is_err() {
                tracing::debug!("flow driver gone; dropping response");
            }
        });
    }
}

async fn tick(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => futures::future::pending().await,
    }
}
