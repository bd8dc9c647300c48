//! Runs deferred work off the event loop.
//!
//! Each [`Command`] becomes one spawned task that posts exactly one
//! [`AppEvent`] back through the loop's channel. `dispatch` never waits.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::openai::ChatBackend;
use crate::spinner::{SpinnerTick, TICK_INTERVAL};
use crate::state::ChatMessage;
use crate::tui::AppEvent;

/// Work requested by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Connectivity check; resolves to `AppEvent::Status`.
    Probe,
    /// Chat completion over the given history; resolves to `AppEvent::Chat`.
    Complete(Vec<ChatMessage>),
    /// Deliver `AppEvent::Tick` after the tick interval.
    Tick(SpinnerTick),
}

#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn ChatBackend>,
    tx: UnboundedSender<AppEvent>,
    tick_interval: Duration,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn ChatBackend>, tx: UnboundedSender<AppEvent>) -> Self {
        Self {
            backend,
            tx,
            tick_interval: TICK_INTERVAL,
        }
    }

    #[cfg(test)]
    fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn dispatch_all(&self, commands: Vec<Command>) {
        for command in commands {
            self.dispatch(command);
        }
    }

    pub fn dispatch(&self, command: Command) {
        let tx = self.tx.clone();
        match command {
            Command::Probe => {
                let backend = Arc::clone(&self.backend);
                tokio::spawn(async move {
                    let result = backend.probe().await;
                    debug!(ok = result.is_ok(), "probe finished");
                    // The receiver is gone only when the loop has exited.
                    let _ = tx.send(AppEvent::Status(result));
                });
            }
            Command::Complete(history) => {
                let backend = Arc::clone(&self.backend);
                tokio::spawn(async move {
                    let result = backend.complete(&history).await;
                    debug!(ok = result.is_ok(), "completion finished");
                    let _ = tx.send(AppEvent::Chat(result));
                });
            }
            Command::Tick(tick) => {
                let interval = self.tick_interval;
                tokio::spawn(async move {
                    tokio::time::sleep(interval).await;
                    let _ = tx.send(AppEvent::Tick(tick));
                });
            }
        }
    }
}
