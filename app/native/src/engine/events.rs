//! Input event listener.
//!
//! Keyboard and mouse events reported by the platform hook are forwarded to a
//! small actor running on its own thread with a current-thread tokio runtime.
//! Events are processed sequentially so hotkey state stays consistent.
//!
//! # Panic Recovery
//!
//! A panic while handling one event is caught and logged; the listener keeps
//! processing subsequent events.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::sync::mpsc;

use super::ZoneSnap;
use crate::error::ZoneSnapError;
use crate::platform::{Point, VirtualKey};
use crate::utils::thread::{panic_message, spawn_named_thread};

/// Channel buffer size for the event listener.
const CHANNEL_BUFFER_SIZE: usize = 256;

/// A raw input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A key went down or up. Auto-repeat arrives as repeated downs.
    Key { key: VirtualKey, pressed: bool },
    /// The mouse wheel turned; positive `delta` scrolls up.
    Scroll { point: Point, delta: i32 },
    /// The secondary mouse button was pressed.
    SecondaryClick { point: Point },
}

impl InputEvent {
    #[must_use]
    pub const fn key_down(key: VirtualKey) -> Self { Self::Key { key, pressed: true } }

    #[must_use]
    pub const fn key_up(key: VirtualKey) -> Self { Self::Key { key, pressed: false } }

    const fn name(&self) -> &'static str {
        match self {
            Self::Key { .. } => "key",
            Self::Scroll { .. } => "scroll",
            Self::SecondaryClick { .. } => "secondary_click",
        }
    }
}

#[derive(Debug)]
enum ListenerMessage {
    Input(InputEvent),
    Shutdown,
}

/// Cloneable sender to the event listener.
#[derive(Debug, Clone)]
pub struct EventHandle {
    sender: mpsc::Sender<ListenerMessage>,
}

impl EventHandle {
    /// Queues an event without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSnapError::EventChannelClosed`] if the listener has
    /// stopped or its queue is full.
    pub fn send(&self, event: InputEvent) -> Result<(), ZoneSnapError> {
        self.sender
            .try_send(ListenerMessage::Input(event))
            .map_err(|_| ZoneSnapError::EventChannelClosed)
    }

    pub(crate) fn shutdown(&self) {
        if self.sender.try_send(ListenerMessage::Shutdown).is_err() {
            tracing::debug!("event listener already stopped");
        }
    }
}

struct EventListener {
    engine: Arc<ZoneSnap>,
    receiver: mpsc::Receiver<ListenerMessage>,
}

impl EventListener {
    async fn run(mut self) {
        tracing::trace!("event listener starting");

        while let Some(message) = self.receiver.recv().await {
            let event = match message {
                ListenerMessage::Shutdown => {
                    tracing::debug!("event listener received shutdown");
                    return;
                }
                ListenerMessage::Input(event) => event,
            };

            let name = event.name();
            let result = catch_unwind(AssertUnwindSafe(|| self.engine.handle_event(event)));

            if let Err(panic) = result {
                tracing::error!(
                    event = name,
                    panic = %panic_message(&*panic),
                    "event handler panicked, continuing"
                );
            }
        }

        tracing::debug!("event channel closed, listener exiting");
    }
}

/// Spawns the listener thread for `engine`.
pub(crate) fn spawn_listener(engine: Arc<ZoneSnap>) -> Option<(EventHandle, JoinHandle<()>)> {
    let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let listener = EventListener { engine, receiver };

    let thread = spawn_named_thread("events", move || {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!(error = %err, "failed to build event runtime");
                return;
            }
        };
        runtime.block_on(listener.run());
    })?;

    Some((EventHandle { sender }, thread))
}
