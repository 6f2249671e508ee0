//! Event System
//!
//! Named local events with per-event subscriber sets. Handlers are
//! registered under an `EventKind` and receive `ChannelEvent` payloads;
//! a panicking handler is isolated so its siblings still run.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::frame::{ChatMessage, PresenceUpdate, ReadStatusUpdate, TypingUpdate};

/// Names of the local events the channel emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Socket opened and authenticated.
    Connected,
    /// Socket closed (any reason).
    Disconnected,
    /// Transport or connection error.
    Error,
    /// Correlated send succeeded.
    SendResponse,
    /// Correlated send failed (server-reported).
    SendError,
    /// Inbound chat message.
    NewMessage,
    /// Read status of a message changed.
    ReadStatusChanged,
    /// A user came online.
    UserOnline,
    /// A user went offline.
    UserOffline,
    /// A user's typing state changed.
    UserTyping,
}

/// Events emitted to subscribers.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    Connected,
    Disconnected {
        code: u16,
        reason: String,
    },
    Error {
        message: String,
    },
    SendResponse {
        message: Option<ChatMessage>,
    },
    SendError {
        error: Option<String>,
    },
    NewMessage(ChatMessage),
    ReadStatusChanged(ReadStatusUpdate),
    UserOnline(PresenceUpdate),
    UserOffline(PresenceUpdate),
    UserTyping(TypingUpdate),
}

impl ChannelEvent {
    /// Returns the kind this event dispatches under.
    pub fn kind(&self) -> EventKind {
        match self {
            ChannelEvent::Connected => EventKind::Connected,
            ChannelEvent::Disconnected { .. } => EventKind::Disconnected,
            ChannelEvent::Error { .. } => EventKind::Error,
            ChannelEvent::SendResponse { .. } => EventKind::SendResponse,
            ChannelEvent::SendError { .. } => EventKind::SendError,
            ChannelEvent::NewMessage(_) => EventKind::NewMessage,
            ChannelEvent::ReadStatusChanged(_) => EventKind::ReadStatusChanged,
            ChannelEvent::UserOnline(_) => EventKind::UserOnline,
            ChannelEvent::UserOffline(_) => EventKind::UserOffline,
            ChannelEvent::UserTyping(_) => EventKind::UserTyping,
        }
    }
}

/// Event handler trait.
///
/// Implement this trait to receive channel events.
pub trait EventHandler: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: ChannelEvent);
}

/// Simple callback-based event handler.
///
/// Wraps a closure for easy event handling.
pub struct CallbackHandler<F>
where
    F: Fn(ChannelEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(ChannelEvent) + Send + Sync,
{
    /// Creates a new callback handler.
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(ChannelEvent) + Send + Sync,
{
    fn on_event(&self, event: ChannelEvent) {
        (self.callback)(event);
    }
}

/// Opaque handle identifying one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

// Identity by data pointer only; vtable pointers are not stable across
// codegen units.
fn same_handler(a: &Arc<dyn EventHandler>, b: &Arc<dyn EventHandler>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const u8,
        Arc::as_ptr(b) as *const u8,
    )
}

/// Per-event subscriber table.
///
/// Registering the same `Arc` twice under one event is a no-op that returns
/// the original id (set semantics). When the last handler for an event is
/// removed, the event's entry is dropped entirely.
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<EventKind, Vec<(HandlerId, Arc<dyn EventHandler>)>>,
    next_id: u64,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        EventBus {
            handlers: HashMap::new(),
            next_id: 0,
        }
    }

    /// Registers a handler for an event. Returns its id.
    pub fn on(&mut self, kind: EventKind, handler: Arc<dyn EventHandler>) -> HandlerId {
        let entry = self.handlers.entry(kind).or_default();

        if let Some((existing, _)) = entry.iter().find(|(_, h)| same_handler(h, &handler)) {
            return *existing;
        }

        let id = HandlerId(self.next_id);
        self.next_id += 1;
        entry.push((id, handler));
        id
    }

    /// Registers a closure for an event. Returns its id.
    pub fn on_fn<F>(&mut self, kind: EventKind, callback: F) -> HandlerId
    where
        F: Fn(ChannelEvent) + Send + Sync + 'static,
    {
        self.on(kind, Arc::new(CallbackHandler::new(callback)))
    }

    /// Removes a registration. Returns true if it was present.
    pub fn off(&mut self, kind: EventKind, id: HandlerId) -> bool {
        let Some(entry) = self.handlers.get_mut(&kind) else {
            return false;
        };

        let before = entry.len();
        entry.retain(|(handler_id, _)| *handler_id != id);
        let removed = entry.len() < before;

        if entry.is_empty() {
            self.handlers.remove(&kind);
        }

        removed
    }

    /// Returns the number of handlers registered for an event.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, |entry| entry.len())
    }

    /// Returns the number of events with at least one handler.
    pub fn subscribed_events(&self) -> usize {
        self.handlers.len()
    }

    /// Dispatches an event to every handler registered for its kind.
    ///
    /// A panicking handler is caught and logged; remaining handlers for the
    /// same emission still run.
    pub fn emit(&self, event: ChannelEvent) {
        let Some(entry) = self.handlers.get(&event.kind()) else {
            return;
        };

        for (id, handler) in entry {
            let result = catch_unwind(AssertUnwindSafe(|| handler.on_event(event.clone())));
            if result.is_err() {
                tracing::error!(kind = ?event.kind(), handler = ?id, "event handler panicked");
            }
        }
    }
}
