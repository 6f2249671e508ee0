// SPDX-FileCopyrightText: 2026 FlipStaq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Channel Client
//!
//! The realtime channel facade: owns the socket lifecycle, the heartbeat,
//! the event fan-out, the presence and typing maps, and the single-slot
//! tracked send. Callers drive it by calling `poll()` from their loop;
//! nothing here spawns threads or installs timers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::ChannelConfig;
use crate::error::{ChannelError, ChannelResult, SendFailure};
use crate::events::{ChannelEvent, EventBus, EventHandler, EventKind, HandlerId};
use crate::frame::{
    ChatMessage, ClientFrame, ConversationRef, OutgoingMessage, ReadReceipt, ServerEvent,
    ServerFrame, TypingState,
};
use crate::lifecycle::{ChannelState, ClosedOutcome, Lifecycle};
use crate::presence::PresenceRoster;
use crate::protocol::{decode_frame, encode_frame};
use crate::token::TokenStore;
use crate::transport::{Transport, TransportEvent, CLOSE_ABNORMAL, CLOSE_NORMAL};
use crate::typing::TypingTracker;

/// Handle for one tracked send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendTicket(u64);

/// How a tracked send ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendResolution {
    /// The server confirmed the message, optionally echoing it back.
    Delivered(Option<ChatMessage>),
    /// Rejection or timeout.
    Failed(SendFailure),
}

#[derive(Debug)]
struct PendingSend {
    ticket: SendTicket,
    deadline: Instant,
}

/// Realtime channel client.
///
/// Generic over the transport so tests can inject a mock. All methods are
/// synchronous; the caller owns the loop and calls `poll()` to drive
/// reconnects, the heartbeat, inbound dispatch, and expiry sweeps.
///
/// # Example
///
/// ```ignore
/// use flipstaq_realtime::{
///     ChannelClient, ChannelConfig, EventKind, StaticTokenStore, WebSocketTransport,
/// };
///
/// let config = ChannelConfig::new("wss://chat.example.com/ws");
/// let tokens = Box::new(StaticTokenStore::new("bearer-token"));
/// let mut client = ChannelClient::new(WebSocketTransport::new(), config, tokens);
///
/// client.on_fn(EventKind::NewMessage, |event| println!("{:?}", event));
/// client.connect();
/// loop {
///     client.poll();
///     std::thread::sleep(std::time::Duration::from_millis(50));
/// }
/// ```
pub struct ChannelClient<T: Transport> {
    transport: T,
    config: ChannelConfig,
    tokens: Box<dyn TokenStore>,
    lifecycle: Lifecycle,
    events: EventBus,
    presence: PresenceRoster,
    typing: TypingTracker,
    pending_send: Option<PendingSend>,
    send_outcome: Option<(SendTicket, SendResolution)>,
    next_ping_at: Option<Instant>,
    next_ticket: u64,
}

impl<T: Transport> ChannelClient<T> {
    /// Creates a new channel client. Nothing connects until `connect()`.
    pub fn new(transport: T, config: ChannelConfig, tokens: Box<dyn TokenStore>) -> Self {
        let lifecycle = Lifecycle::new(config.reconnect.clone());
        let typing = TypingTracker::new(config.typing_ttl_ms);

        ChannelClient {
            transport,
            config,
            tokens,
            lifecycle,
            events: EventBus::new(),
            presence: PresenceRoster::new(),
            typing,
            pending_send: None,
            send_outcome: None,
            next_ping_at: None,
            next_ticket: 0,
        }
    }

    // ---- Lifecycle ------------------------------------------------------

    /// Opens the channel.
    ///
    /// Idempotent: a no-op while connected or while an attempt is in
    /// flight. Fails silently (a warning is logged) when no bearer token is
    /// available. Connection failures surface as `Error`/`Disconnected`
    /// events and enter backoff; nothing is returned or thrown.
    pub fn connect(&mut self) {
        self.connect_at(Instant::now());
    }

    /// `connect()` with an injected clock, for deterministic tests.
    pub fn connect_at(&mut self, now: Instant) {
        if !self.lifecycle.can_connect() {
            debug!(state = ?self.lifecycle.state(), "connect ignored");
            return;
        }

        self.lifecycle.begin_connect();

        let Some(token) = self.tokens.bearer_token() else {
            warn!("no bearer token available, not connecting");
            self.lifecycle.abort_connect();
            return;
        };

        let url = match self.config.connect_url(&token) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "cannot build connection URI");
                self.lifecycle.abort_connect();
                self.events.emit(ChannelEvent::Error {
                    message: e.to_string(),
                });
                return;
            }
        };

        match self.transport.connect(&url, &self.config.transport) {
            Ok(()) => {
                self.lifecycle.mark_open();
                self.next_ping_at = Some(now + self.heartbeat_interval());
                info!("channel connected");
                self.events.emit(ChannelEvent::Connected);
            }
            Err(e) => {
                warn!(error = %e, "connect failed");
                self.events.emit(ChannelEvent::Error {
                    message: e.to_string(),
                });
                self.handle_closed(CLOSE_ABNORMAL, String::new(), now);
            }
        }
    }

    /// Closes the channel deliberately (code 1000). No reconnect follows.
    ///
    /// A tracked send still in flight is not cancelled; it times out on a
    /// later `poll()`.
    pub fn disconnect(&mut self) {
        self.disconnect_at(Instant::now());
    }

    /// `disconnect()` with an injected clock, for deterministic tests.
    pub fn disconnect_at(&mut self, now: Instant) {
        match self.lifecycle.state() {
            ChannelState::Idle => {}
            ChannelState::Backoff { attempt } => {
                // No socket to close; just cancel the pending retry.
                info!(attempt, "cancelling pending reconnect");
                self.lifecycle.begin_close();
                self.lifecycle.mark_closed(CLOSE_NORMAL, now);
            }
            _ => {
                self.lifecycle.begin_close();
                if let Err(e) = self.transport.close(CLOSE_NORMAL) {
                    debug!(error = %e, "transport close reported an error");
                }
                self.handle_closed(CLOSE_NORMAL, String::new(), now);
            }
        }
    }

    /// Returns the current connection state.
    pub fn state(&self) -> ChannelState {
        self.lifecycle.state()
    }

    /// Returns true while the channel is open.
    pub fn is_connected(&self) -> bool {
        self.lifecycle.state() == ChannelState::Open
    }

    /// Returns the retry attempt counter (0 after a successful open).
    pub fn reconnect_attempt(&self) -> u32 {
        self.lifecycle.attempt()
    }

    // ---- Polling --------------------------------------------------------

    /// Drives the channel: due reconnects, the heartbeat, inbound frames,
    /// typing expiry, and the tracked-send deadline.
    ///
    /// Returns the number of inbound frames dispatched.
    pub fn poll(&mut self) -> usize {
        self.poll_at(Instant::now())
    }

    /// `poll()` with an injected clock, for deterministic tests.
    pub fn poll_at(&mut self, now: Instant) -> usize {
        if self.lifecycle.reconnect_due(now) {
            info!(attempt = self.lifecycle.attempt(), "reconnecting");
            self.connect_at(now);
        }

        if self.is_connected() {
            if let Some(at) = self.next_ping_at {
                if now >= at {
                    if let Err(e) = self.send_frame(&ClientFrame::Ping) {
                        debug!(error = %e, "heartbeat ping failed");
                    }
                    self.next_ping_at = Some(now + self.heartbeat_interval());
                }
            }
        }

        let mut dispatched = 0;
        while self.is_connected() {
            match self.transport.poll() {
                Ok(Some(TransportEvent::Frame(text))) => match decode_frame(&text) {
                    Ok(frame) => {
                        self.dispatch_frame(frame, now);
                        dispatched += 1;
                    }
                    Err(e) => {
                        // Protocol junk never touches connection state.
                        warn!(error = %e, "dropping malformed frame");
                    }
                },
                Ok(Some(TransportEvent::Closed { code, reason })) => {
                    self.handle_closed(code, reason, now);
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "transport error");
                    self.events.emit(ChannelEvent::Error {
                        message: e.to_string(),
                    });
                    self.handle_closed(CLOSE_ABNORMAL, String::new(), now);
                }
            }
        }

        let swept = self.typing.sweep(now);
        if swept > 0 {
            debug!(swept, "typing indicators expired");
        }

        if let Some(pending) = &self.pending_send {
            if now >= pending.deadline {
                let ticket = pending.ticket;
                self.pending_send = None;
                warn!("tracked send timed out");
                self.send_outcome =
                    Some((ticket, SendResolution::Failed(SendFailure::TimedOut)));
            }
        }

        dispatched
    }

    // ---- Outbound operations -------------------------------------------

    /// Sends a chat message, fire and forget.
    ///
    /// Dropped with a warning when the channel is not open; the caller gets
    /// `ChannelError::NotConnected` and may fall back to HTTP.
    pub fn send_message(&mut self, message: OutgoingMessage) -> ChannelResult<()> {
        self.send_if_open(&ClientFrame::SendMessage(message))
    }

    /// Sends a chat message and arms the correlation slot.
    ///
    /// The wire protocol carries no correlation id, so only one tracked
    /// send may be outstanding: a second call while one is pending fails
    /// with `ChannelError::SendInFlight` rather than risking a reply being
    /// attributed to the wrong request. The first success/error frame, or
    /// the send timeout, resolves the slot; fetch the result with
    /// `take_send_outcome()`.
    pub fn send_message_tracked(&mut self, message: OutgoingMessage) -> ChannelResult<SendTicket> {
        self.send_message_tracked_at(message, Instant::now())
    }

    /// `send_message_tracked()` with an injected clock.
    pub fn send_message_tracked_at(
        &mut self,
        message: OutgoingMessage,
        now: Instant,
    ) -> ChannelResult<SendTicket> {
        if self.pending_send.is_some() {
            return Err(ChannelError::SendInFlight);
        }

        self.send_if_open(&ClientFrame::SendMessage(message))?;

        let ticket = SendTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending_send = Some(PendingSend {
            ticket,
            deadline: now + Duration::from_millis(self.config.send_timeout_ms),
        });

        Ok(ticket)
    }

    /// Takes the resolution of the most recently resolved tracked send.
    pub fn take_send_outcome(&mut self) -> Option<(SendTicket, SendResolution)> {
        self.send_outcome.take()
    }

    /// Reports a message as read or unread.
    pub fn mark_as_read(&mut self, message_id: &str, read: bool) -> ChannelResult<()> {
        self.send_if_open(&ClientFrame::MarkAsRead(ReadReceipt {
            message_id: message_id.to_string(),
            read,
        }))
    }

    /// Joins a conversation room.
    pub fn join_conversation(&mut self, conversation_id: &str) -> ChannelResult<()> {
        self.send_if_open(&ClientFrame::JoinConversation(ConversationRef {
            conversation_id: conversation_id.to_string(),
        }))
    }

    /// Leaves a conversation room.
    pub fn leave_conversation(&mut self, conversation_id: &str) -> ChannelResult<()> {
        self.send_if_open(&ClientFrame::LeaveConversation(ConversationRef {
            conversation_id: conversation_id.to_string(),
        }))
    }

    /// Reports this user's typing state in a conversation.
    pub fn send_typing(&mut self, conversation_id: &str, is_typing: bool) -> ChannelResult<()> {
        self.send_if_open(&ClientFrame::Typing(TypingState {
            conversation_id: conversation_id.to_string(),
            is_typing,
        }))
    }

    // ---- Subscriptions --------------------------------------------------

    /// Registers a handler for an event. Returns its id.
    pub fn on(&mut self, kind: EventKind, handler: Arc<dyn EventHandler>) -> HandlerId {
        self.events.on(kind, handler)
    }

    /// Registers a closure for an event. Returns its id.
    pub fn on_fn<F>(&mut self, kind: EventKind, callback: F) -> HandlerId
    where
        F: Fn(ChannelEvent) + Send + Sync + 'static,
    {
        self.events.on_fn(kind, callback)
    }

    /// Removes a registration. Returns true if it was present.
    pub fn off(&mut self, kind: EventKind, id: HandlerId) -> bool {
        self.events.off(kind, id)
    }

    /// Returns the number of handlers registered for an event.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.events.handler_count(kind)
    }

    // ---- Read accessors -------------------------------------------------

    /// Read-only view of the online-status roster.
    pub fn presence(&self) -> &PresenceRoster {
        &self.presence
    }

    /// Read-only view of the typing tracker.
    pub fn typing(&self) -> &TypingTracker {
        &self.typing
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a mutable reference to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // ---- Internals ------------------------------------------------------

    fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.config.heartbeat_interval_ms)
    }

    fn send_frame(&mut self, frame: &ClientFrame) -> ChannelResult<()> {
        let text = encode_frame(frame)?;
        self.transport.send(&text)
    }

    fn send_if_open(&mut self, frame: &ClientFrame) -> ChannelResult<()> {
        if !self.is_connected() {
            warn!(tag = frame.tag(), "channel not open, dropping frame");
            return Err(ChannelError::NotConnected);
        }
        self.send_frame(frame)
    }

    fn dispatch_frame(&mut self, frame: ServerFrame, now: Instant) {
        match frame {
            ServerFrame::SendAck { message } => {
                self.resolve_pending(SendResolution::Delivered(message.clone()));
                self.events.emit(ChannelEvent::SendResponse { message });
            }
            ServerFrame::SendNack { error } => {
                let reason = error.clone().unwrap_or_else(|| "send rejected".to_string());
                self.resolve_pending(SendResolution::Failed(SendFailure::Rejected(reason)));
                self.events.emit(ChannelEvent::SendError { error });
            }
            ServerFrame::Event(event) => self.dispatch_event(event, now),
            ServerFrame::Unknown { event } => {
                debug!(tag = %event, "dropping unrecognized event tag");
            }
        }
    }

    fn dispatch_event(&mut self, event: ServerEvent, now: Instant) {
        match event {
            ServerEvent::NewMessage(message) => {
                self.events.emit(ChannelEvent::NewMessage(message));
            }
            ServerEvent::ReadStatusChanged(update) => {
                self.events.emit(ChannelEvent::ReadStatusChanged(update));
            }
            ServerEvent::UserOnline(update) => {
                // Map first, then fan out: handlers observe the new state.
                self.presence.apply(&update, true);
                self.events.emit(ChannelEvent::UserOnline(update));
            }
            ServerEvent::UserOffline(update) => {
                self.presence.apply(&update, false);
                self.events.emit(ChannelEvent::UserOffline(update));
            }
            ServerEvent::UserTyping(update) => {
                self.typing.apply(&update, now);
                self.events.emit(ChannelEvent::UserTyping(update));
            }
            ServerEvent::Ping => {
                if let Err(e) = self.send_frame(&ClientFrame::Pong) {
                    debug!(error = %e, "pong reply failed");
                }
            }
            ServerEvent::Pong => {}
        }
    }

    fn resolve_pending(&mut self, resolution: SendResolution) {
        if let Some(pending) = self.pending_send.take() {
            self.send_outcome = Some((pending.ticket, resolution));
        }
    }

    fn handle_closed(&mut self, code: u16, reason: String, now: Instant) {
        self.next_ping_at = None;

        let outcome = self.lifecycle.mark_closed(code, now);
        self.events.emit(ChannelEvent::Disconnected { code, reason });

        match outcome {
            ClosedOutcome::Finished => {
                info!(code, "channel closed");
            }
            ClosedOutcome::RetryScheduled { attempt, delay_ms } => {
                info!(code, attempt, delay_ms, "scheduling reconnect");
            }
            ClosedOutcome::GaveUp { attempts } => {
                warn!(attempts, "reconnect attempts exhausted, staying offline");
                self.events.emit(ChannelEvent::Error {
                    message: format!("gave up reconnecting after {} attempts", attempts),
                });
            }
        }
    }
}
