//! Transport Trait
//!
//! Platform-agnostic abstraction over the socket. The channel client drives
//! any implementation of this trait; tests use the mock, production uses the
//! tungstenite transport.

use crate::error::ChannelError;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, ChannelError>;

/// WebSocket close code for a deliberate client-initiated close.
pub const CLOSE_NORMAL: u16 = 1000;

/// WebSocket close code reported when the connection dropped without a
/// close handshake.
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Transport-level timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    /// Connection timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Read/write timeout in milliseconds.
    pub io_timeout_ms: u64,
}

impl Default for TransportOptions {
    fn default() -> Self {
        TransportOptions {
            connect_timeout_ms: 10_000,
            io_timeout_ms: 100,
        }
    }
}

/// Something the transport delivered during a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One complete text frame.
    Frame(String),
    /// The peer closed the connection (or it dropped). Code 1000 is a clean
    /// close; everything else counts as abnormal.
    Closed { code: u16, reason: String },
}

/// Transport trait for socket communication.
///
/// # Synchronous Interface
///
/// Methods are synchronous; `poll` must not block longer than the configured
/// I/O timeout so the caller can interleave timers with socket reads.
///
/// # Example
///
/// ```ignore
/// use flipstaq_realtime::{MockTransport, Transport, TransportOptions};
///
/// let mut transport = MockTransport::new();
/// transport.connect("ws://localhost:4101/ws?token=t", &TransportOptions::default())?;
/// transport.send(r#"{"event":"ping"}"#)?;
/// while let Some(event) = transport.poll()? {
///     // handle frame or close
/// }
/// ```
pub trait Transport: Send {
    /// Opens the socket to the given URL (credentials already in the query).
    fn connect(&mut self, url: &str, options: &TransportOptions) -> TransportResult<()>;

    /// Closes the socket with the given close code.
    ///
    /// Safe to call when not connected.
    fn close(&mut self, code: u16) -> TransportResult<()>;

    /// Returns true while the socket is open.
    fn is_open(&self) -> bool;

    /// Writes one text frame.
    ///
    /// Returns an error if not connected.
    fn send(&mut self, frame: &str) -> TransportResult<()>;

    /// Reads the next transport event.
    ///
    /// Returns `Ok(None)` when nothing is available within the I/O timeout,
    /// and when the socket is not open. After yielding
    /// `TransportEvent::Closed` the socket is gone and `poll` keeps
    /// returning `Ok(None)`.
    fn poll(&mut self) -> TransportResult<Option<TransportEvent>>;

    /// Checks if an event is already buffered (non-blocking).
    fn has_pending(&self) -> bool;
}
