//! FlipStaq Realtime Library
//!
//! Poll-driven WebSocket channel client for the FlipStaq chat backend.
//! No background threads or async runtime; the caller's loop drives
//! connection lifecycle, heartbeats, reconnection, and dispatch.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod frame;
pub mod lifecycle;
pub mod mock;
pub mod presence;
pub mod protocol;
pub mod token;
pub mod transport;
pub mod typing;
#[cfg(any(feature = "websocket-native-tls", feature = "websocket-rustls"))]
pub mod websocket;

pub use client::{ChannelClient, SendResolution, SendTicket};
pub use config::{ChannelConfig, ReconnectPolicy};
pub use error::{ChannelError, ChannelResult, SendFailure};
pub use events::{CallbackHandler, ChannelEvent, EventHandler, EventKind, HandlerId};
pub use frame::{
    ChatMessage, ClientFrame, ConversationRef, OutgoingMessage, PresenceUpdate, ReadReceipt,
    ReadStatusUpdate, ServerEvent, ServerFrame, TypingState, TypingUpdate,
};
pub use lifecycle::{ChannelState, ClosedOutcome, Lifecycle};
pub use mock::MockTransport;
pub use presence::{PresenceEntry, PresenceRoster};
pub use protocol::{decode_frame, encode_frame, MAX_FRAME_SIZE};
pub use token::{StaticTokenStore, TokenStore};
pub use transport::{
    Transport, TransportEvent, TransportOptions, TransportResult, CLOSE_ABNORMAL, CLOSE_NORMAL,
};
pub use typing::TypingTracker;
#[cfg(any(feature = "websocket-native-tls", feature = "websocket-rustls"))]
pub use websocket::WebSocketTransport;
