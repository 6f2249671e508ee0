//! Wire Frame Types
//!
//! Typed model of the relay protocol. Outbound frames serialize to
//! `{"event": <tag>, "payload": <object>}`; inbound frames are classified
//! once at the boundary (see `protocol`) into `ServerFrame` so the rest of
//! the client never touches raw JSON.

use serde::{Deserialize, Serialize};

/// Chat message as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Read-status change for a single message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadStatusUpdate {
    pub message_id: String,
    pub read: bool,
}

/// Presence change pushed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceUpdate {
    pub user_id: String,
    #[serde(default)]
    pub username: String,
}

/// Typing change pushed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingUpdate {
    pub conversation_id: String,
    pub user_id: String,
    pub is_typing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Message submitted by this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub conversation_id: String,
    pub content: String,
}

/// Read receipt reported by this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    pub message_id: String,
    pub read: bool,
}

/// Conversation reference for join/leave frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRef {
    pub conversation_id: String,
}

/// Local typing state reported by this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingState {
    pub conversation_id: String,
    pub is_typing: bool,
}

/// Outbound frame.
///
/// Adjacent tagging produces the wire shape directly; the unit variants
/// `Ping`/`Pong` serialize without a payload key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum ClientFrame {
    SendMessage(OutgoingMessage),
    MarkAsRead(ReadReceipt),
    JoinConversation(ConversationRef),
    LeaveConversation(ConversationRef),
    Typing(TypingState),
    Ping,
    Pong,
}

impl ClientFrame {
    /// Returns the wire tag for this frame.
    pub fn tag(&self) -> &'static str {
        match self {
            ClientFrame::SendMessage(_) => "sendMessage",
            ClientFrame::MarkAsRead(_) => "markAsRead",
            ClientFrame::JoinConversation(_) => "joinConversation",
            ClientFrame::LeaveConversation(_) => "leaveConversation",
            ClientFrame::Typing(_) => "typing",
            ClientFrame::Ping => "ping",
            ClientFrame::Pong => "pong",
        }
    }
}

/// Recognized inbound event tags with their decoded payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    NewMessage(ChatMessage),
    ReadStatusChanged(ReadStatusUpdate),
    UserOnline(PresenceUpdate),
    UserOffline(PresenceUpdate),
    UserTyping(TypingUpdate),
    Ping,
    Pong,
}

impl ServerEvent {
    /// Returns the wire tag for this event.
    pub fn tag(&self) -> &'static str {
        match self {
            ServerEvent::NewMessage(_) => "newMessage",
            ServerEvent::ReadStatusChanged(_) => "messageReadStatusChanged",
            ServerEvent::UserOnline(_) => "userOnline",
            ServerEvent::UserOffline(_) => "userOffline",
            ServerEvent::UserTyping(_) => "userTyping",
            ServerEvent::Ping => "ping",
            ServerEvent::Pong => "pong",
        }
    }
}

/// Inbound frame after boundary classification.
///
/// The relay multiplexes three shapes onto one socket: correlated responses
/// carrying `success`, bare error reports carrying `error`, and tagged
/// events. Classification happens exactly once (`protocol::decode_frame`);
/// precedence is success, then error, then the event tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFrame {
    /// Correlated response with `success == true`.
    SendAck { message: Option<ChatMessage> },
    /// Correlated response with `success == false`, or a bare error report.
    SendNack { error: Option<String> },
    /// Recognized event tag.
    Event(ServerEvent),
    /// Unrecognized tag (logged and dropped by the client, for forward
    /// compatibility).
    Unknown { event: String },
}
