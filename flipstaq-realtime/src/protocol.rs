//! Protocol Layer
//!
//! Frame serialization and boundary classification. The relay speaks JSON
//! text frames, one frame per transport message, no length prefix.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ChannelError, ChannelResult};
use crate::frame::{ChatMessage, ClientFrame, ServerEvent, ServerFrame};

/// Maximum frame size (1 MB).
pub const MAX_FRAME_SIZE: usize = 1_048_576;

/// Raw inbound shape before classification.
///
/// The relay reuses one object shape for responses and events, so every
/// discriminating field is optional here. The event payload may arrive under
/// either `data` or `payload` depending on the emitting server path.
#[derive(Debug, serde::Deserialize)]
struct RawFrame {
    event: Option<String>,
    data: Option<Value>,
    payload: Option<Value>,
    success: Option<bool>,
    message: Option<Value>,
    error: Option<String>,
}

/// Serializes an outbound frame to its JSON text form.
pub fn encode_frame(frame: &ClientFrame) -> ChannelResult<String> {
    let json =
        serde_json::to_string(frame).map_err(|e| ChannelError::InvalidFrame(e.to_string()))?;

    if json.len() > MAX_FRAME_SIZE {
        return Err(ChannelError::FrameTooLarge {
            size: json.len(),
            max: MAX_FRAME_SIZE,
        });
    }

    Ok(json)
}

/// Parses and classifies one inbound frame.
///
/// Classification precedence: a `success` field marks a correlated response,
/// a bare `error` field marks a send failure, otherwise the `event` tag
/// selects the event type. Unrecognized tags classify as
/// `ServerFrame::Unknown` rather than an error; malformed JSON and bad
/// payloads are errors (the caller logs and drops them).
pub fn decode_frame(text: &str) -> ChannelResult<ServerFrame> {
    if text.len() > MAX_FRAME_SIZE {
        return Err(ChannelError::FrameTooLarge {
            size: text.len(),
            max: MAX_FRAME_SIZE,
        });
    }

    let raw: RawFrame =
        serde_json::from_str(text).map_err(|e| ChannelError::InvalidFrame(e.to_string()))?;

    classify(raw)
}

fn classify(raw: RawFrame) -> ChannelResult<ServerFrame> {
    if let Some(success) = raw.success {
        if success {
            // Lenient: a response without a well-formed message body still acks.
            let message = raw
                .message
                .and_then(|v| serde_json::from_value::<ChatMessage>(v).ok());
            return Ok(ServerFrame::SendAck { message });
        }
        return Ok(ServerFrame::SendNack { error: raw.error });
    }

    if raw.error.is_some() {
        return Ok(ServerFrame::SendNack { error: raw.error });
    }

    let Some(event) = raw.event else {
        return Err(ChannelError::InvalidFrame(
            "frame has no success, error, or event field".into(),
        ));
    };

    let payload = raw.data.or(raw.payload);

    let event = match event.as_str() {
        "newMessage" => ServerEvent::NewMessage(parse_payload(&event, payload)?),
        "messageReadStatusChanged" => {
            ServerEvent::ReadStatusChanged(parse_payload(&event, payload)?)
        }
        "userOnline" => ServerEvent::UserOnline(parse_payload(&event, payload)?),
        "userOffline" => ServerEvent::UserOffline(parse_payload(&event, payload)?),
        "userTyping" => ServerEvent::UserTyping(parse_payload(&event, payload)?),
        "ping" => ServerEvent::Ping,
        "pong" => ServerEvent::Pong,
        _ => return Ok(ServerFrame::Unknown { event }),
    };

    Ok(ServerFrame::Event(event))
}

fn parse_payload<T: DeserializeOwned>(tag: &str, payload: Option<Value>) -> ChannelResult<T> {
    let value = payload.unwrap_or(Value::Null);
    serde_json::from_value(value)
        .map_err(|e| ChannelError::InvalidFrame(format!("bad {} payload: {}", tag, e)))
}
