//! Tests for wire frame encoding and boundary classification.

use flipstaq_realtime::{
    decode_frame, encode_frame, ChannelError, ChatMessage, ClientFrame, ConversationRef,
    OutgoingMessage, ReadReceipt, ServerEvent, ServerFrame, TypingState,
};
use proptest::prelude::*;

#[test]
fn test_send_message_wire_shape() {
    let frame = ClientFrame::SendMessage(OutgoingMessage {
        conversation_id: "c1".to_string(),
        content: "hello".to_string(),
    });

    assert_eq!(
        encode_frame(&frame).unwrap(),
        r#"{"event":"sendMessage","payload":{"conversationId":"c1","content":"hello"}}"#
    );
}

#[test]
fn test_mark_as_read_wire_shape() {
    let frame = ClientFrame::MarkAsRead(ReadReceipt {
        message_id: "m1".to_string(),
        read: true,
    });

    assert_eq!(
        encode_frame(&frame).unwrap(),
        r#"{"event":"markAsRead","payload":{"messageId":"m1","read":true}}"#
    );
}

#[test]
fn test_join_and_leave_wire_shapes() {
    let join = ClientFrame::JoinConversation(ConversationRef {
        conversation_id: "c9".to_string(),
    });
    let leave = ClientFrame::LeaveConversation(ConversationRef {
        conversation_id: "c9".to_string(),
    });

    assert_eq!(
        encode_frame(&join).unwrap(),
        r#"{"event":"joinConversation","payload":{"conversationId":"c9"}}"#
    );
    assert_eq!(
        encode_frame(&leave).unwrap(),
        r#"{"event":"leaveConversation","payload":{"conversationId":"c9"}}"#
    );
}

#[test]
fn test_typing_wire_shape() {
    let frame = ClientFrame::Typing(TypingState {
        conversation_id: "c1".to_string(),
        is_typing: false,
    });

    assert_eq!(
        encode_frame(&frame).unwrap(),
        r#"{"event":"typing","payload":{"conversationId":"c1","isTyping":false}}"#
    );
}

#[test]
fn test_heartbeat_frames_have_no_payload_key() {
    assert_eq!(encode_frame(&ClientFrame::Ping).unwrap(), r#"{"event":"ping"}"#);
    assert_eq!(encode_frame(&ClientFrame::Pong).unwrap(), r#"{"event":"pong"}"#);
}

#[test]
fn test_decode_presence_event_from_data_key() {
    let frame = decode_frame(r#"{"event":"userOnline","data":{"userId":"u1","username":"a"}}"#)
        .unwrap();

    match frame {
        ServerFrame::Event(ServerEvent::UserOnline(update)) => {
            assert_eq!(update.user_id, "u1");
            assert_eq!(update.username, "a");
        }
        other => panic!("expected UserOnline, got {:?}", other),
    }
}

#[test]
fn test_decode_new_message_event() {
    let text = r#"{
        "event": "newMessage",
        "data": {
            "id": "m1",
            "conversationId": "c1",
            "senderId": "u2",
            "content": "hey",
            "createdAt": "2026-08-22T10:00:00Z"
        }
    }"#;

    match decode_frame(text).unwrap() {
        ServerFrame::Event(ServerEvent::NewMessage(message)) => {
            assert_eq!(message.id, "m1");
            assert_eq!(message.conversation_id, "c1");
            assert_eq!(message.sender_id, "u2");
            assert_eq!(message.content, "hey");
            assert_eq!(message.created_at.as_deref(), Some("2026-08-22T10:00:00Z"));
        }
        other => panic!("expected NewMessage, got {:?}", other),
    }
}

#[test]
fn test_decode_success_response_with_echo() {
    let text = r#"{"success":true,"message":{"id":"m1","conversationId":"c1","senderId":"me","content":"hi"}}"#;

    match decode_frame(text).unwrap() {
        ServerFrame::SendAck { message: Some(message) } => {
            assert_eq!(message.id, "m1");
            assert_eq!(message.created_at, None);
        }
        other => panic!("expected SendAck with echo, got {:?}", other),
    }
}

#[test]
fn test_decode_failure_response() {
    match decode_frame(r#"{"success":false,"error":"message too long"}"#).unwrap() {
        ServerFrame::SendNack { error } => {
            assert_eq!(error.as_deref(), Some("message too long"));
        }
        other => panic!("expected SendNack, got {:?}", other),
    }
}

#[test]
fn test_success_key_outranks_event_tag() {
    let frame = decode_frame(r#"{"success":true,"event":"newMessage"}"#).unwrap();
    assert_eq!(frame, ServerFrame::SendAck { message: None });
}

#[test]
fn test_unknown_tag_is_classified_not_rejected() {
    match decode_frame(r#"{"event":"reactionAdded","data":{"messageId":"m1"}}"#).unwrap() {
        ServerFrame::Unknown { event } => assert_eq!(event, "reactionAdded"),
        other => panic!("expected Unknown, got {:?}", other),
    }
}

#[test]
fn test_garbage_is_an_error() {
    assert!(matches!(
        decode_frame("not json at all"),
        Err(ChannelError::InvalidFrame(_))
    ));
    assert!(matches!(
        decode_frame("{}"),
        Err(ChannelError::InvalidFrame(_))
    ));
}

#[test]
fn test_client_frame_tags_match_wire_names() {
    let message = OutgoingMessage {
        conversation_id: String::new(),
        content: String::new(),
    };
    assert_eq!(ClientFrame::SendMessage(message).tag(), "sendMessage");
    assert_eq!(ClientFrame::Ping.tag(), "ping");
    assert_eq!(ClientFrame::Pong.tag(), "pong");
}

fn chat_message_strategy() -> impl Strategy<Value = ChatMessage> {
    (
        "[a-z0-9-]{1,20}",
        "[a-z0-9-]{1,20}",
        "[a-z0-9-]{1,20}",
        ".{0,200}",
        proptest::option::of("[0-9TZ:-]{10,25}"),
    )
        .prop_map(|(id, conversation_id, sender_id, content, created_at)| ChatMessage {
            id,
            conversation_id,
            sender_id,
            content,
            created_at,
        })
}

proptest! {
    /// Arbitrary text must never panic the decoder; it either classifies
    /// or returns an error.
    #[test]
    fn fuzz_decode_frame_no_panic(text in ".{0,500}") {
        let _ = decode_frame(&text);
    }

    /// Arbitrary JSON objects must never panic the decoder either.
    #[test]
    fn fuzz_decode_object_no_panic(
        key in "[a-zA-Z]{1,12}",
        value in "[^\"\\\\]{0,40}",
    ) {
        let text = format!(r#"{{"{}":"{}"}}"#, key, value);
        let _ = decode_frame(&text);
    }

    /// A server-pushed message event always survives the decode boundary
    /// with its fields intact.
    #[test]
    fn fuzz_new_message_event_decodes(message in chat_message_strategy()) {
        let text = format!(
            r#"{{"event":"newMessage","data":{}}}"#,
            serde_json::to_string(&message).unwrap()
        );

        let decoded = decode_frame(&text).unwrap();
        prop_assert_eq!(
            decoded,
            ServerFrame::Event(ServerEvent::NewMessage(message))
        );
    }

    /// Outbound frames always fit the `{"event", "payload"}` envelope.
    #[test]
    fn fuzz_outbound_envelope(conversation_id in "[a-z0-9-]{1,20}", content in ".{0,200}") {
        let frame = ClientFrame::SendMessage(OutgoingMessage { conversation_id, content });
        let text = encode_frame(&frame).unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(value["event"].as_str(), Some("sendMessage"));
        prop_assert!(value["payload"].is_object());
    }
}
