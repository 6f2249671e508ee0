//! Send and Watch Commands

use std::thread;
use std::time::Duration;

use anyhow::{bail, Result};
use flipstaq_realtime::{
    ChannelClient, ChannelConfig, ChannelEvent, ChannelState, EventKind, OutgoingMessage,
    SendFailure, SendResolution, WebSocketTransport,
};
use tracing::warn;

use crate::config::CliConfig;
use crate::display;
use crate::session::{FileTokenStore, Session};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn build_channel(config: &CliConfig) -> Result<ChannelClient<WebSocketTransport>> {
    // Fail fast with the login hint before touching the network.
    Session::load(config)?;

    Ok(ChannelClient::new(
        WebSocketTransport::new(),
        ChannelConfig::new(&config.endpoint),
        Box::new(FileTokenStore::new(config)),
    ))
}

/// Sends one message and waits for the server's verdict.
pub fn send(config: &CliConfig, conversation_id: &str, text: &str) -> Result<()> {
    let mut client = build_channel(config)?;

    client.connect();
    if !client.is_connected() {
        bail!("could not connect to {}", config.endpoint);
    }

    client.join_conversation(conversation_id)?;
    client.send_message_tracked(OutgoingMessage {
        conversation_id: conversation_id.to_string(),
        content: text.to_string(),
    })?;

    // The slot resolves within the send timeout even if the link drops.
    let outcome = loop {
        client.poll();
        if let Some((_, resolution)) = client.take_send_outcome() {
            break resolution;
        }
        thread::sleep(POLL_INTERVAL);
    };

    client.disconnect();

    match outcome {
        SendResolution::Delivered(Some(message)) => {
            display::success(&format!("Delivered as {}", message.id));
        }
        SendResolution::Delivered(None) => {
            display::success("Delivered");
        }
        SendResolution::Failed(SendFailure::Rejected(reason)) => {
            bail!("server rejected the message: {}", reason);
        }
        SendResolution::Failed(SendFailure::TimedOut) => {
            bail!("no response from the server");
        }
    }
    Ok(())
}

/// Streams channel events to the terminal until the channel goes offline.
pub fn watch(config: &CliConfig, conversation_id: Option<&str>) -> Result<()> {
    let mut client = build_channel(config)?;

    client.on_fn(EventKind::Connected, |_| display::success("Connected"));
    client.on_fn(EventKind::Disconnected, |event| {
        if let ChannelEvent::Disconnected { code, .. } = event {
            display::warning(&format!("Disconnected (code {})", code));
        }
    });
    client.on_fn(EventKind::NewMessage, |event| {
        if let ChannelEvent::NewMessage(message) = event {
            display::message(&message.sender_id, &message.content);
        }
    });
    client.on_fn(EventKind::ReadStatusChanged, |event| {
        if let ChannelEvent::ReadStatusChanged(update) = event {
            let state = if update.read { "read" } else { "unread" };
            display::info(&format!("message {} marked {}", update.message_id, state));
        }
    });
    client.on_fn(EventKind::UserOnline, |event| {
        if let ChannelEvent::UserOnline(update) = event {
            display::presence(&update.username, &update.user_id, true);
        }
    });
    client.on_fn(EventKind::UserOffline, |event| {
        if let ChannelEvent::UserOffline(update) = event {
            display::presence(&update.username, &update.user_id, false);
        }
    });
    client.on_fn(EventKind::UserTyping, |event| {
        if let ChannelEvent::UserTyping(update) = event {
            if update.is_typing {
                display::typing(update.username.as_deref().unwrap_or(&update.user_id));
            }
        }
    });

    client.connect();
    if !client.is_connected() {
        bail!("could not connect to {}", config.endpoint);
    }
    display::info(&format!("Watching {} (Ctrl+C to quit)", config.endpoint));

    let mut was_open = false;
    loop {
        client.poll();

        // Rooms are per connection; rejoin after every reconnect.
        let open = client.is_connected();
        if open && !was_open {
            if let Some(id) = conversation_id {
                if let Err(e) = client.join_conversation(id) {
                    warn!(error = %e, conversation = id, "could not rejoin conversation");
                }
            }
        }
        was_open = open;

        if client.state() == ChannelState::Idle {
            bail!("channel offline");
        }

        thread::sleep(POLL_INTERVAL);
    }
}
