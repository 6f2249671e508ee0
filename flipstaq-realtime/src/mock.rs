//! Mock Transport
//!
//! Mock implementation of the Transport trait for testing.

use std::collections::VecDeque;

use crate::error::ChannelError;
use crate::transport::{Transport, TransportEvent, TransportOptions, TransportResult};

/// Mock transport for testing.
///
/// Records sent frames, replays scripted transport events, and can fail
/// connect attempts on demand to exercise the backoff path.
///
/// # Example
///
/// ```ignore
/// use flipstaq_realtime::{MockTransport, Transport, TransportOptions};
///
/// let mut transport = MockTransport::new();
/// transport.queue_frame(r#"{"event":"pong"}"#);
///
/// transport.connect("ws://test/ws?token=t", &TransportOptions::default()).unwrap();
/// transport.send(r#"{"event":"ping"}"#).unwrap();
///
/// assert_eq!(transport.sent_frames().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    open: bool,
    /// Frames that have been sent.
    sent_frames: Vec<String>,
    /// Events to return from poll().
    event_queue: VecDeque<TransportEvent>,
    /// Error to inject on the next operation.
    inject_error: Option<ChannelError>,
    /// How many upcoming connect calls should fail.
    fail_connects_remaining: u32,
    /// Total connect calls observed.
    connect_attempts: u32,
    /// URLs passed to connect, in order.
    connect_urls: Vec<String>,
    /// Code passed to the most recent close().
    last_close_code: Option<u16>,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        MockTransport::default()
    }

    /// Queues a text frame to be returned by poll().
    pub fn queue_frame(&mut self, frame: &str) {
        self.event_queue
            .push_back(TransportEvent::Frame(frame.to_string()));
    }

    /// Queues a close event to be returned by poll().
    pub fn queue_close(&mut self, code: u16, reason: &str) {
        self.event_queue.push_back(TransportEvent::Closed {
            code,
            reason: reason.to_string(),
        });
    }

    /// Returns all frames that have been sent.
    pub fn sent_frames(&self) -> &[String] {
        &self.sent_frames
    }

    /// Clears the sent frames buffer.
    pub fn clear_sent(&mut self) {
        self.sent_frames.clear();
    }

    /// Injects an error to be returned by the next operation.
    pub fn inject_error(&mut self, error: ChannelError) {
        self.inject_error = Some(error);
    }

    /// Makes the next `count` connect calls fail with a refused error.
    pub fn fail_next_connects(&mut self, count: u32) {
        self.fail_connects_remaining = count;
    }

    /// Returns how many times connect() has been called.
    pub fn connect_attempts(&self) -> u32 {
        self.connect_attempts
    }

    /// Returns the URLs passed to connect, in order.
    pub fn connect_urls(&self) -> &[String] {
        &self.connect_urls
    }

    /// Returns the close code of the most recent close().
    pub fn last_close_code(&self) -> Option<u16> {
        self.last_close_code
    }

    /// Returns the number of queued events not yet polled.
    pub fn event_queue_len(&self) -> usize {
        self.event_queue.len()
    }

    fn check_error(&mut self) -> TransportResult<()> {
        if let Some(err) = self.inject_error.take() {
            return Err(err);
        }
        Ok(())
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, url: &str, _options: &TransportOptions) -> TransportResult<()> {
        self.check_error()?;
        self.connect_attempts += 1;
        self.connect_urls.push(url.to_string());

        if self.fail_connects_remaining > 0 {
            self.fail_connects_remaining -= 1;
            return Err(ChannelError::ConnectionFailed("connection refused".into()));
        }

        self.open = true;
        Ok(())
    }

    fn close(&mut self, code: u16) -> TransportResult<()> {
        self.check_error()?;
        self.last_close_code = Some(code);
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn send(&mut self, frame: &str) -> TransportResult<()> {
        self.check_error()?;

        if !self.open {
            return Err(ChannelError::NotConnected);
        }

        self.sent_frames.push(frame.to_string());
        Ok(())
    }

    fn poll(&mut self) -> TransportResult<Option<TransportEvent>> {
        self.check_error()?;

        if !self.open {
            return Ok(None);
        }

        let event = self.event_queue.pop_front();
        if matches!(event, Some(TransportEvent::Closed { .. })) {
            self.open = false;
        }

        Ok(event)
    }

    fn has_pending(&self) -> bool {
        self.open && !self.event_queue.is_empty()
    }
}
