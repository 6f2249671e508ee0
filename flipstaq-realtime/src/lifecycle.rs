// SPDX-FileCopyrightText: 2026 FlipStaq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Connection Lifecycle
//!
//! Explicit state machine for the connect/close/backoff cycle. Transitions
//! are pure given an injected `Instant`, so the whole retry policy is
//! testable without a socket or a real clock.

use std::time::{Duration, Instant};

use crate::config::ReconnectPolicy;
use crate::transport::CLOSE_NORMAL;

/// Channel connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelState {
    /// Not connected; no retry pending.
    Idle,
    /// Connection attempt in flight.
    Connecting,
    /// Connected and ready.
    Open,
    /// Client-initiated close in progress.
    Closing,
    /// Waiting out the backoff delay before retry `attempt`.
    Backoff { attempt: u32 },
}

/// What a close transitioned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClosedOutcome {
    /// Deliberate close (code 1000 or client-initiated); no retry.
    Finished,
    /// Abnormal close; a retry is scheduled after the backoff delay.
    RetryScheduled { attempt: u32, delay_ms: u64 },
    /// Abnormal close with the retry budget spent; the caller must connect
    /// manually.
    GaveUp { attempts: u32 },
}

/// Owns the connection state, the retry counter, and the backoff deadline.
///
/// The counter resets only when a connection actually opens. A failed manual
/// connect after the budget is spent therefore schedules nothing further,
/// matching the bounded-retry contract.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: ChannelState,
    policy: ReconnectPolicy,
    attempt: u32,
    resume_at: Option<Instant>,
}

impl Lifecycle {
    /// Creates an idle lifecycle with the given policy.
    pub fn new(policy: ReconnectPolicy) -> Self {
        Lifecycle {
            state: ChannelState::Idle,
            policy,
            attempt: 0,
            resume_at: None,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> ChannelState {
        self.state.clone()
    }

    /// Returns the retry attempt counter (0 after a successful open).
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Returns true if a connect may be started from the current state.
    ///
    /// Connecting, Open and Closing all refuse: a connect is already in
    /// flight or the socket is still there.
    pub fn can_connect(&self) -> bool {
        matches!(
            self.state,
            ChannelState::Idle | ChannelState::Backoff { .. }
        )
    }

    /// Enters `Connecting`. A pending backoff deadline is consumed.
    pub fn begin_connect(&mut self) {
        self.resume_at = None;
        self.state = ChannelState::Connecting;
    }

    /// Enters `Open` and resets the retry counter.
    pub fn mark_open(&mut self) {
        self.attempt = 0;
        self.resume_at = None;
        self.state = ChannelState::Open;
    }

    /// Abandons a connect attempt before a socket ever existed (no token,
    /// bad endpoint). Returns to `Idle` without scheduling a retry.
    pub fn abort_connect(&mut self) {
        if matches!(self.state, ChannelState::Connecting) {
            self.state = ChannelState::Idle;
        }
    }

    /// Enters `Closing` ahead of a client-initiated close.
    pub fn begin_close(&mut self) {
        self.state = ChannelState::Closing;
    }

    /// Records that the socket is gone and decides what happens next.
    ///
    /// A close during `Closing` or with code 1000 finishes quietly. Any
    /// other close schedules retry `attempt + 1` with exponential delay,
    /// unless that would exceed the policy cap.
    pub fn mark_closed(&mut self, code: u16, now: Instant) -> ClosedOutcome {
        let deliberate = matches!(self.state, ChannelState::Closing) || code == CLOSE_NORMAL;
        self.resume_at = None;

        if deliberate {
            self.state = ChannelState::Idle;
            return ClosedOutcome::Finished;
        }

        let next = self.attempt + 1;
        if self.policy.is_exhausted(next) {
            self.state = ChannelState::Idle;
            return ClosedOutcome::GaveUp {
                attempts: self.attempt,
            };
        }

        let delay_ms = self.policy.delay_ms_for(next);
        self.attempt = next;
        self.state = ChannelState::Backoff { attempt: next };
        self.resume_at = Some(now + Duration::from_millis(delay_ms));

        ClosedOutcome::RetryScheduled {
            attempt: next,
            delay_ms,
        }
    }

    /// Returns true once the backoff delay has elapsed.
    pub fn reconnect_due(&self, now: Instant) -> bool {
        matches!(self.state, ChannelState::Backoff { .. })
            && self.resume_at.is_some_and(|at| now >= at)
    }
}
