// SPDX-FileCopyrightText: 2026 FlipStaq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Channel Configuration
//!
//! Tunables for the realtime channel client. Defaults match the production
//! relay deployment.

use url::Url;

use crate::error::{ChannelError, ChannelResult};
use crate::transport::TransportOptions;

/// Reconnection policy with exponential backoff.
///
/// Attempt numbers are 1-based: the first retry after a drop is attempt 1
/// and waits `base_delay_ms`, attempt 2 waits twice that, and so on. After
/// `max_attempts` failed retries the channel stays down until the caller
/// connects manually.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Base delay for exponential backoff (milliseconds).
    pub base_delay_ms: u64,
    /// Maximum automatic reconnection attempts.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy {
            base_delay_ms: 1_000,
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Returns the backoff delay before the given attempt (1-based).
    ///
    /// `delay = base * 2^(attempt - 1)`, so attempts 1..=5 with the default
    /// base wait 1s, 2s, 4s, 8s, 16s.
    pub fn delay_ms_for(&self, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay_ms * (1u64 << exponent)
    }

    /// Returns true if the given attempt number exceeds the policy cap.
    pub fn is_exhausted(&self, attempt: u32) -> bool {
        attempt > self.max_attempts
    }
}

/// Configuration for the realtime channel client.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// WebSocket endpoint, e.g. `wss://chat.example.com/ws`.
    pub endpoint: String,
    /// Heartbeat ping interval in milliseconds.
    pub heartbeat_interval_ms: u64,
    /// Timeout for a tracked send awaiting its response (milliseconds).
    pub send_timeout_ms: u64,
    /// Time-to-live for typing indicators without a refresh (milliseconds).
    pub typing_ttl_ms: u64,
    /// Reconnection policy.
    pub reconnect: ReconnectPolicy,
    /// Transport-level timeouts.
    pub transport: TransportOptions,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            endpoint: String::new(),
            heartbeat_interval_ms: 30_000,
            send_timeout_ms: 10_000,
            typing_ttl_ms: 10_000,
            reconnect: ReconnectPolicy::default(),
            transport: TransportOptions::default(),
        }
    }
}

impl ChannelConfig {
    /// Creates a config for the given endpoint with default tunables.
    pub fn new(endpoint: &str) -> Self {
        ChannelConfig {
            endpoint: endpoint.to_string(),
            ..Default::default()
        }
    }

    /// Sets the heartbeat interval.
    pub fn with_heartbeat_interval_ms(mut self, ms: u64) -> Self {
        self.heartbeat_interval_ms = ms;
        self
    }

    /// Sets the tracked-send timeout.
    pub fn with_send_timeout_ms(mut self, ms: u64) -> Self {
        self.send_timeout_ms = ms;
        self
    }

    /// Sets the reconnection policy.
    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// Builds the connection URI with the bearer token as a query credential.
    ///
    /// The token is percent-encoded by the URL serializer. Any query already
    /// present on the endpoint is replaced.
    pub fn connect_url(&self, token: &str) -> ChannelResult<String> {
        let mut url =
            Url::parse(&self.endpoint).map_err(|e| ChannelError::InvalidUrl(e.to_string()))?;

        match url.scheme() {
            "ws" | "wss" => {}
            other => {
                return Err(ChannelError::InvalidUrl(format!(
                    "expected ws:// or wss://, got {}://",
                    other
                )))
            }
        }

        url.query_pairs_mut().clear().append_pair("token", token);
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_matches_deployment() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.base_delay_ms, 1_000);
        assert_eq!(policy.max_attempts, 5);
    }

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_ms_for(1), 1_000);
        assert_eq!(policy.delay_ms_for(2), 2_000);
        assert_eq!(policy.delay_ms_for(3), 4_000);
        assert_eq!(policy.delay_ms_for(4), 8_000);
        assert_eq!(policy.delay_ms_for(5), 16_000);
    }

    #[test]
    fn test_exhaustion_is_strictly_above_cap() {
        let policy = ReconnectPolicy::default();
        assert!(!policy.is_exhausted(5));
        assert!(policy.is_exhausted(6));
    }

    #[test]
    fn test_connect_url_appends_token() {
        let config = ChannelConfig::new("wss://chat.example.com/ws");
        let url = config.connect_url("abc123").unwrap();
        assert_eq!(url, "wss://chat.example.com/ws?token=abc123");
    }

    #[test]
    fn test_connect_url_encodes_token() {
        let config = ChannelConfig::new("ws://localhost:4101/ws");
        // Form encoding: '+' -> %2B, space -> '+', '=' -> %3D
        let url = config.connect_url("a+b c=").unwrap();
        assert_eq!(url, "ws://localhost:4101/ws?token=a%2Bb+c%3D");
    }

    #[test]
    fn test_connect_url_replaces_existing_query() {
        let config = ChannelConfig::new("wss://chat.example.com/ws?debug=1");
        let url = config.connect_url("tok").unwrap();
        assert_eq!(url, "wss://chat.example.com/ws?token=tok");
    }

    #[test]
    fn test_connect_url_rejects_http_scheme() {
        let config = ChannelConfig::new("https://chat.example.com/ws");
        let result = config.connect_url("abc");
        assert!(matches!(result, Err(ChannelError::InvalidUrl(_))));
    }

    #[test]
    fn test_connect_url_rejects_garbage() {
        let config = ChannelConfig::new("not a url");
        assert!(config.connect_url("abc").is_err());
    }

    #[test]
    fn test_default_config_timings() {
        let config = ChannelConfig::default();
        assert_eq!(config.heartbeat_interval_ms, 30_000);
        assert_eq!(config.send_timeout_ms, 10_000);
        assert_eq!(config.typing_ttl_ms, 10_000);
    }
}
