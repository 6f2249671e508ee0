//! Typing Indicators
//!
//! Tracks who is typing in which conversation. Entries carry an explicit
//! expiry instant instead of a timer each: a `userTyping` frame with
//! `isTyping=true` arms (or refreshes) the entry, `isTyping=false` removes
//! it immediately, and anything older than the TTL disappears on the next
//! sweep or read.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::frame::TypingUpdate;

#[derive(Debug, Clone)]
struct TypingEntry {
    expires_at: Instant,
    username: Option<String>,
}

/// (conversation, user) to typing-state mapping with soft expiry.
#[derive(Debug)]
pub struct TypingTracker {
    ttl: Duration,
    entries: HashMap<(String, String), TypingEntry>,
}

impl TypingTracker {
    /// Creates a tracker whose entries live `ttl_ms` without a refresh.
    pub fn new(ttl_ms: u64) -> Self {
        TypingTracker {
            ttl: Duration::from_millis(ttl_ms),
            entries: HashMap::new(),
        }
    }

    /// Applies a typing frame at the given instant.
    pub fn apply(&mut self, update: &TypingUpdate, now: Instant) {
        let key = (update.conversation_id.clone(), update.user_id.clone());

        if update.is_typing {
            self.entries.insert(
                key,
                TypingEntry {
                    expires_at: now + self.ttl,
                    username: update.username.clone(),
                },
            );
        } else {
            self.entries.remove(&key);
        }
    }

    /// Returns true if the user is typing in the conversation and the entry
    /// has not expired.
    pub fn is_typing(&self, conversation_id: &str, user_id: &str, now: Instant) -> bool {
        self.entries
            .get(&(conversation_id.to_string(), user_id.to_string()))
            .is_some_and(|entry| entry.expires_at > now)
    }

    /// Returns the username stored with a live typing entry, if the frame
    /// carried one.
    pub fn typist_name(&self, conversation_id: &str, user_id: &str, now: Instant) -> Option<&str> {
        self.entries
            .get(&(conversation_id.to_string(), user_id.to_string()))
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| entry.username.as_deref())
    }

    /// Returns the ids of users with a live typing entry in a conversation.
    pub fn typists(&self, conversation_id: &str, now: Instant) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|((conv, _), entry)| conv == conversation_id && entry.expires_at > now)
            .map(|((_, user), _)| user.as_str())
            .collect()
    }

    /// Drops expired entries. Returns how many were removed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
