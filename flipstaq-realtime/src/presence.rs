//! Online Status Roster
//!
//! Tracks which users are online, fed exclusively by inbound
//! `userOnline`/`userOffline` frames. Consumers read it as a snapshot;
//! nothing outside the channel client writes to it.

use std::collections::HashMap;

use crate::frame::PresenceUpdate;

/// One user's presence as last reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEntry {
    pub username: String,
    pub is_online: bool,
}

/// User id to presence mapping.
#[derive(Debug, Default)]
pub struct PresenceRoster {
    users: HashMap<String, PresenceEntry>,
}

impl PresenceRoster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        PresenceRoster::default()
    }

    /// Applies a presence frame. Offline users stay in the roster with
    /// `is_online` false, so the last known username remains available
    /// even when the offline frame omits it.
    pub fn apply(&mut self, update: &PresenceUpdate, is_online: bool) {
        let entry = self
            .users
            .entry(update.user_id.clone())
            .or_insert_with(|| PresenceEntry {
                username: String::new(),
                is_online,
            });
        if !update.username.is_empty() {
            entry.username = update.username.clone();
        }
        entry.is_online = is_online;
    }

    /// Returns true if the user is currently reported online.
    pub fn is_online(&self, user_id: &str) -> bool {
        self.users.get(user_id).is_some_and(|entry| entry.is_online)
    }

    /// Returns the stored entry for a user, if any frame mentioned them.
    pub fn get(&self, user_id: &str) -> Option<&PresenceEntry> {
        self.users.get(user_id)
    }

    /// Returns how many users are currently online.
    pub fn online_count(&self) -> usize {
        self.users.values().filter(|entry| entry.is_online).count()
    }

    /// Returns how many users the roster has seen.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns true if no presence frame has arrived yet.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(user_id: &str, username: &str) -> PresenceUpdate {
        PresenceUpdate {
            user_id: user_id.into(),
            username: username.into(),
        }
    }

    #[test]
    fn test_online_then_offline() {
        let mut roster = PresenceRoster::new();
        assert!(!roster.is_online("u1"));

        roster.apply(&update("u1", "aya"), true);
        assert!(roster.is_online("u1"));
        assert_eq!(roster.online_count(), 1);

        roster.apply(&update("u1", "aya"), false);
        assert!(!roster.is_online("u1"));
        assert_eq!(roster.online_count(), 0);

        // Username survives going offline
        assert_eq!(roster.get("u1").unwrap().username, "aya");
    }

    #[test]
    fn test_offline_frame_without_username_keeps_name() {
        let mut roster = PresenceRoster::new();
        roster.apply(&update("u1", "aya"), true);
        roster.apply(&update("u1", ""), false);

        assert!(!roster.is_online("u1"));
        assert_eq!(roster.get("u1").unwrap().username, "aya");
    }

    #[test]
    fn test_unknown_user_is_offline() {
        let roster = PresenceRoster::new();
        assert!(!roster.is_online("ghost"));
        assert!(roster.get("ghost").is_none());
    }

    #[test]
    fn test_multiple_users() {
        let mut roster = PresenceRoster::new();
        roster.apply(&update("u1", "aya"), true);
        roster.apply(&update("u2", "ben"), true);
        roster.apply(&update("u3", "cem"), false);

        assert_eq!(roster.len(), 3);
        assert_eq!(roster.online_count(), 2);
    }
}
