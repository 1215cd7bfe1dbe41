//! Minimal channel membership and status-prefix queries (spec §1 scope
//! note: "no channel command handlers... beyond the minimum needed for
//! mode propagation and membership queries").
//!
//! Grounded in the teacher's `state/channel.rs::MemberModes` prefix
//! priority (`~ & @ % +`), generalized from a fixed-field struct to a
//! per-member set of status-mode names so it composes with the
//! per-server [`crate::mode::ModeTable`] instead of a hardcoded letter set.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

/// A channel, as far as this crate needs one: a name and a membership
/// table mapping member UID to the set of status-mode names they hold.
pub struct Channel {
    pub name: String,
    members: RwLock<HashMap<String, HashSet<String>>>,
}

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), members: RwLock::new(HashMap::new()) }
    }

    pub fn add_member(&self, uid: &str) {
        self.members.write().entry(uid.to_string()).or_default();
    }

    pub fn remove_member(&self, uid: &str) {
        self.members.write().remove(uid);
    }

    pub fn is_member(&self, uid: &str) -> bool {
        self.members.read().contains_key(uid)
    }

    pub fn member_count(&self) -> usize {
        self.members.read().len()
    }

    pub fn grant_status(&self, uid: &str, status_name: &str) -> bool {
        let mut members = self.members.write();
        match members.get_mut(uid) {
            Some(set) => set.insert(status_name.to_string()),
            None => false,
        }
    }

    pub fn revoke_status(&self, uid: &str, status_name: &str) -> bool {
        let mut members = self.members.write();
        match members.get_mut(uid) {
            Some(set) => set.remove(status_name),
            None => false,
        }
    }

    pub fn status_names_of(&self, uid: &str) -> HashSet<String> {
        self.members.read().get(uid).cloned().unwrap_or_default()
    }

    /// The single highest-ranked status name a member holds, given a
    /// priority list ordered from highest to lowest (e.g.
    /// `["owner", "admin", "op", "halfop", "voice"]`).
    pub fn highest_status<'a>(&self, uid: &str, priority: &[&'a str]) -> Option<&'a str> {
        let held = self.status_names_of(uid);
        priority.iter().find(|name| held.contains(**name)).copied()
    }

    pub fn member_uids(&self) -> Vec<String> {
        self.members.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_grant_and_revoke_round_trip() {
        let ch = Channel::new("#general");
        ch.add_member("001AAAAAA");
        assert!(ch.grant_status("001AAAAAA", "op"));
        assert!(ch.status_names_of("001AAAAAA").contains("op"));
        assert!(ch.revoke_status("001AAAAAA", "op"));
        assert!(!ch.status_names_of("001AAAAAA").contains("op"));
    }

    #[test]
    fn highest_status_respects_priority_order() {
        let ch = Channel::new("#general");
        ch.add_member("001AAAAAA");
        ch.grant_status("001AAAAAA", "voice");
        ch.grant_status("001AAAAAA", "op");
        let order = ["owner", "admin", "op", "halfop", "voice"];
        assert_eq!(ch.highest_status("001AAAAAA", &order), Some("op"));
    }

    #[test]
    fn grant_status_is_noop_for_non_member() {
        let ch = Channel::new("#general");
        assert!(!ch.grant_status("001AAAAAA", "op"));
    }
}
