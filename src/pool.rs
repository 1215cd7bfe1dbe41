//! The authoritative in-memory registry (spec §3 "Pool", §4.B).
//!
//! Grounded in the teacher's `state/managers/user.rs::UserManager` and
//! `state/managers/client.rs::ClientManager` DashMap-indexed pattern,
//! generalized to also index servers by SID/name. Maintains the
//! invariants `pool.by_nick(fold(u.nick)) == u` and
//! `pool.by_uid(u.uid) == u` for every registered user.

use std::sync::Arc;

use dashmap::DashMap;
use meshlink_proto::irc_to_lower;

use crate::server::Server;
use crate::user::User;

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("nickname already in use")]
    NickInUse,
    #[error("server name already linked")]
    ServerExists,
}

/// The global pool/registry: every locally-known user and server,
/// indexed for O(1) lookup by identifier and by case-folded name.
#[derive(Default)]
pub struct Pool {
    users_by_uid: DashMap<String, Arc<User>>,
    users_by_nick: DashMap<String, Arc<User>>,

    servers_by_sid: DashMap<String, Arc<Server>>,
    servers_by_name: DashMap<String, Arc<Server>>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_uid(&self, uid: &str) -> Option<Arc<User>> {
        self.users_by_uid.get(uid).map(|e| e.value().clone())
    }

    pub fn by_nick(&self, nick: &str) -> Option<Arc<User>> {
        self.users_by_nick.get(&irc_to_lower(nick)).map(|e| e.value().clone())
    }

    pub fn nick_in_use(&self, nick: &str) -> bool {
        self.users_by_nick.contains_key(&irc_to_lower(nick))
    }

    /// Register a new user. Fails without mutating anything if the nick
    /// is already claimed (spec §4.D "change_nick (pool-first,
    /// abort-on-collision)" applies equally at registration time).
    pub fn register_user(&self, user: Arc<User>) -> Result<(), PoolError> {
        let folded = irc_to_lower(&user.nick());
        if self.users_by_nick.contains_key(&folded) {
            return Err(PoolError::NickInUse);
        }
        self.users_by_uid.insert(user.uid.clone(), user.clone());
        self.users_by_nick.insert(folded, user);
        Ok(())
    }

    pub fn remove_user(&self, uid: &str) -> Option<Arc<User>> {
        let user = self.users_by_uid.remove(uid).map(|(_, u)| u)?;
        self.users_by_nick.remove(&irc_to_lower(&user.nick()));
        Some(user)
    }

    /// Rename a user's nick index entry. The caller must already hold
    /// the user (via `by_uid`/`by_nick`) and have decided the new nick
    /// is free; this only keeps the nick index consistent with
    /// `user.nick`.
    pub fn rename_user(&self, uid: &str, new_nick: &str) -> Result<(), PoolError> {
        let folded_new = irc_to_lower(new_nick);
        if self.users_by_nick.contains_key(&folded_new) {
            return Err(PoolError::NickInUse);
        }
        let Some(user) = self.users_by_uid.get(uid).map(|e| e.value().clone()) else {
            return Ok(());
        };
        let folded_old = irc_to_lower(&user.nick());
        self.users_by_nick.remove(&folded_old);
        self.users_by_nick.insert(folded_new, user);
        Ok(())
    }

    pub fn by_sid(&self, sid: &str) -> Option<Arc<Server>> {
        self.servers_by_sid.get(sid).map(|e| e.value().clone())
    }

    pub fn by_server_name(&self, name: &str) -> Option<Arc<Server>> {
        self.servers_by_name.get(&irc_to_lower(name)).map(|e| e.value().clone())
    }

    pub fn register_server(&self, server: Arc<Server>) -> Result<(), PoolError> {
        let folded = irc_to_lower(&server.name);
        if self.servers_by_name.contains_key(&folded) || self.servers_by_sid.contains_key(&server.sid) {
            return Err(PoolError::ServerExists);
        }
        self.servers_by_sid.insert(server.sid.clone(), server.clone());
        self.servers_by_name.insert(folded, server);
        Ok(())
    }

    pub fn remove_server(&self, sid: &str) -> Option<Arc<Server>> {
        let server = self.servers_by_sid.remove(sid).map(|(_, s)| s)?;
        self.servers_by_name.remove(&irc_to_lower(&server.name));
        Some(server)
    }

    pub fn user_count(&self) -> usize {
        self.users_by_uid.len()
    }

    pub fn server_count(&self) -> usize {
        self.servers_by_sid.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{Location, NewUser};
    use std::sync::Weak;

    fn make_user(uid: &str, nick: &str) -> Arc<User> {
        Arc::new(User::new(NewUser {
            uid: uid.into(),
            nick: nick.into(),
            user: "u".into(),
            host: "h".into(),
            visible_host: "h".into(),
            realname: "r".into(),
            ip: "127.0.0.1".into(),
            server: Weak::new(),
            location: Location::Remote,
            created_at: 0,
        }))
    }

    #[test]
    fn register_and_lookup_round_trip() {
        let pool = Pool::new();
        let u = make_user("001AAAAAA", "Alice");
        pool.register_user(u.clone()).unwrap();

        assert_eq!(pool.by_uid("001AAAAAA").unwrap().uid, u.uid);
        assert_eq!(pool.by_nick("alice").unwrap().uid, u.uid);
        assert_eq!(pool.by_nick("ALICE").unwrap().uid, u.uid); // casemap fold
    }

    #[test]
    fn register_rejects_nick_collision() {
        let pool = Pool::new();
        pool.register_user(make_user("001AAAAAA", "Alice")).unwrap();
        let err = pool.register_user(make_user("001AAAAAB", "alice")).unwrap_err();
        assert!(matches!(err, PoolError::NickInUse));
    }

    #[test]
    fn register_rejects_sid_collision_with_new_name() {
        let pool = Pool::new();
        let first = Server::new_root("001", "hub.example", "hub");
        pool.register_server(first).unwrap();

        let colliding = Server::new_root("001", "impostor.example", "impostor");
        let err = pool.register_server(colliding).unwrap_err();
        assert!(matches!(err, PoolError::ServerExists));
    }

    #[test]
    fn rename_updates_nick_index_only() {
        let pool = Pool::new();
        let u = make_user("001AAAAAA", "Alice");
        pool.register_user(u.clone()).unwrap();
        let hooks = crate::hooks::HookRegistry::new();
        u.apply_nick_change(&hooks, "Bob", 1);
        pool.rename_user("001AAAAAA", "Bob").unwrap();

        assert!(pool.by_nick("alice").is_none());
        assert_eq!(pool.by_nick("bob").unwrap().uid, u.uid);
        assert_eq!(pool.by_uid("001AAAAAA").unwrap().nick(), "Bob");
    }

    #[test]
    fn remove_user_clears_both_indices() {
        let pool = Pool::new();
        let u = make_user("001AAAAAA", "Alice");
        pool.register_user(u.clone()).unwrap();
        pool.remove_user("001AAAAAA");

        assert!(pool.by_uid("001AAAAAA").is_none());
        assert!(pool.by_nick("alice").is_none());
    }
}
