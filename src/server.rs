//! The server entity (spec §3 "Server", §4.E "Server entity").
//!
//! Grounded in the teacher's `state/matrix.rs` tree-shaped link topology
//! and `handlers/s2s` burst/propagation flow, without the CRDT
//! convergence layer (`slirc_crdt`) the teacher uses for distributed
//! state merge — this spec models a single authoritative tree, not a
//! multi-writer convergent store (see DESIGN.md).

use std::collections::HashSet;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::hooks::HookRegistry;
use crate::mode::ModeTable;

pub struct Server {
    pub sid: String,
    pub name: String,
    pub description: RwLock<String>,

    /// Upward link. `None`/unset for the local root server.
    pub parent: RwLock<Weak<Server>>,
    pub children: RwLock<Vec<Arc<Server>>>,
    pub is_root: bool,

    /// This server's own umode/cmode letter tables (spec §4.F: two
    /// linked servers may use different letters for the same mode).
    pub umodes: RwLock<ModeTable>,
    pub cmodes: RwLock<ModeTable>,

    /// Set once this server has sent its own burst to this link.
    pub i_sent_burst: RwLock<bool>,
    /// Set once this server's burst has been fully received (gates
    /// `send_children` fan-out: never forward to a peer that hasn't
    /// finished linking).
    pub burst_complete: RwLock<bool>,

    /// UIDs of users directly attached to this server (not descendants).
    pub users: RwLock<HashSet<String>>,
}

impl Server {
    pub fn new_root(sid: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            sid: sid.into(),
            name: name.into(),
            description: RwLock::new(description.into()),
            parent: RwLock::new(Weak::new()),
            children: RwLock::new(Vec::new()),
            is_root: true,
            umodes: RwLock::new(ModeTable::new()),
            cmodes: RwLock::new(ModeTable::new()),
            i_sent_burst: RwLock::new(true),
            burst_complete: RwLock::new(true),
            users: RwLock::new(HashSet::new()),
        })
    }

    pub fn new_linked(
        sid: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        parent: &Arc<Server>,
    ) -> Arc<Self> {
        let server = Arc::new(Self {
            sid: sid.into(),
            name: name.into(),
            description: RwLock::new(description.into()),
            parent: RwLock::new(Arc::downgrade(parent)),
            children: RwLock::new(Vec::new()),
            is_root: false,
            umodes: RwLock::new(ModeTable::new()),
            cmodes: RwLock::new(ModeTable::new()),
            i_sent_burst: RwLock::new(false),
            burst_complete: RwLock::new(false),
            users: RwLock::new(HashSet::new()),
        });
        parent.children.write().push(server.clone());
        server
    }

    /// Walk up the parent chain counting hops to the root, detecting
    /// cycles and unreachable (parentless, non-root) nodes (spec §4.E
    /// "hop distance walk").
    pub fn hop_distance(&self) -> i32 {
        if self.is_root {
            return 0;
        }
        let mut hops = 0i32;
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(self.sid.clone());
        let mut current = self.parent.read().upgrade();
        loop {
            match current {
                None => return -1,
                Some(p) => {
                    hops += 1;
                    if p.is_root {
                        return hops;
                    }
                    if !visited.insert(p.sid.clone()) {
                        return -1;
                    }
                    current = p.parent.read().upgrade();
                }
            }
        }
    }

    /// Mark this link's burst as sent. Returns `false` if it had already
    /// been sent (spec §4.E "`send_burst()` (idempotent, guarded by
    /// `i_sent_burst`)"), so callers know not to re-send. Fires the
    /// `send_burst` hook family exactly once, on the transition.
    pub fn mark_burst_sent(&self, hooks: &HookRegistry) -> bool {
        let mut sent = self.i_sent_burst.write();
        if *sent {
            return false;
        }
        *sent = true;
        drop(sent);
        let mut arg = self.sid.clone();
        hooks.send_burst.fire(&mut arg, true);
        true
    }

    pub fn mark_burst_complete(&self) {
        *self.burst_complete.write() = true;
    }

    /// Invoke `f` for each direct child that has completed its own burst
    /// (spec §4.E "`send_children` broadcast ... skip non-burst-complete
    /// peers").
    pub fn send_children<F: FnMut(&Arc<Server>)>(&self, mut f: F) {
        for child in self.children.read().iter() {
            if *child.burst_complete.read() {
                f(child);
            }
        }
    }

    pub fn attach_user(&self, uid: &str) {
        self.users.write().insert(uid.to_string());
    }

    pub fn detach_user(&self, uid: &str) {
        self.users.write().remove(uid);
    }

    /// Post-order cascade: every descendant server (and its own users)
    /// quits before this server's own directly-attached users do (spec
    /// §4.E "quit cascade (recursive child-server quit then user
    /// quit)"). Returns the server SIDs in quit order and the full set
    /// of user UIDs that must also be quit. Fires `server_quit` for each
    /// server in that same order (descendants before this one).
    pub fn cascade_quit(&self, hooks: &HookRegistry) -> (Vec<String>, Vec<String>) {
        let mut servers = Vec::new();
        let mut users = Vec::new();
        self.collect_cascade(hooks, &mut servers, &mut users);
        (servers, users)
    }

    fn collect_cascade(&self, hooks: &HookRegistry, servers: &mut Vec<String>, users: &mut Vec<String>) {
        for child in self.children.read().iter() {
            child.collect_cascade(hooks, servers, users);
        }
        servers.push(self.sid.clone());
        let mut arg = self.sid.clone();
        hooks.server_quit.fire(&mut arg, true);
        users.extend(self.users.read().iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hop_distance_counts_walk_to_root() {
        let root = Server::new_root("001", "hub.example", "hub");
        let mid = Server::new_linked("002", "mid.example", "mid", &root);
        let leaf = Server::new_linked("003", "leaf.example", "leaf", &mid);

        assert_eq!(root.hop_distance(), 0);
        assert_eq!(mid.hop_distance(), 1);
        assert_eq!(leaf.hop_distance(), 2);
    }

    #[test]
    fn hop_distance_unreachable_without_root_link() {
        let orphan = Arc::new(Server {
            sid: "004".into(),
            name: "orphan.example".into(),
            description: RwLock::new("orphan".into()),
            parent: RwLock::new(Weak::new()),
            children: RwLock::new(Vec::new()),
            is_root: false,
            umodes: RwLock::new(ModeTable::new()),
            cmodes: RwLock::new(ModeTable::new()),
            i_sent_burst: RwLock::new(false),
            burst_complete: RwLock::new(false),
            users: RwLock::new(HashSet::new()),
        });
        assert_eq!(orphan.hop_distance(), -1);
    }

    #[test]
    fn mark_burst_sent_is_idempotent() {
        let root = Server::new_root("001", "hub.example", "hub");
        let mid = Server::new_linked("002", "mid.example", "mid", &root);
        let hooks = HookRegistry::new();
        assert!(mid.mark_burst_sent(&hooks));
        assert!(!mid.mark_burst_sent(&hooks));
    }

    #[test]
    fn send_children_skips_non_burst_complete_peers() {
        let root = Server::new_root("001", "hub.example", "hub");
        let done = Server::new_linked("002", "done.example", "done", &root);
        let pending = Server::new_linked("003", "pending.example", "pending", &root);
        done.mark_burst_complete();

        let mut seen = Vec::new();
        root.send_children(|child| seen.push(child.sid.clone()));
        assert_eq!(seen, vec!["002".to_string()]);
        let _ = &pending;
    }

    #[test]
    fn cascade_quit_orders_descendants_before_self() {
        let root = Server::new_root("001", "hub.example", "hub");
        let mid = Server::new_linked("002", "mid.example", "mid", &root);
        let leaf = Server::new_linked("003", "leaf.example", "leaf", &mid);
        leaf.attach_user("001LEAFUSR");
        mid.attach_user("001MIDUSR");

        let hooks = HookRegistry::new();
        let (servers, users) = mid.cascade_quit(&hooks);
        assert_eq!(servers, vec!["003".to_string(), "002".to_string()]);
        assert!(users.contains(&"001LEAFUSR".to_string()));
        assert!(users.contains(&"001MIDUSR".to_string()));
    }
}
