//! Connection registration state machine (spec §3 "Connection", §4.C).
//!
//! Grounded in the teacher's `network/connection/handshake.rs` pre-
//! registration loop, collapsed into an explicit state machine rather
//! than a bespoke loop-with-flags, since the spec names the states
//! directly (`Fresh`/`Accumulating`/`Ready`/`GoodBye`).

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::ConfigLookup;
use crate::error::{CloseReason, RegistrationError};
use crate::hooks::{CommandExtArgs, HookRegistry};
use crate::numeric::Numeric;
use crate::security;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnState {
    /// Just accepted; nothing received yet.
    Fresh,
    /// NICK and/or USER (or PASS/SERVER) seen, still waiting on the rest.
    Accumulating,
    /// Registration complete; a User or Server entity has been created.
    Ready,
    /// Torn down (possibly only partially — `done()` is idempotent).
    GoodBye,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Promotion {
    User,
    Server,
}

struct Inner {
    state: ConnState,
    /// Starts at 2 (NICK + USER); SERVER registration counts down from 1
    /// once a valid PASS has been seen (spec §4.C "`wait` counter
    /// starting at 2").
    wait: i32,
    nick: Option<String>,
    user: Option<(String, String)>, // (username, realname)
    pass: Option<String>,
    server_name: Option<String>,
    server_sid: Option<String>,
    server_desc: Option<String>,
    promotion: Option<Promotion>,
    done: bool,
    /// The remote IP this socket is connected to, used to cross-check
    /// against the connect block's configured `address` (spec §4.C).
    peer_ip: String,
    /// For outgoing links, the server name we dialed expecting to reach;
    /// a `SERVER` announcing a different name closes with
    /// `UnexpectedServer` (spec §4.C "want" mismatch).
    expected_peer: Option<String>,
}

/// One not-yet-fully-registered (or freshly torn down) connection.
pub struct Connection {
    pub id: u64,
    inner: Mutex<Inner>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Keep waiting for more pre-registration commands.
    Continue,
    /// Send this numeric reply to the peer; the connection stays open
    /// (spec §7.1 "protocol errors ... connection remains open" — missing
    /// parameters and nickname validation failures during registration).
    Reply(Numeric, Vec<String>),
    /// Registration completed; hand off to the pool as a User or Server.
    Promote(Promotion),
    /// Close the connection with this reason.
    Close(CloseReason),
    /// Command wasn't one of the pre-ready set and no `command_<CMD>`
    /// hook claimed it either.
    Unhandled,
}

impl Connection {
    pub fn new(id: u64) -> Self {
        Self::new_for_peer(id, String::new(), None)
    }

    /// Construct a connection that knows the peer IP it's talking to and,
    /// for outgoing links, the server name it expects to reach.
    pub fn new_for_peer(id: u64, peer_ip: String, expected_peer: Option<String>) -> Self {
        Self {
            id,
            inner: Mutex::new(Inner {
                state: ConnState::Fresh,
                wait: 2,
                nick: None,
                user: None,
                pass: None,
                server_name: None,
                server_sid: None,
                server_desc: None,
                promotion: None,
                done: false,
                peer_ip,
                expected_peer,
            }),
        }
    }

    pub fn state(&self) -> ConnState {
        self.inner.lock().state
    }

    /// Dispatch one pre-registration command. Commands outside the
    /// fixed NICK/USER/SERVER/PASS/QUIT/ERROR set fall through to the
    /// `command_<CMD>` extension hook (spec §4.C).
    pub fn dispatch(
        &self,
        hooks: &HookRegistry,
        config: &dyn ConfigLookup,
        command: &str,
        params: &[String],
    ) -> Dispatch {
        let mut inner = self.inner.lock();
        if inner.state == ConnState::GoodBye {
            return Dispatch::Close(CloseReason::Transport("already closed".into()));
        }
        if inner.state == ConnState::Fresh {
            inner.state = ConnState::Accumulating;
        }

        match command.to_ascii_uppercase().as_str() {
            "NICK" => {
                let Some(nick) = params.first() else {
                    return Dispatch::Reply(Numeric::ERR_NEEDMOREPARAMS, vec!["NICK".to_string()]);
                };
                if nick.is_empty() || nick.starts_with(['#', ':', '&']) {
                    return Dispatch::Reply(Numeric::ERR_ERRONEUSNICKNAME, vec![nick.clone()]);
                }
                if inner.nick.is_none() {
                    inner.wait -= 1;
                }
                inner.nick = Some(nick.clone());
                let mut reg_arg = nick.clone();
                hooks.reg_nick.fire(&mut reg_arg, false);
                self.maybe_promote(&mut inner)
            }
            "USER" => {
                if params.len() < 4 {
                    return Dispatch::Reply(Numeric::ERR_NEEDMOREPARAMS, vec!["USER".to_string()]);
                }
                if inner.user.is_none() {
                    inner.wait -= 1;
                }
                inner.user = Some((params[0].clone(), params[3].clone()));
                let mut reg_arg = (params[0].clone(), params[3].clone());
                hooks.reg_user.fire(&mut reg_arg, false);
                self.maybe_promote(&mut inner)
            }
            "PASS" => {
                let Some(pass) = params.first() else {
                    return Dispatch::Reply(Numeric::ERR_NEEDMOREPARAMS, vec!["PASS".to_string()]);
                };
                inner.pass = Some(pass.clone());
                Dispatch::Continue
            }
            "SERVER" => {
                // SID name proto ircd :description...
                if params.len() < 5 {
                    return Dispatch::Reply(Numeric::ERR_NEEDMOREPARAMS, vec!["SERVER".to_string()]);
                }
                let sid = params[0].clone();
                let name = params[1].clone();
                let desc = params[4..].join(" ");

                if let Some(want) = inner.expected_peer.clone() {
                    if !meshlink_proto::irc_eq(&want, &name) {
                        return Dispatch::Close(CloseReason::Registration(RegistrationError::UnexpectedServer));
                    }
                }

                if !config.has_connect_block(&name) {
                    return Dispatch::Close(CloseReason::Registration(RegistrationError::InvalidCredentials));
                }

                if let Some(expected_addr) = config.conn(&name, "address") {
                    if !inner.peer_ip.is_empty() && expected_addr != inner.peer_ip {
                        return Dispatch::Close(CloseReason::Registration(RegistrationError::InvalidCredentials));
                    }
                }

                let algorithm = config.conn(&name, "encryption").unwrap_or_else(|| "sha256".to_string());
                let expected = config.conn(&name, "receive_password").unwrap_or_default();
                let supplied = inner.pass.clone().unwrap_or_default();
                if security::digest(&algorithm, &supplied) != expected {
                    return Dispatch::Close(CloseReason::Registration(RegistrationError::InvalidCredentials));
                }

                inner.server_sid = Some(sid);
                inner.server_name = Some(name);
                inner.server_desc = Some(desc);
                inner.wait = 0;
                self.maybe_promote(&mut inner)
            }
            "QUIT" => {
                let reason = params.first().cloned();
                inner.state = ConnState::GoodBye;
                Dispatch::Close(CloseReason::SelfQuit(reason))
            }
            "ERROR" => {
                let reason = params.first().cloned().unwrap_or_default();
                inner.state = ConnState::GoodBye;
                Dispatch::Close(CloseReason::Error(reason))
            }
            other => {
                drop(inner);
                let mut ext = CommandExtArgs {
                    command: other.to_string(),
                    params: params.to_vec(),
                    trailing: None,
                };
                match hooks.fire_command_ext(other, &mut ext) {
                    Some(decision) if decision.is_stop() => {
                        if let crate::hooks::HookDecision::StopWithReply(numeric, args) = decision {
                            let _ = (numeric, args); // caller renders the reply to the client
                        }
                        Dispatch::Continue
                    }
                    Some(_) => Dispatch::Continue,
                    None => Dispatch::Unhandled,
                }
            }
        }
    }

    fn maybe_promote(&self, inner: &mut Inner) -> Dispatch {
        if let Some(name) = &inner.server_name {
            if inner.wait <= 0 {
                let name = name.clone();
                inner.state = ConnState::Ready;
                inner.promotion = Some(Promotion::Server);
                let _ = name;
                return Dispatch::Promote(Promotion::Server);
            }
            return Dispatch::Continue;
        }
        if inner.wait <= 0 && inner.nick.is_some() && inner.user.is_some() {
            inner.state = ConnState::Ready;
            inner.promotion = Some(Promotion::User);
            return Dispatch::Promote(Promotion::User);
        }
        Dispatch::Continue
    }

    pub fn pending_nick(&self) -> Option<String> {
        self.inner.lock().nick.clone()
    }

    pub fn pending_user(&self) -> Option<(String, String)> {
        self.inner.lock().user.clone()
    }

    pub fn pending_pass(&self) -> Option<String> {
        self.inner.lock().pass.clone()
    }

    pub fn pending_server_name(&self) -> Option<String> {
        self.inner.lock().server_name.clone()
    }

    pub fn pending_server_sid(&self) -> Option<String> {
        self.inner.lock().server_sid.clone()
    }

    pub fn pending_server_desc(&self) -> Option<String> {
        self.inner.lock().server_desc.clone()
    }

    /// Idempotent teardown: the first call records the reason and
    /// reports `true`; subsequent calls are no-ops reporting `false`
    /// (spec §4.C "`done(reason, silent?)` idempotent teardown").
    pub fn done(&self, _reason: &CloseReason, _silent: bool) -> bool {
        let mut inner = self.inner.lock();
        if inner.done {
            return false;
        }
        inner.done = true;
        inner.state = ConnState::GoodBye;
        true
    }
}

pub type SharedConnection = Arc<Connection>;
