//! The user entity (spec §3 "User", §4.D "User entity").
//!
//! Grounded in the teacher's `state/user.rs::User`/`UserModes`, stripped
//! of CRDT merge machinery (this spec has one authoritative in-memory
//! index, not a convergent multi-writer store — see DESIGN.md) and
//! generalized from a fixed-field `UserModes` struct to a per-server
//! [`ModeTable`]-driven letter set, since umode letters aren't assumed
//! uniform across linked servers.

use std::collections::HashSet;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::hooks::{HookDecision, HookRegistry, MutableText, NickChangeArgs};
use crate::mode::{ModeKind, ModeTable};
use crate::numeric::Numeric;
use crate::server::Server;

/// Where a user's connection actually lives: a local session (with an
/// outbound queue) or a remote server hop distance away (spec §3
/// "location").
#[derive(Clone)]
pub enum Location {
    Local(tokio::sync::mpsc::Sender<String>),
    Remote,
}

pub struct User {
    pub uid: String,
    pub nick: RwLock<String>,
    pub user: String,
    pub host: String,
    pub visible_host: RwLock<String>,
    pub realname: RwLock<String>,
    pub ip: String,

    /// The server this user is attached to (weak: a server never keeps
    /// its users alive past its own lifetime, spec §9 "cyclic references
    /// resolved with weak backreferences").
    pub server: Weak<Server>,
    pub location: RwLock<Location>,

    /// Currently-set umode names (resolved against `server`'s umode
    /// table elsewhere; stored as names, not letters, so translation
    /// across servers never needs to round-trip through a wire string).
    pub modes: RwLock<HashSet<String>>,
    pub snomasks: RwLock<HashSet<char>>,
    pub oper_type: RwLock<Option<String>>,

    pub away: RwLock<Option<String>>,
    /// Bound services account name, if any (spec §3 "account (optional
    /// name)", §4.D account binding/logout + `ACCOUNT` propagation).
    pub account: RwLock<Option<String>>,
    pub caps: RwLock<HashSet<String>>,
    pub channels: RwLock<HashSet<String>>,

    /// Monotonic "how long has this user held this nick" clock, used to
    /// resolve nick collisions during linking (spec §4.D "save" uses
    /// `nick_time = 100` to always win).
    pub nick_time: RwLock<i64>,
    pub created_at: i64,

    /// Set once the welcome burst has been sent; guards against sending
    /// it twice (spec §4.D "welcome sequence ... `init_complete`").
    pub init_complete: RwLock<bool>,
}

pub struct NewUser {
    pub uid: String,
    pub nick: String,
    pub user: String,
    pub host: String,
    pub visible_host: String,
    pub realname: String,
    pub ip: String,
    pub server: Weak<Server>,
    pub location: Location,
    pub created_at: i64,
}

impl User {
    pub fn new(p: NewUser) -> Self {
        Self {
            uid: p.uid,
            nick: RwLock::new(p.nick),
            user: p.user,
            host: p.host,
            visible_host: RwLock::new(p.visible_host),
            realname: RwLock::new(p.realname),
            ip: p.ip,
            server: p.server,
            location: RwLock::new(p.location),
            modes: RwLock::new(HashSet::new()),
            snomasks: RwLock::new(HashSet::new()),
            oper_type: RwLock::new(None),
            away: RwLock::new(None),
            account: RwLock::new(None),
            caps: RwLock::new(HashSet::new()),
            channels: RwLock::new(HashSet::new()),
            nick_time: RwLock::new(p.created_at),
            created_at: p.created_at,
            init_complete: RwLock::new(false),
        }
    }

    pub fn nick(&self) -> String {
        self.nick.read().clone()
    }

    pub fn is_away(&self) -> bool {
        self.away.read().is_some()
    }

    pub fn is_oper(&self) -> bool {
        self.modes.read().contains("ircop")
    }

    pub fn is_local(&self) -> bool {
        matches!(*self.location.read(), Location::Local(_))
    }

    /// Idempotent mode set (spec §4.D "set_mode/unset_mode (idempotent)").
    /// Returns whether this call actually changed anything, so callers
    /// only propagate real transitions.
    pub fn set_mode(&self, name: &str) -> bool {
        self.modes.write().insert(name.to_string())
    }

    pub fn unset_mode(&self, name: &str) -> bool {
        self.modes.write().remove(name)
    }

    pub fn has_mode(&self, name: &str) -> bool {
        self.modes.read().contains(name)
    }

    /// Apply a umode change string against this user, using `table` to
    /// resolve letters to names, collapsing it to canonical form as it
    /// goes (spec §4.D "canonical collapsing, no adjacent duplicate
    /// signs, no trailing bare sign").
    ///
    /// `force` bypasses the `user_mode` veto hook family (remote-
    /// originated changes never get vetoed locally, spec §4.D).
    pub fn handle_mode_string(
        &self,
        table: &ModeTable,
        hooks: &HookRegistry,
        mode_str: &str,
        force: bool,
    ) -> String {
        let mut applied = Vec::new();
        let mut sign = crate::mode::Sign::Plus;

        for ch in mode_str.chars() {
            match ch {
                '+' => sign = crate::mode::Sign::Plus,
                '-' => sign = crate::mode::Sign::Minus,
                letter => {
                    let Some(kind) = table.kind_of_letter(letter) else { continue };
                    if kind != ModeKind::Flag {
                        // umodes in this model never carry parameters.
                        continue;
                    }
                    let Some(name) = table.name_of(letter).map(str::to_string) else { continue };

                    let mut arg = name.clone();
                    let decision = hooks.user_mode.fire(&mut arg, force);
                    if decision.is_stop() {
                        continue;
                    }

                    let changed = match sign {
                        crate::mode::Sign::Plus => self.set_mode(&name),
                        crate::mode::Sign::Minus => self.unset_mode(&name),
                    };
                    if !changed {
                        continue;
                    }

                    if name == "ircop" && sign == crate::mode::Sign::Minus {
                        *self.oper_type.write() = None;
                    }

                    applied.push((sign, letter));
                }
            }
        }

        canonicalize_sign_runs(&applied)
    }

    /// Oper flag check with an `all` wildcard (spec §4.D "oper flags with
    /// `all` wildcard").
    pub fn has_oper_flag(&self, flag: &str, flags: &HashSet<String>) -> bool {
        self.is_oper() && (flags.contains("all") || flags.contains(flag))
    }

    /// Promote to operator: sets `ircop`, idempotently, and records the
    /// oper type (spec §4.D "auto `ircop` mode toggling").
    pub fn grant_oper(&self, oper_type: &str) {
        self.set_mode("ircop");
        *self.oper_type.write() = Some(oper_type.to_string());
    }

    /// Run the welcome sequence for a newly-promoted local user (spec
    /// §4.D "Welcome"): apply configured automatic modes, set `ssl` if
    /// the connection is TLS, build the 001-005 (+ optional 042) numeric
    /// burst and the user's own opening MODE line, and mark
    /// `init_complete`. Idempotent: a user that's already been welcomed
    /// gets an empty burst back rather than a second one (spec §4.D "No
    /// further mode or mask-change notifications are sent to the user
    /// before `init_complete`" implies welcome itself never repeats).
    ///
    /// Broadcasting the new user to peers and dispatching synthetic
    /// LUSERS/MOTD are the caller's concern, same as every other
    /// cross-entity fan-out in this crate.
    pub fn welcome(&self, table: &ModeTable, params: WelcomeParams) -> WelcomeBurst {
        if *self.init_complete.read() {
            return WelcomeBurst { numerics: Vec::new(), mode_string: String::new() };
        }

        for name in params.auto_modes {
            self.set_mode(name);
        }
        if params.tls {
            self.set_mode("ssl");
        }

        let nick = self.nick();
        let mut numerics = vec![
            (Numeric::RPL_WELCOME, vec![nick.clone(), format!("Welcome to the network, {}", nick)]),
            (
                Numeric::RPL_YOURHOST,
                vec![nick.clone(), format!("Your host is {}, running version {}", params.server_name, params.version)],
            ),
            (Numeric::RPL_CREATED, vec![nick.clone(), format!("This server was created {}", params.created)]),
            (
                Numeric::RPL_MYINFO,
                vec![
                    nick.clone(),
                    params.server_name.to_string(),
                    params.version.to_string(),
                    params.user_modes.to_string(),
                    params.chan_modes.to_string(),
                ],
            ),
        ];
        for line in params.isupport {
            let mut args = vec![nick.clone()];
            args.extend(line.iter().cloned());
            args.push("are supported by this server".to_string());
            numerics.push((Numeric::RPL_ISUPPORT, args));
        }
        if let Some(yourid) = params.yourid {
            numerics.push((Numeric::RPL_YOURID, vec![nick.clone(), yourid.to_string(), "your unique ID".to_string()]));
        }

        let cloaked = *self.visible_host.read() != self.host;
        if cloaked {
            numerics.push((
                Numeric::RPL_HOSTHIDDEN,
                vec![nick.clone(), self.visible_host.read().clone(), "is now your hidden host".to_string()],
            ));
        }

        let mut letters: Vec<char> = self
            .modes
            .read()
            .iter()
            .filter_map(|name| table.letter_of(name))
            .collect();
        letters.sort_unstable();
        let mode_string = if letters.is_empty() {
            String::new()
        } else {
            std::iter::once('+').chain(letters).collect()
        };

        *self.init_complete.write() = true;
        WelcomeBurst { numerics, mode_string }
    }

    /// Attempt a nick change, pool-first so a collision aborts before
    /// any local state mutates (spec §4.D "change_nick (pool-first,
    /// abort-on-collision)"). The pool registration itself happens in
    /// the caller (it owns the uniqueness index); this only updates the
    /// user's own fields once the caller has confirmed no collision, then
    /// fires `will_change_nick` followed by `change_nick` with the old and
    /// new nick/time pairs (spec §4.D).
    pub fn apply_nick_change(&self, hooks: &HookRegistry, new_nick: &str, now: i64) {
        let old_nick = self.nick();
        let old_time = *self.nick_time.read();
        *self.nick.write() = new_nick.to_string();
        *self.nick_time.write() = now;

        let mut args = NickChangeArgs {
            old_nick,
            new_nick: new_nick.to_string(),
            old_time,
            new_time: now,
        };
        hooks.will_change_nick.fire(&mut args, true);
        hooks.change_nick.fire(&mut args, true);
    }

    /// Force this user's recorded nick-claim time to the maximum so it
    /// always wins a collision comparison (spec §4.D "save using
    /// nick_time = 100").
    pub fn save(&self) {
        *self.nick_time.write() = 100;
    }

    pub fn set_away(&self, message: Option<String>) {
        *self.away.write() = message;
    }

    /// Bind a services account name (spec §4.D account binding).
    pub fn login(&self, account: impl Into<String>) {
        *self.account.write() = Some(account.into());
    }

    /// Unbind any services account (spec §4.D "logout unbinds the account
    /// and propagates ACCOUNT to account-notify peers" — the propagation
    /// itself is the caller's concern, same as every other fan-out here).
    pub fn logout(&self) {
        *self.account.write() = None;
    }

    /// Channels to leave when this user disconnects (spec §4.D
    /// "part-all"). Draining clears the user's own set; the caller is
    /// responsible for telling each channel's membership to drop this
    /// user.
    pub fn part_all(&self) -> Vec<String> {
        self.channels.write().drain().collect()
    }

    /// Route a PRIVMSG/NOTICE from this user to `target` (spec §4.D
    /// "do_privmsgnotice", "the spec's most delicate routing point"):
    ///
    /// 1. For PRIVMSG, send the away numeric unconditionally first (a
    ///    sender still learns the target is away even if delivery is
    ///    later vetoed or forwarded).
    /// 2. Run the source-side `can_message`/`can_<cmd>` veto family on
    ///    mutable text, skippable via `opts.force` (spec: "lossless
    ///    forwarding of remote-originated messages").
    /// 3. If the target is local, run `can_receive_<cmd>` on a *copy* of
    ///    the text; if stopped, silently drop (no `cant_*` fallback on
    ///    this side — that fallback is only described for step 2).
    /// 4. If the target is remote and `!opts.dont_forward`, forward the
    ///    text to `target.location` as-is.
    pub fn do_privmsgnotice(
        &self,
        hooks: &HookRegistry,
        command: &str,
        target: &User,
        text: &str,
        opts: PrivmsgOpts,
    ) -> PrivmsgResult {
        let away = if command.eq_ignore_ascii_case("PRIVMSG") { target.away.read().clone() } else { None };

        let mut source_text = MutableText(text.to_string());
        let can_cmd = format!("can_{}", command.to_ascii_lowercase());
        if !opts.force && hooks.has_command_ext(&can_cmd) {
            let mut ext_args = crate::hooks::CommandExtArgs {
                command: can_cmd.clone(),
                params: vec![source_text.0.clone()],
                trailing: None,
            };
            if let Some(decision) = hooks.fire_command_ext(&can_cmd, &mut ext_args) {
                if decision.is_stop() {
                    return PrivmsgResult { away, outcome: self.reject_or_silence(hooks, command, &ext_args.params, decision) };
                }
                if let Some(rewritten) = ext_args.params.into_iter().next() {
                    source_text = MutableText(rewritten);
                }
            }
        }

        if target.is_local() {
            let mut recv_text = MutableText(source_text.0.clone());
            let can_receive = format!("can_receive_{}", command.to_ascii_lowercase());
            if hooks.has_command_ext(&can_receive) {
                let mut ext_args = crate::hooks::CommandExtArgs {
                    command: can_receive.clone(),
                    params: vec![recv_text.0.clone()],
                    trailing: None,
                };
                if let Some(decision) = hooks.fire_command_ext(&can_receive, &mut ext_args) {
                    if decision.is_stop() {
                        return PrivmsgResult { away, outcome: PrivmsgOutcome::Silent };
                    }
                    if let Some(rewritten) = ext_args.params.into_iter().next() {
                        recv_text = MutableText(rewritten);
                    }
                }
            }
            return PrivmsgResult { away, outcome: PrivmsgOutcome::Delivered(recv_text.0) };
        }

        if opts.dont_forward {
            return PrivmsgResult { away, outcome: PrivmsgOutcome::Silent };
        }
        PrivmsgResult { away, outcome: PrivmsgOutcome::Forward(source_text.0) }
    }

    /// A `can_*`/`can_receive_*` hook vetoed the event. Fire the matching
    /// `cant_*` family for its side effects (e.g. a flood-control handler
    /// logging the block); only surface the original veto's numeric if
    /// that fallback chain itself doesn't also stop the event (spec §4.D
    /// "cant_* fallback, error_reply-on-can-event").
    fn reject_or_silence(
        &self,
        hooks: &HookRegistry,
        command: &str,
        text_params: &[String],
        decision: HookDecision,
    ) -> PrivmsgOutcome {
        let cant_cmd = format!("cant_{}", command.to_ascii_lowercase());
        let mut cant_args = crate::hooks::CommandExtArgs {
            command: cant_cmd.clone(),
            params: text_params.to_vec(),
            trailing: None,
        };
        let cant_stopped = hooks
            .fire_command_ext(&cant_cmd, &mut cant_args)
            .map(|d| d.is_stop())
            .unwrap_or(false);

        if !cant_stopped {
            if let HookDecision::StopWithReply(numeric, args) = decision {
                return PrivmsgOutcome::Rejected(numeric, args);
            }
        }
        PrivmsgOutcome::Silent
    }
}

/// Controls for [`User::do_privmsgnotice`]'s veto/forward behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrivmsgOpts {
    /// Skip the source-side `can_<cmd>` veto family (spec §4.D: remote-
    /// originated receipt is delivered losslessly, never vetoed locally).
    pub force: bool,
    /// Never forward to a remote target even if that's otherwise the
    /// routing decision (e.g. the caller is already handling forwarding
    /// itself).
    pub dont_forward: bool,
}

/// The away numeric (if any) is independent of the delivery outcome —
/// a sender can learn the target is away even when the message itself
/// is later vetoed, silently dropped, or forwarded onward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivmsgResult {
    pub away: Option<String>,
    pub outcome: PrivmsgOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivmsgOutcome {
    Delivered(String),
    /// Target is remote: forward this text to `target.location`.
    Forward(String),
    Silent,
    Rejected(Numeric, Vec<String>),
}

/// Inputs to [`User::welcome`] that come from outside this entity
/// (server identity, configured ISUPPORT tokens, auto-modes).
pub struct WelcomeParams<'a> {
    pub server_name: &'a str,
    pub version: &'a str,
    pub created: &'a str,
    pub user_modes: &'a str,
    pub chan_modes: &'a str,
    /// Pre-split RPL_ISUPPORT token groups, one line each.
    pub isupport: &'a [Vec<String>],
    pub auto_modes: &'a [String],
    pub tls: bool,
    pub yourid: Option<&'a str>,
}

/// Numeric burst plus opening MODE line produced by [`User::welcome`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WelcomeBurst {
    pub numerics: Vec<(Numeric, Vec<String>)>,
    pub mode_string: String,
}

/// Collapse a list of `(sign, letter)` pairs into a canonical string with
/// no adjacent duplicate sign characters and no trailing bare sign.
fn canonicalize_sign_runs(applied: &[(crate::mode::Sign, char)]) -> String {
    let mut out = String::new();
    let mut last_sign = None;
    for (sign, letter) in applied {
        if last_sign != Some(*sign) {
            out.push(sign.as_char());
            last_sign = Some(*sign);
        }
        out.push(*letter);
    }
    out
}
