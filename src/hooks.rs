//! The generic extension-point contract (spec §9 "Dynamic command
//! dispatch", §6 "Notice channel").
//!
//! The core never hardcodes command semantics. Every named extension
//! point (`reg_nick`, `user_mode`, `can_message`/`can_<cmd>`, `cant_*`,
//! `can_receive_*`, `will_change_nick`, `change_nick`, `server_quit`,
//! `send_burst`, `command_<CMD>`, ...) is a named slot in a
//! [`HookRegistry`]: a handler list with well-defined iteration order and
//! stop/veto semantics, grounded in the teacher's
//! `handlers/core/registry.rs` name-keyed dispatch and
//! `handlers/helpers/fanout.rs` notice fan-out.

use std::collections::HashMap;
use std::sync::Arc;

use crate::numeric::Numeric;

/// Control-flow result of a single hook invocation.
#[derive(Clone, Debug)]
pub enum HookDecision {
    /// Let the next hook (or the default action) run.
    Continue,
    /// Stop further processing without telling the originator why.
    StopSilent,
    /// Stop further processing and report a numeric to the originator.
    StopWithReply(Numeric, Vec<String>),
}

impl HookDecision {
    pub fn is_stop(&self) -> bool {
        !matches!(self, HookDecision::Continue)
    }
}

/// A single named extension point: an ordered list of handlers sharing a
/// call signature `Fn(&mut T) -> HookDecision`. `force` bypasses vetoes
/// entirely (used for remote-originated changes per spec §4.D).
pub struct HookChain<T> {
    handlers: Vec<Arc<dyn Fn(&mut T) -> HookDecision + Send + Sync>>,
}

impl<T> Default for HookChain<T> {
    fn default() -> Self {
        Self { handlers: Vec::new() }
    }
}

impl<T> HookChain<T> {
    pub fn register<F>(&mut self, f: F)
    where
        F: Fn(&mut T) -> HookDecision + Send + Sync + 'static,
    {
        self.handlers.push(Arc::new(f));
    }

    /// Run every registered handler in registration order, stopping at the
    /// first non-`Continue` decision. With `force = true`, vetoes
    /// (`StopSilent`/`StopWithReply`) are ignored — the handlers still run
    /// (for their side effects) but the overall result is always
    /// `Continue`.
    pub fn fire(&self, arg: &mut T, force: bool) -> HookDecision {
        for h in &self.handlers {
            let decision = h(arg);
            if decision.is_stop() && !force {
                return decision;
            }
        }
        HookDecision::Continue
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Mutable text buffer handed to `can_message`/`can_receive` family hooks.
/// Source-side and target-side copies are distinct objects (spec §9
/// "Mutable message body shared between hooks"), so a flood-control hook
/// rewriting the sender's text never leaks into an ignore-list hook's view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutableText(pub String);

/// Argument passed to the `command_<CMD>` extension family (spec §4.C:
/// any pre-ready command the core doesn't know is delegated here).
#[derive(Clone, Debug)]
pub struct CommandExtArgs {
    pub command: String,
    pub params: Vec<String>,
    pub trailing: Option<String>,
}

/// Structured operator-visible notice (spec §6 "Notice channel").
/// `kind` is one of `connection_invalid`, `user_quit`, `user_opered`,
/// `user_mask_change`, `server_quit`, `user_saved`, etc. Sinks live
/// outside the core.
pub type NoticeSink = Arc<dyn Fn(&str, &[String]) + Send + Sync>;

/// All named extension points the core fires into, plus the dynamic
/// per-command registry and the notice sink list.
#[derive(Default)]
pub struct HookRegistry {
    pub reg_nick: HookChain<String>,
    pub reg_user: HookChain<(String, String)>,
    /// `user_mode` veto family: argument is the mode name being applied.
    pub user_mode: HookChain<String>,
    pub will_change_nick: HookChain<NickChangeArgs>,
    pub change_nick: HookChain<NickChangeArgs>,
    pub server_quit: HookChain<String>,
    pub send_burst: HookChain<String>,
    pub mask_changed: HookChain<String>,

    /// `command_<CMD>` registry: command name (already upper-cased) ->
    /// ordered handler list.
    command_ext: HashMap<String, HookChain<CommandExtArgs>>,

    notices: Vec<NoticeSink>,
}

#[derive(Clone, Debug)]
pub struct NickChangeArgs {
    pub old_nick: String,
    pub new_nick: String,
    pub old_time: i64,
    pub new_time: i64,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_notice_sink(&mut self, sink: NoticeSink) {
        self.notices.push(sink);
    }

    /// Fire a structured notice to every registered sink.
    pub fn notice(&self, kind: &str, args: &[String]) {
        for sink in &self.notices {
            sink(kind, args);
        }
    }

    /// Whether any `command_<CMD>` handler is registered for `command`.
    pub fn has_command_ext(&self, command: &str) -> bool {
        self.command_ext.contains_key(command)
    }

    pub fn command_ext_names(&self) -> Vec<String> {
        self.command_ext.keys().cloned().collect()
    }

    /// Register a handler under `command_<CMD>` (spec §4.C: "Anything else
    /// — delegated to a generic extension hook `command_<CMD>`").
    pub fn register_command_ext<F>(&mut self, command: &str, f: F)
    where
        F: Fn(&mut CommandExtArgs) -> HookDecision + Send + Sync + 'static,
    {
        self.command_ext.entry(command.to_ascii_uppercase()).or_default().register(f);
    }

    /// Fire the `command_<CMD>` chain for `command`, if any handler is
    /// registered. Returns `None` when nothing is registered for this
    /// command, so callers can distinguish "unhandled" from "handled and
    /// continued".
    pub fn fire_command_ext(&self, command: &str, args: &mut CommandExtArgs) -> Option<HookDecision> {
        self.command_ext.get(command).map(|chain| chain.fire(args, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_chain_stops_at_first_veto() {
        let mut chain: HookChain<i32> = HookChain::default();
        let log = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
        let log1 = log.clone();
        chain.register(move |n: &mut i32| {
            log1.lock().push(*n);
            HookDecision::StopWithReply(Numeric::ERR_NEEDMOREPARAMS, vec![])
        });
        let log2 = log.clone();
        chain.register(move |n: &mut i32| {
            log2.lock().push(*n * 100);
            HookDecision::Continue
        });

        let mut arg = 1;
        let decision = chain.fire(&mut arg, false);
        assert!(decision.is_stop());
        assert_eq!(*log.lock(), vec![1]); // second handler never ran
    }

    #[test]
    fn force_ignores_vetoes_but_still_runs_every_handler() {
        let mut chain: HookChain<i32> = HookChain::default();
        let log = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
        let log1 = log.clone();
        chain.register(move |n: &mut i32| {
            log1.lock().push(*n);
            HookDecision::StopSilent
        });
        let log2 = log.clone();
        chain.register(move |n: &mut i32| {
            log2.lock().push(*n);
            HookDecision::Continue
        });

        let mut arg = 7;
        let decision = chain.fire(&mut arg, true);
        assert!(!decision.is_stop());
        assert_eq!(*log.lock(), vec![7, 7]);
    }

    #[test]
    fn notice_sink_receives_structured_events() {
        let mut registry = HookRegistry::new();
        let received = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
        let r = received.clone();
        registry.register_notice_sink(Arc::new(move |kind, args| {
            r.lock().push((kind.to_string(), args.to_vec()));
        }));
        registry.notice("connection_invalid", &["bad password".to_string()]);
        assert_eq!(received.lock().len(), 1);
        assert_eq!(received.lock()[0].0, "connection_invalid");
    }
}
