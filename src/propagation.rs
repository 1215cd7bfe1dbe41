//! Capability-gated propagation helpers (spec §3 "capabilities", §4.D
//! supplemented scope): deciding what an observer's connection actually
//! receives once a user-mask change or other capability-filtered event
//! happens, grounded in the teacher's `handlers/oper/chghost.rs`
//! capability check and `handlers/helpers/fanout.rs` fan-out shape.
//!
//! This module only renders wire lines from already-decided facts (old/
//! new mask, channel membership); it does not itself walk the pool or
//! decide who observes whom — that's connection/channel plumbing outside
//! this crate's scope.

use std::collections::HashSet;

/// Whether an observer with capability set `caps` should receive an
/// event gated behind `cap` (e.g. `"away-notify"`, `"account-notify"`,
/// `"chghost"`). A thin wrapper so callers don't scatter `.contains()`
/// calls, and so the gate list has one place to grow.
pub fn cap_allows(caps: &HashSet<String>, cap: &str) -> bool {
    caps.contains(cap)
}

/// Render the lines a single observer should see for a change to a
/// user's username/visible host (CHGHOST's subject). Observers
/// advertising the `chghost` capability get one `CHGHOST` line;
/// everyone else gets the QUIT+JOIN(+MODE) emulation the capability
/// exists to let newer clients skip (spec §4.D "CHGHOST capability
/// fallback"). `channels_with_status` is this user's channel
/// memberships paired with the rendered status-mode string to restate
/// on rejoin (e.g. `("#general", "+o")`, or `""` for no status).
pub fn mask_change_lines(
    nick: &str,
    old_user: &str,
    old_host: &str,
    new_user: &str,
    new_host: &str,
    channels_with_status: &[(String, String)],
    observer_caps: &HashSet<String>,
) -> Vec<String> {
    let old_prefix = format!("{nick}!{old_user}@{old_host}");

    if cap_allows(observer_caps, "chghost") {
        return vec![format!(":{old_prefix} CHGHOST {new_user} {new_host}")];
    }

    let new_prefix = format!("{nick}!{new_user}@{new_host}");
    let mut lines = vec![format!(":{old_prefix} QUIT :Changing host")];
    for (channel, status) in channels_with_status {
        lines.push(format!(":{new_prefix} JOIN {channel}"));
        if !status.is_empty() {
            lines.push(format!(":{nick} MODE {channel} {status} {nick}"));
        }
    }
    lines
}
