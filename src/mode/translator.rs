//! Translating mode strings between two servers' letter tables (spec
//! §4.F `convert_umode_string`, `convert_cmode_string`). Two servers
//! linked in the same network may assign the same logical mode to
//! different letters (or not support it at all); this is the bridge.

use super::parse::{parse_mode_changes, render_mode_changes};
use super::types::{ModeParam, ModeTable};

/// Translate a user-mode string (no parameters) from `from`'s letters to
/// `to`'s letters. Modes `from` knows but `to` doesn't are dropped —
/// there is no parameter alignment to preserve for umodes.
pub fn convert_umode_string(from: &ModeTable, to: &ModeTable, mode_str: &str) -> String {
    let changes = parse_mode_changes(from, mode_str, &[]);
    let translatable: Vec<_> = changes.into_iter().filter(|c| to.contains_name(&c.name)).collect();
    let (s, _params) = render_mode_changes(to, &translatable, false);
    s
}

/// Translate a channel-mode string plus its already-resolved parameters
/// from `from`'s letters/semantics to `to`'s.
///
/// `over_protocol` selects UID/SID vs nickname/servername stringification
/// for any status or list parameter. `skip_status` drops status-mode
/// entries (`+o`/`+v`-shaped) from the output while still consuming their
/// parameter from the input stream, for callers that propagate status
/// changes through a separate channel.
pub fn convert_cmode_string(
    from: &ModeTable,
    to: &ModeTable,
    mode_str: &str,
    params: &[ModeParam],
    over_protocol: bool,
    skip_status: bool,
) -> (String, Vec<String>) {
    let changes = parse_mode_changes(from, mode_str, params);
    let translatable: Vec<_> = changes
        .into_iter()
        .filter(|c| to.contains_name(&c.name))
        .filter(|c| {
            if skip_status {
                to.kind_of_name(&c.name) != Some(super::types::ModeKind::Status)
            } else {
                true
            }
        })
        .collect();
    render_mode_changes(to, &translatable, over_protocol)
}
