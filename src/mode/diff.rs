//! Computing the minimal mode transition between two applied-mode
//! snapshots (spec §4.F `cmode_string_difference`).

use super::parse::render_mode_changes;
use super::types::{ModeChange, ModeKind, ModeParam, ModeTable, Sign};

/// One currently-applied mode: a name and, for param-carrying kinds, its
/// parameter. List-kind modes may appear multiple times with distinct
/// parameters (e.g. several separate bans). Entries compare as opaque
/// `(name, param)` pairs (spec §4.F: "parameterised modes compare by
/// `(letter, param)` pairs independently").
pub type CmodeState = Vec<(String, Option<ModeParam>)>;

/// Compute the transition taking `old` to `new`, rendered as a
/// `(mode_str, params)` pair. Modes present in `new` but not `old` are
/// emitted after `+`; modes present in `old` but not `new` are emitted
/// after `-`, unless `remove_none` is set, in which case no removals are
/// emitted at all. If `combine_lists` is set, list-type modes (spec
/// glossary "List mode") are never removed even when absent from `new`.
///
/// Returns `("+", [])` when there is no difference (spec §8 round-trip
/// law `cmode_string_difference(x, x, _, _) = "+"`).
pub fn cmode_string_difference(
    table: &ModeTable,
    old: &CmodeState,
    new: &CmodeState,
    combine_lists: bool,
    remove_none: bool,
) -> (String, Vec<String>) {
    let mut out = Vec::new();

    for (name, param) in new {
        if !old.iter().any(|(n, p)| n == name && p == param) {
            out.push(ModeChange::new(Sign::Plus, name.clone(), param.clone()));
        }
    }

    if !remove_none {
        for (name, param) in old {
            if new.iter().any(|(n, p)| n == name && p == param) {
                continue;
            }
            if combine_lists && table.kind_of_name(name) == Some(ModeKind::List) {
                continue;
            }
            out.push(ModeChange::new(Sign::Minus, name.clone(), param.clone()));
        }
    }

    if out.is_empty() {
        return ("+".to_string(), Vec::new());
    }
    render_mode_changes(table, &out, false)
}
