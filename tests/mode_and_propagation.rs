//! Mode translation and capability-filtered propagation scenarios
//! (spec §8 end-to-end cases), exercised at the crate's public API
//! rather than over a socket — these are pure state transitions with no
//! wire framing beyond what `src/mode/` already tests at the unit level.

use meshlink_ircd::mode::{
    convert_umode_string, parse_mode_changes, render_mode_changes, strings_from_cmodes,
    ModeChange, ModeKind, ModeParam, ModeTable, Sign,
};
use meshlink_ircd::{cap_allows, mask_change_lines};
use std::collections::HashSet;

fn hub_umodes() -> ModeTable {
    let mut t = ModeTable::new();
    t.insert('i', "invisible", ModeKind::Flag);
    t.insert('w', "wallops", ModeKind::Flag);
    t.insert('o', "ircop", ModeKind::Flag);
    t.insert('x', "cloak", ModeKind::Flag);
    t
}

fn leaf_umodes() -> ModeTable {
    // leaf.example doesn't support cloaking and uses 'W' for wallops
    let mut t = ModeTable::new();
    t.insert('i', "invisible", ModeKind::Flag);
    t.insert('W', "wallops", ModeKind::Flag);
    t.insert('o', "ircop", ModeKind::Flag);
    t
}

#[test]
fn umode_translation_drops_unsupported_and_remaps_letters_across_a_link() {
    let from = hub_umodes();
    let to = leaf_umodes();

    // a user on the hub is +iwox; the leaf doesn't know cloak at all and
    // spells wallops differently
    let translated = convert_umode_string(&from, &to, "+iwox");
    assert_eq!(translated, "+iWo");
}

#[test]
fn cmode_split_broadcast_spills_across_lines_at_the_configured_limit() {
    let mut table = ModeTable::new();
    table.insert('b', "ban", ModeKind::List);

    let masks = ["a!*@*", "b!*@*", "c!*@*", "d!*@*"];
    let changes: Vec<ModeChange> = masks
        .iter()
        .map(|m| ModeChange::new(Sign::Plus, "ban", Some(ModeParam::Raw(m.to_string()))))
        .collect();

    // max 3 ban entries per line -> four masks split into two lines
    let lines = strings_from_cmodes(&table, &changes, false, true, true, false, 3);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].0, "+bbb");
    assert_eq!(lines[0].1, vec!["a!*@*".to_string(), "b!*@*".to_string(), "c!*@*".to_string()]);
    assert_eq!(lines[1].0, "+b");
    assert_eq!(lines[1].1, vec!["d!*@*".to_string()]);
}

#[test]
fn parse_then_render_round_trips_a_mixed_sign_mode_string() {
    let mut table = ModeTable::new();
    table.insert('n', "noexternal", ModeKind::Flag);
    table.insert('t', "topiclock", ModeKind::Flag);
    table.insert('l', "limit", ModeKind::ParamOnSet);

    let original = "+nt-l";
    let params = vec![]; // unsetting limit takes no param
    let changes = parse_mode_changes(&table, original, &params);
    let (rendered, rendered_params) = render_mode_changes(&table, &changes, false);
    assert_eq!(rendered, original);
    assert!(rendered_params.is_empty());
}

#[test]
fn chghost_capability_gates_the_rejoin_emulation() {
    let capable: HashSet<String> = ["chghost".to_string()].into_iter().collect();
    let incapable: HashSet<String> = HashSet::new();

    assert!(cap_allows(&capable, "chghost"));
    assert!(!cap_allows(&incapable, "chghost"));

    let single_line = mask_change_lines(
        "alice",
        "alice",
        "masked-1.example",
        "alice",
        "masked-2.example",
        &[("#general".to_string(), "+o".to_string())],
        &capable,
    );
    assert_eq!(single_line.len(), 1);
    assert!(single_line[0].contains("CHGHOST"));

    let emulated = mask_change_lines(
        "alice",
        "alice",
        "masked-1.example",
        "alice",
        "masked-2.example",
        &[("#general".to_string(), "+o".to_string())],
        &incapable,
    );
    assert_eq!(emulated.len(), 3);
    assert!(emulated[0].contains("QUIT"));
    assert!(emulated[1].contains("JOIN"));
    assert!(emulated[2].contains("MODE"));
}
