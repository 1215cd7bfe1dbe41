//! Splitting a run of mode changes into one or more wire-ready
//! `(mode_str, params)` lines (spec §4.F `strings_from_cmodes`).

use super::types::{ModeChange, ModeTable, Sign};

/// Render `changes` into wire lines.
///
/// `organize` stably groups all `+` entries before all `-` entries,
/// minimizing sign-character switches within a line. `split` allows
/// spilling onto multiple lines once `max_per_line` letters have been
/// emitted on the current line (each continuation restates the sign of
/// its first entry); with `split = false` everything goes on one line
/// regardless of length. `skip_checks` bypasses the "does this server's
/// table know this mode" filter — used when replaying modes verbatim
/// during a burst.
pub fn strings_from_cmodes(
    table: &ModeTable,
    changes: &[ModeChange],
    over_protocol: bool,
    organize: bool,
    split: bool,
    skip_checks: bool,
    max_per_line: usize,
) -> Vec<(String, Vec<String>)> {
    let ordered: Vec<ModeChange> = if organize {
        let mut plus: Vec<ModeChange> = changes.iter().filter(|c| c.sign == Sign::Plus).cloned().collect();
        let mut minus: Vec<ModeChange> = changes.iter().filter(|c| c.sign == Sign::Minus).cloned().collect();
        plus.sort_by(|a, b| a.name.cmp(&b.name));
        minus.sort_by(|a, b| a.name.cmp(&b.name));
        plus.extend(minus);
        plus
    } else {
        changes.to_vec()
    };

    let usable: Vec<&ModeChange> = ordered
        .iter()
        .filter(|c| skip_checks || table.letter_of(&c.name).is_some())
        .collect();

    if usable.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    let mut cur_str = String::new();
    let mut cur_params = Vec::new();
    let mut cur_sign = None;
    let mut cur_count = 0usize;

    for change in usable {
        let Some(letter) = table.letter_of(&change.name) else { continue };
        if split && cur_count >= max_per_line.max(1) {
            lines.push((std::mem::take(&mut cur_str), std::mem::take(&mut cur_params)));
            cur_sign = None;
            cur_count = 0;
        }
        if cur_sign != Some(change.sign) {
            cur_str.push(change.sign.as_char());
            cur_sign = Some(change.sign);
        }
        cur_str.push(letter);
        if let Some(param) = &change.param {
            cur_params.push(param.stringify(over_protocol));
        }
        cur_count += 1;
    }
    if !cur_str.is_empty() {
        lines.push((cur_str, cur_params));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::types::ModeKind;
    use crate::mode::types::ModeParam;

    fn table() -> ModeTable {
        let mut t = ModeTable::new();
        t.insert('o', "op", ModeKind::Status);
        t.insert('v', "voice", ModeKind::Status);
        t.insert('b', "ban", ModeKind::List);
        t
    }

    fn user(n: &str) -> Option<ModeParam> {
        Some(ModeParam::User { uid: format!("{n}-uid"), nick: n.to_string() })
    }

    #[test]
    fn organize_groups_plus_before_minus() {
        let t = table();
        let changes = vec![
            ModeChange::new(Sign::Minus, "op", user("a")),
            ModeChange::new(Sign::Plus, "voice", user("b")),
        ];
        let lines = strings_from_cmodes(&t, &changes, false, true, false, false, 10);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, "+v-o");
        assert_eq!(lines[0].1, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn organize_sorts_alphabetically_within_each_sign() {
        let t = table();
        let changes = vec![
            ModeChange::new(Sign::Plus, "voice", user("a")),
            ModeChange::new(Sign::Plus, "op", user("b")),
        ];
        let lines = strings_from_cmodes(&t, &changes, false, true, false, false, 10);
        assert_eq!(lines[0].0, "+ov");
        assert_eq!(lines[0].1, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn splits_across_lines_at_max_per_line() {
        let t = table();
        let changes = vec![
            ModeChange::new(Sign::Plus, "op", user("a")),
            ModeChange::new(Sign::Plus, "op", user("b")),
            ModeChange::new(Sign::Plus, "op", user("c")),
        ];
        let lines = strings_from_cmodes(&t, &changes, false, false, true, false, 2);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].0, "+oo");
        assert_eq!(lines[0].1, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(lines[1].0, "+o");
        assert_eq!(lines[1].1, vec!["c".to_string()]);
    }

    #[test]
    fn split_false_keeps_everything_on_one_line() {
        let t = table();
        let changes = vec![
            ModeChange::new(Sign::Plus, "op", user("a")),
            ModeChange::new(Sign::Plus, "op", user("b")),
            ModeChange::new(Sign::Plus, "op", user("c")),
        ];
        let lines = strings_from_cmodes(&t, &changes, false, false, false, false, 2);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, "+ooo");
    }

    #[test]
    fn unknown_mode_dropped_unless_skip_checks() {
        let t = table();
        let changes = vec![ModeChange::new(Sign::Plus, "nonexistent", None)];
        assert!(strings_from_cmodes(&t, &changes, false, false, false, false, 10).is_empty());
    }
}
