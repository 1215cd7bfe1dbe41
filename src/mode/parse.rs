//! Tokenizing a raw wire mode string (`"+ov-b"` plus trailing parameters)
//! into the structured [`ModeChange`] vocabulary, and back.

use super::types::{ModeChange, ModeParam, ModeTable, ParamPolicy, Sign};

/// Parse a mode-letter string against `table`, pulling parameters from
/// `params` in order as each letter's [`ParamPolicy`] demands. Unknown
/// letters are dropped silently (spec §4.F: a server only ever emits
/// mode letters its own table knows, so an unknown letter here means a
/// peer table mismatch — the safe behavior is to ignore it rather than
/// guess at parameter alignment for a mode we don't recognize).
pub fn parse_mode_changes(table: &ModeTable, mode_str: &str, params: &[ModeParam]) -> Vec<ModeChange> {
    let mut changes = Vec::new();
    let mut sign = Sign::Plus;
    let mut param_iter = params.iter().cloned();

    for ch in mode_str.chars() {
        match ch {
            '+' => sign = Sign::Plus,
            '-' => sign = Sign::Minus,
            letter => {
                let Some(kind) = table.kind_of_letter(letter) else { continue };
                let policy = kind.takes_parameter(sign == Sign::Plus);
                let param = match policy {
                    ParamPolicy::Never => None,
                    ParamPolicy::Always => param_iter.next(),
                    // consumed from the stream (keeps later positional
                    // parameters aligned) but discarded: unsetting never
                    // carries a meaningful value.
                    ParamPolicy::OnSetOnly => {
                        param_iter.next();
                        None
                    }
                };
                if let Some(name) = table.name_of(letter) {
                    changes.push(ModeChange::new(sign, name, param));
                }
            }
        }
    }
    changes
}

/// Render structured changes back into a wire-format mode string and its
/// parameter list, grouping consecutive runs of the same sign under one
/// sign character (`+ov-b` rather than `+o+v-b`).
pub fn render_mode_changes(table: &ModeTable, changes: &[ModeChange], over_protocol: bool) -> (String, Vec<String>) {
    let mut mode_str = String::new();
    let mut out_params = Vec::new();
    let mut last_sign = None;

    for change in changes {
        let Some(letter) = table.letter_of(&change.name) else { continue };
        if last_sign != Some(change.sign) {
            mode_str.push(change.sign.as_char());
            last_sign = Some(change.sign);
        }
        mode_str.push(letter);
        if let Some(param) = &change.param {
            out_params.push(param.stringify(over_protocol));
        }
    }
    (mode_str, out_params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::types::ModeKind;

    fn sample_table() -> ModeTable {
        let mut t = ModeTable::new();
        t.insert('o', "op", ModeKind::Status);
        t.insert('v', "voice", ModeKind::Status);
        t.insert('b', "ban", ModeKind::List);
        t.insert('n', "noexternal", ModeKind::Flag);
        t.insert('l', "limit", ModeKind::ParamOnSet);
        t
    }

    #[test]
    fn parses_mixed_sign_runs_with_param_alignment() {
        let table = sample_table();
        let params = vec![
            ModeParam::User { uid: "001AAAAAA".into(), nick: "alice".into() },
            ModeParam::Raw("*!*@host".into()),
        ];
        let changes = parse_mode_changes(&table, "+ob-n", &params);
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0].name, "op");
        assert_eq!(changes[1].name, "ban");
        assert_eq!(changes[1].param, Some(ModeParam::Raw("*!*@host".into())));
        assert_eq!(changes[2].name, "noexternal");
        assert_eq!(changes[2].param, None);
    }

    #[test]
    fn unknown_letters_are_dropped() {
        let table = sample_table();
        let changes = parse_mode_changes(&table, "+oQ", &[ModeParam::Raw("x".into())]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].name, "op");
    }

    #[test]
    fn limit_set_takes_param_unset_does_not() {
        let table = sample_table();
        let set = parse_mode_changes(&table, "+l", &[ModeParam::Raw("10".into())]);
        assert_eq!(set[0].param, Some(ModeParam::Raw("10".into())));

        let unset = parse_mode_changes(&table, "-l", &[ModeParam::Raw("10".into())]);
        assert_eq!(unset[0].param, None);
    }

    #[test]
    fn unsetting_limit_still_consumes_a_present_stray_param() {
        // a peer sending "-lo <stray> <uid>" shouldn't desync op's param
        // onto the stray value just because limit discards its own.
        let table = sample_table();
        let changes = parse_mode_changes(
            &table,
            "-lo",
            &[
                ModeParam::Raw("stray".into()),
                ModeParam::User { uid: "001AAAAAA".into(), nick: "alice".into() },
            ],
        );
        assert_eq!(changes[0].name, "limit");
        assert_eq!(changes[0].param, None);
        assert_eq!(changes[1].name, "op");
        assert_eq!(changes[1].param, Some(ModeParam::User { uid: "001AAAAAA".into(), nick: "alice".into() }));
    }

    #[test]
    fn render_groups_consecutive_same_sign_letters() {
        let table = sample_table();
        let changes = parse_mode_changes(&table, "+ov-n", &[
            ModeParam::User { uid: "001AAAAAA".into(), nick: "alice".into() },
            ModeParam::User { uid: "001AAAAAB".into(), nick: "bob".into() },
        ]);
        let (s, params) = render_mode_changes(&table, &changes, false);
        assert_eq!(s, "+ov-n");
        assert_eq!(params, vec!["alice".to_string(), "bob".to_string()]);
    }
}
