//! Per-server mode-letter tables and the structured mode-change
//! vocabulary shared by the translator, differ, and serializer (spec
//! §3 "Server": "per-server `umodes` and `cmodes` tables mapping
//! mode-name → `{letter, type}`", §4.F).

use std::collections::HashMap;

/// The four mode categories the spec distinguishes, driving parameter
/// consumption (`cmode_takes_parameter`) and diff/serialize behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModeKind {
    /// No parameter ever (e.g. `+n`, `+t`).
    Flag,
    /// Scalar parameter required on set, none expected on unset (e.g.
    /// `+l <limit>`, `+k <key>`).
    ParamOnSet,
    /// List-type mode: multiple independent entries share one letter
    /// (e.g. ban `+b`), parameter required both ways.
    List,
    /// Status mode: associates a user with a rank prefix (e.g. `+o`,
    /// `+v`); parameter is a user identifier, required both ways.
    Status,
}

/// How many parameters a mode change consumes from the parameter stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamPolicy {
    Never,
    Always,
    /// Required when setting; on unset, no parameter is expected in the
    /// result but one is still consumed from the positional parameter
    /// stream if present, so a peer that sends a (discarded) value on
    /// unset doesn't desync subsequent parameter alignment (spec §4.F:
    /// "2 (only when setting, consumed if present when unsetting)").
    OnSetOnly,
}

impl ModeKind {
    /// Spec §4.F `cmode_takes_parameter(name, state)`: 0/1/2 encoded as
    /// [`ParamPolicy`].
    pub fn takes_parameter(self, setting: bool) -> ParamPolicy {
        match self {
            ModeKind::Flag => ParamPolicy::Never,
            ModeKind::List | ModeKind::Status => ParamPolicy::Always,
            ModeKind::ParamOnSet => {
                if setting {
                    ParamPolicy::Always
                } else {
                    ParamPolicy::OnSetOnly
                }
            }
        }
    }

    /// Numeric type tag matching the glossary's "type 3"/"type 4" usage.
    pub fn type_number(self) -> u8 {
        match self {
            ModeKind::Flag => 0,
            ModeKind::ParamOnSet => 2,
            ModeKind::List => 3,
            ModeKind::Status => 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeDef {
    pub letter: char,
    pub name: String,
    pub kind: ModeKind,
}

/// A server's letter↔name mapping for one mode namespace (umodes or
/// cmodes). Two servers may expose the same logical mode under different
/// letters — that's exactly what the translator bridges.
#[derive(Clone, Debug, Default)]
pub struct ModeTable {
    by_letter: HashMap<char, ModeDef>,
    by_name: HashMap<String, ModeDef>,
}

impl ModeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, letter: char, name: impl Into<String>, kind: ModeKind) {
        let name = name.into();
        let def = ModeDef { letter, name: name.clone(), kind };
        self.by_letter.insert(letter, def.clone());
        self.by_name.insert(name, def);
    }

    pub fn name_of(&self, letter: char) -> Option<&str> {
        self.by_letter.get(&letter).map(|d| d.name.as_str())
    }

    pub fn letter_of(&self, name: &str) -> Option<char> {
        self.by_name.get(name).map(|d| d.letter)
    }

    pub fn kind_of_letter(&self, letter: char) -> Option<ModeKind> {
        self.by_letter.get(&letter).map(|d| d.kind)
    }

    pub fn kind_of_name(&self, name: &str) -> Option<ModeKind> {
        self.by_name.get(name).map(|d| d.kind)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }
}

/// A parameter attached to a mode change. Stringification depends on the
/// viewer (spec §4.F `strings_from_cmodes`: "users → UID (protocol) or
/// nickname (client); servers → SID or name; objects exposing a `name` →
/// that name; otherwise the raw value").
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModeParam {
    User { uid: String, nick: String },
    Server { sid: String, name: String },
    Named(String),
    Raw(String),
}

impl ModeParam {
    pub fn stringify(&self, over_protocol: bool) -> String {
        match self {
            ModeParam::User { uid, nick } => if over_protocol { uid.clone() } else { nick.clone() },
            ModeParam::Server { sid, name } => if over_protocol { sid.clone() } else { name.clone() },
            ModeParam::Named(n) => n.clone(),
            ModeParam::Raw(r) => r.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    pub fn as_char(self) -> char {
        match self {
            Sign::Plus => '+',
            Sign::Minus => '-',
        }
    }
}

/// One structured mode change: `strings_from_cmodes`' input element
/// `(state, name, param)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeChange {
    pub sign: Sign,
    pub name: String,
    pub param: Option<ModeParam>,
}

impl ModeChange {
    pub fn new(sign: Sign, name: impl Into<String>, param: Option<ModeParam>) -> Self {
        Self { sign, name: name.into(), param }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_table_round_trips_letter_and_name() {
        let mut t = ModeTable::new();
        t.insert('o', "ircop", ModeKind::Flag);
        assert_eq!(t.name_of('o'), Some("ircop"));
        assert_eq!(t.letter_of("ircop"), Some('o'));
        assert_eq!(t.kind_of_name("ircop"), Some(ModeKind::Flag));
    }

    #[test]
    fn param_policy_matches_spec_table() {
        assert_eq!(ModeKind::Flag.takes_parameter(true), ParamPolicy::Never);
        assert_eq!(ModeKind::List.takes_parameter(false), ParamPolicy::Always);
        assert_eq!(ModeKind::Status.takes_parameter(false), ParamPolicy::Always);
        assert_eq!(ModeKind::ParamOnSet.takes_parameter(true), ParamPolicy::Always);
        assert_eq!(ModeKind::ParamOnSet.takes_parameter(false), ParamPolicy::OnSetOnly);
    }

    #[test]
    fn mode_param_stringifies_per_viewer() {
        let p = ModeParam::User { uid: "001AAAAAA".into(), nick: "alice".into() };
        assert_eq!(p.stringify(true), "001AAAAAA");
        assert_eq!(p.stringify(false), "alice");
    }
}
