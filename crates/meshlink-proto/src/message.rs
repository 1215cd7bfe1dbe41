//! The parsed message type: component A's output (§4.A, §3 "Message").
//!
//! Unlike a closed `Command` enum, `command` here stays a bare string: the
//! core routes by name and leaves command semantics to pluggable handlers
//! (spec §1 scope — "the core routes commands by name; each command
//! handler is a pluggable unit outside this spec").

use std::fmt;

/// Origin of a message: either a linked server's name, or a user's full
/// `nick!user@host` mask.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Prefix {
    ServerName(String),
    Nickname { nick: String, user: String, host: String },
}

impl Prefix {
    /// Lenient parse: a dot before the first `!`/`@` suggests a server name,
    /// otherwise this is a nick mask (possibly partial, e.g. just a nick).
    pub fn parse(s: &str) -> Self {
        if let Some(bang) = s.find('!') {
            let nick = s[..bang].to_string();
            let rest = &s[bang + 1..];
            if let Some(at) = rest.find('@') {
                return Prefix::Nickname {
                    nick,
                    user: rest[..at].to_string(),
                    host: rest[at + 1..].to_string(),
                };
            }
            return Prefix::Nickname {
                nick,
                user: rest.to_string(),
                host: String::new(),
            };
        }
        if let Some(at) = s.find('@') {
            return Prefix::Nickname {
                nick: s[..at].to_string(),
                user: String::new(),
                host: s[at + 1..].to_string(),
            };
        }
        if s.contains('.') {
            Prefix::ServerName(s.to_string())
        } else {
            Prefix::Nickname {
                nick: s.to_string(),
                user: String::new(),
                host: String::new(),
            }
        }
    }

    pub fn nick(&self) -> Option<&str> {
        match self {
            Prefix::Nickname { nick, .. } => Some(nick),
            Prefix::ServerName(_) => None,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => write!(f, "{name}"),
            Prefix::Nickname { nick, user, host } => {
                if user.is_empty() && host.is_empty() {
                    write!(f, "{nick}")
                } else {
                    write!(f, "{nick}!{user}@{host}")
                }
            }
        }
    }
}

/// A parsed protocol line (spec §3 "Message", §4.A).
///
/// `command` is always upper-cased by the parser. `params` holds the
/// "middle" parameters (at most 14); `trailing` is the optional final
/// parameter introduced by a leading `:` (or simply the last middle
/// parameter if no `:` was present and fewer than 15 params were given —
/// conventional IRC parsers treat the two uniformly for output purposes,
/// but we keep them distinct to mirror the wire form on re-encode).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Message {
    pub prefix: Option<Prefix>,
    pub command: String,
    pub params: Vec<String>,
    pub trailing: Option<String>,
}

impl Message {
    pub fn new(command: impl Into<String>) -> Self {
        Message {
            prefix: None,
            command: command.into().to_ascii_uppercase(),
            params: Vec::new(),
            trailing: None,
        }
    }

    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn with_trailing(mut self, trailing: impl Into<String>) -> Self {
        self.trailing = Some(trailing.into());
        self
    }

    /// All parameters including the trailing one, in wire order — the view
    /// most command handlers want (spec §4.A: "up to 14 middle parameters
    /// and an optional trailing parameter").
    pub fn all_params(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.params.iter().map(String::as_str).collect();
        if let Some(t) = &self.trailing {
            v.push(t.as_str());
        }
        v
    }

    pub fn source_nick(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.prefix {
            write!(f, ":{p} ")?;
        }
        write!(f, "{}", self.command)?;
        for p in &self.params {
            write!(f, " {p}")?;
        }
        if let Some(t) = &self.trailing {
            write!(f, " :{t}")?;
        }
        Ok(())
    }
}
