//! The error taxonomy from spec §7, typed per layer the way the teacher's
//! `error.rs` splits `HandlerError` / `ChannelError` by concern.

use thiserror::Error;

/// 1. Protocol errors — malformed or underspecified inbound commands.
/// The connection stays open; the caller turns this into a numeric reply.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("not enough parameters")]
    NeedMoreParams,

    #[error("nickname is already in use")]
    NicknameInUse,

    #[error("erroneous nickname")]
    ErroneousNickname,

    #[error("you may not reregister")]
    AlreadyRegistered,

    /// 2. Authentication failure during server-link handshake. Close the
    /// connection with `Invalid credentials`; never reveal which check
    /// failed (spec §7.2).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// 3. Conflict error — duplicate SID, duplicate nick, duplicate name.
    #[error("server exists")]
    ServerExists,

    #[error("unexpected server")]
    UnexpectedServer,
}

/// Mode-translation and mode-string errors (component F).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModeError {
    #[error("letter '{0}' is unknown on this server")]
    UnknownLetter(char),

    #[error("mode '{0}' takes no parameter here")]
    NoParameter(String),
}

/// Everything a `done()` call on a connection can be closing for (spec
/// §4.C "done(reason, silent?)").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Self-issued QUIT; the wire reason is prefixed with `~` by convention.
    SelfQuit(Option<String>),
    Error(String),
    Registration(RegistrationError),
    /// 4. Transport errors — read/write failure or timeout.
    Transport(String),
    Killed { by: String, reason: String },
}

impl CloseReason {
    /// The text sent after `ERROR :Closing Link: <host> (...)`.
    pub fn wire_reason(&self) -> String {
        match self {
            CloseReason::SelfQuit(Some(r)) => format!("~{r}"),
            CloseReason::SelfQuit(None) => "~Client Quit".to_string(),
            CloseReason::Error(e) => e.clone(),
            CloseReason::Registration(e) => e.to_string(),
            CloseReason::Transport(e) => e.clone(),
            CloseReason::Killed { by, reason } => format!("Killed ({by} ({reason}))"),
        }
    }
}

/// 5. Internal errors — unreachable states. Logged, never propagated to
/// peers; the message that triggered it is simply dropped (spec §7.5).
#[derive(Debug, Error)]
#[error("internal error handling {command}: {detail}")]
pub struct InternalError {
    pub command: String,
    pub detail: String,
}
