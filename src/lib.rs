//! Core connection lifecycle, entity model, and inter-server propagation
//! fabric for a linked IRC network.
//!
//! This crate deliberately stops short of a full daemon: command
//! semantics beyond the fixed pre-registration set (NICK/USER/PASS/
//! SERVER/QUIT/ERROR) are pluggable through [`hooks::HookRegistry`], and
//! there is no socket acceptor here — `main.rs` wires sockets to
//! [`connection::Connection`] the way a real daemon would, but that
//! wiring is an application concern, not a core one.

#![warn(missing_docs)]
#![allow(clippy::module_inception)]

pub mod channel;
pub mod config;
pub mod connection;
pub mod error;
pub mod hooks;
pub mod mode;
pub mod numeric;
pub mod pool;
pub mod propagation;
pub mod security;
pub mod server;
pub mod user;

pub use config::{ConfigLookup, ConfigError, ConnectBlock, FakeConfig, ServerSection, TomlConfig};
pub use connection::{Connection, ConnState, Dispatch, Promotion, SharedConnection};
pub use error::{CloseReason, InternalError, ModeError, RegistrationError};
pub use hooks::{CommandExtArgs, HookChain, HookDecision, HookRegistry, MutableText, NickChangeArgs, NoticeSink};
pub use numeric::Numeric;
pub use pool::{Pool, PoolError};
pub use propagation::{cap_allows, mask_change_lines};
pub use server::Server;
pub use user::{Location, NewUser, PrivmsgOpts, PrivmsgOutcome, PrivmsgResult, User, WelcomeBurst, WelcomeParams};
