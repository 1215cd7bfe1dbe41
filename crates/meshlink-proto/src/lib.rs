//! # meshlink-proto
//!
//! Wire-format primitives for a linked IRC network: the line framer and
//! message tokenizer behind component A of the core connection lifecycle
//! (see the root `meshlink-ircd` crate for the pool, connection, and
//! entity model built on top of this).
//!
//! This crate deliberately keeps `Message::command` a bare string rather
//! than a closed enum of known commands — the core routes by name and
//! leaves per-command semantics to pluggable handlers outside this crate.

#![warn(missing_docs)]
#![allow(clippy::module_inception)]

mod casemap;
#[cfg(feature = "tokio")]
mod codec;
mod error;
mod message;
mod parse;

pub use casemap::{irc_eq, irc_lower_char, irc_to_lower};
#[cfg(feature = "tokio")]
pub use codec::{MeshlinkCodec, DEFAULT_MAX_LINE_LEN};
pub use error::{ProtocolError, Result};
pub use message::{Message, Prefix};
pub use parse::parse_line;
