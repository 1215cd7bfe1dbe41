//! Mode-letter tables and translation (spec §4.F "Mode translator").
//!
//! Unlike the teacher's `UserModes`/`ChannelModes` fixed-field structs,
//! this models mode tables as per-server, per-namespace letter↔name
//! maps ([`ModeTable`]) — required because two linked servers may use
//! different letters for the same logical mode, and the translator has
//! to bridge that (see DESIGN.md).

pub mod diff;
pub mod parse;
pub mod serialize;
pub mod translator;
pub mod types;

pub use diff::{cmode_string_difference, CmodeState};
pub use parse::{parse_mode_changes, render_mode_changes};
pub use serialize::strings_from_cmodes;
pub use translator::{convert_cmode_string, convert_umode_string};
pub use types::{ModeChange, ModeDef, ModeKind, ModeParam, ModeTable, ParamPolicy, Sign};
