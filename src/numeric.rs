//! The pool's numeric-reply table (spec §3 "Pool": "numeric-reply table").
//!
//! Only the numerics this core actually emits are named here; handler
//! extensions outside this crate are free to send any others directly.

#![allow(non_camel_case_types)]

/// A three-digit IRC numeric reply code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Numeric {
    /// 001 - Welcome to the network.
    RPL_WELCOME = 1,
    /// 002 - Your host is running this server software/version.
    RPL_YOURHOST = 2,
    /// 003 - When this server was created.
    RPL_CREATED = 3,
    /// 004 - Server name, version, user modes, channel modes.
    RPL_MYINFO = 4,
    /// 005 - RPL_ISUPPORT, advertised server capabilities.
    RPL_ISUPPORT = 5,
    /// 042 - The client's unique ID.
    RPL_YOURID = 42,
    /// 301 - Target is away.
    RPL_AWAY = 301,
    /// 396 - Notify the client of its (possibly cloaked) visible host.
    RPL_HOSTHIDDEN = 396,
    /// 421 - Unknown command.
    ERR_UNKNOWNCOMMAND = 421,
    /// 432 - Nickname fails validation.
    ERR_ERRONEUSNICKNAME = 432,
    /// 433 - Nickname already in use.
    ERR_NICKNAMEINUSE = 433,
    /// 404 - Cannot send to channel (vetoed by a can_privmsg-family hook).
    ERR_CANNOTSENDTOCHAN = 404,
    /// 461 - Not enough parameters given to a command.
    ERR_NEEDMOREPARAMS = 461,
    /// 462 - Already registered, may not re-register.
    ERR_ALREADYREGISTERED = 462,
}

impl Numeric {
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Zero-padded three-digit wire form, e.g. `"001"`.
    pub fn as_str(self) -> String {
        format!("{:03}", self.code())
    }
}

impl std::fmt::Display for Numeric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_as_zero_padded_three_digits() {
        assert_eq!(Numeric::RPL_WELCOME.as_str(), "001");
        assert_eq!(Numeric::RPL_ISUPPORT.as_str(), "005");
        assert_eq!(Numeric::ERR_NICKNAMEINUSE.as_str(), "433");
    }
}
