//! The line tokenizer backing component A (spec §4.A).
//!
//! Recognises an optional leading `:source`, a command token (letters or a
//! 3-digit numeric), up to 14 middle parameters, and an optional trailing
//! parameter preceded by a standalone `:`. Once 14 middle parameters have
//! been consumed, the remainder of the line — even without a leading `:` —
//! concatenates into the trailing segment, per spec.

use crate::error::ProtocolError;
use crate::message::{Message, Prefix};

const MAX_MIDDLE_PARAMS: usize = 14;

/// Parse one already-delimited line (CR/LF already stripped) into a
/// [`Message`]. Returns `Ok(None)` for a blank line — callers must drop
/// those silently per §4.A ("silently drops empty lines").
pub fn parse_line(line: &str) -> Result<Option<Message>, ProtocolError> {
    let line = line.trim_matches(|c| c == '\r' || c == '\n');
    if line.is_empty() {
        return Ok(None);
    }

    let mut rest = line;
    let mut prefix = None;
    if let Some(stripped) = rest.strip_prefix(':') {
        let (source, remainder) = split_first_token(stripped);
        if source.is_empty() {
            return Err(ProtocolError::MalformedPrefix(line.to_string()));
        }
        prefix = Some(Prefix::parse(source));
        rest = remainder.trim_start_matches(' ');
    }

    let (command_tok, mut rest) = split_first_token(rest);
    if command_tok.is_empty() {
        return Err(ProtocolError::EmptyCommand);
    }
    let command = command_tok.to_ascii_uppercase();

    let mut params = Vec::new();
    let mut trailing = None;

    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }
        if let Some(stripped) = rest.strip_prefix(':') {
            trailing = Some(stripped.to_string());
            break;
        }
        if params.len() >= MAX_MIDDLE_PARAMS {
            // Excess bytes after the limit concatenate into the trailing
            // segment, even without a leading colon.
            trailing = Some(rest.to_string());
            break;
        }
        let (tok, remainder) = split_first_token(rest);
        params.push(tok.to_string());
        rest = remainder;
    }

    Ok(Some(Message {
        prefix,
        command,
        params,
        trailing,
    }))
}

/// Split on the first run of spaces, returning (token, remainder).
fn split_first_token(s: &str) -> (&str, &str) {
    match s.find(' ') {
        Some(idx) => (&s[..idx], &s[idx..]),
        None => (s, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_command() {
        let m = parse_line("NICK alice").unwrap().unwrap();
        assert_eq!(m.command, "NICK");
        assert_eq!(m.params, vec!["alice"]);
        assert!(m.trailing.is_none());
    }

    #[test]
    fn parses_prefix_and_trailing() {
        let m = parse_line(":alice!ali@host PRIVMSG #chan :hello there")
            .unwrap()
            .unwrap();
        assert_eq!(m.source_nick(), Some("alice"));
        assert_eq!(m.command, "PRIVMSG");
        assert_eq!(m.params, vec!["#chan"]);
        assert_eq!(m.trailing.as_deref(), Some("hello there"));
    }

    #[test]
    fn lowercases_command_get_uppercased() {
        let m = parse_line("nick bob").unwrap().unwrap();
        assert_eq!(m.command, "NICK");
    }

    #[test]
    fn numeric_command_token_accepted() {
        let m = parse_line(":irc.example.com 001 alice :Welcome").unwrap().unwrap();
        assert_eq!(m.command, "001");
    }

    #[test]
    fn blank_line_is_dropped_silently() {
        assert!(parse_line("").unwrap().is_none());
        assert!(parse_line("   ").is_err() || parse_line("   ").unwrap().is_none());
    }

    #[test]
    fn excess_middle_params_fold_into_trailing_without_colon() {
        // 15 space-separated tokens after the command, no leading ':'.
        let raw = format!("CMD {}", (0..15).map(|i| i.to_string()).collect::<Vec<_>>().join(" "));
        let m = parse_line(&raw).unwrap().unwrap();
        assert_eq!(m.params.len(), MAX_MIDDLE_PARAMS);
        // Remaining tokens (the 15th onward) concatenate verbatim into trailing.
        assert_eq!(m.trailing.as_deref(), Some("14"));
    }

    #[test]
    fn user_command_real_name_remainder_preserved_verbatim() {
        let m = parse_line("USER ali * * :Alice Liddell").unwrap().unwrap();
        assert_eq!(m.params, vec!["ali", "*", "*"]);
        assert_eq!(m.trailing.as_deref(), Some("Alice Liddell"));
    }
}
