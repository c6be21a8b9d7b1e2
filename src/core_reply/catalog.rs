use log::debug;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplyCatalogError {
    #[error("Invalid reply code: {0}")]
    InvalidCode(String),
}

const DEFAULT_REPLY_TEXTS: &[(u16, &str)] = &[
    (110, "Restart marker reply."),
    (120, "Service ready in a few minutes."),
    (125, "Data connection already open; transfer starting."),
    (150, "File status okay; about to open data connection."),
    (200, "Command okay."),
    (202, "Command not implemented, superfluous at this site."),
    (211, "System status, or system help reply."),
    (213, "{0}"),
    (214, "{0}"),
    (215, "\"{0}\" system type."),
    (220, "Service ready for new user."),
    (221, "Service closing control connection."),
    (225, "Data connection open; no transfer in progress."),
    (226, "Closing data connection. Requested file action successful."),
    (227, "Entering Passive Mode ({0})."),
    (230, "User logged in, proceed."),
    (250, "Requested file action okay, completed."),
    (257, "\"{0}\" is current directory."),
    (331, "User name okay, need password."),
    (332, "Need account for login."),
    (350, "Requested file action pending further information."),
    (421, "Service not available, closing control connection."),
    (425, "Can't open data connection."),
    (426, "Connection closed; transfer aborted."),
    (450, "Requested file action not taken."),
    (451, "Requested action aborted: local error in processing."),
    (452, "Requested action not taken. Insufficient storage space in system."),
    (500, "Syntax error, command unrecognized."),
    (501, "Syntax error in parameters or arguments."),
    (502, "Command not implemented."),
    (503, "Bad sequence of commands."),
    (504, "Command not implemented for that parameter."),
    (530, "Not logged in."),
    (532, "Need account for storing files."),
    (550, "Requested action not taken. File unavailable."),
    (551, "Requested action aborted: page type unknown."),
    (552, "Requested file action aborted. Exceeded storage allocation."),
    (553, "Requested action not taken. File name not allowed."),
];

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{(\d+)\}").expect("placeholder pattern is valid"))
}

/// Default reply text for every reply code the server sends.
///
/// The catalog is built once at configuration time and shared read-only by
/// every session. Texts may contain positional placeholders (`{0}`, `{1}`)
/// that are filled in by [`ReplyCatalog::format`].
#[derive(Debug, Clone)]
pub struct ReplyCatalog {
    texts: HashMap<u16, String>,
}

impl Default for ReplyCatalog {
    fn default() -> Self {
        let texts = DEFAULT_REPLY_TEXTS
            .iter()
            .map(|(code, text)| (*code, text.to_string()))
            .collect();
        Self { texts }
    }
}

impl ReplyCatalog {
    /// Builds the default catalog and replaces the texts named in `overrides`.
    ///
    /// Keys are reply codes as strings, the way they appear in the `[replies]`
    /// table of the configuration file.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Result<Self, ReplyCatalogError> {
        let mut catalog = Self::default();
        for (key, text) in overrides {
            let code = key
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|code| (100..=599).contains(code))
                .ok_or_else(|| ReplyCatalogError::InvalidCode(key.clone()))?;
            debug!("Overriding reply text for {}: {}", code, text);
            catalog.texts.insert(code, text.clone());
        }
        Ok(catalog)
    }

    /// Raw text for `code`, placeholders untouched. Unknown codes map to "".
    pub fn text(&self, code: u16) -> &str {
        self.texts.get(&code).map(String::as_str).unwrap_or("")
    }

    /// Text for `code` with `{n}` replaced by `args[n]`.
    pub fn format(&self, code: u16, args: &[&str]) -> String {
        fill_placeholders(self.text(code), args)
    }
}

/// Replaces `{n}` in `template` with `args[n]`, or nothing when `args` is
/// too short.
pub fn fill_placeholders(template: &str, args: &[&str]) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| args.get(index))
                .copied()
                .unwrap_or("")
                .to_string()
        })
        .into_owned()
}

/// Formats a reply for the wire.
///
/// A text spanning several lines becomes a multi-line reply: every line but
/// the last uses the `CCC-` prefix and the last one `CCC `.
pub fn format_reply(code: u16, text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= 1 {
        return format!("{} {}\r\n", code, lines.first().copied().unwrap_or(""));
    }

    let mut reply = String::new();
    let last = lines.len() - 1;
    for (index, line) in lines.iter().enumerate() {
        let separator = if index == last { ' ' } else { '-' };
        reply.push_str(&format!("{}{}{}\r\n", code, separator, line));
    }
    reply
}
