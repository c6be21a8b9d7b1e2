use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("Empty command line")]
    Empty,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParameterError {
    #[error("Missing required parameter at index {0}")]
    Missing(usize),

    #[error("Invalid parameter {value:?}: {reason}")]
    Invalid { value: String, reason: String },
}

/// One request line received on the control connection.
///
/// The verb is everything before the first space, uppercased. The rest of the
/// line is split on `,` into parameters, so `PORT 127,0,0,1,4,1` carries six
/// parameters and `STOR my file.txt` carries one. Handlers interpret their
/// own parameter grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: String,
    params: Vec<String>,
}

impl Command {
    pub fn new(verb: &str, params: &[&str]) -> Result<Self, CommandParseError> {
        let verb = verb.trim();
        if verb.is_empty() {
            return Err(CommandParseError::Empty);
        }
        Ok(Self {
            verb: verb.to_ascii_uppercase(),
            params: params.iter().map(|p| p.to_string()).collect(),
        })
    }

    pub fn parse(line: &str) -> Result<Self, CommandParseError> {
        let line = line.trim_end_matches(['\r', '\n']).trim();
        let (verb, rest) = match line.split_once(' ') {
            Some((verb, rest)) => (verb, rest),
            None => (line, ""),
        };
        if verb.is_empty() {
            return Err(CommandParseError::Empty);
        }

        let params = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split(',').map(str::to_string).collect()
        };
        Ok(Self {
            verb: verb.to_ascii_uppercase(),
            params,
        })
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    pub fn required_param(&self, index: usize) -> Result<&str, ParameterError> {
        self.param(index)
            .filter(|p| !p.is_empty())
            .ok_or(ParameterError::Missing(index))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never log passwords.
        if self.verb == "PASS" {
            return write!(f, "PASS ****");
        }
        if self.params.is_empty() {
            write!(f, "{}", self.verb)
        } else {
            write!(f, "{} {}", self.verb, self.params.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verb_only() {
        let command = Command::parse("pwd\r\n").unwrap();
        assert_eq!(command.verb(), "PWD");
        assert!(command.params().is_empty());
    }

    #[test]
    fn test_parse_comma_separated_params() {
        let command = Command::parse("PORT 127,0,0,1,4,1\r\n").unwrap();
        assert_eq!(command.verb(), "PORT");
        assert_eq!(command.params(), &["127", "0", "0", "1", "4", "1"]);
    }

    #[test]
    fn test_parse_keeps_spaces_in_params() {
        let command = Command::parse("STOR my file.txt").unwrap();
        assert_eq!(command.param(0), Some("my file.txt"));
        assert_eq!(command.params().len(), 1);
    }

    #[test]
    fn test_parse_empty_line() {
        assert_eq!(Command::parse("\r\n"), Err(CommandParseError::Empty));
        assert_eq!(Command::parse("   "), Err(CommandParseError::Empty));
        assert_eq!(Command::new("", &[]), Err(CommandParseError::Empty));
    }

    #[test]
    fn test_required_param() {
        let command = Command::parse("CWD").unwrap();
        assert_eq!(command.required_param(0), Err(ParameterError::Missing(0)));

        let command = Command::parse("CWD docs").unwrap();
        assert_eq!(command.required_param(0), Ok("docs"));
        assert_eq!(command.required_param(1), Err(ParameterError::Missing(1)));
    }

    #[test]
    fn test_display_hides_password() {
        let command = Command::new("pass", &["secret"]).unwrap();
        assert_eq!(command.to_string(), "PASS ****");
    }
}
