use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("Invalid permission string: {0}")]
pub struct PermissionsParseError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    Execute,
}

/// Unix permission bits for owner, group and world, written `rwxr-xr-x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    mode: u16,
}

impl Permissions {
    pub const ALL: Permissions = Permissions { mode: 0o777 };

    pub fn from_mode(mode: u16) -> Self {
        Self { mode: mode & 0o777 }
    }

    pub fn mode(&self) -> u16 {
        self.mode
    }

    /// Checks `access` for a user. Owner bits apply when `is_owner`, group bits
    /// when `in_group`, world bits otherwise.
    pub fn allows(&self, access: Access, is_owner: bool, in_group: bool) -> bool {
        let shift = if is_owner {
            6
        } else if in_group {
            3
        } else {
            0
        };
        let bit = match access {
            Access::Read => 0o4,
            Access::Write => 0o2,
            Access::Execute => 0o1,
        };
        (self.mode >> shift) & bit != 0
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::ALL
    }
}

impl FromStr for Permissions {
    type Err = PermissionsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 9 {
            return Err(PermissionsParseError(s.to_string()));
        }

        let mut mode = 0u16;
        for (index, c) in chars.iter().enumerate() {
            let expected = ['r', 'w', 'x'][index % 3];
            mode <<= 1;
            if *c == expected {
                mode |= 1;
            } else if *c != '-' {
                return Err(PermissionsParseError(s.to_string()));
            }
        }
        Ok(Self { mode })
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..9 {
            let bit = 1 << (8 - index);
            let c = if self.mode & bit != 0 {
                ['r', 'w', 'x'][index % 3]
            } else {
                '-'
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let perms: Permissions = "rwxr-x---".parse().unwrap();
        assert_eq!(perms.mode(), 0o750);
        assert_eq!(perms.to_string(), "rwxr-x---");
        assert_eq!(Permissions::ALL.to_string(), "rwxrwxrwx");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("rwx".parse::<Permissions>().is_err());
        assert!("rwxrwxrwz".parse::<Permissions>().is_err());
        assert!("xwrrwxrwx".parse::<Permissions>().is_err());
    }

    #[test]
    fn test_allows() {
        let perms: Permissions = "rwxr-x--x".parse().unwrap();
        assert!(perms.allows(Access::Write, true, false));
        assert!(!perms.allows(Access::Write, false, true));
        assert!(perms.allows(Access::Read, false, true));
        assert!(!perms.allows(Access::Read, false, false));
        assert!(perms.allows(Access::Execute, false, false));
    }
}
