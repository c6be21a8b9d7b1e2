use crate::core_auth::{InMemoryAccountStore, UserAccount};
use crate::core_fs::{InMemoryFileSystem, Permissions};
use crate::core_ftpcommand::handlers::{HandlerOptions, HandlerRegistry};
use crate::core_reply::{codes, ReplyCatalog};
use crate::session::{DEFAULT_DATA_TIMEOUT, DEFAULT_TRANSFER_BUFFER_SIZE};
use anyhow::{Context, Result};
use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::sync::Arc;

/// Which handler family the server is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    /// Canned replies; every invocation is recorded.
    Stub,
    /// Simulated filesystem and user accounts.
    #[default]
    Fake,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: IpAddr,
    pub listen_port: u16,
    /// Address advertised in PASV replies. Defaults to the local address of
    /// the control connection.
    pub pasv_address: Option<IpAddr>,
    pub mode: ServerMode,
    pub system_name: String,
    pub data_accept_timeout_secs: u64,
    pub transfer_buffer_size: usize,
    pub greeting: Option<String>,
    pub help_text: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            listen_port: 21,
            pasv_address: None,
            mode: ServerMode::default(),
            system_name: HandlerOptions::default().system_name,
            data_accept_timeout_secs: DEFAULT_DATA_TIMEOUT.as_secs(),
            transfer_buffer_size: DEFAULT_TRANSFER_BUFFER_SIZE,
            greeting: None,
            help_text: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[default]
    File,
    Directory,
}

/// One `[[filesystem]]` entry seeded into the fake filesystem.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileSystemEntryConfig {
    pub path: String,
    #[serde(default)]
    pub kind: EntryKind,
    #[serde(default)]
    pub contents: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    /// `rwxrwxrwx` form; everything allowed when absent.
    #[serde(default)]
    pub permissions: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// Reply text overrides keyed by reply code.
    #[serde(default)]
    pub replies: HashMap<String, String>,
    #[serde(default)]
    pub accounts: Vec<UserAccount>,
    #[serde(default)]
    pub filesystem: Vec<FileSystemEntryConfig>,
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)?;
        Ok(config)
    }

    pub fn handler_options(&self) -> HandlerOptions {
        let defaults = HandlerOptions::default();
        HandlerOptions {
            system_name: self.server.system_name.clone(),
            help_text: self.server.help_text.clone().unwrap_or(defaults.help_text),
        }
    }

    /// Default reply texts with `[replies]` and the greeting applied.
    pub fn build_catalog(&self) -> Result<ReplyCatalog> {
        let mut overrides = self.replies.clone();
        if let Some(greeting) = &self.server.greeting {
            overrides.insert(codes::SERVICE_READY.to_string(), greeting.clone());
        }
        ReplyCatalog::with_overrides(&overrides).context("Invalid [replies] table")
    }

    /// Fake filesystem holding the `[[filesystem]]` entries. Missing parent
    /// directories are created.
    pub fn build_filesystem(&self) -> Result<InMemoryFileSystem> {
        let filesystem = InMemoryFileSystem::new();
        for entry in &self.filesystem {
            let permissions = match &entry.permissions {
                Some(text) => text
                    .parse::<Permissions>()
                    .with_context(|| format!("Invalid permissions for {}", entry.path))?,
                None => Permissions::default(),
            };
            let contents = match entry.kind {
                EntryKind::Directory => None,
                EntryKind::File => Some(entry.contents.clone().unwrap_or_default().into_bytes()),
            };
            filesystem
                .add_entry(
                    &entry.path,
                    contents,
                    entry.owner.as_deref(),
                    entry.group.as_deref(),
                    permissions,
                )
                .with_context(|| format!("Failed to add filesystem entry {}", entry.path))?;
        }
        Ok(filesystem)
    }

    pub fn build_accounts(&self) -> InMemoryAccountStore {
        InMemoryAccountStore::from_accounts(self.accounts.iter().cloned())
    }

    /// Handler registry for the configured mode.
    pub fn build_registry(&self) -> Result<HandlerRegistry> {
        let options = self.handler_options();
        let registry = match self.server.mode {
            ServerMode::Stub => HandlerRegistry::stub(&options),
            ServerMode::Fake => {
                let filesystem = self.build_filesystem()?;
                info!(
                    "Fake filesystem seeded with {} entries, {} accounts",
                    self.filesystem.len(),
                    self.accounts.len()
                );
                HandlerRegistry::fake(
                    Arc::new(filesystem),
                    Arc::new(self.build_accounts()),
                    &options,
                )
            }
        };
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_auth::AccountStore;
    use crate::core_fs::FileSystem;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[server]
listen_port = 2121
mode = "stub"
system_name = "UNIX Type: L8"
pasv_address = "10.0.0.5"

[replies]
"230" = "Welcome."

[[accounts]]
username = "alice"
password = "secret"
home_directory = "/home/alice"
groups = ["users"]

[[filesystem]]
path = "/home/alice/readme.txt"
contents = "hello"
owner = "alice"
permissions = "rw-r-----"

[[filesystem]]
path = "/pub"
kind = "directory"
"#;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.server.listen_port, 21);
        assert_eq!(config.server.mode, ServerMode::Fake);
        assert_eq!(config.server.system_name, "WINDOWS");
        assert_eq!(config.server.data_accept_timeout_secs, 30);
        assert!(config.server.pasv_address.is_none());
        assert!(config.accounts.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.server.listen_port, 2121);
        assert_eq!(config.server.mode, ServerMode::Stub);
        assert_eq!(config.server.pasv_address, Some("10.0.0.5".parse().unwrap()));
        assert_eq!(config.handler_options().system_name, "UNIX Type: L8");
        assert_eq!(config.build_catalog().unwrap().text(230), "Welcome.");

        let accounts = config.build_accounts();
        let alice = accounts.lookup("alice").unwrap();
        assert_eq!(alice.groups, vec!["users".to_string()]);
        assert!(alice.password_required);
    }

    #[test]
    fn test_build_filesystem() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        let fs = config.build_filesystem().unwrap();
        assert!(fs.is_directory("/home/alice"));
        assert!(fs.is_directory("/pub"));
        let readme = fs.entry("/home/alice/readme.txt").unwrap();
        assert_eq!(readme.size, 5);
        assert_eq!(readme.permissions.to_string(), "rw-r-----");
        assert_eq!(readme.owner.as_deref(), Some("alice"));
    }

    #[test]
    fn test_greeting_override() {
        let config = Config::from_toml_str("[server]\ngreeting = \"Mock FTP ready\"").unwrap();
        assert_eq!(config.build_catalog().unwrap().text(220), "Mock FTP ready");
    }

    #[test]
    fn test_invalid_files() {
        assert!(Config::load_from_file(Path::new("/definitely/not/here.toml")).is_err());
        assert!(Config::from_toml_str("[server]\nmode = \"ftps\"").is_err());

        let config = Config::from_toml_str(
            "[[filesystem]]\npath = \"/x\"\npermissions = \"bogus\"",
        )
        .unwrap();
        assert!(config.build_filesystem().is_err());

        let config = Config::from_toml_str("[replies]\n\"abc\" = \"x\"").unwrap();
        assert!(config.build_catalog().is_err());
    }

    #[test]
    fn test_build_registry_per_mode() {
        let stub = Config::from_toml_str("[server]\nmode = \"stub\"").unwrap();
        let registry = stub.build_registry().unwrap();
        assert!(registry.get_handler("STOR").invocations().is_some());

        let fake = Config::default();
        let registry = fake.build_registry().unwrap();
        assert!(registry.get_handler("STOR").invocations().is_none());
        assert!(registry.is_registered("SIZE"));
    }
}
