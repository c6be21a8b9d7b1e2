pub mod error;
pub mod memory;
pub mod path;
pub mod permissions;

pub use error::FileSystemError;
pub use memory::InMemoryFileSystem;
pub use permissions::{Access, Permissions};

use chrono::{DateTime, Local};

/// Metadata snapshot of one filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemEntry {
    pub path: String,
    pub is_directory: bool,
    pub size: u64,
    pub owner: Option<String>,
    pub group: Option<String>,
    pub permissions: Permissions,
    pub last_modified: DateTime<Local>,
}

impl FileSystemEntry {
    pub fn name(&self) -> &str {
        path::file_name(&self.path)
    }

    /// Whether `username` (member of `groups`) has `access` to this entry.
    pub fn permits(&self, access: Access, username: &str, groups: &[String]) -> bool {
        let is_owner = self.owner.as_deref() == Some(username);
        let in_group = self
            .group
            .as_ref()
            .map(|group| groups.contains(group))
            .unwrap_or(false);
        self.permissions.allows(access, is_owner, in_group)
    }

    /// One line in the style of `ls -l`.
    pub fn format_unix_listing(&self) -> String {
        format!(
            "{}{}  1 {:<8} {:<8} {:>12} {} {}",
            if self.is_directory { 'd' } else { '-' },
            self.permissions,
            self.owner.as_deref().unwrap_or("none"),
            self.group.as_deref().unwrap_or("none"),
            self.size,
            self.last_modified.format("%b %d %H:%M"),
            self.name()
        )
    }
}

/// Filesystem consumed by the fake command handlers.
///
/// All paths are absolute Unix-style paths; implementations normalize them
/// with [`path::normalize`]. Parents are never created implicitly.
pub trait FileSystem: Send + Sync {
    fn entry(&self, path: &str) -> Option<FileSystemEntry>;

    fn exists(&self, path: &str) -> bool {
        self.entry(path).is_some()
    }

    fn is_directory(&self, path: &str) -> bool {
        self.entry(path).map(|e| e.is_directory).unwrap_or(false)
    }

    fn is_file(&self, path: &str) -> bool {
        self.entry(path).map(|e| !e.is_directory).unwrap_or(false)
    }

    fn parent(&self, path: &str) -> Option<String> {
        path::parent(path)
    }

    /// Entries directly inside a directory, or the file itself for a file
    /// path. Empty when nothing exists at `path`.
    fn list(&self, path: &str) -> Vec<FileSystemEntry>;

    fn create_directory(&self, path: &str, owner: Option<&str>) -> Result<(), FileSystemError>;

    fn read_file(&self, path: &str) -> Result<Vec<u8>, FileSystemError>;

    /// Creates or truncates the file at `path`, or appends when `append` is
    /// set.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
        append: bool,
        owner: Option<&str>,
    ) -> Result<(), FileSystemError>;

    fn delete(&self, path: &str) -> Result<(), FileSystemError>;

    fn rename(&self, from: &str, to: &str) -> Result<(), FileSystemError>;
}
