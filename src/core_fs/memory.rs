use super::path::{self, ROOT};
use super::{FileSystem, FileSystemEntry, FileSystemError, Permissions};
use chrono::{DateTime, Local};
use log::debug;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
struct Node {
    // None for directories
    contents: Option<Vec<u8>>,
    owner: Option<String>,
    group: Option<String>,
    permissions: Permissions,
    last_modified: DateTime<Local>,
}

impl Node {
    fn directory(owner: Option<&str>) -> Self {
        Self {
            contents: None,
            owner: owner.map(str::to_string),
            group: None,
            permissions: Permissions::default(),
            last_modified: Local::now(),
        }
    }

    fn file(contents: Vec<u8>, owner: Option<&str>) -> Self {
        Self {
            contents: Some(contents),
            ..Self::directory(owner)
        }
    }

    fn to_entry(&self, path: &str) -> FileSystemEntry {
        FileSystemEntry {
            path: path.to_string(),
            is_directory: self.contents.is_none(),
            size: self.contents.as_ref().map(|c| c.len() as u64).unwrap_or(0),
            owner: self.owner.clone(),
            group: self.group.clone(),
            permissions: self.permissions,
            last_modified: self.last_modified,
        }
    }
}

/// Simulated Unix filesystem held entirely in memory.
///
/// Shared by every session of a server; each operation takes the internal
/// lock once, so operations are atomic with respect to each other.
#[derive(Debug)]
pub struct InMemoryFileSystem {
    nodes: Mutex<BTreeMap<String, Node>>,
}

impl Default for InMemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFileSystem {
    /// An empty filesystem containing only the root directory.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(ROOT.to_string(), Node::directory(None));
        Self {
            nodes: Mutex::new(nodes),
        }
    }

    fn nodes(&self) -> MutexGuard<'_, BTreeMap<String, Node>> {
        self.nodes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds an entry, creating any missing parent directories.
    ///
    /// Used to seed the filesystem from configuration and in tests. `contents`
    /// of `None` adds a directory. An existing entry at `path` is replaced.
    pub fn add_entry(
        &self,
        entry_path: &str,
        contents: Option<Vec<u8>>,
        owner: Option<&str>,
        group: Option<&str>,
        permissions: Permissions,
    ) -> Result<(), FileSystemError> {
        let target = path::normalize(entry_path);
        if target == ROOT && contents.is_some() {
            return Err(FileSystemError::InvalidPath(target));
        }

        let mut nodes = self.nodes();
        let mut missing = Vec::new();
        let mut current = path::parent(&target);
        while let Some(dir) = current {
            match nodes.get(&dir) {
                Some(node) if node.contents.is_some() => {
                    return Err(FileSystemError::NotADirectory(dir));
                }
                Some(_) => break,
                None => {
                    current = path::parent(&dir);
                    missing.push(dir);
                }
            }
        }
        for dir in missing.into_iter().rev() {
            nodes.insert(dir, Node::directory(None));
        }

        let node = Node {
            contents,
            owner: owner.map(str::to_string),
            group: group.map(str::to_string),
            permissions,
            last_modified: Local::now(),
        };
        debug!("Adding filesystem entry: {}", target);
        nodes.insert(target, node);
        Ok(())
    }

    pub fn add_directory(&self, path: &str) -> Result<(), FileSystemError> {
        self.add_entry(path, None, None, None, Permissions::default())
    }

    pub fn add_file(&self, path: &str, contents: impl Into<Vec<u8>>) -> Result<(), FileSystemError> {
        self.add_entry(path, Some(contents.into()), None, None, Permissions::default())
    }

    fn require_parent_directory(
        nodes: &BTreeMap<String, Node>,
        target: &str,
    ) -> Result<(), FileSystemError> {
        let parent = path::parent(target).ok_or_else(|| FileSystemError::InvalidPath(target.to_string()))?;
        match nodes.get(&parent) {
            Some(node) if node.contents.is_none() => Ok(()),
            Some(_) => Err(FileSystemError::NotADirectory(parent)),
            None => Err(FileSystemError::NotFound(parent)),
        }
    }
}

fn is_descendant(candidate: &str, ancestor: &str) -> bool {
    ancestor == ROOT || candidate.starts_with(&format!("{}/", ancestor))
}

impl FileSystem for InMemoryFileSystem {
    fn entry(&self, entry_path: &str) -> Option<FileSystemEntry> {
        let target = path::normalize(entry_path);
        self.nodes().get(&target).map(|node| node.to_entry(&target))
    }

    fn list(&self, entry_path: &str) -> Vec<FileSystemEntry> {
        let target = path::normalize(entry_path);
        let nodes = self.nodes();
        match nodes.get(&target) {
            None => Vec::new(),
            Some(node) if node.contents.is_some() => vec![node.to_entry(&target)],
            Some(_) => nodes
                .iter()
                .filter(|(key, _)| path::parent(key).as_deref() == Some(target.as_str()))
                .map(|(key, node)| node.to_entry(key))
                .collect(),
        }
    }

    fn create_directory(&self, entry_path: &str, owner: Option<&str>) -> Result<(), FileSystemError> {
        let target = path::normalize(entry_path);
        let mut nodes = self.nodes();
        if nodes.contains_key(&target) {
            return Err(FileSystemError::AlreadyExists(target));
        }
        Self::require_parent_directory(&nodes, &target)?;
        nodes.insert(target, Node::directory(owner));
        Ok(())
    }

    fn read_file(&self, entry_path: &str) -> Result<Vec<u8>, FileSystemError> {
        let target = path::normalize(entry_path);
        match self.nodes().get(&target) {
            Some(Node {
                contents: Some(contents),
                ..
            }) => Ok(contents.clone()),
            Some(_) => Err(FileSystemError::IsADirectory(target)),
            None => Err(FileSystemError::NotFound(target)),
        }
    }

    fn write_file(
        &self,
        entry_path: &str,
        data: &[u8],
        append: bool,
        owner: Option<&str>,
    ) -> Result<(), FileSystemError> {
        let target = path::normalize(entry_path);
        let mut nodes = self.nodes();
        Self::require_parent_directory(&nodes, &target)?;

        match nodes.get_mut(&target) {
            Some(Node { contents: None, .. }) => Err(FileSystemError::IsADirectory(target)),
            Some(node) => {
                let contents = node.contents.get_or_insert_with(Vec::new);
                if !append {
                    contents.clear();
                }
                contents.extend_from_slice(data);
                node.last_modified = Local::now();
                Ok(())
            }
            None => {
                nodes.insert(target, Node::file(data.to_vec(), owner));
                Ok(())
            }
        }
    }

    fn delete(&self, entry_path: &str) -> Result<(), FileSystemError> {
        let target = path::normalize(entry_path);
        if target == ROOT {
            return Err(FileSystemError::InvalidPath(target));
        }
        let mut nodes = self.nodes();
        let node = nodes
            .get(&target)
            .ok_or_else(|| FileSystemError::NotFound(target.clone()))?;
        if node.contents.is_none() && nodes.keys().any(|key| is_descendant(key, &target)) {
            return Err(FileSystemError::DirectoryNotEmpty(target));
        }
        nodes.remove(&target);
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), FileSystemError> {
        let source = path::normalize(from);
        let destination = path::normalize(to);
        if source == ROOT || destination == ROOT || is_descendant(&destination, &source) {
            return Err(FileSystemError::InvalidPath(destination));
        }

        let mut nodes = self.nodes();
        if !nodes.contains_key(&source) {
            return Err(FileSystemError::NotFound(source));
        }
        if nodes.contains_key(&destination) {
            return Err(FileSystemError::AlreadyExists(destination));
        }
        Self::require_parent_directory(&nodes, &destination)?;

        let moved: Vec<String> = nodes
            .keys()
            .filter(|key| **key == source || is_descendant(key, &source))
            .cloned()
            .collect();
        for key in moved {
            if let Some(node) = nodes.remove(&key) {
                let new_key = format!("{}{}", destination, &key[source.len()..]);
                nodes.insert(new_key, node);
            }
        }
        Ok(())
    }
}
